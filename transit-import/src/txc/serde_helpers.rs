//! Shape normalization for parser-emitted records.
//!
//! The XML-to-JSON step collapses single children into plain objects, drops
//! absent ones and turns empty elements into `""`. These helpers fold every
//! one of those shapes into a uniform representation so that nothing past
//! the `txc` boundary has to care.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Deserialize a child that may be a list, a single record, `null` or `""`.
///
/// Use with `#[serde(default, deserialize_with = "one_or_many")]` so that an
/// absent field also yields an empty `Vec`. List entries are read one at a
/// time: `null` entries are dropped, and entries that don't fit `T` are
/// dropped with a warning while their siblings are kept.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Element<T> {
        Value(T),
        Null(()),
        Other(IgnoredAny),
    }

    // `Many` accepts every array, so an array never reaches `One`
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape<T> {
        Many(Vec<Element<T>>),
        One(T),
        Blank(IgnoredAny),
    }

    Ok(match Shape::<T>::deserialize(deserializer)? {
        Shape::Many(items) => {
            let mut values = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    Element::Value(value) => values.push(value),
                    Element::Null(()) => {}
                    Element::Other(_) => warn!(index, "dropping list entry of unexpected shape"),
                }
            }
            values
        }
        Shape::One(item) => vec![item],
        Shape::Blank(_) => Vec::new(),
    })
}

/// Deserialize a nested record, treating any shape it doesn't fit as absent.
///
/// Empty container elements (`<StopPoints/>`) arrive as `""`, which would
/// otherwise fail the whole document.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape<T> {
        Value(T),
        Other(IgnoredAny),
    }

    Ok(match Shape::<T>::deserialize(deserializer)? {
        Shape::Value(value) => Some(value),
        Shape::Other(_) => None,
    })
}

/// Deserialize a scalar that the parser may emit as a string or a number.
///
/// Blank strings become `None`.
pub fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
        Flag(bool),
        Other(IgnoredAny),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Scalar::Int(n) => Some(n.to_string()),
        Scalar::Float(n) => Some(n.to_string()),
        Scalar::Flag(b) => Some(b.to_string()),
        Scalar::Other(_) => None,
    })
}
