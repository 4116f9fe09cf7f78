//! Import configuration.

use std::path::PathBuf;

use crate::error::ImportError;

/// Default input document, as written by the XML converter.
const DEFAULT_INPUT: &str = "TransXChange.json";

/// Default directory the store persists into.
const DEFAULT_OUTPUT_DIR: &str = "db";

/// Default number of documents per insert chunk.
const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Path of the JSON schedule document
    pub input: PathBuf,
    /// Directory the store writes its collections into
    pub output_dir: PathBuf,
    /// Maximum documents per insert chunk
    pub batch_size: usize,
    /// Whether entity collections are emptied before writing.
    /// Service calendars are never cleared.
    pub clear_collections: bool,
}

impl ImportConfig {
    /// Create a config for the given input and output with default settings.
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            clear_collections: true,
        }
    }

    /// Set the insert chunk size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set whether entity collections are cleared first.
    pub fn with_clear_collections(mut self, clear: bool) -> Self {
        self.clear_collections = clear;
        self
    }

    /// Read `TXC_INPUT`, `TXC_OUTPUT_DIR` and `TXC_BATCH_SIZE` from the
    /// process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ImportError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ImportConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ImportError> {
        let mut config = Self::default();
        if let Some(input) = lookup("TXC_INPUT") {
            config.input = input.into();
        }
        if let Some(dir) = lookup("TXC_OUTPUT_DIR") {
            config.output_dir = dir.into();
        }
        if let Some(size) = lookup("TXC_BATCH_SIZE") {
            config.batch_size = size.trim().parse().map_err(|_| {
                ImportError::Config(format!("TXC_BATCH_SIZE is not a number: {size}"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Override input path and output directory from positional arguments
    /// (program name already stripped).
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Result<Self, ImportError> {
        let mut args = args.into_iter();
        if let Some(input) = args.next() {
            self.input = input.into();
        }
        if let Some(dir) = args.next() {
            self.output_dir = dir.into();
        }
        if let Some(extra) = args.next() {
            return Err(ImportError::Config(format!("unexpected argument: {extra}")));
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ImportError> {
        if self.batch_size == 0 {
            return Err(ImportError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT, DEFAULT_OUTPUT_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = ImportConfig::default();

        assert_eq!(config.input, PathBuf::from("TransXChange.json"));
        assert_eq!(config.output_dir, PathBuf::from("db"));
        assert_eq!(config.batch_size, 1000);
        assert!(config.clear_collections);
    }

    #[test]
    fn builder() {
        let config = ImportConfig::new("in.json", "out")
            .with_batch_size(50)
            .with_clear_collections(false);

        assert_eq!(config.input, PathBuf::from("in.json"));
        assert_eq!(config.batch_size, 50);
        assert!(!config.clear_collections);
    }

    #[test]
    fn from_environment() {
        let config = ImportConfig::from_lookup(lookup(&[
            ("TXC_INPUT", "/data/schedule.json"),
            ("TXC_BATCH_SIZE", " 250 "),
        ]))
        .unwrap();

        assert_eq!(config.input, PathBuf::from("/data/schedule.json"));
        assert_eq!(config.output_dir, PathBuf::from("db"));
        assert_eq!(config.batch_size, 250);
    }

    #[test]
    fn rejects_bad_batch_size() {
        let err = ImportConfig::from_lookup(lookup(&[("TXC_BATCH_SIZE", "lots")])).unwrap_err();
        assert!(matches!(err, ImportError::Config(_)));

        let err = ImportConfig::from_lookup(lookup(&[("TXC_BATCH_SIZE", "0")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: batch size must be at least 1"
        );
    }

    #[test]
    fn positional_arguments() {
        let config = ImportConfig::default()
            .with_args(["a.json".to_string(), "out".to_string()])
            .unwrap();
        assert_eq!(config.input, PathBuf::from("a.json"));
        assert_eq!(config.output_dir, PathBuf::from("out"));

        let config = ImportConfig::default()
            .with_args(["only.json".to_string()])
            .unwrap();
        assert_eq!(config.input, PathBuf::from("only.json"));
        assert_eq!(config.output_dir, PathBuf::from("db"));

        let err = ImportConfig::default()
            .with_args(["a".to_string(), "b".to_string(), "c".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("unexpected argument: c"));
    }
}
