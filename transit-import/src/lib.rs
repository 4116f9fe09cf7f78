//! Schedule importer.
//!
//! Reads a TransXChange-style schedule document (already converted from XML
//! to JSON), normalizes it into flat entity collections, resolves which line
//! serves each journey pattern, and annotates stops with the lines and next
//! stops reachable from them.

pub mod domain;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod resolve;
pub mod store;
pub mod txc;
