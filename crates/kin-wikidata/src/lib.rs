//! Wikidata client — the production [`kin_core::source::RelationSource`].
//!
//! Two upstream surfaces: the MediaWiki action API (`wbsearchentities`,
//! `wbgetentities`) for search and biographical detail, and the SPARQL
//! endpoint for family relations. All response decoding lives in
//! [`parse`], which is pure over `serde_json::Value` and tested offline.

mod client;
pub mod error;
mod parse;

pub use client::{WikidataClient, WikidataConfig};
pub use error::{Error, Result};
