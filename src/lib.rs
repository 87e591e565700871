//! Lending-shelf catalog service
//!
//! Serves the rows of a Notion database as a flat book catalog
//! (`/api/notion-books`) plus a configuration health probe (`/api/ping`).

pub mod modules;

pub use modules::*;
