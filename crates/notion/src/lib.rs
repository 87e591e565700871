//! Notion database access for the shelf service.
//!
//! - [`model`]: the subset of the Notion page schema the catalog reads
//! - [`credentials`]: per-request secret and database id
//! - [`client`]: paginated database queries

pub mod client;
pub mod credentials;
pub mod error;
pub mod model;

pub use client::{query_all, DatabaseQuery, NotionClient};
pub use credentials::{
    CredentialSource, Credentials, CredentialsError, EnvCredentials, RawCredentials,
    StaticCredentials,
};
pub use error::NotionError;
pub use model::{FileObject, Page, Properties, PropertyValue, QueryResponse, RichText, SelectOption};
