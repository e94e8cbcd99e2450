//! Notion REST API client: the schema, query, and page update endpoints the
//! completion sync needs, behind the [`NotionApi`] trait.

mod client;
pub mod error;
pub mod queries;
pub mod types;

pub use client::{NotionApi, NotionClient};
pub use error::NotionError;
pub use types::{DatabaseSchema, Page, QueryResponse};
