//! Backend access for paginated admin collections.
//!
//! The controller only talks to a [`CollectionBackend`]; the HTTP
//! implementation lives in [`http`], and tests substitute an in-memory one.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod http;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::controller::PageSize;
use crate::entities::Entity;
use crate::error::Result;

pub use client::ApiClient;
pub use endpoints::{Endpoints, Resource, UpdateMethod, endpoint_url};
pub use http::HttpCollection;

/// Server-assigned record identifier.
pub type EntityId = u64;

/// Parameters of one list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub search: String,
    pub page: u32,
    pub page_size: PageSize,
}

/// One page of a collection, as returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPage<E> {
    /// Items in server order
    pub items: Vec<E>,
    /// Always at least 1
    pub total_pages: u32,
    pub total_count: Option<u64>,
}

impl<E> CollectionPage<E> {
    pub fn single(items: Vec<E>) -> Self {
        let count = items.len() as u64;
        Self {
            items,
            total_pages: 1,
            total_count: Some(count),
        }
    }
}

/// A selectable option for a foreign-key field in a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOption {
    pub id: EntityId,
    pub label: String,
}

/// Reference data a form needs before it can be usefully submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSource {
    /// Form field the options populate
    pub field: &'static str,
    /// Plural label used in notifications, e.g. "categories"
    pub label: &'static str,
    /// List endpoint path
    pub endpoint: &'static str,
    /// Record fields tried in order to build the option label
    pub label_fields: &'static [&'static str],
}

/// Common interface for collection backends
pub trait CollectionBackend<E: Entity>: Send + Sync + 'static {
    /// Fetch one page of the collection
    fn list(&self, request: &ListRequest) -> impl Future<Output = Result<CollectionPage<E>>> + Send;

    /// Create a record from a form payload
    fn create(&self, form: &E::Form) -> impl Future<Output = Result<()>> + Send;

    /// Replace (or patch) an existing record
    fn update(&self, id: EntityId, form: &E::Form) -> impl Future<Output = Result<()>> + Send;

    /// Delete a record
    fn delete(&self, id: EntityId) -> impl Future<Output = Result<()>> + Send;

    /// Load options for a dependent form field
    fn reference_options(
        &self,
        _source: &ReferenceSource,
    ) -> impl Future<Output = Result<Vec<ReferenceOption>>> + Send {
        async { Ok(Vec::new()) }
    }
}
