//! Resource descriptors and endpoint URL construction.

use url::Url;

use super::EntityId;
use crate::error::{ConsoleError, Result};

/// HTTP method used for updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    Put,
    Patch,
}

impl UpdateMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            UpdateMethod::Put => reqwest::Method::PUT,
            UpdateMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Paths of the four collection endpoints, relative to the base URL.
///
/// `update` and `delete` get the record id appended as a final segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub list: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    pub update_method: UpdateMethod,
}

impl Endpoints {
    pub const fn new(
        list: &'static str,
        create: &'static str,
        update: &'static str,
        delete: &'static str,
    ) -> Self {
        Self {
            list,
            create,
            update,
            delete,
            update_method: UpdateMethod::Put,
        }
    }

    pub const fn with_update_method(mut self, method: UpdateMethod) -> Self {
        self.update_method = method;
        self
    }
}

/// Static description of one managed collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    /// Command-line key, e.g. `commission-configurations`
    pub key: &'static str,
    /// Singular label, e.g. `commission configuration`
    pub singular: &'static str,
    /// Plural label, e.g. `commission configurations`
    pub plural: &'static str,
    pub endpoints: Endpoints,
}

impl Resource {
    /// Singular label with the first letter upper-cased.
    pub fn title(&self) -> String {
        capitalize(self.singular)
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Join `path` (and optionally `id`) onto `base` as path segments.
///
/// The base path is preserved, so `http://host/api` + `get_users` gives
/// `http://host/api/get_users`. Any query string on the base is dropped.
pub fn endpoint_url(base: &Url, path: &str, id: Option<EntityId>) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ConsoleError::Config(format!("'{base}' cannot be used as a base URL")))?;
        segments.pop_if_empty();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            segments.push(part);
        }
        if let Some(id) = id {
            segments.push(&id.to_string());
        }
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
