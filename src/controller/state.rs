//! State types for the collection controller

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use crate::api::{EntityId, ListRequest, ReferenceOption};
use crate::config::Config;
use crate::entities::Entity;
use crate::error::ConsoleError;
use crate::validation::FieldErrors;

const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// Rows requested per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSize {
    Limited(NonZeroU32),
    /// Ask for every row; page parameters are not sent
    Unlimited,
}

impl PageSize {
    /// A limited page size; zero is raised to one.
    pub fn limited(size: u32) -> Self {
        PageSize::Limited(NonZeroU32::new(size).unwrap_or(NonZeroU32::MIN))
    }

    pub fn get(self) -> Option<u32> {
        match self {
            PageSize::Limited(n) => Some(n.get()),
            PageSize::Unlimited => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Limited(DEFAULT_PAGE_SIZE)
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageSize::Limited(n) => write!(f, "{n}"),
            PageSize::Unlimited => f.write_str("all"),
        }
    }
}

impl FromStr for PageSize {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PageSize::Unlimited);
        }
        s.parse::<NonZeroU32>()
            .map(PageSize::Limited)
            .map_err(|_| ConsoleError::InvalidChoice {
                kind: "page size",
                value: s.to_string(),
                expected: &["a positive number", "all"],
            })
    }
}

/// The user's list query: typed search text, page and page size.
///
/// Changing the text or the page size puts the query back on page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub page: u32,
    pub page_size: PageSize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl SearchQuery {
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.page = 1;
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.page = 1;
    }
}

/// Which dialog is open over the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalMode {
    #[default]
    Closed,
    Add,
    Edit,
    View,
    Delete,
}

enum_display_fromstr!(ModalMode, "modal mode", {
    Closed => "none",
    Add => "add",
    Edit => "edit",
    View => "view",
    Delete => "delete",
});

impl ModalMode {
    /// Edit, view and delete operate on an existing record.
    pub fn needs_selection(self) -> bool {
        matches!(self, ModalMode::Edit | ModalMode::View | ModalMode::Delete)
    }

    /// Add and edit show a form.
    pub fn has_form(self) -> bool {
        matches!(self, ModalMode::Add | ModalMode::Edit)
    }
}

/// Everything a list screen renders.
#[derive(Debug, Clone)]
pub struct ControllerState<E: Entity> {
    pub query: SearchQuery,
    /// Search text the current list was (or is being) fetched with
    pub debounced_text: String,
    pub items: Vec<E>,
    /// `None` until the first successful fetch
    pub total_pages: Option<u32>,
    pub total_count: Option<u64>,
    pub loading: bool,
    pub selected: Option<E>,
    pub modal: ModalMode,
    /// Editable mirror of the selected record (add/edit only)
    pub form: Option<E::Form>,
    pub field_errors: FieldErrors,
    /// Options for foreign-key fields, keyed by form field
    pub references: BTreeMap<&'static str, Vec<ReferenceOption>>,
    pub submitting: bool,
}

impl<E: Entity> Default for ControllerState<E> {
    fn default() -> Self {
        Self {
            query: SearchQuery::default(),
            debounced_text: String::new(),
            items: Vec::new(),
            total_pages: None,
            total_count: None,
            loading: false,
            selected: None,
            modal: ModalMode::Closed,
            form: None,
            field_errors: FieldErrors::default(),
            references: BTreeMap::new(),
            submitting: false,
        }
    }
}

impl<E: Entity> ControllerState<E> {
    pub(crate) fn list_request(&self) -> ListRequest {
        ListRequest {
            search: self.debounced_text.clone(),
            page: self.query.page,
            page_size: self.query.page_size,
        }
    }

    pub fn selected_id(&self) -> Option<EntityId> {
        self.selected.as_ref().map(Entity::id)
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal != ModalMode::Closed
    }

    pub(crate) fn reset_modal(&mut self) {
        self.selected = None;
        self.modal = ModalMode::Closed;
        self.form = None;
        self.field_errors = FieldErrors::default();
        self.references.clear();
    }
}

/// Result of a fetch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was written to state
    Applied,
    /// A newer fetch was issued meanwhile; the response was dropped
    Superseded,
}

/// Tunables for a controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub page_size: PageSize,
    /// Quiet period before typed search text is applied
    pub debounce: Duration,
    /// Refetch the current page after each successful write
    pub refresh_after_write: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            debounce: Duration::from_millis(1000),
            refresh_after_write: true,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: PageSize::limited(config.page_size),
            debounce: config.search_debounce(),
            ..Self::default()
        }
    }

    /// Options for a one-shot write with no list on screen to keep in sync.
    pub fn without_refresh(mut self) -> Self {
        self.refresh_after_write = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_resets_page() {
        let mut query = SearchQuery {
            page: 4,
            ..SearchQuery::default()
        };
        query.set_text("soap");
        assert_eq!(query.page, 1);
        assert_eq!(query.text, "soap");

        query.page = 3;
        query.set_page_size(PageSize::Unlimited);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_page_size_parse() {
        assert_eq!("25".parse::<PageSize>().unwrap(), PageSize::limited(25));
        assert_eq!("ALL".parse::<PageSize>().unwrap(), PageSize::Unlimited);
        assert!("0".parse::<PageSize>().is_err());
        assert!("-3".parse::<PageSize>().is_err());
        assert_eq!(PageSize::limited(0).get(), Some(1));
        assert_eq!(PageSize::Unlimited.to_string(), "all");
    }

    #[test]
    fn test_modal_mode_display_and_parse() {
        assert_eq!(ModalMode::Closed.to_string(), "none");
        assert_eq!("Edit".parse::<ModalMode>().unwrap(), ModalMode::Edit);
        assert!(ModalMode::Delete.needs_selection());
        assert!(!ModalMode::Add.needs_selection());
        assert!(ModalMode::Edit.has_form());
        assert!(!ModalMode::View.has_form());
    }

    #[test]
    fn test_options_from_config() {
        let config = Config {
            page_size: 25,
            search_debounce_ms: 300,
            ..Config::default()
        };
        let options = ControllerOptions::from_config(&config);
        assert_eq!(options.page_size, PageSize::limited(25));
        assert_eq!(options.debounce, Duration::from_millis(300));
        assert!(options.refresh_after_write);
        assert!(!options.without_refresh().refresh_after_write);
    }
}
