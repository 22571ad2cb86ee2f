#[macro_use]
mod macros;

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod entities;
pub mod error;
pub mod notify;
pub mod validation;

pub use api::{
    ApiClient, CollectionBackend, CollectionPage, EntityId, HttpCollection, ListRequest,
    ReferenceOption, ReferenceSource, Resource,
};
pub use auth::{CredentialProvider, StaticToken, TokenStore};
pub use config::Config;
pub use controller::{
    CollectionController, ControllerOptions, ControllerState, FetchOutcome, ModalMode, PageSize,
    SearchQuery, page_window,
};
pub use entities::{Entity, EntityForm, ResourceKind};
pub use error::{ConsoleError, Operation, Result};
pub use notify::{Notification, NotificationLevel, NotificationLog, Notifier};
pub use validation::{FieldErrors, Validate};
