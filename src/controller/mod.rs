//! Remote collection controller.
//!
//! One [`CollectionController`] drives one paginated, searchable collection:
//! it debounces search input, keeps list, loading and modal state consistent
//! while fetches and mutations interleave, and refetches after every
//! successful write so the list always mirrors the server.
//!
//! Ordering is enforced with counters rather than cancellation:
//! - every fetch takes a new generation and only the latest may write state
//! - every keystroke takes a new search generation and only the last one
//!   to survive the quiet period triggers a fetch
//! - every modal open/close takes a new session, and a mutation only closes
//!   the modal if its session is still current
//!
//! State lives behind a `parking_lot::Mutex` that is never held across an
//! `.await`.

pub mod pagination;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{CollectionBackend, EntityId};
use crate::entities::Entity;
use crate::error::{ConsoleError, Operation, Result};
use crate::notify::{Notification, Notifier};
use crate::validation::{FieldErrors, Validate};

pub use pagination::page_window;
pub use state::{ControllerOptions, ControllerState, FetchOutcome, ModalMode, PageSize, SearchQuery};

struct Shared<E: Entity> {
    state: ControllerState<E>,
    fetch_generation: u64,
    search_generation: u64,
    modal_session: u64,
}

struct Inner<E: Entity, B> {
    backend: B,
    notifier: Arc<dyn Notifier>,
    debounce: Duration,
    refresh_after_write: bool,
    shared: Mutex<Shared<E>>,
}

/// Controller for one remote collection of `E` served by `B`.
///
/// Cloning is cheap and every clone drives the same state.
pub struct CollectionController<E: Entity, B> {
    inner: Arc<Inner<E, B>>,
}

impl<E: Entity, B> Clone for CollectionController<E, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A write request and the record/form it applies to.
enum Mutation<'a, F> {
    Create(&'a F),
    Update(EntityId, &'a F),
    Delete(EntityId),
}

impl<F> Mutation<'_, F> {
    fn operation(&self) -> Operation {
        match self {
            Mutation::Create(_) => Operation::Create,
            Mutation::Update(..) => Operation::Update,
            Mutation::Delete(_) => Operation::Delete,
        }
    }

    fn form(&self) -> Option<&F> {
        match self {
            Mutation::Create(form) | Mutation::Update(_, form) => Some(form),
            Mutation::Delete(_) => None,
        }
    }
}

/// Clears `submitting` when dropped, however the mutation ends.
struct SubmitGuard<'a, E: Entity> {
    shared: &'a Mutex<Shared<E>>,
}

impl<E: Entity> Drop for SubmitGuard<'_, E> {
    fn drop(&mut self) {
        self.shared.lock().state.submitting = false;
    }
}

impl<E, B> CollectionController<E, B>
where
    E: Entity,
    B: CollectionBackend<E>,
{
    pub fn new(backend: B, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_options(backend, notifier, ControllerOptions::default())
    }

    pub fn with_options(backend: B, notifier: Arc<dyn Notifier>, options: ControllerOptions) -> Self {
        let mut state = ControllerState::default();
        state.query.page_size = options.page_size;

        Self {
            inner: Arc::new(Inner {
                backend,
                notifier,
                debounce: options.debounce,
                refresh_after_write: options.refresh_after_write,
                shared: Mutex::new(Shared {
                    state,
                    fetch_generation: 0,
                    search_generation: 0,
                    modal_session: 0,
                }),
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> ControllerState<E> {
        self.inner.shared.lock().state.clone()
    }

    /// Read the state in place without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&ControllerState<E>) -> R) -> R {
        f(&self.inner.shared.lock().state)
    }

    /// Page links for the pager; empty until the first successful fetch.
    pub fn page_window(&self) -> Vec<u32> {
        let shared = self.inner.shared.lock();
        page_window(shared.state.query.page, shared.state.total_pages.unwrap_or(0))
    }

    fn notify(&self, notification: Notification) {
        self.inner.notifier.notify(notification);
    }

    // ------------------------------------------------------------------
    // Query
    // ------------------------------------------------------------------

    /// Record typed search text and schedule a fetch once typing pauses.
    ///
    /// The text and page reset apply immediately. The fetch runs after the
    /// quiet period unless another call arrives first, in which case this
    /// one is dropped. Outside a Tokio runtime only the text is recorded,
    /// nothing is scheduled and `None` is returned; [`Self::search_now`]
    /// applies it later.
    pub fn set_search_text(&self, text: impl Into<String>) -> Option<JoinHandle<()>> {
        let text = text.into();
        let generation = {
            let mut shared = self.inner.shared.lock();
            shared.state.query.set_text(text.clone());
            shared.search_generation += 1;
            shared.search_generation
        };

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no runtime, search fetch not scheduled");
            return None;
        };
        let this = self.clone();
        Some(handle.spawn(async move {
            tokio::time::sleep(this.inner.debounce).await;
            {
                let mut shared = this.inner.shared.lock();
                if shared.search_generation != generation {
                    return;
                }
                shared.state.debounced_text = text;
            }
            if let Err(e) = this.fetch_page().await {
                debug!(error = %e, "debounced search fetch failed");
            }
        }))
    }

    /// Apply the typed search text now, cancelling any pending debounce.
    pub async fn search_now(&self) -> Result<FetchOutcome> {
        {
            let mut shared = self.inner.shared.lock();
            shared.search_generation += 1;
            shared.state.debounced_text = shared.state.query.text.clone();
        }
        self.fetch_page().await
    }

    /// Move to page `page` and fetch it.
    ///
    /// The page is clamped to `[1, total_pages]`; before the first fetch any
    /// page from 1 up is accepted.
    pub async fn set_page(&self, page: u32) -> Result<FetchOutcome> {
        {
            let mut shared = self.inner.shared.lock();
            let mut page = page.max(1);
            if let Some(total) = shared.state.total_pages {
                page = page.min(total);
            }
            shared.state.query.page = page;
        }
        self.fetch_page().await
    }

    /// Change the page size, go back to page 1 and fetch.
    pub async fn set_page_size(&self, size: PageSize) -> Result<FetchOutcome> {
        self.inner.shared.lock().state.query.set_page_size(size);
        self.fetch_page().await
    }

    /// Replace the whole query and fetch it without waiting for a quiet
    /// period. Used when the query arrives complete, e.g. from a command
    /// line or a bookmarked view.
    pub async fn apply_query(&self, query: SearchQuery) -> Result<FetchOutcome> {
        {
            let mut shared = self.inner.shared.lock();
            shared.search_generation += 1;
            shared.state.debounced_text = query.text.clone();
            shared.state.query = SearchQuery {
                page: query.page.max(1),
                ..query
            };
        }
        self.fetch_page().await
    }

    /// Fetch the current page with the current debounced search text.
    ///
    /// On success the items and page count are replaced wholesale. If the
    /// collection shrank below the current page (e.g. the last row of the
    /// last page was deleted) the page moves to the new last page and that
    /// page is fetched instead. On failure the previous items stay, one error
    /// notification is shown and the error is returned. If another fetch was
    /// issued while this one was in flight its response is dropped and
    /// `Superseded` is returned.
    pub async fn fetch_page(&self) -> Result<FetchOutcome> {
        loop {
            let (generation, request) = {
                let mut shared = self.inner.shared.lock();
                shared.fetch_generation += 1;
                shared.state.loading = true;
                (shared.fetch_generation, shared.state.list_request())
            };

            debug!(
                resource = E::RESOURCE.key,
                generation,
                page = request.page,
                "fetching page"
            );
            let result = self.inner.backend.list(&request).await;

            let err = {
                let mut shared = self.inner.shared.lock();
                if shared.fetch_generation != generation {
                    debug!(
                        resource = E::RESOURCE.key,
                        generation,
                        latest = shared.fetch_generation,
                        "discarding stale response"
                    );
                    return Ok(FetchOutcome::Superseded);
                }

                match result {
                    Ok(page) if request.page > page.total_pages => {
                        debug!(
                            resource = E::RESOURCE.key,
                            page = request.page,
                            total_pages = page.total_pages,
                            "page past the end, moving to last page"
                        );
                        shared.state.total_pages = Some(page.total_pages);
                        shared.state.total_count = page.total_count;
                        shared.state.query.page = page.total_pages;
                        continue;
                    }
                    Ok(page) => {
                        shared.state.loading = false;
                        shared.state.items = page.items;
                        shared.state.total_pages = Some(page.total_pages);
                        shared.state.total_count = page.total_count;
                        return Ok(FetchOutcome::Applied);
                    }
                    Err(err) => {
                        shared.state.loading = false;
                        err
                    }
                }
            };

            warn!(resource = E::RESOURCE.key, error = %err, "fetch failed");
            self.notify(Notification::error(
                err.user_message(Operation::Fetch, E::RESOURCE.plural),
            ));
            return Err(err);
        }
    }

    // ------------------------------------------------------------------
    // Modal
    // ------------------------------------------------------------------

    /// Open a dialog over the list.
    ///
    /// Edit, view and delete need the record they act on. Add starts from an
    /// empty form and edit from the record's current values. For forms with
    /// foreign-key fields the options are loaded in the background.
    pub fn open_modal(&self, mode: ModalMode, entity: Option<E>) -> Result<()> {
        if mode == ModalMode::Closed {
            self.close_modal();
            return Ok(());
        }
        if mode.needs_selection() && entity.is_none() {
            return Err(ConsoleError::MissingSelection(mode));
        }

        let session = {
            let mut guard = self.inner.shared.lock();
            let shared = &mut *guard;
            shared.modal_session += 1;

            let state = &mut shared.state;
            state.reset_modal();
            state.form = match mode {
                ModalMode::Add => Some(E::Form::default()),
                ModalMode::Edit => entity.as_ref().map(E::to_form),
                _ => None,
            };
            state.selected = entity;
            state.modal = mode;
            shared.modal_session
        };
        debug!(resource = E::RESOURCE.key, %mode, session, "modal opened");

        if mode.has_form() && !E::REFERENCES.is_empty() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let this = self.clone();
                    handle.spawn(async move { this.load_references_for(session).await });
                }
                Err(_) => debug!("no runtime, reference data not loaded"),
            }
        }
        Ok(())
    }

    /// Reload the foreign-key options of the open form.
    pub async fn load_references(&self) {
        let session = self.inner.shared.lock().modal_session;
        self.load_references_for(session).await;
    }

    async fn load_references_for(&self, session: u64) {
        let backend = &self.inner.backend;
        let results = join_all(E::REFERENCES.iter().map(|source| async move {
            (source, backend.reference_options(source).await)
        }))
        .await;

        let mut failures = Vec::new();
        {
            let mut shared = self.inner.shared.lock();
            if shared.modal_session != session {
                debug!(session, "modal changed, dropping reference data");
                return;
            }
            for (source, result) in results {
                match result {
                    Ok(options) => {
                        shared.state.references.insert(source.field, options);
                    }
                    Err(e) => failures.push((source, e)),
                }
            }
        }

        for (source, err) in failures {
            warn!(resource = E::RESOURCE.key, field = source.field, error = %err, "reference data failed");
            self.notify(Notification::error(
                err.user_message(Operation::Fetch, source.label),
            ));
        }
    }

    /// Close the dialog and drop the form. Safe to call at any time.
    pub fn close_modal(&self) {
        let mut shared = self.inner.shared.lock();
        shared.modal_session += 1;
        shared.state.reset_modal();
    }

    /// Close the dialog only if it is still the one opened in `session`.
    fn close_modal_if(&self, session: u64) {
        let mut shared = self.inner.shared.lock();
        if shared.modal_session == session {
            shared.modal_session += 1;
            shared.state.reset_modal();
        }
    }

    /// Change the open form in place.
    pub fn edit_form(&self, f: impl FnOnce(&mut E::Form)) -> Result<()> {
        let mut shared = self.inner.shared.lock();
        let mode = shared.state.modal;
        match shared.state.form.as_mut() {
            Some(form) => {
                f(form);
                Ok(())
            }
            None => Err(ConsoleError::NothingToSubmit(mode)),
        }
    }

    /// Submit the open dialog: create for add, update for edit, remove for
    /// delete.
    pub async fn submit(&self) -> Result<()> {
        let (mode, selected, form) = {
            let shared = self.inner.shared.lock();
            (
                shared.state.modal,
                shared.state.selected_id(),
                shared.state.form.clone(),
            )
        };

        match mode {
            ModalMode::Add => {
                let form = form.ok_or(ConsoleError::NothingToSubmit(mode))?;
                self.create(&form).await
            }
            ModalMode::Edit => {
                let id = selected.ok_or(ConsoleError::MissingSelection(mode))?;
                let form = form.ok_or(ConsoleError::NothingToSubmit(mode))?;
                self.update(id, &form).await
            }
            ModalMode::Delete => {
                let id = selected.ok_or(ConsoleError::MissingSelection(mode))?;
                self.remove(id).await
            }
            ModalMode::View | ModalMode::Closed => Err(ConsoleError::NothingToSubmit(mode)),
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub async fn create(&self, form: &E::Form) -> Result<()> {
        self.mutate(Mutation::Create(form)).await
    }

    pub async fn update(&self, id: EntityId, form: &E::Form) -> Result<()> {
        self.mutate(Mutation::Update(id, form)).await
    }

    pub async fn remove(&self, id: EntityId) -> Result<()> {
        self.mutate(Mutation::Delete(id)).await
    }

    /// Validate, write, then on success notify, refetch (unless disabled in
    /// the options) and close the modal, strictly in that order. On failure the modal and form are left as
    /// they were.
    async fn mutate(&self, mutation: Mutation<'_, E::Form>) -> Result<()> {
        let op = mutation.operation();

        if let Some(form) = mutation.form()
            && let Err(errors) = form.validate()
        {
            debug!(resource = E::RESOURCE.key, %errors, "validation failed");
            self.inner.shared.lock().state.field_errors = errors.clone();
            return Err(ConsoleError::Validation(errors));
        }

        let session = {
            let mut shared = self.inner.shared.lock();
            if shared.state.submitting {
                return Err(ConsoleError::SubmitInProgress);
            }
            shared.state.submitting = true;
            shared.state.field_errors = FieldErrors::default();
            shared.modal_session
        };
        let _submitting = SubmitGuard {
            shared: &self.inner.shared,
        };

        let backend = &self.inner.backend;
        let result = match mutation {
            Mutation::Create(form) => backend.create(form).await,
            Mutation::Update(id, form) => backend.update(id, form).await,
            Mutation::Delete(id) => backend.delete(id).await,
        };

        match result {
            Ok(()) => {
                info!(resource = E::RESOURCE.key, operation = op.verb(), "mutation succeeded");
                self.notify(Notification::success(format!(
                    "{} {} successfully",
                    E::RESOURCE.title(),
                    op.past_tense()
                )));
                if self.inner.refresh_after_write {
                    // A failed refetch is reported by fetch_page itself.
                    let _ = self.fetch_page().await;
                }
                self.close_modal_if(session);
                Ok(())
            }
            Err(err) => {
                warn!(resource = E::RESOURCE.key, operation = op.verb(), error = %err, "mutation failed");
                self.notify(Notification::error(
                    err.user_message(op, E::RESOURCE.singular),
                ));
                Err(err)
            }
        }
    }
}
