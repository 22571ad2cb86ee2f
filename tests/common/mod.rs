#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tempfile::TempDir;

use mlm_console::api::{
    CollectionBackend, CollectionPage, EntityId, ListRequest, ReferenceOption, ReferenceSource,
};
use mlm_console::entities::{Entity, EntityForm};
use mlm_console::error::{ConsoleError, Result};

/// Every request the fake backend received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(ListRequest),
    Create(Value),
    Update(EntityId, Value),
    Delete(EntityId),
    References(&'static str),
}

struct FakeState<E> {
    records: Vec<E>,
    next_id: EntityId,
    calls: Vec<Call>,
    page_delays: HashMap<u32, Duration>,
    write_delay: Option<Duration>,
    fail_lists: bool,
    fail_writes: Option<u16>,
    references: HashMap<&'static str, Vec<ReferenceOption>>,
    failing_references: Vec<&'static str>,
}

/// In-memory stand-in for the admin backend.
///
/// Lists newest first (descending id), filters by a case-insensitive
/// substring of the record's JSON, and appends on create. Cloning shares
/// the store.
pub struct FakeBackend<E> {
    state: Arc<Mutex<FakeState<E>>>,
}

impl<E> Clone for FakeBackend<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<E: Entity> FakeBackend<E> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<E>) -> Self {
        let next_id = records.iter().map(Entity::id).max().unwrap_or(0) + 1;
        Self {
            state: Arc::new(Mutex::new(FakeState {
                records,
                next_id,
                calls: Vec::new(),
                page_delays: HashMap::new(),
                write_delay: None,
                fail_lists: false,
                fail_writes: None,
                references: HashMap::new(),
                failing_references: Vec::new(),
            })),
        }
    }

    /// Delay responses for one page number.
    pub fn delay_page(&self, page: u32, delay: Duration) {
        self.state.lock().page_delays.insert(page, delay);
    }

    /// Delay every create/update/delete.
    pub fn delay_writes(&self, delay: Duration) {
        self.state.lock().write_delay = Some(delay);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().fail_lists = fail;
    }

    /// Make every write answer with `status`.
    pub fn fail_writes(&self, status: u16) {
        self.state.lock().fail_writes = Some(status);
    }

    pub fn set_references(&self, field: &'static str, options: Vec<ReferenceOption>) {
        self.state.lock().references.insert(field, options);
    }

    pub fn fail_references(&self, field: &'static str) {
        self.state.lock().failing_references.push(field);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn list_calls(&self) -> Vec<ListRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn records(&self) -> Vec<E> {
        self.state.lock().records.clone()
    }

    async fn write_pause(&self) {
        let delay = self.state.lock().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn write_failure(&self) -> Result<()> {
        match self.state.lock().fail_writes {
            Some(status) => Err(ConsoleError::api(status, None)),
            None => Ok(()),
        }
    }
}

impl<E: Entity> CollectionBackend<E> for FakeBackend<E> {
    async fn list(&self, request: &ListRequest) -> Result<CollectionPage<E>> {
        let delay = {
            let mut state = self.state.lock();
            state.calls.push(Call::List(request.clone()));
            state.page_delays.get(&request.page).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock();
        if state.fail_lists {
            return Err(ConsoleError::api(500, None));
        }

        let needle = request.search.to_lowercase();
        let mut matching: Vec<E> = state
            .records
            .iter()
            .filter(|record| {
                needle.is_empty()
                    || serde_json::to_string(record)
                        .map(|s| s.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        matching.sort_by_key(|record| std::cmp::Reverse(record.id()));

        let total = matching.len();
        let Some(size) = request.page_size.get() else {
            return Ok(CollectionPage::single(matching));
        };
        let size = size as usize;
        let total_pages = total.div_ceil(size).max(1) as u32;
        let start = (request.page.saturating_sub(1) as usize) * size;
        let items = matching.into_iter().skip(start).take(size).collect();

        Ok(CollectionPage {
            items,
            total_pages,
            total_count: Some(total as u64),
        })
    }

    async fn create(&self, form: &E::Form) -> Result<()> {
        let payload = form.payload()?;
        self.state.lock().calls.push(Call::Create(payload.clone()));
        self.write_pause().await;
        self.write_failure()?;

        let mut state = self.state.lock();
        let mut record = payload;
        record["id"] = json!(state.next_id);
        state.next_id += 1;
        let record: E = serde_json::from_value(record)?;
        state.records.push(record);
        Ok(())
    }

    async fn update(&self, id: EntityId, form: &E::Form) -> Result<()> {
        let payload = form.payload()?;
        self.state.lock().calls.push(Call::Update(id, payload.clone()));
        self.write_pause().await;
        self.write_failure()?;

        let mut state = self.state.lock();
        let Some(slot) = state.records.iter_mut().find(|r| r.id() == id) else {
            return Err(ConsoleError::api(404, Some("Not found".to_string())));
        };
        let mut record = payload;
        record["id"] = json!(id);
        *slot = serde_json::from_value(record)?;
        Ok(())
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        self.state.lock().calls.push(Call::Delete(id));
        self.write_pause().await;
        self.write_failure()?;

        let mut state = self.state.lock();
        let before = state.records.len();
        state.records.retain(|r| r.id() != id);
        if state.records.len() == before {
            return Err(ConsoleError::api(404, Some("Not found".to_string())));
        }
        Ok(())
    }

    async fn reference_options(&self, source: &ReferenceSource) -> Result<Vec<ReferenceOption>> {
        let mut state = self.state.lock();
        state.calls.push(Call::References(source.field));
        if state.failing_references.contains(&source.field) {
            return Err(ConsoleError::api(503, None));
        }
        Ok(state.references.get(source.field).cloned().unwrap_or_default())
    }
}

/// Runs the `mlm-console` binary with config and token storage isolated in
/// a temp directory.
pub struct ConsoleTest {
    pub temp_dir: TempDir,
    binary_path: PathBuf,
}

impl ConsoleTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        ConsoleTest {
            temp_dir,
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_mlm-console")),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("MLM_CONSOLE_CONFIG", self.config_path())
            .env("HOME", self.temp_dir.path())
            .env("XDG_CONFIG_HOME", self.temp_dir.path().join("xdg"))
            .env("NO_COLOR", "1")
            .env_remove("MLM_CONSOLE_TOKEN")
            .env_remove("MLM_BACKEND_URL")
            .env_remove("MLM_CONSOLE_PASSWORD")
            .env_remove("RUST_LOG");
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute mlm-console")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Command {:?} should have failed\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}
