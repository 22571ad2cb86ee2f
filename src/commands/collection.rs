//! List, create, update and delete for any managed collection.

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{CommandOutput, TerminalNotifier, connect};
use crate::api::{ApiClient, CollectionBackend, EntityId, HttpCollection};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::controller::{CollectionController, ControllerOptions, PageSize, SearchQuery};
use crate::display::{render_pager, render_table};
use crate::entities::{Entity, ResourceKind};
use crate::error::Result;

/// Query arguments of `ls`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub page: u32,
    pub page_size: Option<PageSize>,
    pub search: Option<String>,
}

type HttpController<E> = CollectionController<E, HttpCollection<E>>;

fn controller<E: Entity>(config: &Config, client: Arc<ApiClient>) -> HttpController<E> {
    CollectionController::with_options(
        HttpCollection::new(client),
        Arc::new(TerminalNotifier),
        ControllerOptions::from_config(config),
    )
}

/// Controller for a single write. Nothing is listed afterwards, so the
/// refetch that keeps a list screen in sync is skipped.
fn write_controller<E: Entity>(config: &Config, client: Arc<ApiClient>) -> HttpController<E> {
    CollectionController::with_options(
        HttpCollection::new(client),
        Arc::new(TerminalNotifier),
        ControllerOptions::from_config(config).without_refresh(),
    )
}

/// List one page of a collection
pub async fn cmd_ls(kind: ResourceKind, options: ListOptions, output: OutputOptions) -> Result<()> {
    let (config, client) = connect()?;
    with_entity!(kind, E => list::<E>(&config, client, options, output).await)
}

async fn list<E: Entity>(
    config: &Config,
    client: Arc<ApiClient>,
    options: ListOptions,
    output: OutputOptions,
) -> Result<()> {
    let controller = controller::<E>(config, client);
    let query = SearchQuery {
        text: options.search.unwrap_or_default(),
        page: options.page,
        page_size: options
            .page_size
            .unwrap_or_else(|| PageSize::limited(config.page_size)),
    };
    controller.apply_query(query).await?;

    let state = controller.snapshot();
    let window = controller.page_window();

    let json_output = json!({
        "resource": E::RESOURCE.key,
        "search": state.query.text,
        "page": state.query.page,
        "page_size": state.query.page_size.to_string(),
        "total_pages": state.total_pages,
        "total_count": state.total_count,
        "items": state.items,
    });

    let text_output = if state.items.is_empty() {
        format!("No {} found.", E::RESOURCE.plural)
    } else {
        let mut text = render_table(&state.items);
        text.push('\n');
        text.push_str(&render_pager(state.query.page, state.total_pages, &window));
        if let Some(count) = state.total_count {
            text.push_str(&format!("\n{}", format!("{count} {}", E::RESOURCE.plural).dimmed()));
        }
        text
    };

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Create a record from a JSON form
pub async fn cmd_create(kind: ResourceKind, data: &str, output: OutputOptions) -> Result<()> {
    let (config, client) = connect()?;
    with_entity!(kind, E => {
        let form: <E as Entity>::Form = serde_json::from_str(data)?;
        write_controller::<E>(&config, client).create(&form).await?;
        mutation_output(E::RESOURCE.key, "create", None).print(output)
    })
}

/// Update a record from a JSON form
pub async fn cmd_update(
    kind: ResourceKind,
    id: EntityId,
    data: &str,
    output: OutputOptions,
) -> Result<()> {
    let (config, client) = connect()?;
    with_entity!(kind, E => {
        let form: <E as Entity>::Form = serde_json::from_str(data)?;
        write_controller::<E>(&config, client).update(id, &form).await?;
        mutation_output(E::RESOURCE.key, "update", Some(id)).print(output)
    })
}

/// Delete a record
pub async fn cmd_delete(kind: ResourceKind, id: EntityId, output: OutputOptions) -> Result<()> {
    let (config, client) = connect()?;
    with_entity!(kind, E => {
        write_controller::<E>(&config, client).remove(id).await?;
        mutation_output(E::RESOURCE.key, "delete", Some(id)).print(output)
    })
}

// The success notification already went to stderr.
fn mutation_output(resource: &str, action: &str, id: Option<EntityId>) -> CommandOutput {
    CommandOutput::new(json!({
        "action": action,
        "resource": resource,
        "id": id,
        "success": true,
    }))
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "ID")]
    id: EntityId,
    #[tabled(rename = "Label")]
    label: String,
}

/// Show the options for each foreign-key field of a collection's form
pub async fn cmd_options(kind: ResourceKind, output: OutputOptions) -> Result<()> {
    let (_, client) = connect()?;
    with_entity!(kind, E => options::<E>(client, output).await)
}

async fn options<E: Entity>(client: Arc<ApiClient>, output: OutputOptions) -> Result<()> {
    let backend = HttpCollection::<E>::new(client);

    let mut json_fields = serde_json::Map::new();
    let mut text_output = String::new();

    if E::REFERENCES.is_empty() {
        text_output = format!("{} forms have no reference fields.", E::RESOURCE.title());
    }

    for source in E::REFERENCES {
        let options = backend.reference_options(source).await?;

        if !text_output.is_empty() {
            text_output.push_str("\n\n");
        }
        text_output.push_str(&format!(
            "{} {}\n",
            source.field.cyan().bold(),
            format!("({})", source.label).dimmed()
        ));
        if options.is_empty() {
            text_output.push_str(&format!("{}", "no options".dimmed()));
        } else {
            let rows: Vec<OptionRow> = options
                .iter()
                .map(|option| OptionRow {
                    id: option.id,
                    label: option.label.clone(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            text_output.push_str(&table.to_string());
        }

        json_fields.insert(source.field.to_string(), json!(options));
    }

    CommandOutput::new(json!({
        "resource": E::RESOURCE.key,
        "fields": json_fields,
    }))
    .with_text(text_output)
    .print(output)
}
