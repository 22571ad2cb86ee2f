//! Package contents: which products and trainings a package bundles.

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, connect};
use crate::api::EntityId;
use crate::cli::OutputOptions;
use crate::entities::{
    add_products_to_package, add_trainings_to_package, package_products, package_trainings,
};
use crate::error::Result;

/// List product ids linked to a package
pub async fn cmd_package_products(package_id: EntityId, output: OutputOptions) -> Result<()> {
    let (_, client) = connect()?;
    let ids = package_products(&client, package_id).await?;
    linked_output(package_id, "products", &ids).print(output)
}

/// List training ids linked to a package
pub async fn cmd_package_trainings(package_id: EntityId, output: OutputOptions) -> Result<()> {
    let (_, client) = connect()?;
    let ids = package_trainings(&client, package_id).await?;
    linked_output(package_id, "trainings", &ids).print(output)
}

/// Link products to a package
pub async fn cmd_package_add_products(
    package_id: EntityId,
    ids: &[EntityId],
    output: OutputOptions,
) -> Result<()> {
    let (_, client) = connect()?;
    let message = add_products_to_package(&client, ids, package_id).await?;
    added_output(package_id, "products", ids, message).print(output)
}

/// Link trainings to a package
pub async fn cmd_package_add_trainings(
    package_id: EntityId,
    ids: &[EntityId],
    output: OutputOptions,
) -> Result<()> {
    let (_, client) = connect()?;
    let message = add_trainings_to_package(&client, ids, package_id).await?;
    added_output(package_id, "trainings", ids, message).print(output)
}

fn linked_output(package_id: EntityId, what: &str, ids: &[EntityId]) -> CommandOutput {
    let text = if ids.is_empty() {
        format!("Package #{package_id} has no {what}")
    } else {
        format!(
            "{} {}",
            format!("Package #{package_id} {what}:").cyan(),
            join_ids(ids)
        )
    };
    CommandOutput::new(json!({ "package_id": package_id, what: ids })).with_text(text)
}

fn added_output(
    package_id: EntityId,
    what: &str,
    ids: &[EntityId],
    message: String,
) -> CommandOutput {
    let text = format!("{} {}", "✓".green(), message.green());
    CommandOutput::new(json!({
        "action": format!("add_{what}"),
        "package_id": package_id,
        what: ids,
        "message": message,
        "success": true,
    }))
    .with_text(text)
}

fn join_ids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}
