use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::entities::ResourceKind;
use crate::error::Result;

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Resource")]
    key: String,
    #[tabled(rename = "List endpoint")]
    list: String,
    #[tabled(rename = "Update")]
    update_method: String,
    #[tabled(rename = "Reference fields")]
    references: String,
}

/// List the managed collections
pub fn cmd_resources(output: OutputOptions) -> Result<()> {
    let json_output: Vec<_> = ResourceKind::ALL
        .iter()
        .map(|kind| {
            let resource = kind.resource();
            json!({
                "key": resource.key,
                "singular": resource.singular,
                "plural": resource.plural,
                "endpoints": {
                    "list": resource.endpoints.list,
                    "create": resource.endpoints.create,
                    "update": resource.endpoints.update,
                    "delete": resource.endpoints.delete,
                },
                "update_method": resource.endpoints.update_method.as_reqwest().as_str(),
                "references": kind.references().iter().map(|r| r.field).collect::<Vec<_>>(),
            })
        })
        .collect();

    let rows: Vec<ResourceRow> = ResourceKind::ALL
        .iter()
        .map(|kind| {
            let resource = kind.resource();
            let references = kind.references();
            ResourceRow {
                key: resource.key.to_string(),
                list: resource.endpoints.list.to_string(),
                update_method: resource.endpoints.update_method.as_reqwest().to_string(),
                references: if references.is_empty() {
                    "-".to_string()
                } else {
                    references
                        .iter()
                        .map(|r| r.field)
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());

    CommandOutput::new(json!(json_output))
        .with_text(table.to_string())
        .print(output)
}
