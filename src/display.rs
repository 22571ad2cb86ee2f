//! Terminal rendering for collection screens.

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::entities::Entity;
use crate::notify::{Notification, NotificationLevel};
use crate::validation::FieldErrors;

/// Render records as a table with the entity's column headers.
pub fn render_table<E: Entity>(items: &[E]) -> String {
    let mut builder = Builder::default();
    builder.push_record(E::COLUMNS.iter().copied());
    for item in items {
        builder.push_record(item.row());
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// One-line pager: `Page 3 of 12  1 2 [3] 4 5`.
pub fn render_pager(page: u32, total_pages: Option<u32>, window: &[u32]) -> String {
    let Some(total) = total_pages else {
        return format!("Page {page}").dimmed().to_string();
    };
    if window.is_empty() {
        return "No pages".dimmed().to_string();
    }

    let mut parts = Vec::with_capacity(window.len() + 2);
    if window.first().is_some_and(|&first| first > 1) {
        parts.push("…".dimmed().to_string());
    }
    for &n in window {
        if n == page {
            parts.push(format!("[{n}]").cyan().bold().to_string());
        } else {
            parts.push(n.to_string());
        }
    }
    if window.last().is_some_and(|&last| last < total) {
        parts.push("…".dimmed().to_string());
    }

    format!(
        "{}  {}",
        format!("Page {page} of {total}").dimmed(),
        parts.join(" ")
    )
}

/// Colored single-line rendering of a notification.
pub fn format_notification(notification: &Notification) -> String {
    let message = &notification.message;
    match notification.level {
        NotificationLevel::Success => format!("{} {}", "✓".green(), message.green()),
        NotificationLevel::Error => format!("{} {}", "✗".red(), message.red()),
        NotificationLevel::Warning => format!("{} {}", "!".yellow(), message.yellow()),
        NotificationLevel::Info => format!("{} {}", "i".cyan(), message),
    }
}

/// Field errors, one per line, for inline display under a form.
pub fn format_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("  {}: {}", field.cyan(), message.red()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Category;

    fn category(id: u64, name: &str) -> Category {
        serde_json::from_value(serde_json::json!({"id": id, "name": name})).unwrap()
    }

    #[test]
    fn test_table_has_headers_and_rows() {
        let table = render_table(&[category(1, "Soaps"), category(2, "Oils")]);
        for column in Category::COLUMNS {
            assert!(table.contains(column), "missing column {column}");
        }
        assert!(table.contains("Soaps"));
        assert!(table.contains("Oils"));
    }

    #[test]
    fn test_pager_marks_current_page() {
        let pager = render_pager(3, Some(12), &[1, 2, 3, 4, 5]);
        assert!(pager.contains("[3]"));
        assert!(pager.contains("Page 3 of 12"));
        assert!(pager.contains('…'));
    }

    #[test]
    fn test_pager_unknown_total() {
        assert!(render_pager(1, None, &[]).contains("Page 1"));
        assert!(render_pager(1, Some(0), &[]).contains("No pages"));
    }

    #[test]
    fn test_field_errors_listed() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name is required");
        let text = format_field_errors(&errors);
        assert!(text.contains("name"));
        assert!(text.contains("Name is required"));
    }
}
