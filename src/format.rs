//! Plain-text and JSON output for CLI commands.

use crate::types::{PrioritiseResult, Stats, SubtaskSuggestion, Task};
use crate::view::TodoView;
use serde::Serialize;
use serde_json::json;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Serialize a value as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

/// One line per task: `[x] Title  (#id)`.
pub fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{}] {}  (#{})", mark, task.title, task.id)
}

pub fn format_stats(stats: &Stats) -> String {
    format!(
        "{} total, {} active, {} completed",
        stats.total, stats.active, stats.completed
    )
}

/// Render the visible list with a footer.
pub fn format_view(view: &TodoView, format: OutputFormat) -> String {
    let visible = view.visible();
    match format {
        OutputFormat::Json => to_json(&json!({
            "filter": view.filter(),
            "todos": visible,
            "stats": view.stats(),
        })),
        OutputFormat::Text => {
            let mut out = String::new();
            if visible.is_empty() {
                out.push_str(view.empty_message());
                out.push('\n');
            } else {
                for task in &visible {
                    out.push_str(&format_task_line(task));
                    out.push('\n');
                }
            }
            out.push_str(&format!(
                "\n{} ({}) - showing {}\n",
                view.remaining_label(),
                format_stats(&view.stats()),
                view.filter()
            ));
            out
        }
    }
}

pub fn format_suggestion(suggestion: &SubtaskSuggestion, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(suggestion),
        OutputFormat::Text if suggestion.subtasks.is_empty() => {
            "No suggestions available.\n".to_string()
        }
        OutputFormat::Text => suggestion
            .subtasks
            .iter()
            .map(|s| format!("- {}\n", s))
            .collect(),
    }
}

pub fn format_prioritised(result: &PrioritiseResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(result),
        OutputFormat::Text if result.prioritised.is_empty() => {
            "No priorities available.\n".to_string()
        }
        OutputFormat::Text => result
            .prioritised
            .iter()
            .map(|p| format!("[{:<6}] {} - {}\n", p.priority.as_str(), p.title, p.reason))
            .collect(),
    }
}
