//! Human-readable summary renderer for change logs.

use crate::changelog::model::{format_timestamp, ChangeEntry, ChangeLog};
use crate::diff::Side;

/// One-line count summary, e.g. `2 added, 0 removed, 1 modified`.
pub fn summary_line(log: &ChangeLog) -> String {
    format!(
        "{} added, {} removed, {} modified",
        log.added.len(),
        log.removed.len(),
        log.modified.len()
    )
}

/// Render a Markdown summary of a [`ChangeLog`].
///
/// Informational only; the JSON change log stays the record of truth.
pub fn render_human_summary(log: &ChangeLog) -> String {
    let mut out = String::new();

    out.push_str("## Configuration Change Log\n\n");
    out.push_str(&format!(
        "**Generated**: {}  \n**Compared against**: {}\n\n",
        format_timestamp(&log.timestamp),
        log.source_generation_ref
            .as_deref()
            .map(|r| format!("`{}`", r))
            .unwrap_or_else(|| "_no previous generation_".to_string())
    ));
    out.push_str(&format!("**Summary**: {}\n\n", summary_line(log)));

    if log.total_changes() == 0 {
        out.push_str("_No changes detected._\n");
        return out;
    }

    if !log.added.is_empty() {
        out.push_str("### Added\n\n");
        for entry in &log.added {
            out.push_str(&format!("- {}\n", entry_label(entry)));
        }
        out.push('\n');
    }

    if !log.removed.is_empty() {
        out.push_str("### Removed\n\n");
        for entry in &log.removed {
            out.push_str(&format!("- {}\n", entry_label(entry)));
        }
        out.push('\n');
    }

    if !log.modified.is_empty() {
        out.push_str("### Modified\n\n");
        for entry in &log.modified {
            out.push_str(&format!("- {}\n", entry_label(entry)));
            if let Some(error) = &entry.diff_error {
                out.push_str(&format!("  - ⚠ comparison failed: {}\n", error));
                continue;
            }
            for (path, change) in &entry.changes {
                out.push_str(&format!(
                    "  - `{}`: {} → {}\n",
                    path,
                    side_label(&change.old),
                    side_label(&change.new)
                ));
            }
        }
        out.push('\n');
    }

    out
}

fn entry_label(entry: &ChangeEntry) -> String {
    format!(
        "**{}** `{}` ({})",
        entry.display_name, entry.object_id, entry.object_type
    )
}

fn side_label(side: &Side) -> String {
    match side.value() {
        None => "_absent_".to_string(),
        Some(value) => format!("`{}`", short(&value.to_string())),
    }
}

/// Truncate long rendered values for display.
fn short(s: &str) -> String {
    const MAX_CHARS: usize = 60;
    if s.chars().count() <= MAX_CHARS {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX_CHARS).collect();
        format!("{}…", head)
    }
}
