//! Human-readable summary renderer for comparison results.

use crate::diff::model::{ComparisonResult, ElementChange, PropertyChange};
use crate::identity::{IdentityWarning, SnapshotSide};
use crate::model::PropertyValue;

/// Render a Markdown summary of a [`ComparisonResult`].
///
/// Intended for review workflows and report attachments. It is informational
/// only and carries nothing the structured result does not.
pub fn render_human_summary(result: &ComparisonResult) -> String {
    let mut out = String::new();

    out.push_str("## Model Comparison\n\n");
    out.push_str(&format!(
        "**Versions**: `{}` → `{}`\n\n",
        result.identity.old_version_id, result.identity.new_version_id
    ));

    out.push_str("### Identity\n\n");
    out.push_str(&format!(
        "| | Version | Content Digest |\n\
         |---|---|---|\n\
         | Old | `{}` | `{}` |\n\
         | New | `{}` | `{}` |\n\n",
        result.identity.old_version_id,
        short(&result.identity.old_digest),
        result.identity.new_version_id,
        short(&result.identity.new_digest),
    ));

    if result.is_unchanged() {
        out.push_str("_No element changes detected._\n");
        push_warnings(&mut out, &result.warnings);
        return out;
    }

    let stats = &result.statistics;
    out.push_str(&format!(
        "**Total changes**: {} (added {}, removed {}, modified {})\n\n",
        stats.total_changes, stats.added_count, stats.removed_count, stats.modified_count
    ));

    if !result.removed.is_empty() {
        out.push_str(&format!("### Removed ({})\n\n", result.removed.len()));
        for change in &result.removed {
            out.push_str(&format!("- {}\n", element_line(change)));
        }
        out.push('\n');
    }

    if !result.modified.is_empty() {
        out.push_str(&format!("### Modified ({})\n\n", result.modified.len()));
        for change in &result.modified {
            out.push_str(&format!("- {}\n", element_line(change)));
            for pc in change.property_changes() {
                out.push_str(&format!("  - {}\n", property_line(pc)));
            }
        }
        out.push('\n');
    }

    if !result.added.is_empty() {
        out.push_str(&format!("### Added ({})\n\n", result.added.len()));
        for change in &result.added {
            out.push_str(&format!("- {}\n", element_line(change)));
        }
        out.push('\n');
    }

    push_warnings(&mut out, &result.warnings);
    out
}

fn push_warnings(out: &mut String, warnings: &[IdentityWarning]) {
    if warnings.is_empty() {
        return;
    }
    out.push_str("\n### ⚠ Identity Warnings\n\n");
    for w in warnings {
        match w {
            IdentityWarning::AmbiguousIdentity {
                side,
                version_id,
                key,
                first_position,
                duplicate_position,
            } => {
                let side = match side {
                    Some(SnapshotSide::Old) => "Old ",
                    Some(SnapshotSide::New) => "New ",
                    None => "",
                };
                out.push_str(&format!(
                    "- {side}`{version_id}`: duplicate `{key}` at position \
                     {duplicate_position} ignored (kept position {first_position})\n"
                ));
            }
        }
    }
}

fn element_line(change: &ElementChange) -> String {
    let mut line = format!("`{}`", change.element_type);
    if let Some(name) = &change.name {
        line.push_str(&format!(" {}", name));
    }
    let mut ids = Vec::new();
    if let Some(global_id) = &change.global_id {
        ids.push(format!("globalId `{}`", global_id));
    }
    if let Some(express_id) = change.express_id {
        ids.push(format!("expressId {}", express_id));
    }
    if !ids.is_empty() {
        line.push_str(&format!(" ({})", ids.join(", ")));
    }
    line
}

fn property_line(pc: &PropertyChange) -> String {
    format!(
        "`{}`: {} → {}",
        pc.property_name,
        value_text(pc.old_value.as_ref()),
        value_text(pc.new_value.as_ref())
    )
}

fn value_text(value: Option<&PropertyValue>) -> String {
    match value {
        Some(v) => format!("`{}`", v),
        None => "_(absent)_".to_string(),
    }
}

/// Return the first 12 characters of a digest for display purposes.
fn short(digest: &str) -> &str {
    let end = digest.len().min(12);
    &digest[..end]
}
