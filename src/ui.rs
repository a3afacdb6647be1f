//! Terminal output helpers.
//!
//! Pure display functions; no prompting, no state. All styling goes
//! through `console` so output degrades cleanly when not attached to a
//! terminal.

use crate::domain::ChangeSet;
use console::style;
use serde::Serialize;

/// Print an error message in red to stderr.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a warning to stderr.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Display the classified upstream changes.
///
/// Shows the three category counts and up to 10 commit lines.
pub fn display_change_summary(changes: &ChangeSet) {
    println!(
        "\n{}",
        style(format!("Upstream changes ({} commits)", changes.len())).bold()
    );
    println!(
        "  security: {}, bugfixes: {}, features: {}",
        changes.security_count(),
        changes.bugfix_count(),
        changes.feature_count()
    );

    for record in changes.records().iter().take(10) {
        let summary = if record.summary.len() > 72 {
            &record.summary[..72]
        } else {
            &record.summary
        };
        println!("  - {}", summary);
    }

    if changes.len() > 10 {
        println!("  ... and {} more commits", changes.len() - 10);
    }
}

/// Display how to review and merge a staged update branch.
pub fn display_review_instructions(base_branch: &str, update_branch: &str) {
    println!(
        "\n{} Review changes with: {}",
        style("→").yellow(),
        style(format!("git diff {}..{}", base_branch, update_branch)).cyan()
    );
    println!(
        "{} Merge with:          {}",
        style("→").yellow(),
        style(format!(
            "git checkout {} && git merge {}",
            base_branch, update_branch
        ))
        .cyan()
    );
}

/// Print a structured report as pretty JSON under a bold heading.
pub fn display_report<T: Serialize>(heading: &str, report: &T) {
    println!("\n{}", style(heading).bold());
    match serde_json::to_string_pretty(report) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => display_error(&format!("Cannot render report: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChangeCategory, CommitRecord};

    #[test]
    fn test_display_change_summary_smoke() {
        // Visual verification test - output is printed to stdout
        let changes = ChangeSet::new(vec![CommitRecord::new(
            "abc1234 harden auth",
            ChangeCategory::Security,
        )]);
        display_change_summary(&changes);
    }

    #[test]
    fn test_display_report_smoke() {
        #[derive(Serialize)]
        struct Sample {
            ok: bool,
        }
        display_report("Sample:", &Sample { ok: true });
    }
}
