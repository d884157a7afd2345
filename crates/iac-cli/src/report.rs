//! Terminal and JSON rendering of a [`SessionView`].

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use iac_session::{
    Banner, HashIndicator, SessionView, Severity, StageStatus, StageSummary, VerificationPanel,
};
use serde::Serialize;

/// Exit code when the session completed but at least one stage failed.
pub const EXIT_STAGE_FAILED: i32 = 2;

/// Machine-readable report of one `analyze` run.
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub backend_url: &'a str,
    pub session: &'a SessionView,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(session: &'a SessionView, backend_url: &'a str) -> Self {
        Self {
            generated_at: Utc::now(),
            backend_url,
            session,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Process exit code for a finished session.
pub fn exit_code(view: &SessionView) -> i32 {
    if view.failed_stages().next().is_some() {
        EXIT_STAGE_FAILED
    } else {
        0
    }
}

/// Render every visible panel as text.
///
/// With `styled` unset, tables carry no ANSI escapes regardless of terminal.
pub fn render(view: &SessionView, styled: bool) -> String {
    let mut out = String::new();
    if let Some(name) = &view.file_name {
        let _ = writeln!(out, "File: {name}");
    }
    for summary in &view.stages {
        let _ = writeln!(out, "{}", stage_line(summary));
    }

    if let Some(hashes) = &view.hashes {
        let mut table = new_table(styled);
        table.set_header(vec![
            header_cell("Algorithm"),
            header_cell("Digest"),
            header_cell("Known hash"),
        ]);
        table.add_row(vec![
            Cell::new("SHA-256"),
            Cell::new(&hashes.sha256),
            indicator_cell(hashes.sha256_match.as_ref()),
        ]);
        table.add_row(vec![
            Cell::new("MD5"),
            Cell::new(&hashes.md5),
            indicator_cell(hashes.md5_match.as_ref()),
        ]);
        let _ = writeln!(out, "\nHashes:\n{table}");
        let transfer = if hashes.transfer_verified {
            "Transfer check: backend SHA-256 matches the local file."
        } else {
            "Transfer check: backend SHA-256 differs from the local file."
        };
        let _ = writeln!(out, "{transfer}");
    }

    if let Some(warnings) = &view.warnings {
        let _ = writeln!(out, "\nMetadata warnings:");
        for warning in warnings {
            let _ = writeln!(out, "- {warning}");
        }
    }

    if let Some(metadata) = &view.metadata {
        let mut table = new_table(styled);
        table.set_header(vec![header_cell("Field"), header_cell("Value")]);
        for row in &metadata.rows {
            let value = if row.missing {
                dim_cell(&row.value)
            } else {
                Cell::new(&row.value)
            };
            table.add_row(vec![Cell::new(&row.field), value]);
        }
        let _ = writeln!(out, "\nMetadata:\n{table}");
        if !metadata.missing_fields.is_empty() {
            let _ = writeln!(
                out,
                "{} field(s) could not be retrieved.",
                metadata.missing_fields.len()
            );
        }
    }

    if let Some(path) = &view.ela_asset {
        let _ = writeln!(out, "\nError level analysis: {path}");
    }

    if let Some(ai) = &view.ai_analysis {
        let _ = writeln!(out, "\nAI metadata analysis:");
        let _ = writeln!(out, "Confidence: {}%", ai.confidence_score);
        let _ = writeln!(out, "Verdict: {}", ai.verdict);
        for item in &ai.evidence {
            let _ = writeln!(out, "- {item}");
        }
    }

    if let Some(verification) = &view.verification {
        let _ = writeln!(out, "\nAuthenticity verification:");
        let _ = writeln!(out, "{}", verification_line(verification));
        for flag in &verification.flags {
            let _ = writeln!(out, "- {flag}");
        }
    }

    if let Some(results) = &view.simulation_results {
        let mut table = new_table(styled);
        table.set_header(vec![
            header_cell("Field"),
            header_cell("Original"),
            header_cell("Simulated"),
        ]);
        for row in &results.rows {
            let simulated = if row.changed {
                Cell::new(&row.simulated)
                    .fg(Color::Yellow)
                    .add_attribute(Attribute::Bold)
            } else {
                Cell::new(&row.simulated)
            };
            table.add_row(vec![
                Cell::new(&row.field),
                Cell::new(&row.original),
                simulated,
            ]);
        }
        let _ = writeln!(out, "\nSimulation results:\n{table}");
        let _ = writeln!(out, "{}", banner_line(&results.banner));
    }

    out
}

fn stage_line(summary: &StageSummary) -> String {
    let status = match summary.status {
        StageStatus::Idle => "not run",
        StageStatus::Pending => "running",
        StageStatus::Succeeded => "ok",
        StageStatus::Failed => "failed",
    };
    match &summary.error {
        Some(error) => format!("{}: {status} ({error})", summary.stage),
        None => format!("{}: {status}", summary.stage),
    }
}

fn verification_line(panel: &VerificationPanel) -> String {
    format!(
        "[{}] Score {}/100, risk {}. {}",
        severity_label(panel.severity),
        panel.score,
        panel.risk_level,
        panel.recommendation
    )
}

fn banner_line(banner: &Banner) -> String {
    let mut line = format!("[{}] {}", severity_label(banner.severity), banner.title);
    if !banner.items.is_empty() {
        let _ = write!(line, ": {}", banner.items.join("; "));
    }
    line
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "success",
        Severity::Warning => "warning",
        Severity::Danger => "danger",
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Danger => Color::Red,
    }
}

fn indicator_cell(indicator: Option<&HashIndicator>) -> Cell {
    match indicator {
        Some(indicator) => Cell::new(&indicator.text).fg(severity_color(indicator.severity)),
        None => dim_cell("-"),
    }
}

fn new_table(styled: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if !styled {
        table.force_no_tty();
    }
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
