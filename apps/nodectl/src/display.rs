//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use nodectl_ops::ModeOutcome;
use nodectl_types::{NodeSummary, RunReport, StepId, StepRecord, StepState};
use std::io;
use std::path::Path;

/// Output renderer for the end-of-run report
pub struct OutputRenderer {
    colors: bool,
    term: Term,
}

impl OutputRenderer {
    pub fn new(colors: bool) -> Self {
        Self {
            colors,
            term: Term::stdout(),
        }
    }

    fn paint(&self, style: &Style, text: &str) -> String {
        if self.colors {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Render what a mode did
    pub fn render_outcome(&self, outcome: &ModeOutcome, debug_log: Option<&Path>) -> io::Result<()> {
        if let Some(report) = &outcome.report {
            self.render_report(report)?;
        }
        if let Some(summary) = &outcome.summary {
            self.render_summary(summary)?;
        }
        if let Some(path) = debug_log {
            self.term
                .write_line(&format!("Debug log: {}", path.display()))?;
        }
        Ok(())
    }

    fn render_report(&self, report: &RunReport) -> io::Result<()> {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("State").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Notes").add_attribute(Attribute::Bold),
        ]);
        for record in &report.records {
            table.add_row(vec![
                Cell::new(record.id),
                self.state_cell(record),
                Cell::new(
                    record
                        .duration_ms
                        .map_or_else(|| "-".to_string(), format_duration),
                ),
                Cell::new(notes(record)),
            ]);
        }
        self.term.write_line(&table.to_string())?;

        if let Some(step) = report.halted_at {
            self.render_failure(report, step)?;
        } else {
            let done = format!(
                "{} finished in {}",
                report.mode,
                format_duration(report.duration_ms)
            );
            self.term
                .write_line(&self.paint(&Style::new().green().bold(), &done))?;
        }

        if !report.warnings.is_empty() {
            self.term.write_line("")?;
            self.term
                .write_line(&self.paint(&Style::new().yellow().bold(), "Warnings:"))?;
            for warning in &report.warnings {
                self.term.write_line(&format!("  • {warning}"))?;
            }
        }
        Ok(())
    }

    fn render_failure(&self, report: &RunReport, step: StepId) -> io::Result<()> {
        let heading = format!("{} stopped at {step}", report.mode);
        self.term
            .write_line(&self.paint(&Style::new().red().bold(), &heading))?;
        let Some(failure) = report
            .records
            .iter()
            .find(|r| r.id == step)
            .and_then(|r| r.failure.as_ref())
        else {
            return Ok(());
        };
        self.term.write_line(&format!("  {}", failure.reason))?;
        if !failure.log_excerpt.is_empty() {
            self.term.write_line("")?;
            for line in &failure.log_excerpt {
                self.term
                    .write_line(&self.paint(&Style::new().dim(), &format!("  | {line}")))?;
            }
        }
        if let Some(path) = &failure.log_path {
            self.term
                .write_line(&format!("  Full output: {}", path.display()))?;
        }
        Ok(())
    }

    fn state_cell(&self, record: &StepRecord) -> Cell {
        let (label, color) = match record.state {
            StepState::Succeeded if record.already_satisfied => ("ok (unchanged)", Color::Green),
            StepState::Succeeded => ("ok", Color::Green),
            StepState::Failed => ("failed", Color::Red),
            StepState::SkippedAdvisory => ("skipped", Color::Yellow),
            StepState::Running => ("running", Color::Cyan),
            StepState::Pending => ("not run", Color::DarkGrey),
        };
        let cell = Cell::new(label);
        if self.colors {
            cell.fg(color)
        } else {
            cell
        }
    }

    fn render_summary(&self, summary: &NodeSummary) -> io::Result<()> {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Node").add_attribute(Attribute::Bold),
            Cell::new(""),
        ]);
        table.add_row(vec![Cell::new("Version"), Cell::new(&summary.version)]);
        let service = if summary.service_active {
            format!("{} (active)", summary.service_unit)
        } else {
            format!("{} (inactive)", summary.service_unit)
        };
        table.add_row(vec![Cell::new("Service"), Cell::new(service)]);
        table.add_row(vec![Cell::new("RPC"), Cell::new(&summary.rpc_url)]);
        table.add_row(vec![Cell::new("Config"), Cell::new(&summary.config_path)]);
        let sync = summary.sync.as_ref().map_or_else(
            || "not available yet".to_string(),
            |sync| {
                format!(
                    "{} {}/{} blocks ({:.2}%)",
                    sync.chain,
                    sync.blocks,
                    sync.headers,
                    sync.percent()
                )
            },
        );
        table.add_row(vec![Cell::new("Sync"), Cell::new(sync)]);

        self.term.write_line("")?;
        self.term.write_line(&table.to_string())
    }
}

fn notes(record: &StepRecord) -> String {
    match (&record.failure, &record.note) {
        (Some(failure), _) => failure.reason.clone(),
        (None, Some(note)) => note.clone(),
        (None, None) => String::new(),
    }
}

fn format_duration(ms: u64) -> String {
    if ms < 1_000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1_000.0)
    } else {
        format!("{}m{:02}s", ms / 60_000, (ms % 60_000) / 1_000)
    }
}
