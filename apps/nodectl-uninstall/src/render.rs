//! Teardown progress and final report

use console::{Style, Term};
use nodectl_events::{AppEvent, EventMessage, GeneralEvent, UninstallEvent};
use nodectl_types::UninstallReport;
use std::io;

use crate::logging;

pub struct Renderer {
    term: Term,
    colors: bool,
    quiet: bool,
}

impl Renderer {
    pub fn new(colors: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors,
            quiet,
        }
    }

    fn paint(&self, style: &Style, text: &str) -> String {
        if self.colors {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    pub fn status(&self, text: &str) {
        if !self.quiet {
            self.line(text);
        }
    }

    pub fn handle_event(&self, message: EventMessage) {
        logging::log_event_with_tracing(&message);
        match message.event {
            AppEvent::Uninstall(UninstallEvent::ActionCompleted { action, removed }) => {
                if !self.quiet {
                    let text = if removed {
                        self.paint(&Style::new().green(), &format!("  ✓ {action}"))
                    } else {
                        self.paint(&Style::new().dim(), &format!("  - {action}: nothing to do"))
                    };
                    self.line(&text);
                }
            }
            AppEvent::Uninstall(UninstallEvent::ActionFailed { action, error }) => {
                self.line(&self.paint(&Style::new().red(), &format!("  ✗ {action}: {error}")));
            }
            AppEvent::General(GeneralEvent::Error { message, .. }) => {
                self.line(&self.paint(&Style::new().red(), &format!("  ✗ {message}")));
            }
            AppEvent::General(GeneralEvent::Warning { message, .. }) if !self.quiet => {
                self.line(&self.paint(&Style::new().yellow(), &format!("  ! {message}")));
            }
            _ => {}
        }
    }

    /// Final summary; failures are always shown
    pub fn render_report(&self, report: &UninstallReport) -> io::Result<()> {
        let out = Term::stdout();
        if !self.quiet {
            out.write_line(&format!("Removed {} item(s)", report.removed.len()))?;
        }
        if !report.failed.is_empty() {
            out.write_line(&self.paint(&Style::new().red().bold(), "Failed:"))?;
            for (action, reason) in &report.failed {
                out.write_line(&format!("  • {action}: {reason}"))?;
            }
        }
        if !report.residual.is_empty() && !self.quiet {
            out.write_line(&self.paint(&Style::new().yellow().bold(), "Still present:"))?;
            for artifact in &report.residual {
                out.write_line(&format!("  • {artifact}"))?;
            }
        }
        if report.is_clean() && !self.quiet {
            out.write_line(&self.paint(&Style::new().green().bold(), "Uninstall complete"))?;
        }
        Ok(())
    }
}
