//! Progress display for events received while a mode runs

use console::{Style, Term};
use nodectl_events::{AppEvent, EventMessage, GeneralEvent, ProbeEvent, StepEvent};

use crate::logging;

/// Renders events as progress lines on stderr
pub struct EventHandler {
    term: Term,
    colors: bool,
}

impl EventHandler {
    pub fn new(colors: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors,
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

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        logging::log_event_with_tracing(&message);
        match message.event {
            AppEvent::Step(event) => self.handle_step(event),
            AppEvent::Probe(event) => self.handle_probe(event),
            AppEvent::General(event) => self.handle_general(event),
            AppEvent::Platform(_) | AppEvent::Uninstall(_) => {}
        }
    }

    fn handle_step(&self, event: StepEvent) {
        match event {
            StepEvent::GraphStarted { mode, steps } => {
                let title = format!("==> {mode} ({} steps)", steps.len());
                self.line(&self.paint(&Style::new().bold(), &title));
            }
            StepEvent::Started { step } => self.line(&format!("  -> {step}")),
            StepEvent::Progress { message, .. } => {
                self.line(&self.paint(&Style::new().dim(), &format!("     {message}")));
            }
            StepEvent::Succeeded {
                step,
                already_satisfied,
                note,
                ..
            } => {
                let mut text = format!("  ✓ {step}");
                if already_satisfied {
                    text.push_str(" (already done)");
                }
                if let Some(note) = note {
                    text.push_str(&format!(": {note}"));
                }
                self.line(&self.paint(&Style::new().green(), &text));
            }
            StepEvent::Failed {
                step,
                failure,
                log_excerpt,
            } => {
                self.show_error(&format!("{step}: {}", failure.message));
                for line in &log_excerpt {
                    self.line(&self.paint(&Style::new().dim(), &format!("     | {line}")));
                }
            }
            StepEvent::AdvisoryFailed {
                step,
                failure,
                remediation,
            } => {
                self.show_warning(&format!("{step} skipped: {}", failure.message));
                if let Some(command) = remediation {
                    self.line(&format!("     run manually: {command}"));
                }
            }
            StepEvent::GraphFinished { .. } => {}
        }
    }

    fn handle_probe(&self, event: ProbeEvent) {
        match event {
            ProbeEvent::CheckDegraded { check, reason } => {
                self.show_warning(&format!("{check} check incomplete: {reason}"));
            }
            ProbeEvent::VersionFallback {
                fallback, reason, ..
            } => {
                self.show_warning(&format!("release lookup failed ({reason}), using {fallback}"));
            }
            ProbeEvent::VersionResolved { version } => {
                self.show_status(&format!("Daemon version {version}"));
            }
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => self.show_warning(&format!("{message} ({context})")),
                None => self.show_warning(&message),
            },
            GeneralEvent::Error { message, details } => match details {
                Some(details) => self.show_error(&format!("{message}: {details}")),
                None => self.show_error(&message),
            },
            GeneralEvent::OperationFailed { operation, error } => {
                self.show_error(&format!("{operation} failed: {error}"));
            }
            GeneralEvent::DebugLog { .. }
            | GeneralEvent::OperationStarted { .. }
            | GeneralEvent::OperationCompleted { .. } => {}
        }
    }

    pub fn show_status(&self, message: &str) {
        self.line(&self.paint(&Style::new().cyan(), message));
    }

    pub fn show_warning(&self, message: &str) {
        self.line(&self.paint(&Style::new().yellow(), &format!("  ! {message}")));
    }

    pub fn show_error(&self, message: &str) {
        self.line(&self.paint(&Style::new().red().bold(), &format!("  ✗ {message}")));
    }
}
