//! nodectl - interactive installer for a Litecoin full node
//!
//! Probes the host, offers the modes that make sense for it and hands the
//! chosen one to the ops crate while rendering its events.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod prompt;

use crate::cli::Cli;
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use crate::prompt::TerminalPrompter;
use clap::Parser;
use console::Term;
use nodectl_config::ToolConfig;
use nodectl_configurator::Prompter;
use nodectl_events::EventReceiver;
use nodectl_net::{NetClient, NetConfig};
use nodectl_ops::{available_modes, run_mode, OpsContextBuilder, Survey};
use nodectl_platform::CommandLog;
use nodectl_types::Mode;
use std::future::Future;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();

    let code = match run().await {
        Ok(code) => code,
        Err(e) if e.is_cancellation() => {
            info!("cancelled by operator");
            eprintln!("Cancelled, nothing was changed.");
            e.exit_code()
        }
        Err(e) => {
            error!("Application error: {e}");
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };
    process::exit(code);
}

/// Main application logic; returns the process exit code
async fn run() -> Result<i32, CliError> {
    nodectl_probe::require_root()?;
    let tool = ToolConfig::load_effective().await.map_err(CliError::Config)?;
    let debug_log = logging::init_tracing(&tool.paths.tool_log_dir);
    info!("Starting nodectl v{}", env!("CARGO_PKG_VERSION"));

    let tool = Arc::new(tool);
    let command_log = Arc::new(CommandLog::create(&tool.paths.tool_log_dir).await?);
    let (event_sender, mut event_receiver) = nodectl_events::channel();

    let mut builder = OpsContextBuilder::new()
        .with_tool_config(tool.clone())
        .with_event_sender(event_sender)
        .with_command_log(command_log.clone());
    match NetClient::new(NetConfig::from(&tool.http)) {
        Ok(net) => builder = builder.with_net(net),
        Err(e) => warn!(error = %e, "HTTP client unavailable, release lookup disabled"),
    }
    let ctx = builder.build()?;

    let colors = Term::stdout().features().colors_supported();
    let mut handler = EventHandler::new(colors);
    let renderer = OutputRenderer::new(colors);
    let mut prompter = TerminalPrompter::default();

    let survey = with_events(nodectl_ops::survey(&ctx), &mut event_receiver, &mut handler).await?;
    show_survey(&handler, &survey);

    let modes = available_modes(&survey.host);
    let labels: Vec<String> = modes.iter().map(ToString::to_string).collect();
    let items: Vec<&str> = labels.iter().map(String::as_str).collect();
    let choice = prompter.select("What would you like to do?", &items, 0)?;
    let mode = modes.get(choice).copied().unwrap_or(Mode::Exit);
    if mode == Mode::Exit {
        info!("exit chosen");
        return Ok(0);
    }

    if let Err(e) = command_log.note(&format!("mode: {mode}")).await {
        warn!(error = %e, "command log unavailable");
    }
    let outcome = with_events(
        run_mode(&ctx, mode, &survey, &mut prompter),
        &mut event_receiver,
        &mut handler,
    )
    .await?;

    renderer.render_outcome(&outcome, debug_log.as_deref())?;
    info!(mode = %mode, success = outcome.succeeded(), "mode finished");
    Ok(outcome.exit_code())
}

/// Drive `future` while rendering the events it emits
async fn with_events<T>(
    future: impl Future<Output = T>,
    event_receiver: &mut EventReceiver,
    event_handler: &mut EventHandler,
) -> T {
    let mut future = std::pin::pin!(future);
    loop {
        select! {
            result = &mut future => {
                while let Ok(message) = event_receiver.try_recv() {
                    event_handler.handle_event(message);
                }
                return result;
            }
            Some(message) = event_receiver.recv() => {
                event_handler.handle_event(message);
            }
        }
    }
}

fn show_survey(handler: &EventHandler, survey: &Survey) {
    let resources = &survey.resources;
    handler.show_status(&format!(
        "{}: {} cores, {} MB RAM, {} GB free{}",
        survey.os.version_label,
        resources.cpu_cores,
        resources.ram_mb,
        resources.disk_free_gb,
        if resources.disk_is_rotational {
            " (rotational disk)"
        } else {
            ""
        }
    ));
    if survey.has_existing_install() {
        let host = &survey.host;
        handler.show_status(&format!(
            "Existing install found (service {})",
            if host.service_active { "running" } else { "stopped" }
        ));
    }
}
