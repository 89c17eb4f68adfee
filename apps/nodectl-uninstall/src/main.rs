//! nodectl-uninstall - remove a nodectl-managed Litecoin full node

mod cli;
mod error;
mod logging;
mod render;

use crate::cli::Cli;
use crate::error::CliError;
use crate::render::Renderer;
use clap::Parser;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm};
use nodectl_config::ToolConfig;
use nodectl_configurator::rehydrate;
use nodectl_events::EventReceiver;
use nodectl_install::{DataRetention, UninstallOptions, Uninstaller};
use nodectl_net::{HttpRpcConnector, RpcConnector, RpcEndpoint};
use nodectl_ops::{uninstall_exit_code, RunLock};
use nodectl_platform::{CommandLog, Platform, PlatformContext};
use nodectl_probe::EnvironmentProbe;
use std::future::Future;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Application error: {e}");
            eprintln!("Error: {e}");
            1
        }
    };
    process::exit(code);
}

async fn run(cli: &Cli) -> Result<i32, CliError> {
    nodectl_probe::require_root()?;
    let tool = Arc::new(ToolConfig::load_effective().await?);
    let debug_log = logging::init_tracing(&tool.paths.tool_log_dir, cli.quiet);
    info!("Starting nodectl-uninstall v{}", env!("CARGO_PKG_VERSION"));

    let renderer = Renderer::new(Term::stderr().features().colors_supported(), cli.quiet);
    let command_log = Arc::new(CommandLog::create(&tool.paths.tool_log_dir).await?);
    let (event_sender, mut event_receiver) = nodectl_events::channel();
    let platform = Platform::current();
    let ctx = PlatformContext::new(Some(event_sender), Some(command_log));

    let host = EnvironmentProbe::new(&platform, &ctx, &tool)
        .detect_existing_install()
        .await;
    if !host.has_existing_install() {
        renderer.status("No nodectl installation found; removing any leftovers.");
    }

    let retention = cli.retention();
    if !cli.force && !confirm(&tool, retention)? {
        renderer.status("Cancelled, nothing was removed.");
        return Ok(0);
    }

    let _lock = RunLock::acquire(&tool.paths.lock_path)?;

    let existing = host.existing_config.unwrap_or_default();
    // Only the RPC endpoint is read from this model
    let config = rehydrate(&tool, &existing, &tool.daemon.version, 1);
    let rpc = HttpRpcConnector.connect(&RpcEndpoint::for_config(&config));
    let uninstaller = Uninstaller::new(platform, ctx, tool.clone())
        .with_existing(&existing)
        .with_rpc(rpc);
    let options = UninstallOptions::new()
        .with_retention(retention)
        .with_force(cli.force);

    let report = with_events(uninstaller.run(&options), &mut event_receiver, &renderer).await;
    renderer.render_report(&report)?;
    if let Some(path) = debug_log {
        renderer.status(&format!("Debug log: {}", path.display()));
    }
    info!(
        removed = report.removed.len(),
        failed = report.failed.len(),
        residual = report.residual.len(),
        "uninstall finished"
    );
    Ok(uninstall_exit_code(&report))
}

fn confirm(tool: &ToolConfig, retention: DataRetention) -> Result<bool, CliError> {
    let data = match retention {
        DataRetention::Remove => "including the blockchain and all wallets",
        DataRetention::KeepAll => "keeping the blockchain data directory",
        DataRetention::KeepWallets => "keeping the wallet directory",
    };
    let prompt = format!(
        "Remove {} ({}) from this host, {data}?",
        tool.daemon.display_name, tool.daemon.service_unit
    );
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

async fn with_events<T>(
    future: impl Future<Output = T>,
    event_receiver: &mut EventReceiver,
    renderer: &Renderer,
) -> T {
    let mut future = std::pin::pin!(future);
    loop {
        select! {
            result = &mut future => {
                while let Ok(message) = event_receiver.try_recv() {
                    renderer.handle_event(message);
                }
                return result;
            }
            Some(message) = event_receiver.recv() => renderer.handle_event(message),
        }
    }
}
