//! OS packages, the service account and the directory tree

use async_trait::async_trait;
use nodectl_events::EventEmitter;
use nodectl_platform::{fs, PlatformCommand};
use nodectl_types::{StepId, StepOutcome, StepSuccess};
use std::path::{Path, PathBuf};

use crate::context::InstallContext;
use crate::graph::Step;

async fn missing_paths(paths: &[PathBuf]) -> Vec<&Path> {
    let mut missing = Vec::new();
    for path in paths {
        if !fs::exists(path).await {
            missing.push(path.as_path());
        }
    }
    missing
}

fn apt_get() -> PlatformCommand {
    PlatformCommand::new("apt-get").env("DEBIAN_FRONTEND", "noninteractive")
}

/// Ensures the build dependencies are installed
pub struct InstallDependencies;

#[async_trait]
impl Step for InstallDependencies {
    fn id(&self) -> StepId {
        StepId::InstallDependencies
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let build = &cx.tool.build;
        let installed = cx
            .succeeds(PlatformCommand::new("dpkg").arg("-s").args(&build.packages))
            .await;
        if installed && missing_paths(&build.critical_headers).await.is_empty() {
            return Ok(StepSuccess::already("all packages present"));
        }

        cx.emit_step_progress(self.id(), "updating package lists");
        cx.run_checked(apt_get().arg("update"), "apt-get update")
            .await?;

        cx.emit_step_progress(
            self.id(),
            format!("installing {} packages", build.packages.len()),
        );
        cx.run_checked(
            apt_get()
                .args(["install", "-y", "--no-install-recommends"])
                .args(&build.packages),
            "package installation",
        )
        .await?;

        let missing = missing_paths(&build.critical_headers).await;
        if !missing.is_empty() {
            let list = missing
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(cx.failure(format!("critical headers missing after install: {list}")));
        }
        Ok(StepSuccess::done(format!(
            "{} packages installed",
            build.packages.len()
        )))
    }
}

/// Creates the no-login system account that runs the daemon
pub struct CreateServiceUser;

#[async_trait]
impl Step for CreateServiceUser {
    fn id(&self) -> StepId {
        StepId::CreateServiceUser
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let user = cx.tool.daemon.service_user.as_str();
        if cx
            .succeeds(PlatformCommand::new("id").args(["-u", user]))
            .await
        {
            return Ok(StepSuccess::already(format!("user {user} exists")));
        }

        let home = cx.config.paths.data_dir.display().to_string();
        cx.run_checked(
            PlatformCommand::new("useradd")
                .args(["--system", "--user-group", "--no-create-home"])
                .args(["--shell", "/usr/sbin/nologin"])
                .args(["--home-dir", home.as_str()])
                .arg(user),
            "useradd",
        )
        .await?;
        Ok(StepSuccess::done(format!("created system user {user}")))
    }
}

/// Creates the Configuration Model's directories with their ownership
pub struct CreateDirectories;

#[async_trait]
impl Step for CreateDirectories {
    fn id(&self) -> StepId {
        StepId::CreateDirectories
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let paths = &cx.config.paths;
        let user = cx.tool.daemon.service_user.as_str();

        let mut created = 0usize;
        for dir in [
            &paths.install_dir,
            &paths.data_dir,
            &paths.wallet_dir,
            &paths.config_dir,
            &paths.log_dir,
            &paths.source_dir,
        ] {
            if fs::exists(dir).await {
                continue;
            }
            fs::create_dir_all(dir)
                .await
                .map_err(|e| cx.failure(e.to_string()))?;
            created += 1;
        }

        for dir in [&paths.data_dir, &paths.log_dir] {
            cx.run_checked(
                PlatformCommand::new("chown")
                    .arg("-R")
                    .arg(format!("{user}:{user}"))
                    .arg(dir.display().to_string()),
                "chown",
            )
            .await?;
        }
        fs::set_mode(&paths.data_dir, 0o750)
            .await
            .map_err(|e| cx.failure(e.to_string()))?;
        fs::set_mode(&paths.wallet_dir, 0o700)
            .await
            .map_err(|e| cx.failure(e.to_string()))?;

        if created == 0 {
            Ok(StepSuccess::already("all directories present"))
        } else {
            Ok(StepSuccess::done(format!("created {created} directories")))
        }
    }
}
