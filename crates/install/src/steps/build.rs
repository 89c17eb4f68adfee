//! Source builds of the legacy database and the daemon

use async_trait::async_trait;
use nodectl_events::EventEmitter;
use nodectl_platform::{fs, PlatformCommand};
use nodectl_types::{StepId, StepOutcome, StepSuccess};
use std::path::Path;

use crate::context::InstallContext;
use crate::graph::Step;

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

fn make(jobs: usize, dir: &Path) -> PlatformCommand {
    PlatformCommand::new("make")
        .arg(format!("-j{jobs}"))
        .current_dir(dir)
}

/// Whether `-version` output names `version`
fn reports_version(output: &str, version: &str) -> bool {
    let wanted = version.trim_start_matches('v');
    output
        .split_whitespace()
        .any(|token| token.trim_start_matches('v') == wanted)
}

/// Builds the legacy database library into its private prefix
pub struct InstallLegacyDatabase;

#[async_trait]
impl Step for InstallLegacyDatabase {
    fn id(&self) -> StepId {
        StepId::InstallLegacyDatabase
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let db = &cx.tool.build.legacy_db;
        let marker = db.marker_path();
        if fs::exists(&marker).await {
            return Ok(StepSuccess::already(format!(
                "found {}",
                marker.display()
            )));
        }

        let work = &cx.tool.paths.temp_dir;
        let source = work.join(db.source_dir_name());
        let archive = work.join(format!("{}.tar.gz", db.source_dir_name()));
        fs::create_dir_all(work)
            .await
            .map_err(|e| cx.failure(e.to_string()))?;

        cx.emit_step_progress(self.id(), format!("downloading {}", db.url));
        cx.run_checked(
            PlatformCommand::new("curl")
                .args(["-fsSL", "-o"])
                .arg(path_arg(&archive))
                .arg(db.url.as_str()),
            "legacy database download",
        )
        .await?;
        cx.run_checked(
            PlatformCommand::new("tar")
                .arg("-xzf")
                .arg(path_arg(&archive))
                .arg("-C")
                .arg(path_arg(work)),
            "archive extraction",
        )
        .await?;

        // Newer compilers ship a builtin with the same name
        cx.run_checked(
            PlatformCommand::new("sed")
                .args(["-i", "s/__atomic_compare_exchange/__atomic_compare_exchange_db/g"])
                .arg(path_arg(&source.join("dbinc").join("atomic.h"))),
            "compatibility patch",
        )
        .await?;

        let build_dir = source.join("build_unix");
        cx.emit_step_progress(self.id(), "configuring");
        cx.run_checked(
            PlatformCommand::new("../dist/configure")
                .args(["--enable-cxx", "--disable-shared", "--with-pic"])
                .arg(format!("--prefix={}", db.prefix.display()))
                .current_dir(&build_dir),
            "legacy database configure",
        )
        .await?;
        cx.emit_step_progress(self.id(), "compiling");
        cx.run_checked(make(cx.tool.build_jobs(), &build_dir), "legacy database build")
            .await?;
        cx.run_checked(
            PlatformCommand::new("make")
                .arg("install")
                .current_dir(&build_dir),
            "legacy database install",
        )
        .await?;

        if !fs::exists(&marker).await {
            return Err(cx.failure(format!(
                "expected {} after install",
                marker.display()
            )));
        }
        Ok(StepSuccess::done(format!(
            "legacy database {} installed to {}",
            db.version,
            db.prefix.display()
        )))
    }
}

/// Fetches, builds and installs the daemon at the resolved version
pub struct BuildAndInstallDaemon;

#[async_trait]
impl Step for BuildAndInstallDaemon {
    fn id(&self) -> StepId {
        StepId::BuildAndInstallDaemon
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let profile = &cx.tool.daemon;
        let version = cx.config.software_version.as_str();
        let binary = cx.installed_binary(&profile.daemon_binary);

        if fs::exists(&binary).await {
            let probe = PlatformCommand::new(&path_arg(&binary)).arg("-version");
            if let Ok(output) = cx.run(probe).await {
                if output.success() && reports_version(&output.stdout, version) {
                    return Ok(StepSuccess::already(format!(
                        "{} {version} already installed",
                        profile.daemon_binary
                    )));
                }
            }
        }

        let source = &cx.config.paths.source_dir;
        let src = path_arg(source);
        if fs::exists(&source.join(".git")).await {
            cx.emit_step_progress(self.id(), "fetching sources");
            cx.run_checked(
                PlatformCommand::new("git")
                    .args(["-C", src.as_str(), "fetch", "--tags", "--force", "origin"]),
                "git fetch",
            )
            .await?;
        } else {
            cx.emit_step_progress(self.id(), "cloning sources");
            // git refuses to clone into a non-empty directory
            let leftovers = fs::list_dir(source).await.is_ok_and(|e| !e.is_empty());
            if leftovers {
                fs::remove_dir_all(source)
                    .await
                    .map_err(|e| cx.failure(e.to_string()))?;
            }
            cx.run_checked(
                PlatformCommand::new("git")
                    .arg("clone")
                    .arg(profile.repository_url.as_str())
                    .arg(src.as_str()),
                "git clone",
            )
            .await?;
        }
        cx.run_checked(
            PlatformCommand::new("git").args(["-C", src.as_str(), "checkout", "--force", version]),
            "git checkout",
        )
        .await?;

        cx.emit_step_progress(self.id(), "configuring");
        cx.run_checked(
            PlatformCommand::new("./autogen.sh").current_dir(source),
            "autogen",
        )
        .await?;
        let db_prefix = &cx.tool.build.legacy_db.prefix;
        cx.run_checked(
            PlatformCommand::new("./configure")
                .arg(format!("--prefix={}", cx.config.paths.install_dir.display()))
                .args(&profile.configure_flags)
                .arg(format!("BDB_LIBS=-L{}/lib -ldb_cxx", db_prefix.display()))
                .arg(format!("BDB_CFLAGS=-I{}/include", db_prefix.display()))
                .current_dir(source),
            "daemon configure",
        )
        .await?;

        cx.emit_step_progress(self.id(), format!("compiling {version}"));
        cx.run_checked(make(cx.tool.build_jobs(), source), "daemon build")
            .await?;
        cx.run_checked(
            PlatformCommand::new("make").arg("install").current_dir(source),
            "daemon install",
        )
        .await?;

        if !fs::exists(&binary).await {
            return Err(cx.failure(format!(
                "expected {} after install",
                binary.display()
            )));
        }
        Ok(StepSuccess::done(format!(
            "{} {version} installed",
            profile.daemon_binary
        )))
    }
}

/// Links the installed executables into the shared bin directory
pub struct CreateSymlinks;

#[async_trait]
impl Step for CreateSymlinks {
    fn id(&self) -> StepId {
        StepId::CreateSymlinks
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let bin_dir = &cx.tool.paths.bin_dir;
        fs::create_dir_all(bin_dir)
            .await
            .map_err(|e| cx.failure(e.to_string()))?;

        let mut linked = 0usize;
        let mut missing = Vec::new();
        for name in &cx.tool.daemon.binaries {
            let target = cx.installed_binary(name);
            if !fs::exists(&target).await {
                missing.push(name.as_str());
                continue;
            }
            let link = bin_dir.join(name);
            if fs::is_symlink_to(&link, &target).await {
                continue;
            }
            fs::replace_symlink(&target, &link)
                .await
                .map_err(|e| cx.failure(e.to_string()))?;
            linked += 1;
        }

        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "skipping binaries the build did not produce");
        }
        let note = if missing.is_empty() {
            format!("linked {linked} binaries")
        } else {
            format!("linked {linked} binaries, skipped {}", missing.join(", "))
        };
        if linked == 0 {
            Ok(StepSuccess::already(note))
        } else {
            Ok(StepSuccess::done(note))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::reports_version;

    #[test]
    fn version_output_matching() {
        let out = "Litecoin Core Daemon version v0.21.4\nCopyright (C) 2011-2024";
        assert!(reports_version(out, "v0.21.4"));
        assert!(reports_version(out, "0.21.4"));
        assert!(!reports_version(out, "0.21.3"));
        assert!(!reports_version(out, "0.21"));
    }
}
