//! Firewall rules, data retention and temporary build files

use globset::{Glob, GlobSet, GlobSetBuilder};
use nodectl_config::ToolConfig;
use nodectl_platform::{fs, PlatformCommand};
use nodectl_types::UninstallReport;
use std::path::Path;

use super::{DataRetention, Uninstaller};

/// Rule numbers in `ufw status numbered` output that belong to nodectl,
/// highest first so deleting one does not renumber the rest
#[must_use]
pub fn matching_rule_numbers(status: &str, ports: &[u16], tag: &str) -> Vec<usize> {
    let mut numbers: Vec<usize> = status
        .lines()
        .filter_map(|line| {
            let (number, rest) = line.trim_start().strip_prefix('[')?.split_once(']')?;
            let number = number.trim().parse::<usize>().ok()?;
            let rule = rest.split_whitespace().next()?;
            let port_matches = rule
                .split('/')
                .next()
                .and_then(|p| p.parse::<u16>().ok())
                .is_some_and(|p| ports.contains(&p));
            let tag_matches = rest
                .split_once('#')
                .is_some_and(|(_, comment)| comment.trim() == tag);
            (port_matches || tag_matches).then_some(number)
        })
        .collect();
    numbers.sort_unstable_by(|a, b| b.cmp(a));
    numbers.dedup();
    numbers
}

/// Name patterns of leftovers in the temp directory
#[must_use]
pub fn temp_patterns(tool: &ToolConfig) -> Vec<String> {
    vec![
        "nodectl-*".to_string(),
        format!("{}*", tool.build.legacy_db.source_dir_name()),
        format!("{}-*", tool.daemon.name),
    ]
}

fn temp_matcher(tool: &ToolConfig) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in temp_patterns(tool) {
        builder.add(Glob::new(&pattern)?);
    }
    builder.build()
}

/// Whether `candidate` is `wallet_dir` or one of its ancestors
fn holds_wallets(candidate: &Path, wallet_dir: &Path) -> bool {
    wallet_dir.starts_with(candidate)
}

impl Uninstaller {
    pub(super) async fn remove_firewall_rules(&self, report: &mut UninstallReport) {
        if !self.platform.has_program("ufw").await {
            tracing::debug!("ufw not installed, no rules to remove");
            return;
        }
        let status = match self
            .exec(PlatformCommand::new("ufw").args(["status", "numbered"]))
            .await
        {
            Ok(output) if output.success() => output.stdout,
            Ok(output) => {
                self.failed(report, "firewall rules", output.status_description());
                return;
            }
            Err(e) => {
                self.failed(report, "firewall rules", e.to_string());
                return;
            }
        };

        let tag = crate::context::firewall_tag(&self.tool);
        for number in matching_rule_numbers(&status, &self.ports, &tag) {
            self.command(
                report,
                &format!("firewall rule {number}"),
                PlatformCommand::new("ufw")
                    .args(["--force", "delete"])
                    .arg(number.to_string()),
                false,
            )
            .await;
        }
    }

    pub(super) async fn remove_data(&self, report: &mut UninstallReport, retention: DataRetention) {
        let data_dir = &self.paths.data_dir;
        match retention {
            DataRetention::Remove => self.remove(report, "data directory", data_dir).await,
            DataRetention::KeepAll => {
                tracing::info!(path = %data_dir.display(), "keeping data directory");
            }
            DataRetention::KeepWallets => {
                let entries = match fs::list_dir(data_dir).await {
                    Ok(entries) => entries,
                    Err(e) => {
                        self.failed(report, "blockchain data", e.to_string());
                        return;
                    }
                };
                for entry in entries {
                    if holds_wallets(&entry, &self.paths.wallet_dir) {
                        continue;
                    }
                    let name = entry
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.remove(report, &format!("data {name}"), &entry).await;
                }
            }
        }
    }

    pub(super) async fn remove_temp_files(&self, report: &mut UninstallReport) {
        let matcher = match temp_matcher(&self.tool) {
            Ok(matcher) => matcher,
            Err(e) => {
                self.failed(report, "temporary files", e.to_string());
                return;
            }
        };
        let Ok(entries) = fs::list_dir(&self.tool.paths.temp_dir).await else {
            return;
        };
        for entry in entries {
            let Some(name) = entry.file_name() else {
                continue;
            };
            if matcher.is_match(name) {
                let label = format!("temporary {}", name.to_string_lossy());
                self.remove(report, &label, &entry).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMBERED: &str = "Status: active\n\n     To                         Action      From\n     \
        --                         ------      ----\n\
        [ 1] 22/tcp                     ALLOW IN    Anywhere\n\
        [ 2] 9333/tcp                   ALLOW IN    Anywhere                   # nodectl-litecoin\n\
        [ 3] 8080/tcp                   ALLOW IN    Anywhere                   # nodectl-litecoin\n\
        [ 4] 9332/tcp                   ALLOW IN    Anywhere\n\
        [ 5] 9333/tcp (v6)              ALLOW IN    Anywhere (v6)              # nodectl-litecoin\n";

    #[test]
    fn rules_match_by_port_or_tag_highest_first() {
        let numbers = matching_rule_numbers(NUMBERED, &[9333, 9332], "nodectl-litecoin");
        assert_eq!(numbers, vec![5, 4, 3, 2]);
    }

    #[test]
    fn unrelated_rules_survive() {
        assert!(matching_rule_numbers(NUMBERED, &[1234], "nodectl-other").is_empty());
        assert!(matching_rule_numbers("Status: inactive\n", &[9333], "x").is_empty());
    }

    #[test]
    fn wallet_ancestors_are_kept() {
        let wallets = Path::new("/var/lib/litecoin/wallets");
        assert!(holds_wallets(Path::new("/var/lib/litecoin/wallets"), wallets));
        assert!(!holds_wallets(Path::new("/var/lib/litecoin/blocks"), wallets));
        assert!(holds_wallets(
            Path::new("/srv/node/w"),
            Path::new("/srv/node/w/pool")
        ));
    }

    #[test]
    fn temp_patterns_cover_build_leftovers() {
        let tool = ToolConfig::default();
        let matcher = temp_matcher(&tool).unwrap();
        assert!(matcher.is_match("nodectl-build-1"));
        assert!(matcher.is_match(tool.build.legacy_db.source_dir_name()));
        assert!(matcher.is_match(format!("{}-src", tool.daemon.name)));
        assert!(!matcher.is_match("systemd-private-abc"));
    }
}
