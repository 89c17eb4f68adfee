//! Host firewall rules

use async_trait::async_trait;
use nodectl_platform::PlatformCommand;
use nodectl_types::{StepId, StepOutcome, StepSuccess};

use crate::context::InstallContext;
use crate::graph::Step;

/// Whether `ufw status` output already lists `rule`
#[must_use]
pub fn status_has_rule(status: &str, rule: &str) -> bool {
    status
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .any(|first| first == rule)
}

/// Numbers of rules in `ufw status numbered` output for `rule` carrying
/// `tag`, highest first so deleting in order keeps the rest valid
#[must_use]
pub fn tagged_rule_numbers(status: &str, rule: &str, tag: &str) -> Vec<usize> {
    let mut numbers: Vec<usize> = status
        .lines()
        .filter_map(|line| {
            let (number, rest) = line.trim_start().strip_prefix('[')?.split_once(']')?;
            let first = rest.split_whitespace().next()?;
            let tagged = rest
                .split_once('#')
                .is_some_and(|(_, comment)| comment.trim() == tag);
            if first != rule || !tagged {
                return None;
            }
            number.trim().parse::<usize>().ok()
        })
        .collect();
    numbers.sort_unstable_by(|a, b| b.cmp(a));
    numbers
}

/// Opens the P2P port, and the RPC port when the node exposes it. A node
/// that no longer exposes RPC has its tagged RPC rule removed.
pub struct ConfigureFirewall;

#[async_trait]
impl Step for ConfigureFirewall {
    fn id(&self) -> StepId {
        StepId::ConfigureFirewall
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        if !cx.config.firewall_enabled {
            return Ok(StepSuccess::already("firewall management disabled"));
        }
        if !cx.platform.has_program("ufw").await {
            return Err(cx.failure("ufw is not installed"));
        }

        let status = cx
            .run_checked(PlatformCommand::new("ufw").arg("status"), "ufw status")
            .await?
            .stdout;
        let tag = cx.firewall_tag();

        let mut rules = vec![format!("{}/tcp", cx.config.network.p2p_port)];
        if cx.config.exposes_rpc() {
            rules.push(format!("{}/tcp", cx.config.network.rpc_port));
        }

        let mut added = Vec::new();
        for rule in &rules {
            if status_has_rule(&status, rule) {
                continue;
            }
            cx.run_checked(
                PlatformCommand::new("ufw")
                    .args(["allow", rule.as_str(), "comment", tag.as_str()]),
                "ufw allow",
            )
            .await?;
            added.push(rule.as_str());
        }

        let rpc_rule = format!("{}/tcp", cx.config.network.rpc_port);
        let mut removed = false;
        if !cx.config.exposes_rpc() && status_has_rule(&status, &rpc_rule) {
            let numbered = cx
                .run_checked(
                    PlatformCommand::new("ufw").args(["status", "numbered"]),
                    "ufw status numbered",
                )
                .await?
                .stdout;
            for number in tagged_rule_numbers(&numbered, &rpc_rule, &tag) {
                cx.run_checked(
                    PlatformCommand::new("ufw")
                        .args(["--force", "delete"])
                        .arg(number.to_string()),
                    "ufw delete",
                )
                .await?;
                removed = true;
            }
        }

        let mut notes = Vec::new();
        if !added.is_empty() {
            notes.push(format!("allowed {}", added.join(", ")));
        }
        if removed {
            notes.push(format!("closed {rpc_rule}"));
        }
        if notes.is_empty() {
            Ok(StepSuccess::already(format!(
                "{} already allowed",
                rules.join(", ")
            )))
        } else {
            Ok(StepSuccess::done(notes.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{status_has_rule, tagged_rule_numbers};

    #[test]
    fn rule_lookup_matches_first_column_only() {
        let status = "Status: active\n\nTo                         Action      From\n\
                      --                         ------      ----\n\
                      9333/tcp                   ALLOW       Anywhere # nodectl-litecoin\n\
                      22/tcp                     ALLOW       9332/tcp\n";
        assert!(status_has_rule(status, "9333/tcp"));
        assert!(status_has_rule(status, "22/tcp"));
        assert!(!status_has_rule(status, "9332/tcp"));
        assert!(!status_has_rule("Status: inactive\n", "9333/tcp"));
    }

    #[test]
    fn tagged_rules_only_match_our_comment() {
        let status = "Status: active\n\n     To                         Action      From\n\
                      [ 1] 9333/tcp                   ALLOW IN    Anywhere # nodectl-litecoin\n\
                      [ 2] 9332/tcp                   ALLOW IN    Anywhere # nodectl-litecoin\n\
                      [ 3] 9332/tcp                   ALLOW IN    Anywhere (v6) # nodectl-litecoin\n\
                      [ 4] 9332/tcp                   ALLOW IN    10.0.0.0/8\n";
        assert_eq!(
            tagged_rule_numbers(status, "9332/tcp", "nodectl-litecoin"),
            vec![3, 2]
        );
        assert!(tagged_rule_numbers(status, "9332/tcp", "nodectl-other").is_empty());
    }
}
