//! Scripted in-memory host for tests
//!
//! [`FakeHost`] models the bits of host state nodectl reads back through
//! commands (system users and groups, firewall rules, unit state, running
//! processes) and records every command line it is asked to run. Anything it
//! does not model succeeds with empty output. Individual command prefixes can
//! be scripted to fail, to return canned output, or to trigger a hook that
//! fakes the side effect on disk (for example creating a build artifact).

use async_trait::async_trait;
use nodectl_errors::{Error, PlatformError};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::Platform;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

type Hook = Box<dyn Fn(&PlatformCommand) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FirewallRule {
    rule: String,
    comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Process {
    name: String,
    user: String,
}

#[derive(Default)]
struct FakeState {
    users: BTreeSet<String>,
    groups: BTreeSet<String>,
    firewall_rules: Vec<FirewallRule>,
    units_active: BTreeSet<String>,
    units_enabled: BTreeSet<String>,
    processes: Vec<Process>,
    missing_programs: BTreeSet<String>,
    failures: Vec<(String, CommandOutput)>,
    responses: Vec<(String, CommandOutput)>,
    hooks: Vec<(String, Hook)>,
    calls: Vec<String>,
}

/// Stateful scripted implementation of [`ProcessOperations`]
#[derive(Default, Clone)]
pub struct FakeHost {
    state: Arc<Mutex<FakeState>>,
}

impl FakeHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`Platform`] driving this host
    #[must_use]
    pub fn platform(&self) -> Platform {
        Platform::new(Arc::new(self.clone()))
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[must_use]
    pub fn with_user(self, user: &str) -> Self {
        {
            let mut state = self.state();
            state.users.insert(user.to_string());
            state.groups.insert(user.to_string());
        }
        self
    }

    #[must_use]
    pub fn with_active_unit(self, unit: &str) -> Self {
        {
            let mut state = self.state();
            state.units_active.insert(unit.to_string());
            state.units_enabled.insert(unit.to_string());
        }
        self
    }

    #[must_use]
    pub fn with_process(self, name: &str, user: &str) -> Self {
        self.state().processes.push(Process {
            name: name.to_string(),
            user: user.to_string(),
        });
        self
    }

    #[must_use]
    pub fn with_firewall_rule(self, rule: &str, comment: Option<&str>) -> Self {
        self.state().firewall_rules.push(FirewallRule {
            rule: rule.to_string(),
            comment: comment.map(str::to_string),
        });
        self
    }

    /// Make `which(program)` fail
    #[must_use]
    pub fn without_program(self, program: &str) -> Self {
        self.state().missing_programs.insert(program.to_string());
        self
    }

    /// Commands whose line starts with `prefix` exit non-zero
    #[must_use]
    pub fn fail_on(self, prefix: &str, exit_code: i32, stderr: &str) -> Self {
        self.state()
            .failures
            .push((prefix.to_string(), CommandOutput::failed(exit_code, stderr)));
        self
    }

    /// Drop every scripted failure, as if the operator repaired the host
    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Commands whose line starts with `prefix` return `output` verbatim
    #[must_use]
    pub fn respond(self, prefix: &str, output: CommandOutput) -> Self {
        self.state().responses.push((prefix.to_string(), output));
        self
    }

    /// Run `hook` whenever a command starting with `prefix` succeeds
    #[must_use]
    pub fn on<F>(self, prefix: &str, hook: F) -> Self
    where
        F: Fn(&PlatformCommand) + Send + Sync + 'static,
    {
        self.state()
            .hooks
            .push((prefix.to_string(), Box::new(hook)));
        self
    }

    /// Every command line run so far
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Number of recorded commands starting with `prefix`
    #[must_use]
    pub fn count(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }

    #[must_use]
    pub fn user_exists(&self, user: &str) -> bool {
        self.state().users.contains(user)
    }

    #[must_use]
    pub fn group_exists(&self, group: &str) -> bool {
        self.state().groups.contains(group)
    }

    #[must_use]
    pub fn unit_active(&self, unit: &str) -> bool {
        self.state().units_active.contains(unit)
    }

    #[must_use]
    pub fn unit_enabled(&self, unit: &str) -> bool {
        self.state().units_enabled.contains(unit)
    }

    /// Firewall rules as `rule` strings, in insertion order
    #[must_use]
    pub fn firewall_rules(&self) -> Vec<String> {
        self.state()
            .firewall_rules
            .iter()
            .map(|r| r.rule.clone())
            .collect()
    }

    #[must_use]
    pub fn process_count(&self) -> usize {
        self.state().processes.len()
    }
}

impl FakeState {
    fn simulate(&mut self, cmd: &PlatformCommand) -> CommandOutput {
        let args: Vec<&str> = cmd.get_args().iter().map(String::as_str).collect();
        match (cmd.program(), args.as_slice()) {
            ("id", [.., user]) => {
                if self.users.contains(*user) {
                    CommandOutput::ok("999\n")
                } else {
                    CommandOutput::failed(1, format!("id: '{user}': no such user"))
                }
            }
            ("useradd", [.., user]) => {
                if self.users.insert((*user).to_string()) {
                    self.groups.insert((*user).to_string());
                    CommandOutput::ok("")
                } else {
                    CommandOutput::failed(9, format!("useradd: user '{user}' already exists"))
                }
            }
            ("userdel", [.., user]) => {
                if self.users.remove(*user) {
                    CommandOutput::ok("")
                } else {
                    CommandOutput::failed(6, format!("userdel: user '{user}' does not exist"))
                }
            }
            ("getent", ["group", group]) => {
                if self.groups.contains(*group) {
                    CommandOutput::ok(format!("{group}:x:999:\n"))
                } else {
                    CommandOutput::failed(2, "")
                }
            }
            ("groupdel", [group]) => {
                if self.groups.remove(*group) {
                    CommandOutput::ok("")
                } else {
                    CommandOutput::failed(6, format!("groupdel: group '{group}' does not exist"))
                }
            }
            ("ufw", ["status"]) => CommandOutput::ok(self.ufw_status(false)),
            ("ufw", ["status", "numbered"]) => CommandOutput::ok(self.ufw_status(true)),
            ("ufw", ["allow", rule, rest @ ..]) => {
                if self.firewall_rules.iter().any(|r| r.rule == *rule) {
                    return CommandOutput::ok("Skipping adding existing rule\n");
                }
                let comment = match rest {
                    ["comment", comment] => Some((*comment).to_string()),
                    _ => None,
                };
                self.firewall_rules.push(FirewallRule {
                    rule: (*rule).to_string(),
                    comment,
                });
                CommandOutput::ok("Rule added\n")
            }
            ("ufw", ["--force", "delete", number]) => {
                match number.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= self.firewall_rules.len() => {
                        self.firewall_rules.remove(n - 1);
                        CommandOutput::ok("Rule deleted\n")
                    }
                    _ => CommandOutput::failed(1, "ERROR: Could not find rule"),
                }
            }
            ("systemctl", [action, unit]) => self.systemctl(action, unit),
            ("pgrep", args) => {
                if self.matching_processes(args).is_empty() {
                    CommandOutput::failed(1, "")
                } else {
                    CommandOutput::ok("4242\n")
                }
            }
            ("pkill", args) => {
                let before = self.processes.len();
                let matched = self.matching_processes(args);
                self.processes.retain(|p| !matched.contains(p));
                if self.processes.len() < before {
                    CommandOutput::ok("")
                } else {
                    CommandOutput::failed(1, "")
                }
            }
            _ => CommandOutput::ok(""),
        }
    }

    fn systemctl(&mut self, action: &str, unit: &str) -> CommandOutput {
        match action {
            "is-active" => {
                if self.units_active.contains(unit) {
                    CommandOutput::ok("active\n")
                } else {
                    CommandOutput {
                        exit_code: Some(3),
                        stdout: "inactive\n".to_string(),
                        stderr: String::new(),
                    }
                }
            }
            "is-enabled" => {
                if self.units_enabled.contains(unit) {
                    CommandOutput::ok("enabled\n")
                } else {
                    CommandOutput::failed(1, "")
                }
            }
            "start" => {
                self.units_active.insert(unit.to_string());
                CommandOutput::ok("")
            }
            "stop" => {
                self.units_active.remove(unit);
                CommandOutput::ok("")
            }
            "enable" => {
                self.units_enabled.insert(unit.to_string());
                CommandOutput::ok("")
            }
            "disable" => {
                self.units_enabled.remove(unit);
                CommandOutput::ok("")
            }
            _ => CommandOutput::ok(""),
        }
    }

    /// `-x NAME` matches by process name, `-u USER` by owner
    fn matching_processes(&self, args: &[&str]) -> Vec<Process> {
        let name = args
            .windows(2)
            .find(|pair| pair[0] == "-x")
            .map(|pair| pair[1]);
        let user = args
            .windows(2)
            .find(|pair| pair[0] == "-u")
            .map(|pair| pair[1]);
        self.processes
            .iter()
            .filter(|p| name.is_none_or(|n| p.name == n) && user.is_none_or(|u| p.user == u))
            .cloned()
            .collect()
    }

    fn ufw_status(&self, numbered: bool) -> String {
        let mut out = String::from("Status: active\n\nTo                         Action      From\n--                         ------      ----\n");
        for (index, rule) in self.firewall_rules.iter().enumerate() {
            let comment = rule
                .comment
                .as_ref()
                .map(|c| format!(" # {c}"))
                .unwrap_or_default();
            if numbered {
                out.push_str(&format!(
                    "[{:>2}] {:<26} ALLOW IN    Anywhere{comment}\n",
                    index + 1,
                    rule.rule
                ));
            } else {
                out.push_str(&format!(
                    "{:<26} ALLOW       Anywhere{comment}\n",
                    rule.rule
                ));
            }
        }
        out
    }
}

#[async_trait]
impl ProcessOperations for FakeHost {
    async fn execute_command(&self, cmd: &PlatformCommand) -> Result<CommandOutput, Error> {
        let line = cmd.command_line();
        let output = {
            let mut state = self.state();
            state.calls.push(line.clone());
            if state.missing_programs.contains(cmd.program()) {
                return Err(PlatformError::CommandNotFound {
                    command: cmd.program().to_string(),
                }
                .into());
            }
            let scripted = state
                .failures
                .iter()
                .chain(state.responses.iter())
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, output)| output.clone());
            match scripted {
                Some(output) => output,
                None => state.simulate(cmd),
            }
        };

        if output.success() {
            let state = self.state();
            for (prefix, hook) in &state.hooks {
                if line.starts_with(prefix) {
                    hook(cmd);
                }
            }
        }
        Ok(output)
    }

    async fn which(&self, program: &str) -> Result<PathBuf, Error> {
        if self.state().missing_programs.contains(program) {
            Err(PlatformError::CommandNotFound {
                command: program.to_string(),
            }
            .into())
        } else {
            Ok(PathBuf::from("/usr/bin").join(program))
        }
    }
}
