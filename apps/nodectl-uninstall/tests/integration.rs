//! Integration tests for the nodectl-uninstall CLI

#[cfg(test)]
mod tests {
    use std::process::Command;

    #[test]
    fn test_cli_help_lists_flags() {
        let output = Command::new(env!("CARGO_BIN_EXE_nodectl-uninstall"))
            .arg("--help")
            .output()
            .expect("Failed to execute nodectl-uninstall");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        for flag in ["--keep-blockchain", "--keep-wallets", "--force", "--quiet"] {
            assert!(stdout.contains(flag), "missing {flag}");
        }
    }

    #[test]
    fn test_cli_conflicting_retention_flags() {
        let output = Command::new(env!("CARGO_BIN_EXE_nodectl-uninstall"))
            .args(["--keep-blockchain", "--keep-wallets"])
            .output()
            .expect("Failed to execute nodectl-uninstall");

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("cannot be used with"));
    }
}
