//! Integration tests for the nodectl CLI

#[cfg(test)]
mod tests {
    use std::process::Command;

    #[test]
    fn test_cli_version() {
        let output = Command::new(env!("CARGO_BIN_EXE_nodectl"))
            .arg("--version")
            .output()
            .expect("Failed to execute nodectl");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("nodectl"));
    }

    #[test]
    fn test_cli_help() {
        let output = Command::new(env!("CARGO_BIN_EXE_nodectl"))
            .arg("--help")
            .output()
            .expect("Failed to execute nodectl");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Interactive installer for a Litecoin full node"));
    }

    #[test]
    fn test_cli_rejects_flags() {
        let output = Command::new(env!("CARGO_BIN_EXE_nodectl"))
            .arg("--keep-wallets")
            .output()
            .expect("Failed to execute nodectl");

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("unexpected argument"));
    }
}
