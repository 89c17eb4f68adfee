//! Pool wallet credential file
//!
//! Plain `KEY=value` lines so pool software can source it from a shell.

use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolCredentials {
    pub wallet_name: String,
    /// Payout address; empty until one is generated or supplied
    pub wallet_address: Option<String>,
    pub wallet_path: PathBuf,
}

impl PoolCredentials {
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("# Pool wallet credentials generated by nodectl\n");
        let _ = writeln!(out, "WALLET_NAME={}", self.wallet_name);
        let _ = writeln!(
            out,
            "WALLET_ADDRESS={}",
            self.wallet_address.as_deref().unwrap_or_default()
        );
        let _ = writeln!(out, "WALLET_PATH={}", self.wallet_path.display());
        out
    }

    /// Parse a credential file; `None` when the wallet name is missing.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut creds = Self::default();
        let mut has_name = false;
        for line in text.lines().map(str::trim) {
            if line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match key.trim() {
                "WALLET_NAME" if !value.is_empty() => {
                    creds.wallet_name = value.to_string();
                    has_name = true;
                }
                "WALLET_ADDRESS" if !value.is_empty() => {
                    creds.wallet_address = Some(value.to_string());
                }
                "WALLET_PATH" => creds.wallet_path = PathBuf::from(value),
                _ => {}
            }
        }
        has_name.then_some(creds)
    }
}
