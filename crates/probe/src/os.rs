//! Operating system identity

use nodectl_config::constants::SUPPORTED_DISTROS;
use nodectl_types::OsInfo;
use std::collections::HashMap;

/// Parse `/etc/os-release` content into key/value pairs
#[must_use]
pub fn parse_os_release(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| {
            (
                key.trim().to_string(),
                value.trim().trim_matches('"').trim_matches('\'').to_string(),
            )
        })
        .collect()
}

/// Classify parsed os-release fields against the supported distro list
#[must_use]
pub fn classify_os(fields: &HashMap<String, String>) -> OsInfo {
    let id = fields.get("ID").map_or("", String::as_str);
    let version = fields.get("VERSION_ID").map_or("", String::as_str);
    let label = fields
        .get("PRETTY_NAME")
        .cloned()
        .unwrap_or_else(|| format!("{id} {version}").trim().to_string());

    OsInfo {
        is_supported_distro: SUPPORTED_DISTROS
            .iter()
            .any(|(distro, release)| *distro == id && *release == version),
        version_label: if label.is_empty() {
            "unknown".to_string()
        } else {
            label
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubuntu_jammy_is_supported() {
        let fields = parse_os_release(
            "NAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nID=ubuntu\nPRETTY_NAME=\"Ubuntu 22.04.4 LTS\"\n",
        );
        let info = classify_os(&fields);
        assert!(info.is_supported_distro);
        assert_eq!(info.version_label, "Ubuntu 22.04.4 LTS");
    }

    #[test]
    fn other_distros_are_not() {
        let info = classify_os(&parse_os_release("ID=fedora\nVERSION_ID=40\n"));
        assert!(!info.is_supported_distro);
        assert_eq!(info.version_label, "fedora 40");
        assert_eq!(classify_os(&HashMap::new()).version_label, "unknown");
    }
}
