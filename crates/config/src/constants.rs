//! Fixed locations and environment variable names
//!
//! These are not part of the TOML file; the file itself is found through them.

pub const CONFIG_PATH: &str = "/etc/nodectl/config.toml";
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

pub const ENV_CONFIG: &str = "NODECTL_CONFIG";
pub const ENV_VERSION: &str = "NODECTL_VERSION";
pub const ENV_BUILD_JOBS: &str = "NODECTL_BUILD_JOBS";
pub const ENV_BIN_DIR: &str = "NODECTL_BIN_DIR";
pub const ENV_LOG_DIR: &str = "NODECTL_LOG_DIR";
pub const ENV_DEBUG: &str = "NODECTL_DEBUG";

/// Requested version that triggers a remote release lookup.
pub const LATEST: &str = "latest";

/// Distribution id and `VERSION_ID` pairs the installer supports.
pub const SUPPORTED_DISTROS: &[(&str, &str)] =
    &[("ubuntu", "22.04"), ("ubuntu", "24.04"), ("debian", "12")];

/// Lines of captured command output shown with a step failure.
pub const LOG_EXCERPT_LINES: usize = 25;
