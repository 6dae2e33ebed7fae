//! Config path resolution helpers.

use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_FILE: &str = "fabdeploy.toml";
pub const SETTINGS_FILE: &str = "settings.toml";

pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}

/// `<config dir>/fabdeploy/settings.toml`, if a config dir exists.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fabdeploy").join(SETTINGS_FILE))
}
