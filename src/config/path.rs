//! Module for searching for hidtouch config files

use std::path::PathBuf;

/// Name of the configuration file looked up in the config directories
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Base system fallback path to use if one cannot be found with XDG
const FALLBACK_BASE_PATH: &str = "/etc/hidtouch";

/// Returns the path of the interpreter configuration file, if one exists.
/// The user's XDG config directories are searched first, then the system
/// fallback path.
pub fn get_config_path() -> Option<PathBuf> {
    match xdg::BaseDirectories::with_prefix("hidtouch") {
        Ok(base_dirs) => {
            if let Some(path) = base_dirs.find_config_file(CONFIG_FILE_NAME) {
                return Some(path);
            }
        }
        Err(e) => {
            log::warn!("Unable to determine config base path: {e}");
        }
    }

    let fallback = PathBuf::from(FALLBACK_BASE_PATH).join(CONFIG_FILE_NAME);
    if fallback.exists() {
        return Some(fallback);
    }

    log::debug!("No config file found. Using defaults.");
    None
}
