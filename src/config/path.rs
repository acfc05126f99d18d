//! Module for searching for PadBus config files

use std::path::PathBuf;

/// Base system fallback path to use if one cannot be found with XDG
const FALLBACK_BASE_PATH: &str = "/usr/share/padbus";

/// Name of the bus config file
const CONFIG_FILE_NAME: &str = "bus.yaml";

/// Returns the base path for configuration data
pub fn get_base_path() -> PathBuf {
    let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("padbus") else {
        log::warn!("Unable to determine config base path. Using fallback path.");
        return PathBuf::from(FALLBACK_BASE_PATH);
    };

    // Get the data directories in preference order
    let data_dirs = base_dirs.get_data_dirs();
    for dir in data_dirs {
        if dir.exists() {
            return dir;
        }
    }

    log::warn!("Config base path not found. Using fallback path.");
    PathBuf::from(FALLBACK_BASE_PATH)
}

/// Returns a list of config file paths in load order.
/// E.g. ["./rootfs/usr/share/padbus/bus.yaml", "/etc/padbus/bus.yaml", "/usr/share/padbus/bus.yaml"]
pub fn get_config_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("./rootfs/usr/share/padbus").join(CONFIG_FILE_NAME),
        PathBuf::from("/etc/padbus").join(CONFIG_FILE_NAME),
        get_base_path().join(CONFIG_FILE_NAME),
    ]
}
