//! Platform-specific locations for test plans.
//!
//! - **User config**: `~/.config/thdmeter/` (Linux), `~/Library/Application Support/thdmeter/` (macOS), `%APPDATA%\thdmeter\` (Windows)
//! - **User plans**: the `plans/` subdirectory of the user config directory
//!
//! ```rust,no_run
//! use thdmeter_config::paths;
//!
//! if let Some(path) = paths::find_plan("loopback") {
//!     println!("Found plan at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "thdmeter";

/// Subdirectory name for saved plans.
const PLANS_SUBDIR: &str = "plans";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the directory saved plans live in.
pub fn user_plans_dir() -> PathBuf {
    user_config_dir().join(PLANS_SUBDIR)
}

/// Find a plan file by path or name.
///
/// An existing file path is returned as-is. Otherwise `name` (with `.toml`
/// appended if missing) is looked up in the user plans directory.
pub fn find_plan(name: &str) -> Option<PathBuf> {
    find_plan_in(name, &user_plans_dir())
}

fn find_plan_in(name: &str, dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Ensure the user plans directory exists and return it.
pub fn ensure_user_plans_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_plans_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

/// List plan files in the user plans directory, sorted by path.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_plans() -> Vec<PathBuf> {
    list_plans_in_dir(&user_plans_dir())
}

fn list_plans_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut plans: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    plans.sort();
    plans
}

/// Plan name from a file path (the file stem).
///
/// ```rust
/// use thdmeter_config::paths::plan_name_from_path;
/// use std::path::Path;
///
/// let name = plan_name_from_path(Path::new("/plans/loopback.toml"));
/// assert_eq!(name, Some("loopback".to_string()));
/// ```
pub fn plan_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}
