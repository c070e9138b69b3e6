//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "gridkit";
const APPLICATION: &str = "gridkit";

const LATEST_LOG: &str = "latest.log";

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 25;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Directory for persistent data.
///
/// - Linux: `$XDG_DATA_HOME/gridkit` or `~/.local/share/gridkit`
/// - macOS: `~/Library/Application Support/dev.gridkit.gridkit`
/// - Windows: `C:\Users\<User>\AppData\Roaming\gridkit\gridkit\data`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Directory for logs.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// The offline preset database.
pub fn presets_db() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("presets.db"))
}

/// Starts file logging in the cache directory, rotating the previous log.
///
/// Logging is best effort: without a cache directory the CLI runs silent.
pub fn init_logging(verbose: bool) {
    let Some(cache) = cache_dir() else { return };
    if fs::create_dir_all(&cache).is_err() {
        return;
    }
    rotate_logs(&cache);

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    if let Ok(file) = File::create(cache.join(LATEST_LOG)) {
        let _ = WriteLogger::init(level, Config::default(), file);
    }
}

/// Renames latest.log to a timestamped name and prunes old logs.
fn rotate_logs(cache: &Path) {
    let latest = cache.join(LATEST_LOG);

    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let archived = cache.join(format!("{}.log", timestamp));
        let _ = fs::rename(&latest, &archived);
    }

    cleanup_old_logs(cache, MAX_OLD_LOGS);
}

/// Removes the oldest archived logs beyond `keep`.
fn cleanup_old_logs(cache: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(cache) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .collect();

    // Oldest first
    logs.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());

    if logs.len() > keep {
        for entry in logs.iter().take(logs.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }
    }
}
