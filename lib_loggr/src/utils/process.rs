use std::env;
use std::path::{Path, PathBuf};

/// Directory name used under the executable's location when no root is configured.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// # Get Process Location
///
/// Returns the directory that contains the running executable, or `None` when
/// the platform cannot report it.
pub fn get_process_location() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe_path| exe_path.parent().map(Path::to_path_buf))
}

/// Default log root: `<executable dir>/logs`, or `./logs` if the executable
/// location is unknown.
pub fn default_log_root() -> PathBuf {
    get_process_location()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_LOG_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_root_ends_with_logs() {
        assert!(default_log_root().ends_with(DEFAULT_LOG_DIR));
    }
}
