//! XDG path discovery for config and log files

use std::path::PathBuf;

const APP_DIR: &str = "docqa";

/// Discover the client log file with a fallback chain
///
/// Priority:
/// 1. $DOCQA_LOG_FILE (explicit override)
/// 2. $XDG_STATE_HOME/docqa/docqactl.log
/// 3. ~/.local/state/docqa/docqactl.log
pub fn discover_log_path() -> Option<PathBuf> {
    log_path_from(|key| std::env::var(key).ok())
}

pub fn log_path_from(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(path) = lookup("DOCQA_LOG_FILE") {
        return Some(PathBuf::from(path));
    }

    if let Some(state) = lookup("XDG_STATE_HOME") {
        return Some(PathBuf::from(state).join(APP_DIR).join("docqactl.log"));
    }

    lookup("HOME").map(|home| {
        PathBuf::from(home)
            .join(".local")
            .join("state")
            .join(APP_DIR)
            .join("docqactl.log")
    })
}

/// ~/.config/docqa/config.toml
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// /etc/docqa/config.toml
pub fn system_config_path() -> PathBuf {
    PathBuf::from("/etc").join(APP_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_explicit_override_wins() {
        let vars = env(&[
            ("DOCQA_LOG_FILE", "/tmp/custom.log"),
            ("XDG_STATE_HOME", "/state"),
            ("HOME", "/home/u"),
        ]);
        let path = log_path_from(|k| vars.get(k).cloned());
        assert_eq!(path, Some(PathBuf::from("/tmp/custom.log")));
    }

    #[test]
    fn test_xdg_state_then_home() {
        let vars = env(&[("XDG_STATE_HOME", "/state"), ("HOME", "/home/u")]);
        assert_eq!(
            log_path_from(|k| vars.get(k).cloned()),
            Some(PathBuf::from("/state/docqa/docqactl.log"))
        );

        let vars = env(&[("HOME", "/home/u")]);
        assert_eq!(
            log_path_from(|k| vars.get(k).cloned()),
            Some(PathBuf::from("/home/u/.local/state/docqa/docqactl.log"))
        );
    }

    #[test]
    fn test_no_environment() {
        assert_eq!(log_path_from(|_| None), None);
    }
}
