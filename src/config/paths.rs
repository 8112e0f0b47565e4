//! Where mcpilot looks for its config file
//!
//! `MCPILOT_CONFIG` names the file outright. Otherwise the config directory
//! (`MCPILOT_CONFIG_DIR`, else `<platform config dir>/mcpilot`) is searched
//! for `config.json` then `config.toml`.

use std::path::{Path, PathBuf};

/// Candidate file names, in lookup order
const CONFIG_FILE_NAMES: [&str; 2] = ["config.json", "config.toml"];

/// Directory holding mcpilot's config file
pub fn config_dir() -> PathBuf {
    match std::env::var("MCPILOT_CONFIG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|d| d.join("mcpilot"))
            .unwrap_or_else(|| PathBuf::from(".mcpilot")),
    }
}

/// Config file to load (it may not exist yet)
pub fn config_path() -> PathBuf {
    locate_config(std::env::var("MCPILOT_CONFIG").ok(), &config_dir())
}

/// An explicit non-blank path wins; then the first existing candidate in
/// `dir`; then `dir/config.json` as the place a new file would go.
pub(crate) fn locate_config(explicit: Option<String>, dir: &Path) -> PathBuf {
    if let Some(path) = explicit.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }

    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| dir.join(CONFIG_FILE_NAMES[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();

        let path = locate_config(Some("/etc/mcpilot.toml".to_string()), dir.path());
        assert_eq!(path, PathBuf::from("/etc/mcpilot.toml"));
    }

    #[test]
    fn test_toml_used_when_json_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();

        assert_eq!(locate_config(None, dir.path()), dir.path().join("config.toml"));
        // Blank override is ignored
        assert_eq!(
            locate_config(Some("  ".to_string()), dir.path()),
            dir.path().join("config.toml")
        );
    }

    #[test]
    fn test_json_preferred_over_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();

        assert_eq!(locate_config(None, dir.path()), dir.path().join("config.json"));
    }

    #[test]
    fn test_defaults_to_json_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(locate_config(None, dir.path()), dir.path().join("config.json"));
    }
}
