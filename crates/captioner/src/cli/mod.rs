//! Command implementations.

pub mod caption;
pub mod config;
pub mod models;
pub mod serve;

use std::path::{Path, PathBuf};

use captioner_core::Config;

/// Load the config from `path` if given, otherwise from the default location.
///
/// An explicit path must exist; the default location falls back to defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))?,
        None => Config::load()?,
    };
    Ok(config)
}

/// The config file in effect: `path` if given, otherwise the default location.
pub fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf).unwrap_or_else(Config::default_path)
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9100\n\n[decoder]\nmax_length = 20\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.decoder.max_length, 20);
        assert_eq!(config.extractor.image_size, 224);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/captioner.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/captioner.toml"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[decoder]\nmax_length = 0\n").unwrap();

        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_config_path_prefers_explicit() {
        let explicit = Path::new("/etc/captioner.toml");
        assert_eq!(config_path(Some(explicit)), explicit);
        assert_eq!(config_path(None), Config::default_path());
    }

    #[test]
    fn test_expand_path_keeps_absolute() {
        assert_eq!(
            expand_path(Path::new("/srv/captioner.toml")),
            PathBuf::from("/srv/captioner.toml")
        );
    }
}
