// src/infra/paths.rs - Config file location
//
// KUBO_HOME overrides everything. Otherwise config lives in ~/.kubo/.

use std::path::PathBuf;

/// Returns the KUBO_HOME override, if set.
fn kubo_home() -> Option<PathBuf> {
    std::env::var_os("KUBO_HOME").map(PathBuf::from)
}

/// Home directory, or the current directory when none can be determined.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $KUBO_HOME/ or ~/.kubo/
pub fn config_dir() -> PathBuf {
    if let Some(home) = kubo_home() {
        return home;
    }
    dirs_home().join(".kubo")
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_is_toml_in_config_dir() {
        let path = config_file_path();
        assert_eq!(path.file_name().unwrap(), "config.toml");
        assert_eq!(path.parent().unwrap(), config_dir());
    }
}
