// DevOps Gateway - Path Resolution
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Single source of truth for home and config directory resolution.
// Cached via OnceLock.
//
// SECURITY NOTE: allow-list prefixes are built from home_dir() here but
// ENFORCED in gate.rs.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static HOME_CACHE: OnceLock<PathBuf> = OnceLock::new();

const APP_DIR: &str = "devops-gateway";

/// User home directory.
///
/// Resolution order:
///   1. HOME environment variable
///   2. USERPROFILE (Windows)
///   3. Filesystem root
pub fn home_dir() -> &'static Path {
    HOME_CACHE.get_or_init(|| {
        for var in ["HOME", "USERPROFILE"] {
            if let Ok(home) = std::env::var(var) {
                if !home.is_empty() {
                    return PathBuf::from(home);
                }
            }
        }
        log::warn!("HOME not set, falling back to /");
        PathBuf::from("/")
    })
}

/// Config directory: $XDG_CONFIG_HOME/devops-gateway or ~/.config/devops-gateway
pub fn config_dir() -> PathBuf {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
        _ => home_dir().join(".config").join(APP_DIR),
    }
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Home-relative path rendered as an allow-list prefix (always ends in '/')
pub fn home_prefix(relative: &str) -> String {
    let home = home_dir().to_string_lossy();
    let home = home.trim_end_matches('/');
    if relative.is_empty() {
        format!("{}/", home)
    } else {
        format!("{}/{}/", home, relative.trim_matches('/'))
    }
}

/// Expand a leading `~` to the home directory. Anything else is returned as-is.
pub fn expand_tilde(path: &str) -> String {
    expand_tilde_with(path, home_dir())
}

fn expand_tilde_with(path: &str, home: &Path) -> String {
    let home = home.to_string_lossy();
    let home = home.trim_end_matches('/');
    if path == "~" {
        home.to_string()
    } else if let Some(rest) = path.strip_prefix("~/") {
        format!("{}/{}", home, rest)
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expansion() {
        let home = Path::new("/home/ops");
        assert_eq!(expand_tilde_with("~", home), "/home/ops");
        assert_eq!(expand_tilde_with("~/a.txt", home), "/home/ops/a.txt");
        assert_eq!(expand_tilde_with("~other/a.txt", home), "~other/a.txt");
        assert_eq!(expand_tilde_with("/etc/passwd", home), "/etc/passwd");
    }

    #[test]
    fn home_prefix_has_trailing_slash() {
        assert!(home_prefix("").ends_with('/'));
        assert!(home_prefix("projects").ends_with("/projects/"));
        assert!(home_prefix("/Documents/").ends_with("/Documents/"));
    }
}
