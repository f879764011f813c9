use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the user home directory (no platform {0})")]
    NoHome(&'static str),
    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to create home directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(target_os = "windows")]
fn platform_home() -> Result<PathBuf, HomeDirError> {
    dirs::data_dir().ok_or(HomeDirError::NoHome("data directory"))
}

#[cfg(not(target_os = "windows"))]
fn platform_home() -> Result<PathBuf, HomeDirError> {
    dirs::home_dir().ok_or(HomeDirError::NoHome("home directory"))
}

/// Expand a leading `~` against the platform home directory.
fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

fn absolutize(p: &Path) -> Result<PathBuf, HomeDirError> {
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    let cwd = env::current_dir().map_err(HomeDirError::CurrentDir)?;
    Ok(cwd.join(p))
}

/// Resolve the application home directory.
///
/// - `Some(path)`: `~` is expanded, relative paths are joined onto the cwd.
/// - `None`: `<platform home>/<default_subdir>` (home dir on Unix, roaming app data on Windows).
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let resolved = match configured {
        Some(raw) => absolutize(&expand_tilde(raw.trim())?)?,
        None => platform_home()?.join(default_subdir),
    };

    if create {
        std::fs::create_dir_all(&resolved).map_err(|source| HomeDirError::Create {
            path: resolved.clone(),
            source,
        })?;
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested/home");
        let resolved = resolve_home_dir(
            Some(target.to_string_lossy().to_string()),
            ".unused",
            true,
        )
        .unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let resolved = resolve_home_dir(Some("some/relative".into()), ".unused", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/relative"));
    }

    #[test]
    fn tilde_and_default_follow_platform_home() {
        let Some(home) = platform_home().ok() else {
            return;
        };
        let tilde = resolve_home_dir(Some("~/.profile-cli-test".into()), ".unused", false).unwrap();
        assert_eq!(tilde, home.join(".profile-cli-test"));

        let default = resolve_home_dir(None, ".profile-cli-default", false).unwrap();
        assert_eq!(default, home.join(".profile-cli-default"));
    }
}
