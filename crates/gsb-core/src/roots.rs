use std::env;
use std::path::{Path, PathBuf};

/// Per-user roots that known save locations hang off.
///
/// Resolved once from the environment. A missing variable yields an empty
/// path, and anything joined under it is relative and therefore never scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownRoots {
    pub user_profile: PathBuf,
    pub appdata: PathBuf,
    pub local_appdata: PathBuf,
}

impl KnownRoots {
    pub fn new(
        user_profile: impl Into<PathBuf>,
        appdata: impl Into<PathBuf>,
        local_appdata: impl Into<PathBuf>,
    ) -> Self {
        Self {
            user_profile: user_profile.into(),
            appdata: appdata.into(),
            local_appdata: local_appdata.into(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            user_profile: env_path("USERPROFILE"),
            appdata: env_path("APPDATA"),
            local_appdata: env_path("LOCALAPPDATA"),
        }
    }

    pub fn documents(&self) -> PathBuf { self.user_profile.join("Documents") }

    pub fn my_games(&self) -> PathBuf { self.documents().join("My Games") }
}

fn env_path(var: &str) -> PathBuf {
    env::var_os(var).map(PathBuf::from).unwrap_or_default()
}

// Relative paths come from unresolved roots; they must not fall back to the cwd.
pub fn exists_on_disk(p: &Path) -> bool { p.is_absolute() && p.exists() }
