//! Heuristic tables and scan settings.
//!
//! Every table has a built-in default; a TOML file may override any subset.
//! Lists are normalized (trimmed, lower-cased) by the components that consume them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::roots::KnownRoots;

pub const DEFAULT_MIN_SAVE_FILES: usize = 3;
pub const DEFAULT_MAX_DEPTH: usize = 32;

fn strings(items: &[&str]) -> Vec<String> { items.iter().map(|s| s.to_string()).collect() }

/// Per-file rules used by [`crate::classify::SaveFileClassifier`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SaveFileRules {
    pub save_extensions: Vec<String>,
    pub excluded_extensions: Vec<String>,
    pub excluded_keywords: Vec<String>,
    pub save_keywords: Vec<String>,
}

impl Default for SaveFileRules {
    fn default() -> Self {
        Self {
            save_extensions: strings(&[
                ".sav", ".save", ".dat", ".json", ".xml", ".cfg", ".ini", ".profile", ".plr",
                ".wld", ".ess", ".skse", ".fos",
            ]),
            excluded_extensions: strings(&[
                ".exe", ".dll", ".msi", ".bat", ".cmd", ".ps1", ".sh", ".txt", ".md", ".html",
                ".css", ".js", ".py", ".cpp", ".h", ".png", ".jpg", ".jpeg", ".gif", ".bmp",
                ".ico", ".svg", ".mp3", ".wav", ".ogg", ".mp4", ".avi", ".mkv", ".zip", ".rar",
            ]),
            excluded_keywords: strings(&[
                "log", "cache", "temp", "crash", "error", "debug", "config", "settings",
                "preferences", "install", "uninstall", "update", "readme", "license",
                "changelog", "version", "manifest",
            ]),
            save_keywords: strings(&[
                "save", "profile", "user", "player", "game", "world", "character", "progress",
                "slot", "checkpoint",
            ]),
        }
    }
}

/// Per-folder rules used by [`crate::estimate::GameLikelihoodEstimator`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub excluded_apps: Vec<String>,
    /// Titles whose progress lives server-side.
    pub excluded_online_games: Vec<String>,
    pub gaming_platforms: Vec<String>,
    pub game_indicators: Vec<String>,
    pub strong_indicators: Vec<String>,
    pub min_save_files: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            excluded_apps: strings(&[
                "npm", "code", "discord", "mozilla", "opera software", "google", "microsoft",
                "atom", "jetbrains", "docker", "kiro", "obsidian", "balenaetcher", "burpsuite",
                "handbrake", "vlc", "winrar", "zoom", "qbittorrent", "qutebrowser",
                "ledger live", "webull desktop", "packages", "programs", "temp", "cache",
                "crashdumps", "pip", "speech", "virtualstore", "intermediate", "saved",
                "publishers", "install4j", "cef", "base", "battlEye", "crashreportclient",
                "discovery", "overwolf", "mod.io", "unisdk_firstopen",
                "ledger-live-desktop-updater", "lorenz_cuno_klopfenstein", "ow-electron",
                "electron-hello-world", "com.seelen.seelen-ui", "nomic.ai", "voicemeeter",
                "aimp", "cherryaudio", "nnaudio", "melkaj", "maize sampler player",
                "fullbucketmusic", "famistudio", "wbcache", "xfer", "image-line",
                "nvidia corporation", "nvidia",
            ]),
            excluded_online_games: strings(&[
                "roblox", "black desert", "world of warcraft", "final fantasy xiv",
                "guild wars 2", "elder scrolls online", "destiny 2", "apex legends", "fortnite",
                "valorant", "overwatch", "league of legends", "dota 2", "counter-strike", "cs2",
                "csgo", "pubg", "call of duty", "warzone", "lost ark", "new world",
                "albion online", "eve online", "warframe", "path of exile", "diablo immortal",
                "hearthstone", "heroes of the storm", "starcraft ii", "world of tanks",
                "war thunder", "rocket league online", "fall guys", "among us",
                "dead by daylight", "sea of thieves", "rust", "ark survival evolved online",
                "conan exiles online", "minecraft realms", "terraria multiplayer",
            ]),
            gaming_platforms: strings(&[
                "steam", "epic games", "epicgameslauncher", "battle.net", "blizzard",
                "riot games", "valorant", "riot-client-ux", "ubisoft", "origin", "gog",
                "bethesda", "rockstar", "activision",
            ]),
            game_indicators: strings(&[
                "game", "simulator", "quest", "world", "craft", "wars", "legends", "online",
                "rpg", "mmo", "adventure", "fantasy", "racing", "sports", "strategy", "action",
                "shooter", "puzzle", "arcade", "indie", "emulator", "launcher",
            ]),
            strong_indicators: strings(&[
                "save", "profile", "player", "character", "world", "level", "progress",
                "checkpoint", "slot", "game",
            ]),
            min_save_files: DEFAULT_MIN_SAVE_FILES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scan_locations: Vec<PathBuf>,
    pub save_folder_names: Vec<String>,
    /// Depth guard for every directory walk.
    pub max_depth: usize,
    pub save_files: SaveFileRules,
    pub games: GameRules,
    /// Extra known locations, merged into the built-in pattern table.
    pub patterns: BTreeMap<String, Vec<PathBuf>>,
    pub backup_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self { Self::for_roots(&KnownRoots::from_env()) }
}

impl ScanConfig {
    pub fn for_roots(roots: &KnownRoots) -> Self {
        Self {
            scan_locations: vec![
                roots.my_games(),
                roots.documents(),
                roots.appdata.clone(),
                roots.local_appdata.clone(),
                roots.local_appdata.join("Steam"),
                roots.local_appdata.join("EpicGamesLauncher"),
            ],
            save_folder_names: strings(&[
                "saves", "savegames", "profiles", "user", "data", "savedata", "saved games",
            ]),
            max_depth: DEFAULT_MAX_DEPTH,
            save_files: SaveFileRules::default(),
            games: GameRules::default(),
            patterns: BTreeMap::new(),
            backup_dir: PathBuf::from("loaded saves"),
            logs_dir: PathBuf::from("logs"),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> { toml::from_str(text) }

    /// Creates the backup and log directories if missing.
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        for dir in [&self.backup_dir, &self.logs_dir] {
            fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
