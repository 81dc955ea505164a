//! Verdicts on unrecognized top-level application folders.
//!
//! All matching is over lower-cased, trimmed strings. Exclusion uses containment in
//! both directions, so `nvidia` is excluded by `nvidia corporation` and
//! `Rust` by the online title `rust`.

use std::path::{Path, PathBuf};

use crate::classify::{lower_name, normalize};
use crate::config::GameRules;

fn matches_either_way(name: &str, term: &str) -> bool {
    name == term || name.contains(term) || term.contains(name)
}

#[derive(Debug, Clone)]
pub struct GameLikelihoodEstimator {
    excluded_apps: Vec<String>,
    excluded_online_games: Vec<String>,
    gaming_platforms: Vec<String>,
    game_indicators: Vec<String>,
    strong_indicators: Vec<String>,
    min_save_files: usize,
}

impl Default for GameLikelihoodEstimator {
    fn default() -> Self { Self::new(&GameRules::default()) }
}

impl GameLikelihoodEstimator {
    pub fn new(rules: &GameRules) -> Self {
        Self {
            excluded_apps: normalize(&rules.excluded_apps),
            excluded_online_games: normalize(&rules.excluded_online_games),
            gaming_platforms: normalize(&rules.gaming_platforms),
            game_indicators: normalize(&rules.game_indicators),
            strong_indicators: normalize(&rules.strong_indicators),
            min_save_files: rules.min_save_files,
        }
    }

    pub fn min_save_files(&self) -> usize { self.min_save_files }

    /// True for known non-game software and server-authoritative games.
    pub fn is_excluded_app(&self, folder_name: &str) -> bool {
        let name = folder_name.trim().to_lowercase();
        if name.is_empty() {
            return false;
        }
        self.excluded_apps
            .iter()
            .chain(&self.excluded_online_games)
            .any(|term| matches_either_way(&name, term))
    }

    pub fn is_likely_game(&self, folder_name: &str, candidates: &[PathBuf]) -> bool {
        let name = folder_name.trim().to_lowercase();
        if name.is_empty() {
            return false;
        }
        // launcher folders are always kept
        if self.gaming_platforms.iter().any(|p| name.contains(p.as_str())) {
            return true;
        }
        if candidates.len() < self.min_save_files {
            return false;
        }
        if self.game_indicators.iter().any(|k| name.contains(k.as_str())) {
            return true;
        }
        candidates
            .iter()
            .filter(|f| self.has_strong_save_indicator(f))
            .take(2)
            .count()
            >= 2
    }

    /// Keyword hit on the file name or on any ancestor directory name.
    pub fn has_strong_save_indicator(&self, file: &Path) -> bool {
        file.ancestors().any(|p| {
            lower_name(p).is_some_and(|n| self.strong_indicators.iter().any(|k| n.contains(k.as_str())))
        })
    }
}
