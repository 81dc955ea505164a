//! Two-phase save discovery.
//!
//! Phase one resolves every known pattern. Phase two walks the immediate children
//! of each scan root and keeps the ones the estimator believes are games. Known
//! entries are recorded first and are never overwritten.
//!
//! Symlinks are followed so relocated save folders are still found; walkdir reports
//! link loops as errors, which are logged and skipped like any unreadable entry.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::classify::{SaveFileClassifier, lower_name, normalize};
use crate::config::ScanConfig;
use crate::estimate::GameLikelihoodEstimator;
use crate::patterns::PatternDatabase;
use crate::roots::exists_on_disk;

/// Game name to the save files attributed to it.
pub type SaveMap = BTreeMap<String, Vec<PathBuf>>;

/// Cooperative stop flag shared with in-flight walks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }

    pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed) }

    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }
}

pub struct ScanOrchestrator {
    patterns: PatternDatabase,
    classifier: SaveFileClassifier,
    estimator: GameLikelihoodEstimator,
    scan_locations: Vec<PathBuf>,
    save_folder_names: Vec<String>,
    max_depth: usize,
    cancel: CancelToken,
}

impl ScanOrchestrator {
    pub fn new(config: &ScanConfig, patterns: PatternDatabase) -> Self {
        Self {
            patterns,
            classifier: SaveFileClassifier::new(&config.save_files),
            estimator: GameLikelihoodEstimator::new(&config.games),
            scan_locations: config.scan_locations.clone(),
            save_folder_names: normalize(&config.save_folder_names),
            max_depth: config.max_depth.max(1),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn classifier(&self) -> &SaveFileClassifier { &self.classifier }

    pub fn estimator(&self) -> &GameLikelihoodEstimator { &self.estimator }

    pub fn patterns(&self) -> &PatternDatabase { &self.patterns }

    /// Runs both phases. `game_filter` is a case-insensitive substring on game names.
    pub fn scan_for_saves(&self, game_filter: Option<&str>) -> SaveMap {
        let filter = game_filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());
        let mut found = SaveMap::new();

        tracing::debug!("scanning {} known game locations", self.patterns.len());
        let known: Vec<(String, Vec<PathBuf>)> = self
            .patterns
            .get_all_patterns()
            .par_iter()
            .filter(|(name, _)| passes_filter(name, filter.as_deref()))
            .map(|(name, paths)| (name.clone(), self.scan_known_game(paths)))
            .collect();
        if self.cancel.is_cancelled() {
            tracing::warn!("scan cancelled");
            return found;
        }
        for (name, files) in known {
            if files.is_empty() {
                continue;
            }
            tracing::debug!("found {} saves for {}", files.len(), name);
            found.insert(name, files);
        }

        tracing::debug!("scanning {} common save locations", self.scan_locations.len());
        for root in &self.scan_locations {
            if self.cancel.is_cancelled() {
                tracing::warn!("scan cancelled");
                break;
            }
            if !exists_on_disk(root) {
                continue;
            }
            for (name, files) in self.scan_for_unknown_games(root, &found, filter.as_deref()) {
                found.entry(name).or_insert(files);
            }
        }
        found
    }

    fn scan_known_game(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for p in paths.iter().filter(|p| exists_on_disk(p)) {
            files.extend(self.collect_save_files(p));
        }
        dedup_paths(files)
    }

    /// Immediate children of `base` that look like unrecognized games.
    fn scan_for_unknown_games(
        &self,
        base: &Path,
        known: &SaveMap,
        filter: Option<&str>,
    ) -> Vec<(String, Vec<PathBuf>)> {
        let entries = match std::fs::read_dir(base) {
            Ok(rd) => rd,
            Err(e) => {
                tracing::warn!("cannot access {}: {}", base.display(), e);
                return Vec::new();
            }
        };
        let known_lower: Vec<String> = known.keys().map(|k| k.to_lowercase()).collect();

        let children: Vec<(String, PathBuf)> = entries
            .filter_map(|e| match e {
                Ok(e) => Some(e),
                Err(e) => {
                    tracing::warn!("cannot read entry in {}: {}", base.display(), e);
                    None
                }
            })
            .filter(|e| e.path().is_dir())
            .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
            .collect();

        let mut out: Vec<(String, Vec<PathBuf>)> = children
            .par_iter()
            .filter_map(|(name, dir)| {
                let lower = name.to_lowercase();
                if !passes_filter(name, filter) {
                    return None;
                }
                if known_lower.iter().any(|k| lower.contains(k.as_str())) {
                    return None;
                }
                if self.estimator.is_excluded_app(name) {
                    tracing::trace!("skipping excluded app {}", name);
                    return None;
                }
                let candidates = self.collect_candidates(dir);
                // a cut-short walk is not evidence either way
                if self.cancel.is_cancelled() {
                    return None;
                }
                if !self.estimator.is_likely_game(name, &candidates) {
                    return None;
                }
                tracing::debug!("found {} potential saves for {}", candidates.len(), name);
                Some((name.clone(), candidates))
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Save-like files under an unknown folder. Save-named subfolders get their own depth budget.
    fn collect_candidates(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut save_dirs = Vec::new();
        let mut walker = WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(self.max_depth)
            .into_iter();
        while let Some(entry) = walker.next() {
            if self.cancel.is_cancelled() {
                break;
            }
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("cannot access {}: {}", walk_error_path(&e, dir).display(), e);
                    continue;
                }
            };
            let ft = entry.file_type();
            if ft.is_dir() {
                if self.is_save_folder(entry.path()) {
                    save_dirs.push(entry.into_path());
                    walker.skip_current_dir();
                }
            } else if ft.is_file() && self.classifier.is_likely_save_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        for d in save_dirs {
            files.extend(self.collect_save_files(&d));
        }
        dedup_paths(files)
    }

    fn collect_save_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).max_depth(self.max_depth) {
            if self.cancel.is_cancelled() {
                break;
            }
            match entry {
                Ok(e) if e.file_type().is_file() && self.classifier.is_likely_save_file(e.path()) => {
                    files.push(e.into_path())
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("cannot access {}: {}", walk_error_path(&e, dir).display(), e)
                }
            }
        }
        files
    }

    fn is_save_folder(&self, dir: &Path) -> bool {
        lower_name(dir).is_some_and(|n| self.save_folder_names.iter().any(|s| n.contains(s.as_str())))
    }
}

fn passes_filter(name: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|f| name.to_lowercase().contains(f))
}

fn walk_error_path<'a>(e: &'a walkdir::Error, fallback: &'a Path) -> &'a Path {
    e.path().unwrap_or(fallback)
}

/// Drops repeated paths, keeping first-seen order.
fn dedup_paths(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(files.len());
    files.into_iter().filter(|p| seen.insert(p.clone())).collect()
}
