//! gsb-core: locating PC game saves and backing them up
//!
//! This crate focuses on a small surface:
//! - A table of known save locations per game (environment-relative)
//! - Per-file save heuristics and per-folder "is this a game" heuristics
//! - A two-phase scanner merging both into one game → files map
//! - Timestamped copy backups with a JSON run log, and zip archives of a run
//!
pub mod backup;
pub mod classify;
pub mod config;
pub mod error;
pub mod estimate;
pub mod patterns;
pub mod roots;
pub mod scan;

pub use backup::{BackupEntry, BackupLog, BackupManager, archive_backup, relative_save_path};
pub use classify::SaveFileClassifier;
pub use config::{GameRules, SaveFileRules, ScanConfig};
pub use error::ConfigError;
pub use estimate::GameLikelihoodEstimator;
pub use patterns::PatternDatabase;
pub use roots::KnownRoots;
pub use scan::{CancelToken, SaveMap, ScanOrchestrator};

/// Builds an orchestrator from a config: built-in patterns plus the configured extras.
pub fn orchestrator_for(config: &ScanConfig, roots: &KnownRoots) -> ScanOrchestrator {
    let patterns = PatternDatabase::new(roots).with_extra(&config.patterns);
    ScanOrchestrator::new(config, patterns)
}
