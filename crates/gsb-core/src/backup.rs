//! Copies discovered saves into timestamped per-game folders and writes a JSON run log.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::scan::SaveMap;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const SAVE_DIR_MARKERS: [&str; 5] = ["saves", "savegames", "profiles", "user", "data"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackedUpFile {
    pub original: PathBuf,
    pub backup: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameBackup {
    pub files: Vec<BackedUpFile>,
    pub count: usize,
    pub backup_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupLog {
    pub timestamp: String,
    pub games_backed_up: BTreeMap<String, GameBackup>,
    pub total_files: usize,
    pub total_bytes: u64,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub timestamp: String,
    pub path: PathBuf,
    pub file_count: usize,
}

pub struct BackupManager {
    backup_dir: PathBuf,
    logs_dir: PathBuf,
}

impl BackupManager {
    pub fn new(backup_dir: impl Into<PathBuf>, logs_dir: impl Into<PathBuf>) -> Self {
        Self { backup_dir: backup_dir.into(), logs_dir: logs_dir.into() }
    }

    pub fn backup_saves(&self, found: &SaveMap) -> BackupLog {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.backup_saves_at(found, &timestamp)
    }

    /// Same as [`Self::backup_saves`] with a caller-chosen run timestamp.
    pub fn backup_saves_at(&self, found: &SaveMap, timestamp: &str) -> BackupLog {
        let mut log = BackupLog { timestamp: timestamp.to_string(), ..Default::default() };

        for (game, files) in found {
            tracing::debug!("backing up {}", game);
            let game_dir = self.backup_dir.join(dir_safe_name(game)).join(timestamp);
            if let Err(e) = fs::create_dir_all(&game_dir) {
                let msg = format!("failed to create {}: {}", game_dir.display(), e);
                tracing::warn!("{}", msg);
                log.errors.push(msg);
                continue;
            }

            let mut copied = Vec::new();
            let mut taken = HashSet::new();
            for src in files {
                match copy_one(src, &game_dir, &mut taken) {
                    Ok(f) => {
                        tracing::trace!("copied {}", src.display());
                        copied.push(f);
                    }
                    Err(e) => {
                        let msg = format!("failed to backup {}: {}", src.display(), e);
                        tracing::warn!("{}", msg);
                        log.errors.push(msg);
                    }
                }
            }
            if copied.is_empty() {
                continue;
            }
            log.total_files += copied.len();
            log.total_bytes += copied.iter().map(|f| f.size).sum::<u64>();
            tracing::info!("backed up {} files for {}", copied.len(), game);
            log.games_backed_up.insert(
                game.clone(),
                GameBackup { count: copied.len(), files: copied, backup_dir: game_dir },
            );
        }

        match self.write_log(&log) {
            Ok(p) => tracing::debug!("backup log saved to {}", p.display()),
            Err(e) => tracing::warn!("could not save backup log: {}", e),
        }
        log
    }

    fn write_log(&self, log: &BackupLog) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.logs_dir)?;
        let path = self.logs_dir.join(format!("backup_{}.json", log.timestamp));
        let file = fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, log).map_err(io::Error::other)?;
        Ok(path)
    }

    /// Run logs found in the logs folder, newest first. Unreadable files are skipped.
    pub fn list_logs(&self) -> Vec<(String, BackupLog)> {
        let Ok(rd) = fs::read_dir(&self.logs_dir) else {
            return Vec::new();
        };
        let mut logs: Vec<(String, BackupLog)> = rd
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")))
            .filter_map(|p| {
                let name = p.file_name()?.to_string_lossy().into_owned();
                let parsed = fs::read_to_string(&p)
                    .map_err(|e| e.to_string())
                    .and_then(|text| serde_json::from_str::<BackupLog>(&text).map_err(|e| e.to_string()));
                match parsed {
                    Ok(log) => Some((name, log)),
                    Err(e) => {
                        tracing::warn!("skipping log {}: {}", p.display(), e);
                        None
                    }
                }
            })
            .collect();
        logs.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp).then_with(|| b.0.cmp(&a.0)));
        logs
    }

    /// Existing backups per game, newest first.
    pub fn list_backups(&self, game_filter: Option<&str>) -> BTreeMap<String, Vec<BackupEntry>> {
        let mut out = BTreeMap::new();
        let filter = game_filter.map(str::to_lowercase);
        let Ok(rd) = fs::read_dir(&self.backup_dir) else {
            return out;
        };
        for game_dir in rd.flatten().map(|e| e.path()).filter(|p| p.is_dir()) {
            let name = game_dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            if filter.as_deref().is_some_and(|f| !name.to_lowercase().contains(f)) {
                continue;
            }
            let Ok(runs) = fs::read_dir(&game_dir) else {
                continue;
            };
            let mut entries: Vec<BackupEntry> = runs
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .map(|p| BackupEntry {
                    timestamp: p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
                    file_count: count_files(&p),
                    path: p,
                })
                .collect();
            if entries.is_empty() {
                continue;
            }
            entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            out.insert(name, entries);
        }
        out
    }
}

fn copy_one(src: &Path, game_dir: &Path, taken: &mut HashSet<PathBuf>) -> io::Result<BackedUpFile> {
    let dest = game_dir.join(relative_save_path(src));
    if taken.contains(&dest) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already written by another save in this run", dest.display()),
        ));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let meta = fs::metadata(src)?;
    let size = fs::copy(src, &dest)?;
    let mut times = fs::FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    fs::OpenOptions::new().write(true).open(&dest)?.set_times(times)?;
    taken.insert(dest.clone());
    Ok(BackedUpFile { original: src.to_path_buf(), backup: dest, size })
}

/// Destination path of a save inside its game's backup folder.
///
/// Starts at the first save-style directory if there is one, else keeps the last
/// three components, else just the file name.
pub fn relative_save_path(path: &Path) -> PathBuf {
    let parts: Vec<&std::ffi::OsStr> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s),
            _ => None,
        })
        .collect();
    if let Some(i) = parts
        .iter()
        .position(|p| SAVE_DIR_MARKERS.contains(&p.to_string_lossy().to_lowercase().as_str()))
    {
        return parts[i..].iter().collect();
    }
    if parts.len() >= 3 {
        return parts[parts.len() - 3..].iter().collect();
    }
    path.file_name().map(PathBuf::from).unwrap_or_default()
}

fn dir_safe_name(game: &str) -> String {
    game.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect()
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir).into_iter().flatten().filter(|e| e.file_type().is_file()).count()
}

/// Zips a backup run directory next to itself as `<dir>.zip`.
pub fn archive_backup(dir: &Path) -> io::Result<PathBuf> {
    if !dir.is_dir() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a directory"));
    }
    let name = dir.file_name().and_then(|s| s.to_str()).unwrap_or("backup");
    let dest = dir.with_file_name(format!("{}.zip", name));

    let file = fs::File::create(&dest)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| io::Error::other(e.to_string()))?;
        let path = entry.path();
        let rel = path.strip_prefix(dir).map_err(io::Error::other)?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let name = rel.to_string_lossy().replace('\\', "/");
        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            zip.write_all(&fs::read(path)?)?;
        }
    }
    zip.finish()?;
    Ok(dest)
}
