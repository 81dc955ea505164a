use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use gsb_core::{BackupManager, KnownRoots, SaveMap, ScanConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gsb",
    about = "Find PC game save files and back them up",
    version
)]
struct Cli {
    /// TOML file overriding scan roots, heuristic tables and output folders
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,
    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Scan for saves without backing up
    Scan(GameArgs),
    /// Scan and copy saves into the backup folder
    Backup(BackupArgs),
    /// List existing backups
    List(GameArgs),
    /// Show past backup runs from the logs folder
    Logs,
    /// Print the known game save locations
    Patterns,
}

#[derive(ClapArgs, Debug, Default)]
struct GameArgs {
    /// Only games whose name contains this (case-insensitive)
    #[arg(long)]
    game: Option<String>,
}

#[derive(ClapArgs, Debug, Default)]
struct BackupArgs {
    /// Only games whose name contains this (case-insensitive)
    #[arg(long)]
    game: Option<String>,
    /// Also zip each game's backup folder
    #[arg(long, default_value_t = false)]
    zip: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let roots = KnownRoots::from_env();
    let config = load_config(cli.config.as_deref(), &roots)?;
    match cli.cmd.unwrap_or(Cmd::Backup(BackupArgs::default())) {
        Cmd::Scan(a) => {
            cmd_scan(&config, &roots, a.game.as_deref());
            Ok(())
        }
        Cmd::Backup(a) => cmd_backup(&config, &roots, a),
        Cmd::List(a) => {
            cmd_list(&config, a.game.as_deref());
            Ok(())
        }
        Cmd::Logs => {
            cmd_logs(&config);
            Ok(())
        }
        Cmd::Patterns => {
            cmd_patterns(&config, &roots);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(explicit: Option<&std::path::Path>, roots: &KnownRoots) -> Result<ScanConfig> {
    if let Some(p) = explicit {
        return ScanConfig::load(p).with_context(|| format!("loading {}", p.display()));
    }
    let user_file = directories::ProjectDirs::from("", "", "gsb")
        .map(|d| d.config_dir().join("config.toml"))
        .filter(|p| p.is_file());
    match user_file {
        Some(p) => {
            tracing::debug!("using config {}", p.display());
            ScanConfig::load(&p).with_context(|| format!("loading {}", p.display()))
        }
        None => Ok(ScanConfig::for_roots(roots)),
    }
}

fn scan(config: &ScanConfig, roots: &KnownRoots, game: Option<&str>) -> SaveMap {
    println!("Game Save Backup Utility");
    println!("{}", "=".repeat(40));
    println!("Scanning for game saves...");
    let found = gsb_core::orchestrator_for(config, roots).scan_for_saves(game);
    if found.is_empty() {
        println!("No game saves found.");
        return found;
    }
    println!("Found saves for {} games:", found.len());
    for (name, files) in &found {
        println!("  {}: {} save files", name, files.len());
    }
    found
}

fn cmd_scan(config: &ScanConfig, roots: &KnownRoots, game: Option<&str>) {
    if !scan(config, roots, game).is_empty() {
        println!("\nScan complete. Run `gsb backup` to back up saves.");
    }
}

fn cmd_backup(config: &ScanConfig, roots: &KnownRoots, args: BackupArgs) -> Result<()> {
    config.ensure_dirs().context("preparing output folders")?;
    let found = scan(config, roots, args.game.as_deref());
    if found.is_empty() {
        return Ok(());
    }
    println!("\nBacking up saves...");
    let manager = BackupManager::new(&config.backup_dir, &config.logs_dir);
    let log = manager.backup_saves(&found);
    if args.zip {
        for (game, b) in &log.games_backed_up {
            match gsb_core::archive_backup(&b.backup_dir) {
                Ok(p) => println!("  {} archived to {}", game, p.display()),
                Err(e) => eprintln!("  error archiving {}: {}", game, e),
            }
        }
    }
    for e in &log.errors {
        eprintln!("  Error: {}", e);
    }
    println!(
        "Backup complete! {} files from {} games.",
        log.total_files,
        log.games_backed_up.len()
    );
    Ok(())
}

fn cmd_list(config: &ScanConfig, game: Option<&str>) {
    let manager = BackupManager::new(&config.backup_dir, &config.logs_dir);
    let backups = manager.list_backups(game);
    if backups.is_empty() {
        println!("No backups found.");
        return;
    }
    for (name, runs) in backups {
        println!("{}", name);
        for r in runs {
            println!("  {}\t{} files\t{}", r.timestamp, r.file_count, r.path.display());
        }
    }
}

fn cmd_logs(config: &ScanConfig) {
    let manager = BackupManager::new(&config.backup_dir, &config.logs_dir);
    let logs = manager.list_logs();
    if logs.is_empty() {
        println!("No backup logs found.");
        return;
    }
    for (file, log) in logs {
        println!(
            "{}	{} games	{} files	{} bytes	{} errors	{}",
            log.timestamp,
            log.games_backed_up.len(),
            log.total_files,
            log.total_bytes,
            log.errors.len(),
            file
        );
        for (game, b) in &log.games_backed_up {
            println!("  {}: {} files", game, b.count);
        }
    }
}

fn cmd_patterns(config: &ScanConfig, roots: &KnownRoots) {
    let db = gsb_core::PatternDatabase::new(roots).with_extra(&config.patterns);
    let listing: serde_json::Map<String, serde_json::Value> = db
        .get_all_patterns()
        .iter()
        .map(|(name, paths)| {
            let paths = paths.iter().map(|p| serde_json::Value::from(p.display().to_string()));
            (name.clone(), serde_json::Value::Array(paths.collect()))
        })
        .collect();
    match serde_json::to_string_pretty(&listing) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("error: {}", e),
    }
}
