use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gsb_core::{
    GameLikelihoodEstimator, GameRules, KnownRoots, PatternDatabase, SaveFileClassifier,
    SaveFileRules, ScanConfig,
};

fn paths(items: &[&str]) -> Vec<PathBuf> { items.iter().map(PathBuf::from).collect() }

#[test]
fn classifier_accepts_save_extensions_and_keywords() {
    let c = SaveFileClassifier::default();
    assert!(c.is_likely_save_file(Path::new(
        r"C:\Users\X\Documents\My Games\Skyrim\Saves\Save1.ess"
    )));
    assert!(c.is_likely_save_file(Path::new("/g/Saves/Save1.ess")));
    assert!(c.is_likely_save_file(Path::new("/g/WORLD1.WLD")));
    assert!(c.is_likely_save_file(Path::new("/g/slot_01.bin")));
    assert!(c.is_likely_save_file(Path::new("/g/Checkpoint")));
    assert!(!c.is_likely_save_file(Path::new("/g/random.bin")));
    assert!(!c.is_likely_save_file(Path::new("/g/noext")));
}

#[test]
fn classifier_exclusions_dominate_allowlists() {
    let c = SaveFileClassifier::default();
    for ext in SaveFileRules::default().excluded_extensions {
        let p = PathBuf::from(format!("/g/save_player_world{}", ext));
        assert!(!c.is_likely_save_file(&p), "{} should be excluded", p.display());
        let upper = PathBuf::from(format!("/g/SAVE{}", ext.to_uppercase()));
        assert!(!c.is_likely_save_file(&upper), "{} should be excluded", upper.display());
    }
    assert!(!c.is_likely_save_file(Path::new("/g/settings.json")));
    assert!(!c.is_likely_save_file(Path::new("/g/savegame.log")));
    assert!(!c.is_likely_save_file(Path::new("/g/player_cache.sav")));
    assert!(!c.is_likely_save_file(Path::new("/g/Manifest.dat")));
}

#[test]
fn classifier_rules_are_injectable() {
    let rules = SaveFileRules {
        save_extensions: vec!["SL2".into()],
        excluded_extensions: vec![],
        excluded_keywords: vec!["backup".into()],
        save_keywords: vec![],
    };
    let c = SaveFileClassifier::new(&rules);
    assert!(c.is_likely_save_file(Path::new("/g/ER0000.sl2")));
    assert!(!c.is_likely_save_file(Path::new("/g/ER0000.sl2.backup")));
    assert!(!c.is_likely_save_file(Path::new("/g/ER0000.backup.sl2")));
    assert!(!c.is_likely_save_file(Path::new("/g/profile.sav")));
}

#[test]
fn excluded_app_matches_in_both_directions() {
    let e = GameLikelihoodEstimator::default();
    let rules = GameRules::default();
    for term in rules.excluded_apps.iter().chain(&rules.excluded_online_games) {
        assert!(e.is_excluded_app(term), "{term}");
        assert!(e.is_excluded_app(&format!("My {} Folder", term.to_uppercase())), "{term}");
    }
    assert!(e.is_excluded_app("nvidia"));
    assert!(e.is_excluded_app("NVIDIA Corporation"));
    // over-inclusive on purpose: single-player titles sharing a name are dropped too
    assert!(e.is_excluded_app("Rust"));
    assert!(e.is_excluded_app("Terraria"));
    assert!(e.is_excluded_app("BattlEye"));
    assert!(!e.is_excluded_app("Hollow Knight"));
    assert!(!e.is_excluded_app(""));
    assert!(!e.is_excluded_app("   "));
}

#[test]
fn platform_folders_are_games_without_files() {
    let e = GameLikelihoodEstimator::default();
    assert!(e.is_likely_game("Steam", &[]));
    assert!(e.is_likely_game("Epic Games", &[]));
    assert!(e.is_likely_game("GOG.com", &[]));
    assert!(!e.is_likely_game("", &[]));
}

#[test]
fn below_threshold_is_never_a_game() {
    let e = GameLikelihoodEstimator::default();
    assert_eq!(e.min_save_files(), 3);
    let two = paths(&["/x/Saves/save1.sav", "/x/Saves/save2.sav"]);
    assert!(!e.is_likely_game("Super Game World", &two));
    assert!(!e.is_likely_game("Super Game World", &[]));

    let relaxed = GameLikelihoodEstimator::new(&GameRules { min_save_files: 1, ..GameRules::default() });
    assert!(relaxed.is_likely_game("Super Game World", &two[..1]));
}

#[test]
fn game_indicator_name_is_enough_above_threshold() {
    let e = GameLikelihoodEstimator::default();
    let files = paths(&["/x/MyIndieGame/a.dat", "/x/MyIndieGame/b.dat", "/x/MyIndieGame/c.dat", "/x/MyIndieGame/d.dat"]);
    assert!(e.is_likely_game("MyIndieGame", &files));
}

#[test]
fn strong_indicators_decide_for_neutral_names() {
    let e = GameLikelihoodEstimator::default();
    let weak = paths(&["/x/Nebula/a.dat", "/x/Nebula/b.dat", "/x/Nebula/c.dat"]);
    assert!(!e.is_likely_game("Nebula", &weak));

    let one = paths(&["/x/Nebula/profile_a.dat", "/x/Nebula/b.dat", "/x/Nebula/c.dat"]);
    assert!(!e.is_likely_game("Nebula", &one));

    let two = paths(&["/x/Nebula/profile_a.dat", "/x/Nebula/slots/b.dat", "/x/Nebula/c.dat"]);
    assert!(e.is_likely_game("Nebula", &two));
}

#[test]
fn strong_indicator_checks_every_ancestor() {
    let e = GameLikelihoodEstimator::default();
    assert!(e.has_strong_save_indicator(Path::new("/home/u/Saves/x.bin")));
    assert!(e.has_strong_save_indicator(Path::new("/LEVELS/a/b/c/x.bin")));
    assert!(e.has_strong_save_indicator(Path::new("/a/b/Player.bin")));
    assert!(!e.has_strong_save_indicator(Path::new("/a/b/c.bin")));
    assert!(!e.has_strong_save_indicator(Path::new("")));
}

#[test]
fn pattern_lookup() {
    let roots = KnownRoots::new("/home/u", "/home/u/AppData/Roaming", "/home/u/AppData/Local");
    let db = PatternDatabase::new(&roots);
    assert_eq!(db.len(), 8);
    assert_eq!(
        db.get_patterns_for_game("Terraria"),
        paths(&[
            "/home/u/Documents/My Games/Terraria/Players",
            "/home/u/Documents/My Games/Terraria/Worlds",
        ])
        .as_slice()
    );
    assert_eq!(
        db.get_patterns_for_game("Stardew Valley"),
        paths(&["/home/u/AppData/Roaming/StardewValley/Saves"]).as_slice()
    );
    assert!(db.get_patterns_for_game("Unknown Title").is_empty());
    assert!(db.get_patterns_for_game("terraria").is_empty());
}

#[test]
fn pattern_extras_merge_into_builtins() {
    let roots = KnownRoots::new("/home/u", "/r", "/l");
    let mut extra = BTreeMap::new();
    extra.insert("Hades".to_string(), paths(&["/r/Hades"]));
    extra.insert(
        "Skyrim".to_string(),
        paths(&["/home/u/Documents/My Games/Skyrim/Saves", "/mods/skyrim/saves"]),
    );
    let db = PatternDatabase::new(&roots).with_extra(&extra);
    assert_eq!(db.len(), 9);
    assert_eq!(db.get_patterns_for_game("Hades"), paths(&["/r/Hades"]).as_slice());
    assert_eq!(
        db.get_patterns_for_game("Skyrim"),
        paths(&["/home/u/Documents/My Games/Skyrim/Saves", "/mods/skyrim/saves"]).as_slice()
    );
}

#[test]
fn unset_roots_resolve_to_relative_paths() {
    let db = PatternDatabase::new(&KnownRoots::default());
    for paths in db.get_all_patterns().values() {
        assert!(paths.iter().all(|p| p.is_relative()));
    }
    assert!(!gsb_core::roots::exists_on_disk(Path::new("Documents")));
}

#[test]
fn config_toml_overrides_a_subset() {
    let cfg = ScanConfig::from_toml_str(
        r#"
        scan_locations = ["/games"]
        max_depth = 5

        [games]
        min_save_files = 5
        gaming_platforms = ["itch"]

        [patterns]
        "Hades" = ["/r/Hades"]
        "#,
    )
    .expect("parse");
    assert_eq!(cfg.scan_locations, paths(&["/games"]));
    assert_eq!(cfg.max_depth, 5);
    assert_eq!(cfg.games.min_save_files, 5);
    assert_eq!(cfg.games.gaming_platforms, vec!["itch".to_string()]);
    assert_eq!(cfg.games.excluded_apps, GameRules::default().excluded_apps);
    assert_eq!(cfg.save_files.save_extensions, SaveFileRules::default().save_extensions);
    assert_eq!(cfg.patterns["Hades"], paths(&["/r/Hades"]));
    assert_eq!(cfg.backup_dir, PathBuf::from("loaded saves"));

    assert!(ScanConfig::from_toml_str("max_depth = \"deep\"").is_err());
}

#[test]
fn config_load_and_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("gsb.toml");
    let backup = dir.path().join("out").join("loaded saves");
    let logs = dir.path().join("out").join("logs");
    std::fs::write(
        &file,
        format!("backup_dir = {:?}\nlogs_dir = {:?}\n", backup.display().to_string(), logs.display().to_string()),
    )
    .unwrap();
    let cfg = ScanConfig::load(&file).expect("load");
    cfg.ensure_dirs().expect("dirs");
    assert!(backup.is_dir());
    assert!(logs.is_dir());

    let err = ScanConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, gsb_core::ConfigError::Read { .. }));
}

#[test]
fn default_scan_roots_follow_known_roots() {
    let roots = KnownRoots::new("/home/u", "/r", "/l");
    let cfg = ScanConfig::for_roots(&roots);
    assert_eq!(
        cfg.scan_locations,
        paths(&[
            "/home/u/Documents/My Games",
            "/home/u/Documents",
            "/r",
            "/l",
            "/l/Steam",
            "/l/EpicGamesLauncher",
        ])
    );
    assert_eq!(cfg.games.min_save_files, 3);
}
