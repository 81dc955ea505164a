//! Hand-curated save locations for games whose layout is known up front.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::roots::KnownRoots;

#[derive(Debug, Clone, Default)]
pub struct PatternDatabase {
    games: BTreeMap<String, Vec<PathBuf>>,
}

impl PatternDatabase {
    /// Builds the built-in table against `roots`. Paths are resolved here and never again.
    pub fn new(roots: &KnownRoots) -> Self {
        let docs = roots.documents();
        let my_games = roots.my_games();
        let appdata = &roots.appdata;
        let local = &roots.local_appdata;

        let mut games = BTreeMap::new();
        let mut add = |name: &str, paths: Vec<PathBuf>| {
            games.insert(name.to_string(), paths);
        };

        // Steam
        add("The Witcher 3", vec![docs.join("The Witcher 3").join("gamesaves")]);
        add("Skyrim", vec![my_games.join("Skyrim").join("Saves")]);
        add("Fallout 4", vec![my_games.join("Fallout4").join("Saves")]);
        add(
            "Cyberpunk 2077",
            vec![appdata.join("CD Projekt Red").join("Cyberpunk 2077").join("UserData")],
        );
        // Epic
        add("Fortnite", vec![local.join("FortniteGame").join("Saved")]);
        // GOG
        add(
            "Baldur's Gate 3",
            vec![appdata.join("Larian Studios").join("Baldur's Gate 3").join("PlayerProfiles")],
        );
        // Indie
        add("Stardew Valley", vec![appdata.join("StardewValley").join("Saves")]);
        add(
            "Terraria",
            vec![
                my_games.join("Terraria").join("Players"),
                my_games.join("Terraria").join("Worlds"),
            ],
        );

        Self { games }
    }

    pub fn from_map(games: BTreeMap<String, Vec<PathBuf>>) -> Self { Self { games } }

    /// Merges user-configured locations. Paths for an already known game are appended.
    pub fn with_extra(mut self, extra: &BTreeMap<String, Vec<PathBuf>>) -> Self {
        for (name, paths) in extra {
            let slot = self.games.entry(name.clone()).or_default();
            for p in paths {
                if !slot.contains(p) {
                    slot.push(p.clone());
                }
            }
        }
        self
    }

    pub fn get_all_patterns(&self) -> &BTreeMap<String, Vec<PathBuf>> { &self.games }

    pub fn get_patterns_for_game(&self, name: &str) -> &[PathBuf] {
        self.games.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize { self.games.len() }

    pub fn is_empty(&self) -> bool { self.games.is_empty() }
}
