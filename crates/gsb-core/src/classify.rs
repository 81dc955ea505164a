use std::path::Path;

use crate::config::SaveFileRules;

pub(crate) fn normalize(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize_ext(items: &[String]) -> Vec<String> {
    normalize(items)
        .into_iter()
        .map(|e| if e.starts_with('.') { e } else { format!(".{e}") })
        .collect()
}

/// Lower-cased final component, or `None` for paths like `/` or `..`.
pub(crate) fn lower_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_lowercase())
}

/// Lower-cased `.ext` suffix; empty when the file has none.
fn lower_suffix(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Decides whether a single file looks like persisted game progress.
#[derive(Debug, Clone)]
pub struct SaveFileClassifier {
    save_extensions: Vec<String>,
    excluded_extensions: Vec<String>,
    excluded_keywords: Vec<String>,
    save_keywords: Vec<String>,
}

impl Default for SaveFileClassifier {
    fn default() -> Self { Self::new(&SaveFileRules::default()) }
}

impl SaveFileClassifier {
    pub fn new(rules: &SaveFileRules) -> Self {
        Self {
            save_extensions: normalize_ext(&rules.save_extensions),
            excluded_extensions: normalize_ext(&rules.excluded_extensions),
            excluded_keywords: normalize(&rules.excluded_keywords),
            save_keywords: normalize(&rules.save_keywords),
        }
    }

    pub fn is_likely_save_file(&self, path: &Path) -> bool {
        let Some(name) = lower_name(path) else {
            return false;
        };
        let suffix = lower_suffix(path);

        // exclusions win over both allowlists
        if self.is_excluded(&name, &suffix) {
            return false;
        }
        if !suffix.is_empty() && self.save_extensions.contains(&suffix) {
            return true;
        }
        self.save_keywords.iter().any(|k| name.contains(k.as_str()))
    }

    fn is_excluded(&self, name: &str, suffix: &str) -> bool {
        (!suffix.is_empty() && self.excluded_extensions.iter().any(|e| e == suffix))
            || self.excluded_keywords.iter().any(|k| name.contains(k.as_str()))
    }
}
