//! Hot-reloadable prompt template catalog (Design Notes item 5): a
//! process-wide registry of named templates, reloadable from a directory of
//! `.txt` files without restarting the process. Reports every load error at
//! once rather than stopping at the first bad file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// One failure while loading a single template file; `load_from_dir` and
/// `reload` collect every such error instead of bailing at the first.
#[derive(Error, Debug)]
pub enum CatalogLoadError {
    #[error("template directory not found: {0}")]
    DirNotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("template file {0} has an empty name")]
    EmptyName(PathBuf),
}

/// A named catalog of prompt template bodies, with a generation counter the
/// context assembler re-reads each turn so a live `reload` is picked up
/// without any coordination beyond comparing counters.
#[derive(Debug, Clone, Default)]
pub struct PromptCatalog {
    templates: HashMap<String, String>,
    generation: u64,
}

impl PromptCatalog {
    /// Loads every `.txt` file directly inside `dir` (non-recursive — one
    /// file per template), keyed by filename stem. Collects all errors
    /// before returning rather than stopping at the first.
    pub fn load_from_dir(dir: &Path) -> Result<Self, Vec<CatalogLoadError>> {
        if !dir.exists() {
            return Err(vec![CatalogLoadError::DirNotFound(dir.to_path_buf())]);
        }
        let mut templates = HashMap::new();
        let mut errors = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(source) => return Err(vec![CatalogLoadError::Io { path: dir.to_path_buf(), source }]),
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(source) => {
                    errors.push(CatalogLoadError::Io { path: dir.to_path_buf(), source });
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => {
                    errors.push(CatalogLoadError::EmptyName(path.clone()));
                    continue;
                }
            };
            match std::fs::read_to_string(&path) {
                Ok(body) => {
                    templates.insert(name, body);
                }
                Err(source) => errors.push(CatalogLoadError::Io { path, source }),
            }
        }

        if !errors.is_empty() && templates.is_empty() {
            return Err(errors);
        }
        Ok(PromptCatalog { templates, generation: 1 })
    }

    /// Reloads from `dir` in place, bumping the generation counter only on
    /// success so a caller mid-read of the old generation never observes a
    /// torn catalog.
    pub fn reload(&mut self, dir: &Path) -> Result<(), Vec<CatalogLoadError>> {
        let fresh = Self::load_from_dir(dir)?;
        self.templates = fresh.templates;
        self.generation += 1;
        Ok(())
    }

    /// Looks up a template body by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|s| s.as_str())
    }

    /// Current generation; bumps by one on every successful reload.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of loaded templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("weave_content_prompt_catalog_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_txt_files_keyed_by_stem() {
        let dir = temp_dir("load");
        fs::write(dir.join("system.txt"), "You are a narrator.").unwrap();
        fs::write(dir.join("rules.txt"), "Stay in character.").unwrap();
        fs::write(dir.join("notes.md"), "ignored, not .txt").unwrap();

        let catalog = PromptCatalog::load_from_dir(&dir).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("system"), Some("You are a narrator."));
        assert_eq!(catalog.get("notes"), None);
        assert_eq!(catalog.generation(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = std::env::temp_dir().join("weave_content_prompt_catalog_missing_dir_xyz");
        let _ = fs::remove_dir_all(&dir);
        assert!(PromptCatalog::load_from_dir(&dir).is_err());
    }

    #[test]
    fn reload_bumps_generation_and_replaces_templates() {
        let dir = temp_dir("reload");
        fs::write(dir.join("system.txt"), "v1").unwrap();
        let mut catalog = PromptCatalog::load_from_dir(&dir).unwrap();
        assert_eq!(catalog.get("system"), Some("v1"));

        fs::write(dir.join("system.txt"), "v2").unwrap();
        fs::remove_file(dir.join("old_unused_marker.txt")).unwrap_or(());
        catalog.reload(&dir).unwrap();
        assert_eq!(catalog.get("system"), Some("v2"));
        assert_eq!(catalog.generation(), 2);

        let _ = fs::remove_dir_all(&dir);
    }
}
