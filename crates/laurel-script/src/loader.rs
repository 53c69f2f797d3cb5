//! RON catalog loader

use crate::error::{Error, Result};
use crate::schema::achievement::{AchievementDef, AchievementDefs};
use laurel_core::{AchievementDefinition, AchievementId};
use laurel_db::Store;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Loaded achievement catalog
#[derive(Debug, Default)]
pub struct Catalog {
    /// Definitions by ID
    pub achievements: BTreeMap<AchievementId, AchievementDefinition>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a definition
    pub fn get(&self, id: &AchievementId) -> Option<&AchievementDefinition> {
        self.achievements.get(id)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }

    /// Write every definition into the store, replacing same-ID rows
    pub fn seed(&self, store: &Store) -> Result<usize> {
        let count = store.upsert_definitions(self.achievements.values())?;
        info!(count, "achievement catalog seeded");
        Ok(count)
    }
}

/// Loader for RON achievement catalogs
pub struct Loader {
    catalog: Catalog,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
        }
    }

    /// Load a single RON file
    ///
    /// Accepts either a catalog `(achievements: [...])` or one definition.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let content = fs::read_to_string(path.as_ref())?;
        if content.contains("achievements:") {
            self.load_str(&content)
        } else {
            self.load_single_definition(&content)
        }
    }

    /// Load a catalog from a RON string
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let file: AchievementDefs = ron::from_str(content)?;
        for def in file.achievements {
            self.insert(def)?;
        }
        Ok(())
    }

    /// Load one definition from a RON string
    fn load_single_definition(&mut self, content: &str) -> Result<()> {
        let def: AchievementDef = ron::from_str(content)?;
        self.insert(def)
    }

    fn insert(&mut self, def: AchievementDef) -> Result<()> {
        if def.id.trim().is_empty() {
            return Err(Error::InvalidSchema("achievement id must not be empty".to_string()));
        }
        if def.title.trim().is_empty() {
            return Err(Error::InvalidSchema(format!("achievement {} has no title", def.id)));
        }
        if def.icon.trim().is_empty() {
            // Clients cannot render an unlock without one
            return Err(Error::InvalidSchema(format!("achievement {} has no icon", def.id)));
        }
        if !def.condition_value.is_finite() {
            return Err(Error::InvalidSchema(format!(
                "achievement {} has a non-finite condition value",
                def.id
            )));
        }
        if !def.has_handler() {
            // Kept: the definition may predate its handler
            debug!(id = %def.id, condition_type = %def.condition_type, "no handler for condition type");
        }

        let definition = def.to_definition();
        if self.catalog.achievements.contains_key(&definition.id) {
            return Err(Error::DuplicateDefinition(definition.id.to_string()));
        }
        self.catalog.achievements.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Load all RON files from a directory
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries: Vec<_> = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        // Stable order so duplicate errors name the same file every run
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading and return the catalog
    pub fn finish(self) -> Catalog {
        self.catalog
    }

    /// Get the current catalog (for inspection during loading)
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
