//! Wrapper catalog - built-in definitions, YAML loading and lookup
//!
//! Definitions are layered, later sources override earlier ones:
//! 1. Built-in definitions (compiled defaults)
//! 2. ~/.config/snakewrap/wrappers/*.yml (user definitions)
//! 3. .snakewrap/wrappers/*.yml (project definitions)
//! 4. Directories listed in the configuration

mod builtin;
mod definition;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub use builtin::builtins;
pub use definition::{ParamDef, SlotDef, WrapperDef};

use crate::error::{Result, SnakewrapError};

/// Catalog of wrapper definitions keyed by name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    wrappers: BTreeMap<String, WrapperDef>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding only the built-in definitions
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for def in builtins() {
            catalog.wrappers.insert(def.name.clone(), def);
        }
        catalog
    }

    /// Built-ins plus user, project and extra definition directories
    pub fn load(extra_dirs: &[PathBuf]) -> Result<Self> {
        let mut catalog = Self::builtin();

        if let Some(config_dir) = dirs::config_dir() {
            let user_dir = config_dir.join("snakewrap").join("wrappers");
            if user_dir.exists() {
                catalog.load_dir(&user_dir)?;
            }
        }

        let project_dir = PathBuf::from(".snakewrap/wrappers");
        if project_dir.exists() {
            catalog.load_dir(&project_dir)?;
        }

        for dir in extra_dirs {
            catalog.load_dir(dir)?;
        }

        Ok(catalog)
    }

    /// Load every `*.yml`/`*.yaml` definition in a directory, skipping files that fail to parse
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SnakewrapError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read wrapper directory {}: {}", dir.display(), e),
            ))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "yml" || ext == "yaml"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match WrapperDef::load_from_file(&path) {
                Ok(def) => {
                    log::debug!("Loaded wrapper '{}' from {}", def.name, path.display());
                    self.wrappers.insert(def.name.clone(), def);
                    loaded += 1;
                }
                Err(e) => {
                    log::warn!("Failed to load wrapper from {}: {}", path.display(), e);
                }
            }
        }
        Ok(loaded)
    }

    /// Add a definition, replacing any existing one with the same name
    pub fn add(&mut self, def: WrapperDef) -> Result<()> {
        def.validate()?;
        self.wrappers.insert(def.name.clone(), def);
        Ok(())
    }

    /// Get a definition by name
    pub fn get(&self, name: &str) -> Option<&WrapperDef> {
        self.wrappers.get(name)
    }

    /// Get a definition by name, failing with `UnknownWrapper`
    pub fn require(&self, name: &str) -> Result<&WrapperDef> {
        self.get(name)
            .ok_or_else(|| SnakewrapError::UnknownWrapper(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.wrappers.contains_key(name)
    }

    /// All wrapper names, sorted
    pub fn list(&self) -> Vec<&str> {
        self.wrappers.keys().map(|s| s.as_str()).collect()
    }

    /// All definitions, sorted by name
    pub fn all(&self) -> impl Iterator<Item = &WrapperDef> {
        self.wrappers.values()
    }

    /// Definitions belonging to one tool family, e.g. `samtools`
    pub fn by_tool(&self, tool: &str) -> Vec<&WrapperDef> {
        self.wrappers.values().filter(|d| d.tool() == tool).collect()
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }
}
