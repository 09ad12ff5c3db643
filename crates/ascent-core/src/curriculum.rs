//! Curriculum knowledge consumed by the context assembler.
//!
//! The content itself is authored elsewhere and loaded from TOML:
//!
//! ```toml
//! [[pillars]]
//! id = "m1"
//! title = "Foundations"
//! description = "Build the operating base."
//! archetype = "Builder"
//!
//! [[pillars.lessons]]
//! title = "Cash flow"
//! summary = "Know where every dollar goes."
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

/// One curriculum module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    /// Module id as it appears in `/curriculum/{id}` paths.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Persona the module is written for, if any.
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(default)]
    pub pillars: Vec<Pillar>,
}

impl Curriculum {
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// # Errors
    /// Returns an error if `content` is not a valid curriculum document.
    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(content)?)
    }

    pub fn pillar(&self, module_id: &str) -> Option<&Pillar> {
        self.pillars.iter().find(|p| p.id == module_id)
    }

    pub fn archetype_for(&self, module_id: &str) -> Option<&str> {
        self.pillar(module_id)?.archetype.as_deref()
    }
}
