//! Biodegradability lookup for waste classes

use serde::{Serialize, Serializer};

/// Known waste classes and whether they are biodegradable
pub const BIODEGRADABLE_CLASSES: &[(&str, bool)] = &[
    ("paper", true),
    ("cardboard", true),
    ("organic", true),
    ("food", true),
    ("wood", true),
    ("leaves", true),
    ("compost", true),
    ("plastic", false),
    ("metal", false),
    ("glass", false),
    ("electronic", false),
    ("battery", false),
    ("hazardous", false),
    ("textile", false),
    ("rubber", false),
    ("styrofoam", false),
];

/// Tri-state biodegradability of a detected class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Biodegradability {
    Biodegradable,
    NonBiodegradable,
    /// Class is not in the table, or the request is not in waste mode
    #[default]
    Unknown,
}

impl Biodegradability {
    /// Look up a class name (case-insensitive)
    pub fn classify(class_name: &str) -> Self {
        let lower = class_name.to_lowercase();
        BIODEGRADABLE_CLASSES
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|&(_, biodegradable)| Self::from(biodegradable))
            .unwrap_or(Biodegradability::Unknown)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Biodegradability::Unknown)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Biodegradability::Biodegradable => Some(true),
            Biodegradability::NonBiodegradable => Some(false),
            Biodegradability::Unknown => None,
        }
    }
}

impl From<bool> for Biodegradability {
    fn from(biodegradable: bool) -> Self {
        if biodegradable {
            Biodegradability::Biodegradable
        } else {
            Biodegradability::NonBiodegradable
        }
    }
}

impl Serialize for Biodegradability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_bool() {
            Some(value) => serializer.serialize_bool(value),
            None => serializer.serialize_none(),
        }
    }
}
