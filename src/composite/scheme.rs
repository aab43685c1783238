//! Class color tables and class schemes.
//!
//! A scheme is a plain value handed to the compositor and the legend
//! builder, so sessions with different class sets can coexist. Schemes are
//! read from JSON:
//!
//! ```json
//! {
//!   "classes": [
//!     { "id": 1, "name": "Normal", "color": [0, 255, 0] },
//!     { "id": 2, "name": "Stroma", "color": [0, 0, 255] }
//!   ]
//! }
//! ```
//!
//! Class 0 is background. It is added in black when the file omits it and
//! is always drawn fully transparent.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CompositeError, IoError, SchemeError};

/// Class id reserved for unlabeled pixels
pub const BACKGROUND: u32 = 0;

// =============================================================================
// ClassColorTable
// =============================================================================

/// Map from class id to an RGB triple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassColorTable {
    colors: BTreeMap<u32, [u8; 3]>,
}

impl ClassColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the color of `class_id`, returning the previous one.
    pub fn insert(&mut self, class_id: u32, rgb: [u8; 3]) -> Option<[u8; 3]> {
        self.colors.insert(class_id, rgb)
    }

    /// Color of `class_id`, or [`CompositeError::UnknownClass`].
    pub fn color(&self, class_id: u32) -> Result<[u8; 3], CompositeError> {
        self.colors
            .get(&class_id)
            .copied()
            .ok_or(CompositeError::UnknownClass { class_id })
    }

    pub fn contains(&self, class_id: u32) -> bool {
        self.colors.contains_key(&class_id)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Entries in ascending class id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, [u8; 3])> + '_ {
        self.colors.iter().map(|(id, rgb)| (*id, *rgb))
    }
}

impl FromIterator<(u32, [u8; 3])> for ClassColorTable {
    fn from_iter<T: IntoIterator<Item = (u32, [u8; 3])>>(iter: T) -> Self {
        ClassColorTable {
            colors: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// ClassScheme
// =============================================================================

/// One foreground class as shown in the legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub id: u32,
    pub name: String,
    pub color: [u8; 3],
}

/// Color table plus the display name of every class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassScheme {
    colors: ClassColorTable,
    names: BTreeMap<u32, String>,
}

#[derive(Debug, Deserialize)]
struct SchemeFile {
    classes: Vec<ClassEntry>,
}

#[derive(Debug, Deserialize)]
struct ClassEntry {
    id: u32,
    name: String,
    color: [u8; 3],
}

impl ClassScheme {
    /// Build a scheme from `(id, name, color)` triples.
    ///
    /// Background is added in black if missing. Fails on duplicate ids or
    /// when no foreground class is given.
    pub fn from_classes<I, S>(classes: I) -> Result<Self, SchemeError>
    where
        I: IntoIterator<Item = (u32, S, [u8; 3])>,
        S: Into<String>,
    {
        let mut colors = ClassColorTable::new();
        let mut names = BTreeMap::new();

        for (id, name, color) in classes {
            if colors.insert(id, color).is_some() {
                return Err(SchemeError::DuplicateClass(id));
            }
            names.insert(id, name.into());
        }

        if !colors.contains(BACKGROUND) {
            colors.insert(BACKGROUND, [0, 0, 0]);
            names.insert(BACKGROUND, "Background".to_string());
        }

        if colors.len() < 2 {
            return Err(SchemeError::NoClasses);
        }

        Ok(ClassScheme { colors, names })
    }

    /// Parse a JSON scheme; `origin` names the source in errors.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, SchemeError> {
        let file: SchemeFile = serde_json::from_str(json).map_err(|e| SchemeError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        Self::from_classes(file.classes.into_iter().map(|c| (c.id, c.name, c.color)))
    }

    /// Read a JSON scheme file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemeError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| IoError::from_std(&display, e))?;
        Self::from_json_str(&json, &display)
    }

    pub fn colors(&self) -> &ClassColorTable {
        &self.colors
    }

    pub fn name(&self, class_id: u32) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    /// Non-background classes in ascending id order.
    pub fn foreground(&self) -> Vec<ClassInfo> {
        self.colors
            .iter()
            .filter(|(id, _)| *id != BACKGROUND)
            .map(|(id, color)| ClassInfo {
                id,
                name: self.name(id).unwrap_or_default().to_string(),
                color,
            })
            .collect()
    }
}

impl Default for ClassScheme {
    /// The three-class histology scheme: Normal, Stroma and Tumor.
    fn default() -> Self {
        ClassScheme {
            colors: [
                (BACKGROUND, [0, 0, 0]),
                (1, [0, 255, 0]),
                (2, [0, 0, 255]),
                (3, [255, 0, 0]),
            ]
            .into_iter()
            .collect(),
            names: [
                (BACKGROUND, "Background"),
                (1, "Normal"),
                (2, "Stroma"),
                (3, "Tumor"),
            ]
            .into_iter()
            .map(|(id, name)| (id, name.to_string()))
            .collect(),
        }
    }
}
