use super::data::{CHARGED_CAPACITIES, NEUTRAL_CAPACITIES};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ValenceEntry {
    symbol: String,
    #[serde(default)]
    charge: i8,
    capacities: Vec<u8>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ValenceTableFile {
    entries: Vec<ValenceEntry>,
}

/// Maps (element symbol, formal charge) to legal total bonding capacities.
///
/// The table is immutable once constructed and is passed explicitly into
/// the engine components; there are no global lookup singletons. The
/// default table covers the main-group elements plus the common charged
/// forms; a custom table can be loaded from a TOML file for exotic
/// chemistry.
///
/// Lookup resolves in two steps: an exact `(symbol, charge)` entry wins;
/// otherwise the neutral capacities are shifted by the formal charge
/// (non-positive results dropped). An element with no entry at all is
/// *unknown* — callers must propagate that rather than treat the atom as
/// unsaturated.
#[derive(Debug, Clone)]
pub struct ValenceTable {
    entries: HashMap<(String, i8), Vec<u8>>,
}

impl Default for ValenceTable {
    fn default() -> Self {
        let mut entries = HashMap::new();
        for (symbol, capacities) in NEUTRAL_CAPACITIES.entries() {
            entries.insert(((*symbol).to_string(), 0), capacities.to_vec());
        }
        for (symbol, charged) in CHARGED_CAPACITIES.entries() {
            for (charge, capacities) in charged.iter() {
                entries.insert(((*symbol).to_string(), *charge), capacities.to_vec());
            }
        }
        Self { entries }
    }
}

impl ValenceTable {
    /// Creates an empty table; every element is unknown.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Loads a valence table from a TOML file.
    ///
    /// # File format
    ///
    /// ```toml
    /// [[entries]]
    /// symbol = "C"
    /// capacities = [4]
    ///
    /// [[entries]]
    /// symbol = "N"
    /// charge = 1
    /// capacities = [4]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ValenceLoadError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ValenceLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ValenceLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: ValenceTableFile =
            toml::from_str(&content).map_err(|e| ValenceLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        let mut entries = HashMap::new();
        for entry in file.entries {
            let mut capacities = entry.capacities;
            capacities.sort_unstable();
            entries.insert((entry.symbol, entry.charge), capacities);
        }
        Ok(Self { entries })
    }

    /// Returns whether the element has any entry, for any charge.
    pub fn knows_element(&self, symbol: &str) -> bool {
        self.entries.keys().any(|(s, _)| s == symbol)
    }

    /// Legal bonding capacities for an element with a formal charge.
    ///
    /// # Return
    ///
    /// Capacities in ascending order, or `None` when the element is
    /// unknown to this table.
    pub fn capacities(&self, symbol: &str, charge: i8) -> Option<Vec<u8>> {
        if let Some(exact) = self.entries.get(&(symbol.to_string(), charge)) {
            return Some(exact.clone());
        }
        if charge != 0 {
            let neutral = self.entries.get(&(symbol.to_string(), 0))?;
            let shifted: Vec<u8> = neutral
                .iter()
                .filter_map(|&v| {
                    let adjusted = i16::from(v) + i16::from(charge);
                    (adjusted > 0).then_some(adjusted as u8)
                })
                .collect();
            return Some(shifted);
        }
        None
    }

    /// Whether `actual` is exactly one of the legal capacities.
    ///
    /// # Return
    ///
    /// Returns `None` when the element is unknown to this table.
    pub fn is_legal_capacity(&self, symbol: &str, charge: i8, actual: u32) -> Option<bool> {
        let capacities = self.capacities(symbol, charge)?;
        Some(capacities.iter().any(|&v| u32::from(v) == actual))
    }
}

#[derive(Debug, Error)]
pub enum ValenceLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}
