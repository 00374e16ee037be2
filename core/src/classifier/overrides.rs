//! Per-family label and capacity overrides.
//!
//! Entries are keyed by the *set* of addresses a region covers, never by its
//! description: descriptions differ between firmware revisions, addresses do not.
//! Capacities are empirical and may be replaced with a JSON file of the same shape:
//!
//! ```json
//! {
//!   "families": [{
//!     "name": "compact-ecotank",
//!     "model_prefixes": ["ET-18"],
//!     "counters": [{ "addresses": ["0x30", "0x31"], "label": "Counter 1", "capacity": 141.0 }]
//!   }]
//! }
//! ```

use std::fs;
use std::path::Path;

use inkpad_common::InkpadError;
use inkpad_common::address::serde_hex;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterOverride {
    #[serde(with = "serde_hex::vec")]
    pub addresses: Vec<u8>,
    pub label: String,
    #[serde(default)]
    pub capacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyOverrides {
    pub name: String,
    pub model_prefixes: Vec<String>,
    pub counters: Vec<CounterOverride>,
}

impl FamilyOverrides {
    pub fn matches_model(&self, model: &str) -> bool {
        let model = model.trim().to_ascii_uppercase();
        self.model_prefixes
            .iter()
            .any(|prefix| model.starts_with(&prefix.trim().to_ascii_uppercase()))
    }

    /// Finds the override whose address set equals `addresses`, in any order.
    pub fn lookup(&self, addresses: &[u8]) -> Option<&CounterOverride> {
        let key = address_set(addresses);
        self.counters
            .iter()
            .find(|counter| address_set(&counter.addresses) == key)
    }
}

fn address_set(addresses: &[u8]) -> Vec<u8> {
    let mut set = addresses.to_vec();
    set.sort_unstable();
    set.dedup();
    set
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideTable {
    pub families: Vec<FamilyOverrides>,
}

impl OverrideTable {
    /// Overrides shipped with the tool.
    ///
    /// Capacities for the compact EcoTank family were measured on a single device
    /// and are approximations.
    pub fn builtin() -> Self {
        Self {
            families: vec![FamilyOverrides {
                name: "compact-ecotank".to_string(),
                model_prefixes: vec!["ET-18".to_string()],
                counters: vec![
                    CounterOverride {
                        addresses: vec![0x30, 0x31],
                        label: "Counter 1".to_string(),
                        capacity: Some(141.0),
                    },
                    CounterOverride {
                        addresses: vec![0x32, 0x33],
                        label: "Counter 2".to_string(),
                        capacity: None,
                    },
                    CounterOverride {
                        addresses: vec![0x34, 0x35],
                        label: "Counter 3".to_string(),
                        capacity: Some(67.0),
                    },
                ],
            }],
        }
    }

    /// The first family whose prefix matches `model`.
    pub fn for_model(&self, model: &str) -> Option<&FamilyOverrides> {
        self.families.iter().find(|family| family.matches_model(model))
    }

    pub fn load(path: &Path) -> Result<Self, InkpadError> {
        let text = fs::read_to_string(path).map_err(|e| InkpadError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text, path)
    }

    pub fn from_json(text: &str, path: &Path) -> Result<Self, InkpadError> {
        let invalid = |reason: String| InkpadError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let table: OverrideTable = serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?;

        for family in &table.families {
            for counter in &family.counters {
                if counter.addresses.is_empty() {
                    return Err(invalid(format!(
                        "'{}' in family '{}' has no addresses",
                        counter.label, family.name
                    )));
                }
                if let Some(cap) = counter.capacity {
                    if !cap.is_finite() || cap <= 0.0 {
                        return Err(invalid(format!(
                            "capacity {cap} for '{}' in family '{}' must be a positive number",
                            counter.label, family.name
                        )));
                    }
                }
            }
        }

        Ok(table)
    }

    /// Layers `other` on top of `self`: families with the same name are replaced,
    /// new families take precedence over the existing ones.
    pub fn merged_with(self, other: OverrideTable) -> Self {
        let mut families = other.families;
        for family in self.families {
            if families.iter().any(|f| f.name == family.name) {
                debug!(family = %family.name, "built-in overrides replaced");
                continue;
            }
            families.push(family);
        }
        Self { families }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
