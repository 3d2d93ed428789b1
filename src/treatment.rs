//! Treatment guidance for recognized diseases, loaded from structured JSON
//! or a directory of plain-text fact sheets.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading treatment data.
#[derive(Error, Debug)]
pub enum TreatmentError {
    #[error("Failed to read treatment data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse treatment JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Treatment guidance for a single class.
///
/// Healthy classes carry only a description; disease classes fill in the
/// remaining sections when the source material provides them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub cycle_lethality: String,
    #[serde(default)]
    pub organic_solutions: String,
    #[serde(default)]
    pub inorganic_solutions: String,
    #[serde(default)]
    pub sources: String,
}

/// An in-memory map from class labels to treatment guidance.
///
/// Entries are kept in label order so the fuzzy lookup passes resolve the
/// same way on every run when several stored keys match a query.
#[derive(Debug, Default, Clone)]
pub struct TreatmentDatabase {
    entries: BTreeMap<String, TreatmentInfo>,
}

// Fact sheets use fixed section markers, split in this order.
const SECTION_MARKERS: [(&str, usize); 5] = [
    ("Symptoms:", 1),
    ("Cycle and Lethality:", 2),
    ("Organic Solutions:", 3),
    ("Inorganic Solutions:", 4),
    ("Src:", 5),
];

const HEALTHY_CROPS: [&str; 14] = [
    "apple",
    "tomato",
    "potato",
    "grape",
    "corn",
    "cherry",
    "peach",
    "pepper",
    "strawberry",
    "raspberry",
    "soybean",
    "blueberry",
    "squash",
    "orange",
];

impl TreatmentDatabase {
    /// Loads a database from a JSON file mapping labels to entries.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TreatmentError> {
        let content = fs::read_to_string(path.as_ref())?;
        let db = Self::from_json_str(&content)?;
        info!(
            "loaded treatment data for {} diseases from {}",
            db.len(),
            path.as_ref().display()
        );
        Ok(db)
    }

    /// Parses a database from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, TreatmentError> {
        let entries: BTreeMap<String, TreatmentInfo> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Builds a database from a directory of plain-text fact sheets, one
    /// `<label>.txt` per class.
    ///
    /// Filenames containing "healthy" become a single-description healthy
    /// entry; everything else is parsed into sections by the fixed markers.
    /// Unreadable files are skipped with a warning.
    pub fn from_text_dir(dir: impl AsRef<Path>) -> Result<Self, TreatmentError> {
        let mut entries = BTreeMap::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(label) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(content) => {
                    entries.insert(label.to_string(), parse_fact_sheet(label, content.trim()));
                }
                Err(e) => warn!("skipping treatment file {}: {}", path.display(), e),
            }
        }
        info!(
            "parsed {} treatment fact sheets from {}",
            entries.len(),
            dir.as_ref().display()
        );
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up treatment guidance for a label, tolerating naming drift.
    ///
    /// Tries an exact match, then case-insensitive, then whitespace-stripped,
    /// and finally matches healthy entries by shared crop name. When several
    /// stored keys satisfy a fuzzy pass, the first in label order wins.
    pub fn lookup(&self, label: &str) -> Option<&TreatmentInfo> {
        if let Some(info) = self.entries.get(label) {
            return Some(info);
        }

        let label_lower = label.to_lowercase();
        for (key, info) in &self.entries {
            if key.to_lowercase() == label_lower {
                return Some(info);
            }
        }

        let label_packed: String = label_lower.split_whitespace().collect();
        for (key, info) in &self.entries {
            let key_lower = key.to_lowercase();
            let key_packed: String = key_lower.split_whitespace().collect();
            if key_packed == label_packed {
                return Some(info);
            }
            if label_lower.contains("healthy") && key_lower.contains("healthy") {
                for crop in HEALTHY_CROPS {
                    if label_lower.contains(crop) && key_lower.contains(crop) {
                        return Some(info);
                    }
                }
            }
        }

        None
    }
}

fn parse_fact_sheet(label: &str, content: &str) -> TreatmentInfo {
    if label.to_lowercase().contains("healthy") {
        return TreatmentInfo {
            kind: "healthy".into(),
            description: content.to_string(),
            symptoms: String::new(),
            cycle_lethality: String::new(),
            organic_solutions: String::new(),
            inorganic_solutions: String::new(),
            sources: String::new(),
        };
    }

    // Split the sheet at each marker; sections may be missing, in which case
    // everything remaining belongs to the previous section.
    let mut sections: [String; 6] = Default::default();
    let mut rest = content;
    let mut current = 0;
    loop {
        let next = SECTION_MARKERS
            .iter()
            .filter_map(|&(marker, slot)| rest.find(marker).map(|pos| (pos, marker, slot)))
            .min_by_key(|&(pos, _, _)| pos);
        match next {
            Some((pos, marker, slot)) => {
                sections[current].push_str(rest[..pos].trim());
                rest = &rest[pos + marker.len()..];
                current = slot;
            }
            None => {
                sections[current].push_str(rest.trim());
                break;
            }
        }
    }

    let description = sections[0]
        .strip_prefix("Basics:")
        .unwrap_or(&sections[0])
        .trim()
        .to_string();

    TreatmentInfo {
        kind: "disease".into(),
        description,
        symptoms: sections[1].clone(),
        cycle_lethality: sections[2].clone(),
        organic_solutions: sections[3].clone(),
        inorganic_solutions: sections[4].clone(),
        sources: sections[5].clone(),
    }
}
