use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Precipitation categories that carry a surcharge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhenomenonCategory {
    Snow,
    Sleet,
    Rain,
}

/// Phenomena that forbid open-air vehicles outright
pub const FORBIDDEN_PHENOMENA: [&str; 3] = ["glaze", "hail", "thunder"];

/// Exact lowercase phenomenon strings grouped by category
#[derive(Debug, Clone)]
pub struct PhenomenonTaxonomy {
    categories: HashMap<String, PhenomenonCategory>,
}

impl Default for PhenomenonTaxonomy {
    fn default() -> Self {
        let mut taxonomy = Self::empty();
        taxonomy.insert_all(
            PhenomenonCategory::Rain,
            [
                "light rain",
                "moderate rain",
                "heavy rain",
                "light shower",
                "moderate shower",
                "heavy shower",
            ],
        );
        taxonomy.insert_all(
            PhenomenonCategory::Snow,
            [
                "light snow shower",
                "moderate snow shower",
                "heavy snow shower",
                "light snowfall",
                "moderate snowfall",
                "heavy snowfall",
                "blowing snow",
                "drifting snow",
            ],
        );
        taxonomy.insert_all(
            PhenomenonCategory::Sleet,
            ["light sleet", "moderate sleet"],
        );
        taxonomy
    }
}

impl PhenomenonTaxonomy {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            categories: HashMap::new(),
        }
    }

    pub fn insert_all<I, S>(&mut self, category: PhenomenonCategory, phenomena: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for phenomenon in phenomena {
            self.categories
                .insert(phenomenon.as_ref().to_lowercase(), category);
        }
    }

    /// Category of an exact (case-insensitive) phenomenon string
    #[must_use]
    pub fn category_of(&self, phenomenon: &str) -> Option<PhenomenonCategory> {
        self.categories.get(&phenomenon.to_lowercase()).copied()
    }

    #[must_use]
    pub fn phenomena(&self, category: PhenomenonCategory) -> HashSet<&str> {
        self.categories
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(p, _)| p.as_str())
            .collect()
    }
}
