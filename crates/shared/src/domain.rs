use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Phrases the backend placed in one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhrasesGroup {
    pub phrases: Vec<String>,
    /// Mean pairwise distance inside the group; `null` when not computed.
    pub avg_distance: Option<f64>,
}

impl PhrasesGroup {
    pub fn new(phrases: Vec<String>, avg_distance: Option<f64>) -> Self {
        Self {
            phrases,
            avg_distance,
        }
    }
}

/// Groups keyed by backend-issued group label.
pub type Groups = HashMap<String, PhrasesGroup>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupingResult {
    pub groups: Groups,
    /// Phrases that weren't grouped.
    pub singles: Vec<String>,
}

impl GroupingResult {
    /// Total number of phrases accounted for by groups and singles.
    pub fn phrase_count(&self) -> usize {
        self.groups.values().map(|group| group.phrases.len()).sum::<usize>() + self.singles.len()
    }
}
