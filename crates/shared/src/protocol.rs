use serde::{Deserialize, Serialize};

pub const GROUP_PHRASES_ROUTE: &str = "/clusterizer/group/";
pub const HEALTH_CHECK_ROUTE: &str = "/health-check/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingPhrasesInput {
    pub phrases: Vec<String>,
}

impl GroupingPhrasesInput {
    pub fn new(phrases: &[String]) -> Self {
        Self {
            phrases: phrases.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub message: String,
}
