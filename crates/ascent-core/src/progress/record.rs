//! Per-user progress record and its value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::level::Level;
use crate::error::ValidationError;

/// Highest score accepted for an assessment sub-score.
pub const MAX_SCORE: u8 = 10;

/// One assessment category broken into three sub-scores (0..=10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryScore {
    pub mindset: u8,
    pub systems: u8,
    pub results: u8,
}

impl CategoryScore {
    pub fn new(mindset: u8, systems: u8, results: u8) -> Self {
        Self {
            mindset,
            systems,
            results,
        }
    }

    pub fn average(&self) -> f64 {
        (self.mindset as f64 + self.systems as f64 + self.results as f64) / 3.0
    }

    fn validate(&self, category: &str) -> Result<(), ValidationError> {
        for (name, value) in [
            ("mindset", self.mindset),
            ("systems", self.systems),
            ("results", self.results),
        ] {
            if value > MAX_SCORE {
                return Err(ValidationError::InvalidValue {
                    field: format!("{category}.{name}"),
                    message: format!("score {value} exceeds {MAX_SCORE}"),
                });
            }
        }
        Ok(())
    }
}

/// Self-assessment across the three life categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssessmentScores {
    pub wealth: CategoryScore,
    pub health: CategoryScore,
    pub relationships: CategoryScore,
}

impl AssessmentScores {
    /// Mean of the three category averages.
    pub fn overall(&self) -> f64 {
        (self.wealth.average() + self.health.average() + self.relationships.average()) / 3.0
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.wealth.validate("wealth")?;
        self.health.validate("health")?;
        self.relationships.validate("relationships")
    }
}

/// Point-in-time assessment. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSnapshot {
    pub scores: AssessmentScores,
    pub recorded_at: DateTime<Utc>,
}

/// The six strategic decision topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionTopic {
    EntityStructure,
    Banking,
    Insurance,
    InvestmentPolicy,
    EstatePlan,
    ExitStrategy,
}

impl DecisionTopic {
    pub const ALL: [DecisionTopic; 6] = [
        DecisionTopic::EntityStructure,
        DecisionTopic::Banking,
        DecisionTopic::Insurance,
        DecisionTopic::InvestmentPolicy,
        DecisionTopic::EstatePlan,
        DecisionTopic::ExitStrategy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DecisionTopic::EntityStructure => "entity_structure",
            DecisionTopic::Banking => "banking",
            DecisionTopic::Insurance => "insurance",
            DecisionTopic::InvestmentPolicy => "investment_policy",
            DecisionTopic::EstatePlan => "estate_plan",
            DecisionTopic::ExitStrategy => "exit_strategy",
        }
    }
}

impl fmt::Display for DecisionTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionTopic {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|topic| topic.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownName {
                kind: "decision topic",
                value: s.to_string(),
            })
    }
}

/// Everything the engine knows about a user's progress.
///
/// Every field defaults so that records written by older builds, or with
/// keys missing, still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    pub current_level: Level,
    pub net_worth: u64,
    pub revenue: f64,
    /// Module id -> sorted, unique completed unit indices.
    pub module_completion: BTreeMap<String, Vec<u32>>,
    pub assessment_history: Vec<AssessmentSnapshot>,
    pub strategic_decisions: BTreeMap<DecisionTopic, String>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            current_level: Level::Architect,
            net_worth: 0,
            revenue: 0.0,
            module_completion: BTreeMap::new(),
            assessment_history: Vec::new(),
            strategic_decisions: BTreeMap::new(),
        }
    }
}

impl ProgressRecord {
    /// Decode a stored record and restore its invariants.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let mut record: ProgressRecord = serde_json::from_str(raw)?;
        record.normalize();
        Ok(record)
    }

    /// Re-derive the level and re-sort unit sets.
    ///
    /// A stored `currentLevel` is never trusted over `netWorth`.
    pub fn normalize(&mut self) {
        self.current_level = Level::for_net_worth(self.net_worth);
        for units in self.module_completion.values_mut() {
            units.sort_unstable();
            units.dedup();
        }
    }

    pub fn set_net_worth(&mut self, amount: u64) {
        self.net_worth = amount;
        self.current_level = Level::for_net_worth(amount);
    }

    /// Insert a unit index; returns `false` if it was already complete.
    pub fn insert_unit(&mut self, module_id: &str, unit_index: u32) -> bool {
        let units = self.module_completion.entry(module_id.to_string()).or_default();
        match units.binary_search(&unit_index) {
            Ok(_) => false,
            Err(pos) => {
                units.insert(pos, unit_index);
                true
            }
        }
    }

    pub fn completion_count(&self, module_id: &str) -> usize {
        self.module_completion.get(module_id).map_or(0, Vec::len)
    }

    pub fn total_completed_units(&self) -> usize {
        self.module_completion.values().map(Vec::len).sum()
    }

    /// Distance to the next tier, `None` at the top of the ladder.
    pub fn gap_to_next_level(&self) -> Option<u64> {
        self.current_level
            .next()
            .map(|next| next.threshold().saturating_sub(self.net_worth))
    }

    pub fn undecided_topics(&self) -> Vec<DecisionTopic> {
        DecisionTopic::ALL
            .iter()
            .copied()
            .filter(|topic| !self.strategic_decisions.contains_key(topic))
            .collect()
    }

    pub fn latest_assessment(&self) -> Option<&AssessmentSnapshot> {
        self.assessment_history.last()
    }
}
