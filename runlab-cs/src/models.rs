//! Run and composition types
//!
//! The same shape is used for the upsert request body, its echo, and point
//! reads, so what a client sends is exactly what it reads back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest accepted percentage
pub const PERCENTAGE_MIN: f64 = 0.0;

/// Highest accepted percentage
pub const PERCENTAGE_MAX: f64 = 100.0;

/// Ids that collide with static routes under `/v1/runs/`
pub const RESERVED_RUN_IDS: &[&str] = &["latest"];

/// One (material, percentage) pair belonging to a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionEntry {
    pub material: String,
    pub percentage: f64,
}

impl CompositionEntry {
    pub fn new(material: impl Into<String>, percentage: f64) -> Self {
        Self {
            material: material.into(),
            percentage,
        }
    }
}

/// Full desired state of a run, as submitted to `POST /v1/runs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPayload {
    /// External identifier
    pub id: String,
    /// Item count; signed so a negative value reaches validation instead of
    /// failing deserialization with a less useful message
    pub items_processed: i64,
    /// Complete composition list; replaces whatever was stored before
    pub composition: Vec<CompositionEntry>,
}

/// Field-level validation failure
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl RunPayload {
    /// Check every field before the store is touched
    ///
    /// Reports the first failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::new("id", "must not be empty"));
        }

        if RESERVED_RUN_IDS.contains(&self.id.as_str()) {
            return Err(ValidationError::new(
                "id",
                format!("'{}' is reserved", self.id),
            ));
        }

        if self.items_processed < 0 {
            return Err(ValidationError::new(
                "items_processed",
                format!("must be >= 0, got {}", self.items_processed),
            ));
        }

        for (index, entry) in self.composition.iter().enumerate() {
            if entry.material.is_empty() {
                return Err(ValidationError::new(
                    format!("composition[{}].material", index),
                    "must not be empty",
                ));
            }

            let in_range = entry.percentage.is_finite()
                && (PERCENTAGE_MIN..=PERCENTAGE_MAX).contains(&entry.percentage);
            if !in_range {
                return Err(ValidationError::new(
                    format!("composition[{}].percentage", index),
                    format!(
                        "must be between {} and {}, got {}",
                        PERCENTAGE_MIN, PERCENTAGE_MAX, entry.percentage
                    ),
                ));
            }
        }

        Ok(())
    }
}

/// Stored run with its composition, returned by point reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    /// Surrogate key; internal ordering only, never serialized
    #[serde(skip)]
    pub pk: i64,
    pub id: String,
    pub items_processed: i64,
    pub composition: Vec<CompositionEntry>,
}

/// List entry: id and count, no composition detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub id: String,
    pub items_processed: i64,
}
