//! Core domain types for the workout engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise definitions and their catalog grouping
//! - Workout plans and the per-exercise training parameters
//! - History entries recorded at the end of a session

use crate::taxonomy::MuscleGroup;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Whether an exercise recruits one joint or several
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Isolated,
    MultiJoint,
}

impl std::str::FromStr for ExerciseKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "isolated" | "isolation" | "isolado" => Ok(ExerciseKind::Isolated),
            "multi" | "multi_joint" | "multi-joint" | "compound" | "multiarticular" => {
                Ok(ExerciseKind::MultiJoint)
            }
            other => Err(crate::Error::Validation(format!(
                "unknown exercise kind '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExerciseKind::Isolated => f.write_str("isolated"),
            ExerciseKind::MultiJoint => f.write_str("multi_joint"),
        }
    }
}

/// An exercise as stored in the catalog.
///
/// Recommended sets/reps/rest are kept as text ranges ("3-4", "8-12",
/// "60-90") exactly as the seed data writes them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseDefinition {
    pub name: String,
    pub sets: String,
    pub reps: String,
    pub rest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synergists: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antagonists: Option<String>,
    /// Held for a duration rather than repeated; `reps` then means seconds
    #[serde(default)]
    pub time_based: bool,
}

impl ExerciseDefinition {
    pub fn new(
        name: impl Into<String>,
        sets: impl Into<String>,
        reps: impl Into<String>,
        rest: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sets: sets.into(),
            reps: reps.into(),
            rest: rest.into(),
            synergists: None,
            antagonists: None,
            time_based: false,
        }
    }

    pub fn time_based(mut self) -> Self {
        self.time_based = true;
        self
    }

    /// Low-end working parameters taken from the recommended ranges
    pub fn recommended_params(&self, time_per_set: u32) -> ExerciseParams {
        ExerciseParams {
            sets: crate::cost::first_of(&self.sets),
            reps: crate::cost::first_of(&self.reps),
            time_per_set,
            rest: crate::cost::first_of(&self.rest),
        }
    }
}

/// The two kind-lists held for one sub-group
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct SubGroupExercises {
    #[serde(default)]
    pub isolated: Vec<ExerciseDefinition>,
    #[serde(default)]
    pub multi: Vec<ExerciseDefinition>,
}

impl SubGroupExercises {
    pub fn list(&self, kind: ExerciseKind) -> &[ExerciseDefinition] {
        match kind {
            ExerciseKind::Isolated => &self.isolated,
            ExerciseKind::MultiJoint => &self.multi,
        }
    }

    pub fn list_mut(&mut self, kind: ExerciseKind) -> &mut Vec<ExerciseDefinition> {
        match kind {
            ExerciseKind::Isolated => &mut self.isolated,
            ExerciseKind::MultiJoint => &mut self.multi,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.isolated.is_empty() && self.multi.is_empty()
    }

    /// Multi-joint entries first, then isolated ones
    pub fn iter(&self) -> impl Iterator<Item = (ExerciseKind, &ExerciseDefinition)> {
        self.multi
            .iter()
            .map(|d| (ExerciseKind::MultiJoint, d))
            .chain(self.isolated.iter().map(|d| (ExerciseKind::Isolated, d)))
    }
}

// ============================================================================
// Plan Types
// ============================================================================

/// Training parameters for one exercise inside a plan
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseParams {
    pub sets: u32,
    pub reps: u32,
    pub time_per_set: u32,
    pub rest: u32,
}

impl ExerciseParams {
    pub fn estimated_seconds(&self) -> u64 {
        crate::cost::estimate_seconds(
            i64::from(self.sets),
            u64::from(self.time_per_set),
            u64::from(self.rest),
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub name: String,
    pub params: ExerciseParams,
}

/// Exercises chosen for one sub-group, in insertion order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanSubGroup {
    pub sub_group: String,
    pub exercises: Vec<PlannedExercise>,
}

/// One step of the flattened exercise list driving a session
#[derive(Clone, Debug, PartialEq)]
pub struct FlatExercise {
    pub sub_group: String,
    pub name: String,
    pub params: ExerciseParams,
}

/// A saved training routine bound to one to three weekdays
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub weekdays: Vec<Weekday>,
    pub groups: Vec<MuscleGroup>,
    pub exercises: Vec<PlanSubGroup>,
    pub created_at: DateTime<Utc>,
}

impl WorkoutPlan {
    /// Sub-group order, then insertion order within each sub-group
    pub fn flattened(&self) -> Vec<FlatExercise> {
        self.exercises
            .iter()
            .flat_map(|group| {
                group.exercises.iter().map(move |ex| FlatExercise {
                    sub_group: group.sub_group.clone(),
                    name: ex.name.clone(),
                    params: ex.params,
                })
            })
            .collect()
    }

    pub fn sub_groups(&self) -> Vec<String> {
        self.exercises.iter().map(|g| g.sub_group.clone()).collect()
    }

    pub fn estimated_seconds(&self) -> u64 {
        self.exercises
            .iter()
            .flat_map(|g| g.exercises.iter())
            .map(|ex| ex.params.estimated_seconds())
            .sum()
    }

    pub fn is_scheduled_on(&self, weekday: Weekday) -> bool {
        self.weekdays.contains(&weekday)
    }
}

// ============================================================================
// History Types
// ============================================================================

/// Record of one completed session.
///
/// Exercise keys are a snapshot of the plan at completion time. A `None`
/// weight means the trainee left the field blank.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub weekdays: Vec<Weekday>,
    pub groups: Vec<MuscleGroup>,
    pub sub_groups: Vec<String>,
    #[serde(with = "day_month_year")]
    pub date: NaiveDate,
    pub weights: BTreeMap<String, Option<f64>>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl HistoryEntry {
    /// Recorded weight for an exercise, if the trainee entered one
    pub fn weight_for(&self, exercise: &str) -> Option<f64> {
        self.weights.get(exercise).copied().flatten()
    }
}

fn default_visible() -> bool {
    true
}

/// Dates are stored as `dd-mm-yyyy`
pub mod day_month_year {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d-%m-%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
