//! Recommended workout generator.
//!
//! Greedily fills a target duration with catalog exercises reachable from
//! the selected muscle groups:
//! - Candidates are shuffled (pluggable via [`PoolOrdering`]) for variety
//! - Multi-joint movements are moved ahead of isolated ones
//! - The pool is walked cyclically, accepting exercises while the running
//!   total stays within the overshoot tolerance

use crate::taxonomy::{validate_selection, MuscleGroup};
use crate::{
    cost, Catalog, Error, ExerciseDefinition, ExerciseKind, ExerciseParams, PlanSubGroup,
    PlannedExercise, Result,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Seconds assumed per set when the catalog gives no timing
pub const DEFAULT_TIME_PER_SET: u32 = 45;

/// Accepted totals may exceed the target by this factor
pub const DEFAULT_OVERSHOOT_TOLERANCE: f64 = 1.2;

/// Tunables for a generation run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorSettings {
    pub time_per_set: u32,
    pub overshoot_tolerance: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            time_per_set: DEFAULT_TIME_PER_SET,
            overshoot_tolerance: DEFAULT_OVERSHOOT_TOLERANCE,
        }
    }
}

/// One exercise reachable from the selected groups
#[derive(Clone, Debug)]
pub struct Candidate<'a> {
    pub group: MuscleGroup,
    pub sub_group: &'a str,
    pub kind: ExerciseKind,
    pub definition: &'a ExerciseDefinition,
}

/// Decides the visiting order of the candidate pool before the
/// multi-joint-first partition is applied.
pub trait PoolOrdering {
    fn arrange(&mut self, pool: &mut [Candidate<'_>]);
}

/// Fresh shuffle on every call
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomOrdering;

impl PoolOrdering for RandomOrdering {
    fn arrange(&mut self, pool: &mut [Candidate<'_>]) {
        pool.shuffle(&mut rand::thread_rng());
    }
}

/// Reproducible shuffle driven by a seed
#[derive(Clone, Debug)]
pub struct SeededOrdering {
    rng: StdRng,
}

impl SeededOrdering {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PoolOrdering for SeededOrdering {
    fn arrange(&mut self, pool: &mut [Candidate<'_>]) {
        pool.shuffle(&mut self.rng);
    }
}

/// Leaves the pool in taxonomy/catalog order
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepOrder;

impl PoolOrdering for KeepOrder {
    fn arrange(&mut self, _pool: &mut [Candidate<'_>]) {}
}

/// Generator output, ready to embed into a plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratedWorkout {
    pub groups: Vec<MuscleGroup>,
    pub exercises: Vec<PlanSubGroup>,
    /// Sub-groups that received at least one exercise, per parent group
    pub involved: BTreeMap<MuscleGroup, Vec<String>>,
    pub estimated_seconds: u64,
}

impl GeneratedWorkout {
    pub fn exercise_count(&self) -> usize {
        self.exercises.iter().map(|g| g.exercises.len()).sum()
    }

    fn record(&mut self, candidate: &Candidate<'_>, params: ExerciseParams) {
        let planned = PlannedExercise {
            name: candidate.definition.name.clone(),
            params,
        };
        match self
            .exercises
            .iter_mut()
            .find(|g| g.sub_group == candidate.sub_group)
        {
            Some(group) => group.exercises.push(planned),
            None => self.exercises.push(PlanSubGroup {
                sub_group: candidate.sub_group.to_string(),
                exercises: vec![planned],
            }),
        }

        let involved = self.involved.entry(candidate.group).or_default();
        if !involved.iter().any(|s| s == candidate.sub_group) {
            involved.push(candidate.sub_group.to_string());
        }
        self.estimated_seconds += params.estimated_seconds();
    }
}

/// Every (group, sub-group, definition) triple reachable from the selection
pub fn build_pool<'a>(catalog: &'a Catalog, groups: &[MuscleGroup]) -> Vec<Candidate<'a>> {
    let mut pool = Vec::new();
    for &group in groups {
        for &sub_group in group.sub_groups() {
            let Some(entry) = catalog.get(sub_group) else {
                continue;
            };
            for (kind, definition) in entry.iter() {
                pool.push(Candidate {
                    group,
                    sub_group,
                    kind,
                    definition,
                });
            }
        }
    }
    pool
}

/// Generate with the default settings and a random order
pub fn generate_recommended(
    catalog: &Catalog,
    groups: &[MuscleGroup],
    target_seconds: i64,
) -> Result<GeneratedWorkout> {
    generate(
        catalog,
        groups,
        target_seconds,
        &GeneratorSettings::default(),
        &mut RandomOrdering,
    )
}

/// Fill `target_seconds` with exercises for the selected groups
pub fn generate(
    catalog: &Catalog,
    groups: &[MuscleGroup],
    target_seconds: i64,
    settings: &GeneratorSettings,
    ordering: &mut dyn PoolOrdering,
) -> Result<GeneratedWorkout> {
    validate_selection(groups)?;

    let mut pool = build_pool(catalog, groups);
    if pool.is_empty() {
        return Err(Error::EmptyCatalog);
    }
    if target_seconds <= 0 {
        return Err(Error::InvalidDuration(target_seconds));
    }

    ordering.arrange(&mut pool);
    // Stable: keeps the arranged order inside each kind
    pool.sort_by_key(|c| c.kind != ExerciseKind::MultiJoint);

    let target = target_seconds as u64;
    let limit = target as f64 * settings.overshoot_tolerance;
    let distinct: HashSet<&str> = pool
        .iter()
        .filter(|c| cost::first_of(&c.definition.sets) > 0)
        .map(|c| c.definition.name.as_str())
        .collect();
    let max_iterations = pool.len() * 2;

    let mut result = GeneratedWorkout {
        groups: groups.to_vec(),
        exercises: Vec::new(),
        involved: BTreeMap::new(),
        estimated_seconds: 0,
    };
    let mut accepted: HashSet<&str> = HashSet::new();
    let mut iterations = 0;

    while result.estimated_seconds < target
        && iterations < max_iterations
        && accepted.len() < distinct.len()
    {
        let candidate = &pool[iterations % pool.len()];
        iterations += 1;

        let name = candidate.definition.name.as_str();
        if accepted.contains(name) {
            continue;
        }
        let params = candidate.definition.recommended_params(settings.time_per_set);
        if params.sets == 0 {
            continue;
        }

        let cost = params.estimated_seconds();
        let accumulated = result.estimated_seconds;
        if accumulated == 0 || (accumulated + cost) as f64 <= limit {
            tracing::debug!(
                "Accepted '{}' ({}s) under {}; total {}s",
                name,
                cost,
                candidate.sub_group,
                accumulated + cost
            );
            accepted.insert(name);
            result.record(candidate, params);
        }
    }

    if result.exercises.is_empty() {
        return Err(Error::GenerationFailed);
    }

    tracing::info!(
        "Generated {} exercises for {:?}: ~{}s of {}s requested",
        result.exercise_count(),
        groups,
        result.estimated_seconds,
        target
    );

    Ok(result)
}
