//! Exercise catalog: definitions grouped by body sub-region.
//!
//! The catalog is persisted as one document keyed by sub-group name. A
//! built-in seed is used until the user saves their own copy.

use crate::taxonomy::MuscleGroup;
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cached seed catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached seed catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Registry of exercise definitions keyed by sub-group
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct Catalog {
    sub_groups: BTreeMap<String, SubGroupExercises>,
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition into a sub-group's kind-list.
    ///
    /// Duplicate names are tolerated; see [`Catalog::add_unique_exercise`].
    pub fn add_exercise(
        &mut self,
        group: &str,
        sub_group: &str,
        kind: ExerciseKind,
        definition: ExerciseDefinition,
    ) -> Result<()> {
        if is_blank(group) {
            return Err(Error::Validation("muscle group must not be empty".into()));
        }
        if is_blank(sub_group) {
            return Err(Error::Validation("sub-group must not be empty".into()));
        }
        if is_blank(&definition.name) {
            return Err(Error::Validation("exercise name must not be empty".into()));
        }

        tracing::debug!(
            "Adding {:?} exercise '{}' to {}/{}",
            kind,
            definition.name,
            group,
            sub_group
        );

        self.sub_groups
            .entry(sub_group.to_string())
            .or_default()
            .list_mut(kind)
            .push(definition);
        Ok(())
    }

    /// Like [`Catalog::add_exercise`] but refuses a name already present in the sub-group
    pub fn add_unique_exercise(
        &mut self,
        group: &str,
        sub_group: &str,
        kind: ExerciseKind,
        definition: ExerciseDefinition,
    ) -> Result<()> {
        if self.contains(sub_group, &definition.name) {
            return Err(Error::Validation(format!(
                "'{}' already exists in {}",
                definition.name.trim(),
                sub_group
            )));
        }
        self.add_exercise(group, sub_group, kind, definition)
    }

    /// Remove every entry with this name from both kind-lists. Returns the number removed.
    pub fn remove_exercise(&mut self, sub_group: &str, name: &str) -> usize {
        let Some(entry) = self.sub_groups.get_mut(sub_group) else {
            return 0;
        };
        let before = entry.isolated.len() + entry.multi.len();
        entry.isolated.retain(|d| d.name != name);
        entry.multi.retain(|d| d.name != name);
        let removed = before - entry.isolated.len() - entry.multi.len();
        if removed > 0 {
            tracing::debug!("Removed {} x '{}' from {}", removed, name, sub_group);
        }
        removed
    }

    /// Both kind-lists for a sub-group, empty when the sub-group is unknown
    pub fn list_by_sub_group(&self, sub_group: &str) -> SubGroupExercises {
        self.sub_groups.get(sub_group).cloned().unwrap_or_default()
    }

    pub fn get(&self, sub_group: &str) -> Option<&SubGroupExercises> {
        self.sub_groups.get(sub_group)
    }

    pub fn contains(&self, sub_group: &str, name: &str) -> bool {
        let name = name.trim();
        self.sub_groups
            .get(sub_group)
            .map(|e| e.iter().any(|(_, d)| d.name.trim() == name))
            .unwrap_or(false)
    }

    /// First definition with this name anywhere in the catalog
    pub fn find(&self, name: &str) -> Option<(&str, ExerciseKind, &ExerciseDefinition)> {
        self.sub_groups.iter().find_map(|(sub, entry)| {
            entry
                .iter()
                .find(|(_, d)| d.name == name)
                .map(|(kind, d)| (sub.as_str(), kind, d))
        })
    }

    pub fn sub_group_names(&self) -> impl Iterator<Item = &str> {
        self.sub_groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sub_groups
            .values()
            .map(|e| e.isolated.len() + e.multi.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of problems, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (sub_group, entry) in &self.sub_groups {
            if is_blank(sub_group) {
                errors.push("Catalog has a blank sub-group key".to_string());
            }
            if MuscleGroup::of_sub_group(sub_group).is_none() {
                errors.push(format!(
                    "Sub-group '{}' is not part of the muscle taxonomy",
                    sub_group
                ));
            }
            for (_, def) in entry.iter() {
                if is_blank(&def.name) {
                    errors.push(format!("Sub-group '{}' has an unnamed exercise", sub_group));
                    continue;
                }
                if crate::cost::first_of(&def.sets) == 0 {
                    errors.push(format!(
                        "'{}' in {}: sets range '{}' has no usable low end",
                        def.name, sub_group, def.sets
                    ));
                }
                if crate::cost::first_of(&def.reps) == 0 {
                    errors.push(format!(
                        "'{}' in {}: reps range '{}' has no usable low end",
                        def.name, sub_group, def.reps
                    ));
                }
            }
        }

        errors
    }
}

fn def(name: &str, sets: &str, reps: &str, rest: &str) -> ExerciseDefinition {
    ExerciseDefinition::new(name, sets, reps, rest)
}

/// Builds the seed catalog used until the user saves their own
pub fn build_default_catalog() -> Catalog {
    use ExerciseKind::{Isolated, MultiJoint};

    let seed: Vec<(MuscleGroup, &str, ExerciseKind, ExerciseDefinition)> = vec![
        // Peito
        (MuscleGroup::Chest, "Peitoral Médio", MultiJoint, ExerciseDefinition {
            synergists: Some("Tríceps, Deltoide Anterior".into()),
            antagonists: Some("Dorsais".into()),
            ..def("Supino Reto", "3-4", "8-12", "60-90")
        }),
        (MuscleGroup::Chest, "Peitoral Médio", Isolated, def("Crucifixo com Halteres", "3", "10-12", "60")),
        (MuscleGroup::Chest, "Peitoral Superior", MultiJoint, def("Supino Inclinado", "3-4", "8-12", "60-90")),
        (MuscleGroup::Chest, "Peitoral Superior", Isolated, def("Crossover Alto", "3", "12-15", "45-60")),
        (MuscleGroup::Chest, "Peitoral Inferior", MultiJoint, def("Mergulho nas Paralelas", "3", "8-10", "90")),
        // Costas
        (MuscleGroup::Back, "Dorsais", MultiJoint, ExerciseDefinition {
            synergists: Some("Bíceps".into()),
            antagonists: Some("Peitoral Médio".into()),
            ..def("Puxada Frontal", "3-4", "8-12", "60-90")
        }),
        (MuscleGroup::Back, "Dorsais", MultiJoint, def("Remada Curvada", "3-4", "8-10", "90")),
        (MuscleGroup::Back, "Dorsais", Isolated, def("Pullover", "3", "12", "60")),
        (MuscleGroup::Back, "Trapézio", Isolated, def("Encolhimento", "3", "12-15", "45")),
        (MuscleGroup::Back, "Lombar", MultiJoint, def("Levantamento Terra", "3", "5-8", "120-180")),
        (MuscleGroup::Back, "Lombar", Isolated, def("Hiperextensão Lombar", "3", "12-15", "45-60")),
        // Ombros
        (MuscleGroup::Shoulders, "Deltoide Anterior", MultiJoint, def("Desenvolvimento Militar", "3-4", "8-10", "90")),
        (MuscleGroup::Shoulders, "Deltoide Anterior", Isolated, def("Elevação Frontal", "3", "12", "45")),
        (MuscleGroup::Shoulders, "Deltoide Lateral", Isolated, def("Elevação Lateral", "3-4", "12-15", "45")),
        (MuscleGroup::Shoulders, "Deltoide Posterior", Isolated, def("Crucifixo Inverso", "3", "12-15", "45")),
        // Braços
        (MuscleGroup::Arms, "Bíceps", Isolated, def("Rosca Direta", "3", "8-12", "60")),
        (MuscleGroup::Arms, "Bíceps", Isolated, def("Rosca Martelo", "3", "10-12", "60")),
        (MuscleGroup::Arms, "Tríceps", MultiJoint, def("Supino Fechado", "3", "8-10", "90")),
        (MuscleGroup::Arms, "Tríceps", Isolated, def("Tríceps Pulley", "3", "10-12", "60")),
        (MuscleGroup::Arms, "Antebraço", Isolated, def("Rosca de Punho", "2-3", "15-20", "45")),
        // Pernas
        (MuscleGroup::Legs, "Quadríceps", MultiJoint, ExerciseDefinition {
            synergists: Some("Glúteos, Posteriores".into()),
            ..def("Agachamento Livre", "4", "6-10", "90-120")
        }),
        (MuscleGroup::Legs, "Quadríceps", MultiJoint, def("Leg Press", "3-4", "10-12", "90")),
        (MuscleGroup::Legs, "Quadríceps", Isolated, def("Cadeira Extensora", "3", "12-15", "60")),
        (MuscleGroup::Legs, "Posteriores", MultiJoint, def("Stiff", "3", "8-10", "90")),
        (MuscleGroup::Legs, "Posteriores", Isolated, def("Mesa Flexora", "3", "10-12", "60")),
        (MuscleGroup::Legs, "Glúteos", MultiJoint, def("Elevação Pélvica", "3-4", "8-12", "90")),
        (MuscleGroup::Legs, "Panturrilhas", Isolated, def("Panturrilha em Pé", "4", "12-20", "45")),
        // Abdômen
        (MuscleGroup::Core, "Reto Abdominal", Isolated, def("Abdominal Supra", "3", "15-20", "45")),
        (MuscleGroup::Core, "Reto Abdominal", Isolated, def("Prancha", "3", "30-60", "45").time_based()),
        (MuscleGroup::Core, "Oblíquos", Isolated, def("Prancha Lateral", "3", "30-45", "45").time_based()),
    ];

    let mut catalog = Catalog::new();
    for (group, sub_group, kind, definition) in seed {
        let name = definition.name.clone();
        let added = catalog.add_exercise(group.name(), sub_group, kind, definition);
        debug_assert!(added.is_ok(), "seed entry '{}' rejected: {:?}", name, added);
    }
    catalog
}
