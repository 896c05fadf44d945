//! Workout plan authoring and the plan collection.
//!
//! Plans are never edited in place: an edit replaces the whole object.
//! Each weekday may belong to at most one plan.

use crate::generator::GeneratedWorkout;
use crate::taxonomy::{validate_selection, MuscleGroup};
use crate::{
    Catalog, Error, ExerciseParams, PlanSubGroup, PlannedExercise, Result, WorkoutPlan,
};
use chrono::{Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A plan under construction, before weekday checks against other plans
#[derive(Clone, Debug, Default)]
pub struct PlanDraft {
    pub weekdays: Vec<Weekday>,
    pub groups: Vec<MuscleGroup>,
    pub exercises: Vec<PlanSubGroup>,
}

impl PlanDraft {
    pub fn new(weekdays: Vec<Weekday>, groups: Vec<MuscleGroup>) -> Self {
        Self {
            weekdays,
            groups,
            exercises: Vec::new(),
        }
    }

    /// Draft from a generator run
    pub fn from_generated(weekdays: Vec<Weekday>, generated: GeneratedWorkout) -> Self {
        Self {
            weekdays,
            groups: generated.groups,
            exercises: generated.exercises,
        }
    }

    /// Add an exercise with explicit parameters
    pub fn add(&mut self, sub_group: &str, name: &str, params: ExerciseParams) -> &mut Self {
        let planned = PlannedExercise {
            name: name.to_string(),
            params,
        };
        match self.exercises.iter_mut().find(|g| g.sub_group == sub_group) {
            Some(group) => group.exercises.push(planned),
            None => self.exercises.push(PlanSubGroup {
                sub_group: sub_group.to_string(),
                exercises: vec![planned],
            }),
        }
        self
    }

    /// Add a catalog exercise at its recommended low-end parameters
    pub fn pick(&mut self, catalog: &Catalog, name: &str, time_per_set: u32) -> Result<&mut Self> {
        let (sub_group, _, definition) = catalog
            .find(name)
            .ok_or_else(|| Error::NotFound(format!("exercise '{}'", name)))?;
        let params = definition.recommended_params(time_per_set);
        Ok(self.add(sub_group, name, params))
    }

    fn validate(&self) -> Result<()> {
        if self.weekdays.is_empty() || self.weekdays.len() > 3 {
            return Err(Error::Validation(format!(
                "a plan needs 1 to 3 weekdays (got {})",
                self.weekdays.len()
            )));
        }
        for (i, day) in self.weekdays.iter().enumerate() {
            if self.weekdays[..i].contains(day) {
                return Err(Error::Validation(format!("{} listed twice", day)));
            }
        }
        validate_selection(&self.groups)?;

        let mut count = 0;
        for group in &self.exercises {
            // Sub-groups outside the fixed taxonomy are user-defined and unchecked
            if let Some(parent) = MuscleGroup::of_sub_group(&group.sub_group) {
                if !self.groups.contains(&parent) {
                    return Err(Error::Validation(format!(
                        "{} belongs to {}, which is not among the plan's groups",
                        group.sub_group, parent
                    )));
                }
            }
            for ex in &group.exercises {
                if ex.params.sets == 0 {
                    return Err(Error::Validation(format!(
                        "'{}' must have at least one set",
                        ex.name
                    )));
                }
                count += 1;
            }
        }
        if count == 0 {
            return Err(Error::Validation("a plan needs at least one exercise".into()));
        }
        Ok(())
    }
}

/// Every saved plan; persisted as one array document
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct PlanBook {
    plans: Vec<WorkoutPlan>,
}

impl PlanBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plans(&self) -> &[WorkoutPlan] {
        &self.plans
    }

    pub fn get(&self, id: Uuid) -> Option<&WorkoutPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    pub fn for_weekday(&self, weekday: Weekday) -> Option<&WorkoutPlan> {
        self.plans.iter().find(|p| p.is_scheduled_on(weekday))
    }

    /// Weekdays already claimed, optionally ignoring one plan
    pub fn taken_weekdays(&self, except: Option<Uuid>) -> Vec<Weekday> {
        self.plans
            .iter()
            .filter(|p| Some(p.id) != except)
            .flat_map(|p| p.weekdays.iter().copied())
            .collect()
    }

    fn check_weekdays(&self, weekdays: &[Weekday], except: Option<Uuid>) -> Result<()> {
        let taken = self.taken_weekdays(except);
        match weekdays.iter().find(|d| taken.contains(d)) {
            Some(day) => Err(Error::WeekdayTaken(*day)),
            None => Ok(()),
        }
    }

    /// Validate and store a new plan
    pub fn create(&mut self, draft: PlanDraft) -> Result<&WorkoutPlan> {
        draft.validate()?;
        self.check_weekdays(&draft.weekdays, None)?;

        let plan = WorkoutPlan {
            id: Uuid::new_v4(),
            weekdays: draft.weekdays,
            groups: draft.groups,
            exercises: draft.exercises,
            created_at: Utc::now(),
        };
        tracing::info!("Created plan {} for {:?}", plan.id, plan.weekdays);
        self.plans.push(plan);
        Ok(&self.plans[self.plans.len() - 1])
    }

    /// Swap a plan for an edited copy, keeping its id and creation time
    pub fn replace(&mut self, id: Uuid, draft: PlanDraft) -> Result<&WorkoutPlan> {
        let idx = self
            .plans
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("plan {}", id)))?;
        draft.validate()?;
        self.check_weekdays(&draft.weekdays, Some(id))?;

        let created_at = self.plans[idx].created_at;
        self.plans[idx] = WorkoutPlan {
            id,
            weekdays: draft.weekdays,
            groups: draft.groups,
            exercises: draft.exercises,
            created_at,
        };
        tracing::info!("Replaced plan {}", id);
        Ok(&self.plans[idx])
    }

    /// Returns whether a plan was removed
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.plans.len();
        self.plans.retain(|p| p.id != id);
        let removed = self.plans.len() != before;
        if removed {
            tracing::info!("Deleted plan {}", id);
        }
        removed
    }
}
