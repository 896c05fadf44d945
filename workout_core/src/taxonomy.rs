//! Fixed mapping from primary muscle groups to their sub-groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary muscle group a trainee can select
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MuscleGroup {
    #[serde(rename = "Peito")]
    Chest,
    #[serde(rename = "Costas")]
    Back,
    #[serde(rename = "Ombros")]
    Shoulders,
    #[serde(rename = "Braços")]
    Arms,
    #[serde(rename = "Pernas")]
    Legs,
    #[serde(rename = "Abdômen")]
    Core,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 6] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Shoulders,
        MuscleGroup::Arms,
        MuscleGroup::Legs,
        MuscleGroup::Core,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Peito",
            MuscleGroup::Back => "Costas",
            MuscleGroup::Shoulders => "Ombros",
            MuscleGroup::Arms => "Braços",
            MuscleGroup::Legs => "Pernas",
            MuscleGroup::Core => "Abdômen",
        }
    }

    /// Ordered sub-groups of this group
    pub fn sub_groups(&self) -> &'static [&'static str] {
        match self {
            MuscleGroup::Chest => &["Peitoral Superior", "Peitoral Médio", "Peitoral Inferior"],
            MuscleGroup::Back => &["Dorsais", "Trapézio", "Lombar"],
            MuscleGroup::Shoulders => &["Deltoide Anterior", "Deltoide Lateral", "Deltoide Posterior"],
            MuscleGroup::Arms => &["Bíceps", "Tríceps", "Antebraço"],
            MuscleGroup::Legs => &["Quadríceps", "Posteriores", "Glúteos", "Panturrilhas"],
            MuscleGroup::Core => &["Reto Abdominal", "Oblíquos"],
        }
    }

    /// Parent group of a sub-group, if the taxonomy knows it
    pub fn of_sub_group(sub_group: &str) -> Option<MuscleGroup> {
        Self::ALL
            .into_iter()
            .find(|g| g.sub_groups().iter().any(|s| *s == sub_group))
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for MuscleGroup {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let wanted = s.trim().to_lowercase();
        MuscleGroup::ALL
            .into_iter()
            .find(|g| g.name().to_lowercase() == wanted || format!("{:?}", g).to_lowercase() == wanted)
            .ok_or_else(|| crate::Error::Validation(format!("unknown muscle group '{}'", s.trim())))
    }
}

/// Reject empty, oversized or repeated group selections
pub fn validate_selection(groups: &[MuscleGroup]) -> crate::Result<()> {
    if groups.is_empty() || groups.len() > 3 {
        return Err(crate::Error::Validation(format!(
            "select between 1 and 3 muscle groups (got {})",
            groups.len()
        )));
    }
    for (i, group) in groups.iter().enumerate() {
        if groups[..i].contains(group) {
            return Err(crate::Error::Validation(format!("{} selected twice", group)));
        }
    }
    Ok(())
}
