//! Workout catalog
//!
//! The catalog is the reference set of workout definitions, grouped into
//! named categories. It is loaded once and only read while a schedule is
//! being edited. Lookups that miss resolve to [`UNKNOWN_WORKOUT`] instead of
//! failing, since schedules and history may outlive a deleted definition.

use crate::models::{WorkoutCategory, WorkoutDefinition};
use serde::{Deserialize, Serialize};

/// Placeholder shown for references to workouts no longer in the catalog
pub const UNKNOWN_WORKOUT: &str = "Unknown Workout";

/// Category metadata without its workouts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryInfo {
    pub key: String,
    pub name: String,
    pub description: String,
}

/// Result of resolving a workout id against the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Known(&'a WorkoutDefinition),
    Unknown(&'a str),
}

impl<'a> Resolved<'a> {
    pub fn definition(&self) -> Option<&'a WorkoutDefinition> {
        match self {
            Self::Known(def) => Some(def),
            Self::Unknown(_) => None,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Self::Known(def) => &def.name,
            Self::Unknown(_) => UNKNOWN_WORKOUT,
        }
    }

    pub fn nickname(&self) -> &'a str {
        match self {
            Self::Known(def) => &def.nickname,
            Self::Unknown(_) => UNKNOWN_WORKOUT,
        }
    }
}

/// Grouped, read-only set of workout definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<WorkoutCategory>,
}

impl Catalog {
    pub fn new(categories: Vec<WorkoutCategory>) -> Self {
        Self { categories }
    }

    /// Group flat definitions under the given categories
    ///
    /// Category order follows `categories`; workouts keep their input order.
    /// A workout whose category is not listed gets a category of its own,
    /// named after its key, appended at the end.
    pub fn from_definitions(categories: Vec<CategoryInfo>, workouts: Vec<WorkoutDefinition>) -> Self {
        let mut grouped: Vec<WorkoutCategory> = categories
            .into_iter()
            .map(|info| WorkoutCategory {
                key: info.key,
                name: info.name,
                description: info.description,
                workouts: Vec::new(),
            })
            .collect();

        for workout in workouts {
            match grouped.iter_mut().find(|c| c.key == workout.category) {
                Some(category) => category.workouts.push(workout),
                None => grouped.push(WorkoutCategory {
                    key: workout.category.clone(),
                    name: workout.category.clone(),
                    description: String::new(),
                    workouts: vec![workout],
                }),
            }
        }

        Self { categories: grouped }
    }

    pub fn categories(&self) -> &[WorkoutCategory] {
        &self.categories
    }

    pub fn into_categories(self) -> Vec<WorkoutCategory> {
        self.categories
    }

    /// Iterate over every definition in category order
    pub fn iter(&self) -> impl Iterator<Item = &WorkoutDefinition> {
        self.categories.iter().flat_map(|c| c.workouts.iter())
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.workouts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, id: &str) -> Option<&WorkoutDefinition> {
        self.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn resolve<'a>(&'a self, id: &'a str) -> Resolved<'a> {
        match self.find(id) {
            Some(def) => Resolved::Known(def),
            None => Resolved::Unknown(id),
        }
    }

    /// The built-in library of mile-training workouts
    pub fn seeded() -> Self {
        Self::from_definitions(seed_categories(), seed_workouts())
    }
}

/// Categories of the built-in library
pub fn seed_categories() -> Vec<CategoryInfo> {
    vec![
        CategoryInfo {
            key: "primary".to_string(),
            name: "Primary/Core Workouts (Tuesdays)".to_string(),
            description: "Longer intervals, pace work, and endurance-focused sessions".to_string(),
        },
        CategoryInfo {
            key: "secondary".to_string(),
            name: "Secondary/Speed Workouts (Fridays)".to_string(),
            description: "Shorter, faster intervals focused on speed and neuromuscular power"
                .to_string(),
        },
    ]
}

fn seeded(id: &str, category: &str, name: &str, nickname: &str, description: &str, rx: &str) -> WorkoutDefinition {
    WorkoutDefinition {
        id: id.to_string(),
        category: category.to_string(),
        name: name.to_string(),
        nickname: nickname.to_string(),
        description: description.to_string(),
        rx: rx.to_string(),
        version: 1,
        is_custom: false,
    }
}

/// Workouts of the built-in library
pub fn seed_workouts() -> Vec<WorkoutDefinition> {
    vec![
        seeded(
            "p1",
            "primary",
            "400-1000-400 Pyramid",
            "The Pyramid 1000",
            "2x 400m, 3x 1000m, 2x 400m",
            "400s @68-70s, 1000s @72-76s, 400s @68-70s w/ 400m recoveries",
        ),
        seeded(
            "p2",
            "primary",
            "200-400-600-400-200 Pyramid Sets",
            "The Pyramid 600",
            "2 x (200-400-600-400-200)",
            "200s @31-33s, 400s @68s, 600s @70-72s w/ 200m recoveries",
        ),
        seeded(
            "p3",
            "primary",
            "400m Alternating Recovery",
            "The 400 Alternator",
            "8-10 x 400m with alternating recovery",
            "Odds @68s w/ 100m recoveries, Evens @70s w/ 400m recoveries",
        ),
        seeded(
            "p4",
            "primary",
            "800-400-200-400-800 Sandwich",
            "The V",
            "2x800 @72, 1x400 @68, 1x200 @32, 1x400 @68, 2x800 @72",
            "800s @72s, 400s @68s, 200s @32s w/ 400m recoveries after 800s & 400s and 200m recoveries after 200s",
        ),
        seeded(
            "p5",
            "primary",
            "600-200 Couplets",
            "Dan's Couplets",
            "5 x (600-200)",
            "600s @70-72s, 200s @30-32s w/ 200m rec between, 400m rec between sets",
        ),
        seeded(
            "p6",
            "primary",
            "400-200-800-200-400",
            "The W",
            "2x400, 2x200, 2x800, 2x200, 2x400",
            "400s @66-68s, 200s @31-32s, 800s @72-75s w/ 200m rec (400m after 800s)",
        ),
        seeded(
            "p7",
            "primary",
            "600-400-200-100 Descending Ladder",
            "The Descender",
            "3x (600-400-200-100)",
            "600s @78s, 400s @76s, 200s @33s, 100s @16s w/ 200/400/300/400m recoveries",
        ),
        seeded(
            "p8",
            "primary",
            "400 @ Goal",
            "Goal Pace Special",
            "6x 400m @goal pace",
            "400s @64-67s (goal race pace) w/ 400m recoveries",
        ),
        seeded(
            "p9",
            "primary",
            "1000 @ Goal",
            "1000 Hot",
            "4x200, 1x1000, 4x150 one step",
            "200s @32s w/ 200m rec, 1000 @68s w/ 400m rec, 150s one step w/ 250m rec",
        ),
        seeded(
            "s1",
            "secondary",
            "200m Repeats",
            "My Little Delights",
            "6-8 x 200m",
            "@28-32s w/ 600m recoveries - best possible average",
        ),
        seeded(
            "s2",
            "secondary",
            "100m Strides",
            "Hunger Builder",
            "8 x 100m",
            "@12-14s w/ 300m recoveries - relaxed speed",
        ),
        seeded(
            "s3",
            "secondary",
            "300-200-100 Descending Triplets",
            "The Triplets",
            "3 x (300-200-100)",
            "300s @48-50s, 200s @30-33s, 100s @13-15s w/ 500/600/700m recoveries",
        ),
        seeded(
            "s4",
            "secondary",
            "150m One Step",
            "One Steps",
            "4-6 x 150m one step",
            "Relaxed acceleration to near-max w/ 250m recoveries",
        ),
        seeded(
            "s5",
            "secondary",
            "400m Time Trial",
            "The 400 TT",
            "4 x 400m @best average",
            "@59-62s w/ 1200m recoveries - race simulation",
        ),
        seeded(
            "s6",
            "secondary",
            "250m Repeats",
            "The 250s",
            "6 x 250m",
            "Fast effort w/ 650m recoveries",
        ),
        seeded(
            "s7",
            "secondary",
            "200-400-200 Sandwich",
            "400 All Out",
            "4x200, 1x400, 4x200",
            "200s @ 31-32s, 400 @ 58-60s w/ 200m recoveries after 200s and 600-800m recovery after the 400",
        ),
        seeded(
            "s8",
            "secondary",
            "300m Repeats",
            "The 300s",
            "6 x 300m",
            "@best possible average w/ 500m recoveries",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog_shape() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.categories().len(), 2);
        assert_eq!(catalog.categories()[0].workouts.len(), 9);
        assert_eq!(catalog.categories()[1].workouts.len(), 8);
        assert_eq!(catalog.len(), 17);
    }

    #[test]
    fn test_find_pyramid() {
        let catalog = Catalog::seeded();
        let p1 = catalog.find("p1").unwrap();
        assert_eq!(p1.name, "400-1000-400 Pyramid");
        assert_eq!(p1.nickname, "The Pyramid 1000");
        assert!(!p1.is_custom);
    }

    #[test]
    fn test_resolve_missing_is_placeholder() {
        let catalog = Catalog::seeded();
        let resolved = catalog.resolve("gone");
        assert_eq!(resolved, Resolved::Unknown("gone"));
        assert_eq!(resolved.name(), UNKNOWN_WORKOUT);
        assert_eq!(resolved.nickname(), UNKNOWN_WORKOUT);
        assert!(resolved.definition().is_none());
    }

    #[test]
    fn test_unlisted_category_is_appended() {
        let mut custom = seed_workouts().remove(0);
        custom.id = "hill-1".to_string();
        custom.category = "hills".to_string();

        let catalog = Catalog::from_definitions(seed_categories(), vec![custom]);
        assert_eq!(catalog.categories().len(), 3);
        assert_eq!(catalog.categories()[2].key, "hills");
        assert_eq!(catalog.categories()[2].workouts[0].id, "hill-1");
        assert!(catalog.categories()[0].workouts.is_empty());
    }
}
