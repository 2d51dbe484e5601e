use super::scheduling_state::SchedulingState;
use super::scoring::{LocationScore, LocationScorer, ScoringContext};
use crate::constants::SLOT_OVERRUN_FACTOR;
use crate::models::{Interest, Location};
use std::collections::HashSet;

/// One picker invocation: the candidate pool plus the slot's constraints.
/// Picks borrow from the pool (`'p`); everything else is only read while
/// scoring (`'c`).
pub struct PickRequest<'p, 'c> {
    /// Candidates in stable snapshot order
    pub pool: &'p [&'p Location],
    /// Interest the pick must serve; `None` accepts any category
    pub interest: Option<Interest>,
    pub state: &'c SchedulingState,
    pub remaining_minutes: u32,
    pub travel_buffer_minutes: u32,
    /// First activity of its slot: no travel buffer and no overrun allowance
    pub is_first_in_slot: bool,
    /// Restrict to these ids when zone restriction is allowed
    pub zone_filter: Option<&'c HashSet<String>>,
    pub scoring: &'c ScoringContext<'c>,
}

#[derive(Debug, Clone)]
pub struct PickedLocation<'a> {
    pub location: &'a Location,
    pub score: LocationScore,
    /// Names of the best runners-up, for "alternatives considered"
    pub alternatives: Vec<String>,
}

impl PickedLocation<'_> {
    pub fn duration_minutes(&self) -> u32 {
        self.location.visit_duration_minutes()
    }
}

pub struct LocationPicker<'s> {
    scorer: &'s dyn LocationScorer,
    max_runner_ups: usize,
}

impl<'s> LocationPicker<'s> {
    pub fn new(scorer: &'s dyn LocationScorer, max_runner_ups: usize) -> Self {
        Self {
            scorer,
            max_runner_ups,
        }
    }

    /// Whether a candidate may be considered at all, before scoring
    pub fn is_eligible(location: &Location, request: &PickRequest<'_, '_>) -> bool {
        if location.is_food() || request.state.is_used(location) {
            return false;
        }
        if let Some(interest) = request.interest {
            if !interest.matches(location.category) {
                return false;
            }
        }
        if let Some(filter) = request.zone_filter {
            if !filter.contains(&location.id) {
                return false;
            }
        }
        fits_time(location.visit_duration_minutes(), request)
    }

    /// Highest-scoring eligible candidate; ties go to the earliest in the pool
    pub fn pick_location_for_time_slot<'p>(
        &self,
        request: &PickRequest<'p, '_>,
    ) -> Option<PickedLocation<'p>> {
        let mut scored: Vec<(LocationScore, &'p Location)> = request
            .pool
            .iter()
            .copied()
            .filter(|location| Self::is_eligible(location, request))
            .map(|location| (self.scorer.score_location(location, request.scoring), location))
            .collect();

        if scored.is_empty() {
            return None;
        }

        let mut best = 0;
        for (i, (score, _)) in scored.iter().enumerate().skip(1) {
            if score.score > scored[best].0.score {
                best = i;
            }
        }
        let (score, location) = scored.remove(best);

        // Stable sort keeps pool order among equal scores
        scored.sort_by(|a, b| b.0.score.total_cmp(&a.0.score));
        let alternatives = scored
            .iter()
            .take(self.max_runner_ups)
            .map(|(_, l)| l.name.clone())
            .collect();

        Some(PickedLocation {
            location,
            score,
            alternatives,
        })
    }
}

fn fits_time(duration: u32, request: &PickRequest<'_, '_>) -> bool {
    if request.is_first_in_slot {
        duration <= request.remaining_minutes
    } else {
        let needed = (duration + request.travel_buffer_minutes) as f64;
        needed <= request.remaining_minutes as f64 * SLOT_OVERRUN_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AccessibilityNeeds, GroupComposition, LocationCategory, TimeSlot, WeatherPreferences,
    };
    use crate::services::itinerary_generator::scoring::WeightedScorer;

    struct Fixture {
        accessibility: AccessibilityNeeds,
        group: GroupComposition,
        prefs: WeatherPreferences,
        content: HashSet<String>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                accessibility: AccessibilityNeeds::default(),
                group: GroupComposition::default(),
                prefs: WeatherPreferences::default(),
                content: HashSet::new(),
            }
        }

        fn context(&self) -> ScoringContext<'_> {
            ScoringContext {
                interests: &[Interest::Culture],
                current_interest: Some(Interest::Culture),
                budget: None,
                accessibility: &self.accessibility,
                group: &self.group,
                weather: None,
                weather_preferences: &self.prefs,
                time_slot: TimeSlot::Morning,
                last_coordinates: None,
                day_categories: &[],
                day_neighborhoods: &[],
                content_ids: &self.content,
            }
        }
    }

    fn loc(id: &str, category: LocationCategory, minutes: u32) -> Location {
        Location::new(id, id, "kyoto", "kansai", category).with_duration(minutes)
    }

    fn request<'a>(
        pool: &'a [&'a Location],
        state: &'a SchedulingState,
        scoring: &'a ScoringContext<'a>,
    ) -> PickRequest<'a, 'a> {
        PickRequest {
            pool,
            interest: Some(Interest::Culture),
            state,
            remaining_minutes: 120,
            travel_buffer_minutes: 20,
            is_first_in_slot: false,
            zone_filter: None,
            scoring,
        }
    }

    #[test]
    fn test_excludes_food_used_and_off_interest() {
        let fixture = Fixture::new();
        let context = fixture.context();
        let scorer = WeightedScorer::default();
        let picker = LocationPicker::new(&scorer, 3);

        let ramen = loc("ramen", LocationCategory::Restaurant, 60);
        let park = loc("park", LocationCategory::Park, 60);
        let used = loc("used", LocationCategory::Temple, 60);
        let pool = vec![&ramen, &park, &used];

        let mut state = SchedulingState::new();
        state.commit(&used);
        assert!(picker
            .pick_location_for_time_slot(&request(&pool, &state, &context))
            .is_none());

        let any_interest = PickRequest {
            interest: None,
            ..request(&pool, &state, &context)
        };
        let picked = picker.pick_location_for_time_slot(&any_interest).unwrap();
        assert_eq!(picked.location.id, "park");
    }

    #[test]
    fn test_time_fit_rules() {
        let fixture = Fixture::new();
        let context = fixture.context();
        let scorer = WeightedScorer::default();
        let picker = LocationPicker::new(&scorer, 3);
        let state = SchedulingState::new();

        // 120 + 20 travel = 140 > 120 * 1.1
        let long = loc("long", LocationCategory::Temple, 120);
        // 110 + 20 = 130 <= 132
        let snug = loc("snug", LocationCategory::Temple, 110);
        let pool = vec![&long, &snug];

        let picked = picker
            .pick_location_for_time_slot(&request(&pool, &state, &context))
            .unwrap();
        assert_eq!(picked.location.id, "snug");

        let first = PickRequest {
            is_first_in_slot: true,
            remaining_minutes: 115,
            ..request(&pool, &state, &context)
        };
        let picked = picker.pick_location_for_time_slot(&first).unwrap();
        assert_eq!(picked.location.id, "snug");

        let too_tight = PickRequest {
            is_first_in_slot: true,
            remaining_minutes: 100,
            ..request(&pool, &state, &context)
        };
        assert!(picker.pick_location_for_time_slot(&too_tight).is_none());
    }

    #[test]
    fn test_ties_go_to_first_seen_and_runner_ups_attached() {
        let fixture = Fixture::new();
        let context = fixture.context();
        let scorer = WeightedScorer::default();
        let picker = LocationPicker::new(&scorer, 2);
        let state = SchedulingState::new();

        let a = loc("a", LocationCategory::Temple, 60);
        let b = loc("b", LocationCategory::Temple, 60);
        let c = loc("c", LocationCategory::Temple, 60);
        let d = loc("d", LocationCategory::Temple, 60);
        let pool = vec![&a, &b, &c, &d];

        let picked = picker
            .pick_location_for_time_slot(&request(&pool, &state, &context))
            .unwrap();
        assert_eq!(picked.location.id, "a");
        assert_eq!(picked.alternatives, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_zone_filter_restricts_pool() {
        let fixture = Fixture::new();
        let context = fixture.context();
        let scorer = WeightedScorer::default();
        let picker = LocationPicker::new(&scorer, 3);
        let state = SchedulingState::new();

        let a = loc("a", LocationCategory::Temple, 60);
        let b = loc("b", LocationCategory::Temple, 60);
        let pool = vec![&a, &b];
        let zone: HashSet<String> = ["b".to_string()].into_iter().collect();

        let zoned = PickRequest {
            zone_filter: Some(&zone),
            ..request(&pool, &state, &context)
        };
        assert_eq!(picker.pick_location_for_time_slot(&zoned).unwrap().location.id, "b");
    }
}
