use super::activity_builder::{
    activity_tags, day_label, preferred_slot_for_saved, recommendation_reason, resolve_day_date,
    DayBuilder,
};
use super::city_sequence::build_city_sequence;
use super::day_trip::{
    day_trip_targets, max_day_trips, should_suggest_day_trip, DayTripConfig, DayTripQuery,
};
use super::geo_validator::CityGeoReference;
use super::location_index::LocationIndex;
use super::location_picker::{LocationPicker, PickRequest, PickedLocation};
use super::scheduling_state::SchedulingState;
use super::scoring::{LocationScorer, ScoringContext};
use super::time_slots::{activities_per_day, slot_budget, travel_time};
use super::zones::{ZoneMap, ZoneSelection};
use crate::config::GeneratorConfig;
use crate::constants::{
    DAY_TRIP_MIN_TARGET_LOCATIONS, MAX_CONSECUTIVE_PICK_FAILURES, MIN_ZONE_SIZE,
    SAVED_SLOT_OVERFLOW_RATIO, SLOT_MIN_REMAINING_RATIO, SLOT_OVERRUN_FACTOR,
};
use crate::models::{
    normalize_key, CityInfo, Coordinates, DayTripInfo, ForecastsByCity, Interest, Itinerary,
    ItineraryDay, Location, LocationCategory, Pace, RecommendationReason, TimeSlot,
    TripBuilderData, WeatherForecast,
};
use std::collections::{HashMap, HashSet};
use time::Date;

const SAVED_PRIMARY_REASON: &str = "One of your saved places";

/// Per-city data derived once from the snapshot
struct CityData<'a> {
    /// Geo-valid, non-food locations in snapshot order
    candidates: Vec<&'a Location>,
    zones: Option<ZoneMap>,
}

/// Zone a day concentrates on, restricted to members still available
struct DayZone {
    members: HashSet<String>,
    expanded: HashSet<String>,
}

/// Minutes and activity counts committed per slot
#[derive(Debug, Default)]
struct SlotLoad {
    minutes: [u32; 3],
    placed: [u32; 3],
}

impl SlotLoad {
    fn add(&mut self, slot: TimeSlot, minutes: u32) {
        self.minutes[slot as usize] += minutes;
        self.placed[slot as usize] += 1;
    }

    fn travel_before(&self, slot: TimeSlot, pace: Pace) -> u32 {
        if self.placed[slot as usize] == 0 {
            0
        } else {
            travel_time(pace)
        }
    }
}

/// Running per-day context shared by the scorer
#[derive(Debug, Default)]
struct DayTrail {
    categories: Vec<LocationCategory>,
    neighborhoods: Vec<String>,
    last_coordinates: Option<Coordinates>,
}

impl DayTrail {
    fn record(&mut self, location: &Location) {
        self.categories.push(location.category);
        if let Some(neighborhood) = &location.neighborhood {
            self.neighborhoods.push(neighborhood.clone());
        }
        if location.coordinates.is_some() {
            self.last_coordinates = location.coordinates;
        }
    }
}

/// Interests in the order slots cycle through them: the top interest
/// alternates with each of the others in rank order.
pub fn interest_sequence(ranked: &[Interest]) -> Vec<Interest> {
    match ranked {
        [] => Vec::new(),
        [only] => vec![*only],
        [top, rest @ ..] => rest.iter().flat_map(|other| [*top, *other]).collect(),
    }
}

/// One synchronous planning pass over a fixed snapshot. Owns the
/// scheduling state for the whole run.
pub struct DayPlanner<'a> {
    trip: &'a TripBuilderData,
    index: &'a LocationIndex,
    forecasts: &'a ForecastsByCity,
    config: &'a GeneratorConfig,
    scorer: &'a dyn LocationScorer,
    pace: Pace,
    interests: Vec<Interest>,
    interest_cycle: Vec<Interest>,
    content_ids: HashSet<String>,
    saved_ids: HashSet<String>,
    state: SchedulingState,
    cities: HashMap<String, CityData<'a>>,
}

impl<'a> DayPlanner<'a> {
    pub fn new(
        trip: &'a TripBuilderData,
        index: &'a LocationIndex,
        forecasts: &'a ForecastsByCity,
        config: &'a GeneratorConfig,
        scorer: &'a dyn LocationScorer,
    ) -> Self {
        let interests = trip.ranked_interests();
        DayPlanner {
            trip,
            index,
            forecasts,
            config,
            scorer,
            pace: trip.pace(),
            interest_cycle: interest_sequence(&interests),
            interests,
            content_ids: trip.content_location_ids.iter().cloned().collect(),
            saved_ids: trip.saved_ids.iter().cloned().collect(),
            state: SchedulingState::new(),
            cities: HashMap::new(),
        }
    }

    /// Plan every day of the trip
    pub fn plan(mut self, total_days: u32) -> Itinerary {
        let sequence = build_city_sequence(self.trip, self.index, total_days);
        let selected: HashSet<&str> = sequence.iter().map(|c| c.key.as_str()).collect();
        let selected_city_count = selected.len();
        let day_trip_cap = max_day_trips(total_days);

        let mut days_in_city: HashMap<String, usize> = HashMap::new();
        for city in &sequence {
            *days_in_city.entry(city.key.clone()).or_default() += 1;
        }
        let mut visited_in_city: HashMap<String, usize> = HashMap::new();
        let mut base_days_seen: HashMap<String, usize> = HashMap::new();

        let mut days = Vec::with_capacity(sequence.len());
        let mut previous_city: Option<&str> = None;
        let mut consecutive: u32 = 0;

        for (offset, base) in sequence.iter().enumerate() {
            consecutive = if previous_city == Some(base.key.as_str()) {
                consecutive + 1
            } else {
                1
            };
            previous_city = Some(base.key.as_str());

            let seen = base_days_seen.entry(base.key.clone()).or_default();
            *seen += 1;
            let final_base_day = *seen >= days_in_city.get(&base.key).copied().unwrap_or(1);
            // The last base day in a city stays there while saved places are pending
            let hold_for_saved = final_base_day && self.has_pending_saved(&base.key);

            let day_trip = if base.is_placeholder()
                || hold_for_saved
                || self.state.day_trip_count() >= day_trip_cap
            {
                None
            } else {
                self.evaluate_day_trip(base, selected_city_count, consecutive)
            };

            let (active, zone_day, zone_days_total, force_saved) = match &day_trip {
                Some(config) => {
                    self.state.record_day_trip();
                    consecutive = 0;
                    let target = self.index.city_info(&config.target_city).unwrap_or_else(|| {
                        CityInfo::new(config.target_city.clone(), config.target_city.clone(), None)
                    });
                    (target, 0, 1, true)
                }
                None => {
                    let seen = visited_in_city.entry(base.key.clone()).or_default();
                    let day_in_city = *seen;
                    *seen += 1;
                    let total = days_in_city.get(&base.key).copied().unwrap_or(1);
                    (base.clone(), day_in_city, total, final_base_day)
                }
            };

            let day = self.plan_day(
                offset as u32,
                base,
                &active,
                day_trip.as_ref(),
                zone_day,
                zone_days_total,
                force_saved,
            );
            days.push(day);
        }

        let itinerary = Itinerary { days };
        tracing::info!(
            days = itinerary.days.len(),
            activities = itinerary.place_count(),
            day_trips = itinerary.day_trip_count(),
            "Generated itinerary"
        );
        itinerary
    }

    fn ensure_city(&mut self, city_key: &str) {
        if self.cities.contains_key(city_key) {
            return;
        }
        let index: &'a LocationIndex = self.index;
        let located = index.locations_in(city_key);
        let reference = CityGeoReference::for_city(city_key, &located);
        let candidates: Vec<&'a Location> = located
            .into_iter()
            .filter(|l| !l.is_food() && reference.is_valid(l))
            .collect();
        let zones = ZoneMap::build(city_key, &candidates, self.config.zone_cell_size_km);
        self.cities
            .insert(city_key.to_string(), CityData { candidates, zones });
    }

    fn unused_count(&mut self, city_key: &str) -> usize {
        self.ensure_city(city_key);
        self.cities
            .get(city_key)
            .map(|data| data.candidates.iter().filter(|l| !self.state.is_used(l)).count())
            .unwrap_or(0)
    }

    fn evaluate_day_trip(
        &mut self,
        base: &CityInfo,
        selected_city_count: usize,
        consecutive: u32,
    ) -> Option<DayTripConfig> {
        let unused_location_count = self.unused_count(&base.key);
        let viable: HashSet<&str> = day_trip_targets(&base.key)
            .iter()
            .filter(|t| self.unused_count(t.city_key) >= DAY_TRIP_MIN_TARGET_LOCATIONS)
            .map(|t| t.city_key)
            .collect();

        let query = DayTripQuery {
            current_city_key: &base.key,
            selected_city_count,
            consecutive_days_in_city: consecutive,
            unused_location_count,
            target_activities_per_day: activities_per_day(self.pace),
        };
        should_suggest_day_trip(&query, |city| viable.contains(city))
    }

    /// Unused candidates for a day, with repeated names collapsed to the
    /// first row seen
    fn day_pool(&mut self, city_key: &str) -> Vec<&'a Location> {
        self.ensure_city(city_key);
        let Some(data) = self.cities.get(city_key) else {
            return Vec::new();
        };
        let mut seen_names = HashSet::new();
        data.candidates
            .iter()
            .copied()
            .filter(|l| !self.state.is_used(l))
            .filter(|l| seen_names.insert(l.normalized_name()))
            .collect()
    }

    fn select_day_zone(
        &mut self,
        city_key: &str,
        pool: &[&Location],
        day_in_city: usize,
        total_days_in_city: usize,
    ) -> Option<DayZone> {
        let map = self.cities.get(city_key)?.zones.as_ref()?;
        let available: HashSet<String> = pool.iter().map(|l| l.id.clone()).collect();
        let used_zone_ids = self.state.used_zones(city_key);

        let zone = map.select_zone_for_day(&ZoneSelection {
            day_in_city,
            total_days_in_city,
            used_zone_ids: &used_zone_ids,
            interests: &self.interests,
            prioritized_ids: &self.saved_ids,
            available_ids: Some(&available),
        })?;

        let members: HashSet<String> = zone
            .location_ids
            .iter()
            .filter(|id| available.contains(*id))
            .cloned()
            .collect();
        if members.len() < MIN_ZONE_SIZE {
            return None;
        }
        let zone_id = zone.id.clone();
        let expanded = map.expanded_zone_location_ids(&zone_id);
        self.state.mark_zone_used(city_key, &zone_id);
        Some(DayZone { members, expanded })
    }

    fn forecast_for(&self, city_key: &str, date: Option<Date>) -> Option<&'a WeatherForecast> {
        let forecasts: &'a ForecastsByCity = self.forecasts;
        forecasts.get(city_key)?.get(&date?)
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_day(
        &mut self,
        offset: u32,
        base: &CityInfo,
        active: &CityInfo,
        day_trip: Option<&DayTripConfig>,
        day_in_city: usize,
        total_days_in_city: usize,
        force_saved: bool,
    ) -> ItineraryDay {
        let day_number = offset + 1;
        let (date, weekday) = resolve_day_date(self.trip.dates.start, offset);
        let weather = self.forecast_for(&active.key, date);
        let day_trip_minutes = day_trip.map(|c| c.travel_minutes);

        let mut builder = DayBuilder::new(day_number);
        let mut load = SlotLoad::default();
        let mut trail = DayTrail::default();

        if let Some(config) = day_trip {
            builder.push_note(
                TimeSlot::Morning,
                format!("Day trip to {}", active.label),
                format!(
                    "Travel from {} to {} (about {} min each way) and return in the evening.",
                    base.label, active.label, config.travel_minutes
                ),
            );
        }

        let pool = self.day_pool(&active.key);
        let zone = self.select_day_zone(&active.key, &pool, day_in_city, total_days_in_city);

        self.insert_saved_locations(
            &active.key,
            day_trip_minutes,
            force_saved,
            weather,
            &mut builder,
            &mut load,
            &mut trail,
        );

        if pool.is_empty() {
            tracing::warn!(day = day_number, city = %active.key, "No locations available for day");
        }

        let picker = LocationPicker::new(self.scorer, self.config.max_runner_ups);
        let mut cursor = offset as usize;

        for slot in TimeSlot::ALL {
            if !pool.iter().any(|l| !self.state.is_used(l)) {
                if !pool.is_empty() {
                    tracing::warn!(
                        day = day_number,
                        city = %active.key,
                        slot = %slot,
                        "Locations exhausted, ending day early"
                    );
                }
                break;
            }

            let budget = slot_budget(slot, self.pace, day_trip_minutes);
            let mut failures = 0;
            let mut attempts = 0;

            while attempts < self.config.max_attempts_per_slot {
                attempts += 1;
                let used = load.minutes[slot as usize];
                let remaining = budget.saturating_sub(used);
                if load.placed[slot as usize] > 0
                    && (remaining as f64) < budget as f64 * SLOT_MIN_REMAINING_RATIO
                {
                    break;
                }

                let interest = if self.interest_cycle.is_empty() {
                    None
                } else {
                    let i = self.interest_cycle[cursor % self.interest_cycle.len()];
                    cursor += 1;
                    Some(i)
                };
                let travel = load.travel_before(slot, self.pace);

                let picked = {
                    let context = ScoringContext {
                        interests: &self.interests,
                        current_interest: interest,
                        budget: self.trip.budget,
                        accessibility: &self.trip.accessibility,
                        group: &self.trip.group,
                        weather,
                        weather_preferences: &self.trip.weather_preferences,
                        time_slot: slot,
                        last_coordinates: trail.last_coordinates,
                        day_categories: &trail.categories,
                        day_neighborhoods: &trail.neighborhoods,
                        content_ids: &self.content_ids,
                    };
                    let tiers: [(Option<&HashSet<String>>, Option<Interest>); 4] = [
                        (zone.as_ref().map(|z| &z.members), interest),
                        (zone.as_ref().map(|z| &z.expanded), interest),
                        (None, interest),
                        (None, None),
                    ];
                    tiers
                        .iter()
                        .enumerate()
                        .filter(|(i, (filter, tier_interest))| {
                            // Skip tiers that repeat the previous one
                            match i {
                                0 | 1 => filter.is_some(),
                                3 => tier_interest.is_none() && interest.is_some(),
                                _ => true,
                            }
                        })
                        .find_map(|(_, (filter, tier_interest))| {
                            picker.pick_location_for_time_slot(&PickRequest {
                                pool: &pool,
                                interest: *tier_interest,
                                state: &self.state,
                                remaining_minutes: remaining,
                                travel_buffer_minutes: travel,
                                is_first_in_slot: load.placed[slot as usize] == 0,
                                zone_filter: *filter,
                                scoring: &context,
                            })
                        })
                };

                match picked {
                    Some(picked) => {
                        if self.commit_pick(&picked, slot, travel, &mut builder, day_trip.is_some()) {
                            load.add(slot, picked.duration_minutes() + travel);
                            trail.record(picked.location);
                            failures = 0;
                        } else {
                            failures += 1;
                        }
                    }
                    None => failures += 1,
                }

                if failures >= MAX_CONSECUTIVE_PICK_FAILURES {
                    tracing::debug!(day = day_number, slot = %slot, "Slot exhausted after repeated failures");
                    break;
                }
            }

            tracing::debug!(
                day = day_number,
                city = %active.key,
                slot = %slot,
                placed = load.placed[slot as usize],
                minutes = load.minutes[slot as usize],
                budget,
                "Filled slot"
            );
        }

        let label = day_label(
            day_number,
            &base.label,
            day_trip.map(|_| active.label.as_str()),
        );
        let info = day_trip.map(|config| DayTripInfo {
            base_city_id: config.base_city.clone(),
            target_city_id: config.target_city.clone(),
            target_label: active.label.clone(),
            travel_minutes: config.travel_minutes,
        });
        builder.finish(label, weekday, date, active.id.clone(), info)
    }

    fn commit_pick(
        &mut self,
        picked: &PickedLocation<'_>,
        slot: TimeSlot,
        travel: u32,
        builder: &mut DayBuilder,
        on_day_trip: bool,
    ) -> bool {
        let location = picked.location;
        if !self.state.commit(location) {
            return false;
        }
        let featured = self.content_ids.contains(&location.id);
        builder.push_place(
            location,
            slot,
            travel,
            activity_tags(location, false, featured, on_day_trip),
            Some(recommendation_reason(picked)),
        );
        true
    }

    /// Saved locations of a city not yet scheduled, in request order
    fn pending_saved(&self, city_key: &str) -> Vec<&'a Location> {
        let index: &'a LocationIndex = self.index;
        self.trip
            .saved_ids
            .iter()
            .filter_map(|id| index.get(id))
            .filter(|l| normalize_key(&l.city) == city_key && !self.state.is_used(l))
            .collect()
    }

    fn has_pending_saved(&self, city_key: &str) -> bool {
        !self.pending_saved(city_key).is_empty()
    }

    /// Saved locations in the city go in before anything else, whatever
    /// their score. Food is allowed here. A place that fits no slot waits
    /// for the next day in the city; on the city's last day it is forced in.
    #[allow(clippy::too_many_arguments)]
    fn insert_saved_locations(
        &mut self,
        city_key: &str,
        day_trip_minutes: Option<u32>,
        force: bool,
        weather: Option<&WeatherForecast>,
        builder: &mut DayBuilder,
        load: &mut SlotLoad,
        trail: &mut DayTrail,
    ) {
        for location in self.pending_saved(city_key) {
            if self.state.is_used(location) {
                continue;
            }
            let slot = match self.saved_slot(location, day_trip_minutes, load) {
                Some(slot) => slot,
                None if force => {
                    let slot = self.least_loaded_slot(day_trip_minutes, load);
                    tracing::warn!(
                        id = %location.id,
                        city = %city_key,
                        slot = %slot,
                        "Last day in city, placing saved location over the slot budget"
                    );
                    slot
                }
                None => {
                    tracing::debug!(id = %location.id, "Saved location deferred to a later day");
                    continue;
                }
            };
            let travel = load.travel_before(slot, self.pace);

            let score = {
                let context = ScoringContext {
                    interests: &self.interests,
                    current_interest: None,
                    budget: self.trip.budget,
                    accessibility: &self.trip.accessibility,
                    group: &self.trip.group,
                    weather,
                    weather_preferences: &self.trip.weather_preferences,
                    time_slot: slot,
                    last_coordinates: trail.last_coordinates,
                    day_categories: &trail.categories,
                    day_neighborhoods: &trail.neighborhoods,
                    content_ids: &self.content_ids,
                };
                self.scorer.score_location(location, &context)
            };

            if !self.state.commit(location) {
                continue;
            }
            let featured = self.content_ids.contains(&location.id);
            builder.push_place(
                location,
                slot,
                travel,
                activity_tags(location, true, featured, day_trip_minutes.is_some()),
                Some(RecommendationReason {
                    primary_reason: SAVED_PRIMARY_REASON.to_string(),
                    factors: score.reasoning,
                    score: score.score,
                    breakdown: score.breakdown,
                    alternatives_considered: Vec::new(),
                }),
            );
            load.add(slot, location.visit_duration_minutes() + travel);
            trail.record(location);
            tracing::debug!(id = %location.id, slot = %slot, "Inserted saved location");
        }
    }

    /// Category slot while it stays under the overflow threshold, else the
    /// least-loaded slot the visit still fits in. `None` when nothing fits.
    fn saved_slot(
        &self,
        location: &Location,
        day_trip_minutes: Option<u32>,
        load: &SlotLoad,
    ) -> Option<TimeSlot> {
        let duration = location.visit_duration_minutes();
        let fits = |slot: TimeSlot, ratio: f64| {
            let projected =
                load.minutes[slot as usize] + load.travel_before(slot, self.pace) + duration;
            projected as f64 <= slot_budget(slot, self.pace, day_trip_minutes) as f64 * ratio
        };

        let preferred = preferred_slot_for_saved(location.category);
        if fits(preferred, SAVED_SLOT_OVERFLOW_RATIO) {
            return Some(preferred);
        }

        TimeSlot::ALL
            .into_iter()
            .filter(|slot| fits(*slot, SLOT_OVERRUN_FACTOR))
            .min_by(|a, b| {
                load_ratio(load, *a, self.pace, day_trip_minutes)
                    .total_cmp(&load_ratio(load, *b, self.pace, day_trip_minutes))
            })
    }

    fn least_loaded_slot(&self, day_trip_minutes: Option<u32>, load: &SlotLoad) -> TimeSlot {
        TimeSlot::ALL
            .into_iter()
            .min_by(|a, b| {
                load_ratio(load, *a, self.pace, day_trip_minutes)
                    .total_cmp(&load_ratio(load, *b, self.pace, day_trip_minutes))
            })
            .unwrap_or(TimeSlot::Morning)
    }
}

fn load_ratio(load: &SlotLoad, slot: TimeSlot, pace: Pace, day_trip_minutes: Option<u32>) -> f64 {
    load.minutes[slot as usize] as f64 / slot_budget(slot, pace, day_trip_minutes).max(1) as f64
}
