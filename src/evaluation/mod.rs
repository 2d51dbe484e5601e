pub mod scenarios;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::{Itinerary, Location, LocationCategory, TripBuilderData};

pub use scenarios::{default_scenarios, synthetic_city_pool};

/// A named trip plus the location snapshot it is planned against
#[derive(Debug, Clone)]
pub struct EvalScenario {
    pub name: String,
    pub trip: TripBuilderData,
    pub locations: Vec<Location>,
}

/// Quality measures for one generated itinerary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryMetrics {
    pub days: usize,
    pub total_activities: usize,
    pub activities_per_day: f32,
    pub empty_days: usize,
    pub day_trips: usize,
    /// Normalized Shannon entropy of categories per day, averaged over
    /// non-empty days (0-1)
    pub category_entropy: f32,
    /// Mean straight-line distance between consecutive stops of a day, km
    pub mean_hop_km: Option<f32>,
    /// Share of featured ids that made it into the itinerary
    pub featured_coverage: Option<f32>,
    /// Share of saved ids that made it into the itinerary
    pub saved_coverage: Option<f32>,
}

impl ItineraryMetrics {
    /// Compute metrics; `locations` supplies categories and coordinates for
    /// the ids the itinerary references
    pub fn compute(itinerary: &Itinerary, locations: &[Location], trip: &TripBuilderData) -> Self {
        let by_id: HashMap<&str, &Location> =
            locations.iter().map(|l| (l.id.as_str(), l)).collect();

        let days = itinerary.days.len();
        let total_activities = itinerary.place_count();
        let empty_days = itinerary
            .days
            .iter()
            .filter(|d| d.places().next().is_none())
            .count();

        let mut entropies = Vec::new();
        let mut hops = Vec::new();
        for day in &itinerary.days {
            let stops: Vec<&Location> = day
                .places()
                .filter_map(|p| by_id.get(p.location_id.as_str()).copied())
                .collect();
            if stops.is_empty() {
                continue;
            }
            entropies.push(category_entropy(stops.iter().map(|l| l.category)));
            for pair in stops.windows(2) {
                if let (Some(a), Some(b)) = (pair[0].coordinates, pair[1].coordinates) {
                    hops.push(a.distance_to(&b) as f32);
                }
            }
        }

        let scheduled: HashSet<&str> = itinerary.places().map(|p| p.location_id.as_str()).collect();
        let coverage = |ids: &[String]| -> Option<f32> {
            if ids.is_empty() {
                return None;
            }
            let hit = ids.iter().filter(|id| scheduled.contains(id.as_str())).count();
            Some(hit as f32 / ids.len() as f32)
        };

        ItineraryMetrics {
            days,
            total_activities,
            activities_per_day: if days == 0 {
                0.0
            } else {
                total_activities as f32 / days as f32
            },
            empty_days,
            day_trips: itinerary.day_trip_count(),
            category_entropy: mean(&entropies).unwrap_or(0.0),
            mean_hop_km: mean(&hops),
            featured_coverage: coverage(&trip.content_location_ids),
            saved_coverage: coverage(&trip.saved_ids),
        }
    }
}

/// Result of running one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub metrics: ItineraryMetrics,
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}

/// Normalized Shannon entropy of a category multiset
fn category_entropy(categories: impl Iterator<Item = LocationCategory>) -> f32 {
    let mut counts: HashMap<LocationCategory, usize> = HashMap::new();
    for category in categories {
        *counts.entry(category).or_insert(0) += 1;
    }

    let total = counts.values().sum::<usize>();
    if total <= 1 || counts.len() <= 1 {
        return 0.0;
    }

    let entropy: f64 = counts
        .values()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.ln()
        })
        .sum();

    let max_entropy = (counts.len() as f64).ln();
    (entropy / max_entropy).clamp(0.0, 1.0) as f32
}

/// Format a single scenario result for display
pub fn format_scenario_result(result: &ScenarioResult) -> String {
    let m = &result.metrics;
    let mut out = String::new();

    out.push_str(&format!(
        "\n{} ({} days, {} activities)\n",
        result.name, m.days, m.total_activities
    ));
    out.push_str(&format!("  activities/day:   {:.2}\n", m.activities_per_day));
    out.push_str(&format!("  empty_days:       {}\n", m.empty_days));
    out.push_str(&format!("  day_trips:        {}\n", m.day_trips));
    out.push_str(&format!("  category_entropy: {:.2}\n", m.category_entropy));
    match m.mean_hop_km {
        Some(km) => out.push_str(&format!("  mean_hop:         {:.2} km\n", km)),
        None => out.push_str("  mean_hop:         n/a\n"),
    }
    if let Some(coverage) = m.featured_coverage {
        out.push_str(&format!("  featured:         {:.0}%\n", coverage * 100.0));
    }
    if let Some(coverage) = m.saved_coverage {
        out.push_str(&format!("  saved:            {:.0}%\n", coverage * 100.0));
    }

    out
}

/// Format the full evaluation report
pub fn format_report(results: &[ScenarioResult]) -> String {
    let mut report = String::from("=== Itinerary Quality Evaluation Report ===\n");

    for result in results {
        report.push_str(&format_scenario_result(result));
    }

    report
}
