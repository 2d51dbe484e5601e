use crate::constants::{MIN_LOCATIONS_FOR_ZONES, MIN_ZONE_SIZE};
use crate::models::coordinates::KM_PER_DEGREE_LAT;
use crate::models::{Coordinates, Interest, Location, LocationCategory};
use std::collections::{BTreeMap, HashSet};

/// Interest rank weights used when scoring zones (top three interests)
const ZONE_INTEREST_WEIGHTS: [usize; 3] = [3, 2, 1];
/// Score bonus per favourited location inside a zone
const ZONE_FAVORITE_BONUS: usize = 100;

/// A walkable cluster of locations within one city
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    /// Grid cell (row, col) the zone was seeded from
    pub cell: (i64, i64),
    pub centroid: Coordinates,
    /// Member ids in snapshot order
    pub location_ids: Vec<String>,
    categories: Vec<LocationCategory>,
}

impl Zone {
    pub fn len(&self) -> usize {
        self.location_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.location_ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.location_ids.iter().any(|l| l == id)
    }

    fn members(&self) -> impl Iterator<Item = (&str, LocationCategory)> {
        self.location_ids
            .iter()
            .map(String::as_str)
            .zip(self.categories.iter().copied())
    }
}

/// Inputs for picking the zone a day concentrates on
#[derive(Debug, Clone, Copy)]
pub struct ZoneSelection<'a> {
    /// 0-based index of this day among the consecutive days in the city
    pub day_in_city: usize,
    pub total_days_in_city: usize,
    pub used_zone_ids: &'a HashSet<String>,
    /// Ranked, most important first
    pub interests: &'a [Interest],
    /// Favourited location ids; zones holding them are strongly preferred
    pub prioritized_ids: &'a HashSet<String>,
    /// When given, only these member ids count, and zones with fewer than
    /// the minimum zone size of them are passed over while others qualify
    pub available_ids: Option<&'a HashSet<String>>,
}

/// Deterministic grid clustering of one city's locations
#[derive(Debug, Clone)]
pub struct ZoneMap {
    pub city_key: String,
    /// Ordered by grid cell
    pub zones: Vec<Zone>,
}

impl ZoneMap {
    /// Bin locations into square cells of `cell_size_km`. Cells with enough
    /// members seed zones; stragglers join the zone with the nearest centroid.
    /// `None` when there are too few coordinate-bearing locations or fewer
    /// than two zones.
    pub fn build(city_key: &str, locations: &[&Location], cell_size_km: f64) -> Option<ZoneMap> {
        let located: Vec<(&Location, Coordinates)> = locations
            .iter()
            .filter_map(|l| l.coordinates.map(|c| (*l, c)))
            .filter(|(_, c)| !c.is_null_island())
            .collect();

        if located.len() < MIN_LOCATIONS_FOR_ZONES || cell_size_km <= 0.0 {
            return None;
        }

        let mean_lat = located.iter().map(|(_, c)| c.lat).sum::<f64>() / located.len() as f64;
        let lat_step = cell_size_km / KM_PER_DEGREE_LAT;
        let lng_step = cell_size_km / (KM_PER_DEGREE_LAT * mean_lat.to_radians().cos().max(0.01));

        let mut cells: BTreeMap<(i64, i64), Vec<(&Location, Coordinates)>> = BTreeMap::new();
        for (location, coords) in &located {
            let cell = (
                (coords.lat / lat_step).floor() as i64,
                (coords.lng / lng_step).floor() as i64,
            );
            cells.entry(cell).or_default().push((*location, *coords));
        }

        let mut zones: Vec<Zone> = Vec::new();
        let mut stragglers: Vec<(&Location, Coordinates)> = Vec::new();
        for (cell, members) in cells {
            if members.len() < MIN_ZONE_SIZE {
                stragglers.extend(members);
                continue;
            }
            let points: Vec<Coordinates> = members.iter().map(|(_, c)| *c).collect();
            let Some(centroid) = Coordinates::centroid(&points) else {
                continue;
            };
            zones.push(Zone {
                id: format!("{}-zone-{}-{}", city_key, cell.0, cell.1),
                cell,
                centroid,
                location_ids: members.iter().map(|(l, _)| l.id.clone()).collect(),
                categories: members.iter().map(|(l, _)| l.category).collect(),
            });
        }

        if zones.len() < 2 {
            tracing::debug!(city = %city_key, zones = zones.len(), "Too few zones, clustering skipped");
            return None;
        }

        for (location, coords) in stragglers {
            let nearest = zones
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.centroid
                        .distance_to(&coords)
                        .total_cmp(&b.centroid.distance_to(&coords))
                })
                .map(|(i, _)| i);
            if let Some(i) = nearest {
                zones[i].location_ids.push(location.id.clone());
                zones[i].categories.push(location.category);
            }
        }

        tracing::debug!(
            city = %city_key,
            zones = zones.len(),
            locations = located.len(),
            "Built zone map"
        );

        Some(ZoneMap {
            city_key: city_key.to_string(),
            zones,
        })
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Zones in the 8-neighbourhood of the given zone's cell; when it has
    /// none, the single zone with the nearest centroid.
    pub fn adjacent_zones(&self, id: &str) -> Vec<&Zone> {
        let Some(zone) = self.zone(id) else {
            return Vec::new();
        };

        let neighbours: Vec<&Zone> = self
            .zones
            .iter()
            .filter(|other| other.id != zone.id)
            .filter(|other| {
                (other.cell.0 - zone.cell.0).abs() <= 1 && (other.cell.1 - zone.cell.1).abs() <= 1
            })
            .collect();

        if !neighbours.is_empty() {
            return neighbours;
        }

        self.zones
            .iter()
            .filter(|other| other.id != zone.id)
            .min_by(|a, b| {
                a.centroid
                    .distance_to(&zone.centroid)
                    .total_cmp(&b.centroid.distance_to(&zone.centroid))
            })
            .into_iter()
            .collect()
    }

    /// Members of the zone and its adjacent zones
    pub fn expanded_zone_location_ids(&self, id: &str) -> HashSet<String> {
        let mut ids: HashSet<String> = HashSet::new();
        if let Some(zone) = self.zone(id) {
            ids.extend(zone.location_ids.iter().cloned());
            for neighbour in self.adjacent_zones(id) {
                ids.extend(neighbour.location_ids.iter().cloned());
            }
        }
        ids
    }

    /// Pick the zone for a day: favourites first, then interest matches.
    /// Used zones are skipped until every zone has been used. Exact ties
    /// rotate with `day_in_city` so consecutive days spread out.
    pub fn select_zone_for_day(&self, selection: &ZoneSelection<'_>) -> Option<&Zone> {
        let counted = |zone: &Zone| -> usize {
            match selection.available_ids {
                Some(available) => zone.members().filter(|(id, _)| available.contains(*id)).count(),
                None => zone.len(),
            }
        };

        let mut candidates: Vec<&Zone> = self
            .zones
            .iter()
            .filter(|z| !selection.used_zone_ids.contains(&z.id))
            .collect();
        if candidates.is_empty() {
            candidates = self.zones.iter().collect();
        }

        let viable: Vec<&Zone> = candidates
            .iter()
            .copied()
            .filter(|z| counted(z) >= MIN_ZONE_SIZE)
            .collect();
        if !viable.is_empty() {
            candidates = viable;
        }

        let scored: Vec<(usize, &Zone)> = candidates
            .into_iter()
            .map(|zone| (self.zone_score(zone, selection), zone))
            .collect();

        let best = scored.iter().map(|(s, _)| *s).max()?;
        let ties: Vec<&Zone> = scored
            .iter()
            .filter(|(s, _)| *s == best)
            .map(|(_, z)| *z)
            .collect();
        let chosen = ties[selection.day_in_city % ties.len()];

        tracing::debug!(
            city = %self.city_key,
            zone = %chosen.id,
            score = best,
            day_in_city = selection.day_in_city,
            days_in_city = selection.total_days_in_city,
            "Selected zone for day"
        );
        Some(chosen)
    }

    fn zone_score(&self, zone: &Zone, selection: &ZoneSelection<'_>) -> usize {
        let mut score = 0;
        for (id, category) in zone.members() {
            if selection.available_ids.is_some_and(|a| !a.contains(id)) {
                continue;
            }
            if selection.prioritized_ids.contains(id) {
                score += ZONE_FAVORITE_BONUS;
            }
            score += selection
                .interests
                .iter()
                .zip(ZONE_INTEREST_WEIGHTS)
                .filter(|(interest, _)| interest.matches(category))
                .map(|(_, weight)| weight)
                .sum::<usize>();
        }
        score
    }
}
