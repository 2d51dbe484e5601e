use crate::config::ScoreWeights;
use crate::constants::NEUTRAL_FACTOR_SCORE;
use crate::models::{
    AccessibilityNeeds, BudgetLevel, Coordinates, GroupComposition, GroupType, Interest, Location,
    LocationCategory, ScoreBreakdown, TimeSlot, WeatherForecast, WeatherPreferences,
};
use std::collections::HashSet;

/// Walking distance (km) from the previous stop that scores full logistics
const LOGISTICS_FULL_SCORE_KM: f64 = 1.0;
/// Distance (km) at which the logistics factor reaches zero
const LOGISTICS_ZERO_SCORE_KM: f64 = 10.0;
/// Review count at which a rating is fully trusted
const RATING_CONFIDENT_REVIEWS: u32 = 200;
const FEATURED_INTEREST_BOOST: f32 = 0.25;
const CATEGORY_REPEAT_PENALTY: f32 = 0.35;
const NEIGHBORHOOD_REPEAT_PENALTY: f32 = 0.15;

/// Everything the scorer knows about the slot being filled
pub struct ScoringContext<'a> {
    /// Ranked, most important first
    pub interests: &'a [Interest],
    /// Interest this pick is meant to serve, if any
    pub current_interest: Option<Interest>,
    pub budget: Option<BudgetLevel>,
    pub accessibility: &'a AccessibilityNeeds,
    pub group: &'a GroupComposition,
    pub weather: Option<&'a WeatherForecast>,
    pub weather_preferences: &'a WeatherPreferences,
    pub time_slot: TimeSlot,
    pub last_coordinates: Option<Coordinates>,
    /// Categories already placed today
    pub day_categories: &'a [LocationCategory],
    /// Neighbourhoods already visited today
    pub day_neighborhoods: &'a [String],
    /// Editorially featured location ids
    pub content_ids: &'a HashSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationScore {
    pub score: f32,
    pub breakdown: ScoreBreakdown,
    /// Human-readable lines ordered by the weighted contribution of the
    /// factor behind each one, strongest first
    pub reasoning: Vec<String>,
}

/// Scores a single candidate location in context
pub trait LocationScorer: Send + Sync {
    fn score_location(&self, location: &Location, context: &ScoringContext) -> LocationScore;
}

/// Nine-factor weighted sum. Each factor lies in [0, 1] and weights are
/// non-negative, so raising one factor never lowers the total.
pub struct WeightedScorer {
    weights: ScoreWeights,
}

impl WeightedScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn total(&self, b: &ScoreBreakdown) -> f32 {
        let w = &self.weights;
        w.interest * b.interest_match
            + w.rating * b.rating_quality
            + w.logistics * b.logistical_fit
            + w.budget * b.budget_fit
            + w.accessibility * b.accessibility_fit
            + w.diversity * b.diversity_bonus
            + w.weather * b.weather_fit
            + w.time_of_day * b.time_optimization
            + w.group * b.group_fit
    }
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl LocationScorer for WeightedScorer {
    fn score_location(&self, location: &Location, context: &ScoringContext) -> LocationScore {
        let featured = context.content_ids.contains(&location.id);
        let breakdown = ScoreBreakdown {
            interest_match: interest_score(location.category, context, featured),
            rating_quality: rating_score(location),
            logistical_fit: logistics_score(location, context.last_coordinates),
            budget_fit: budget_score(location, context.budget),
            accessibility_fit: accessibility_score(location, context.accessibility),
            diversity_bonus: diversity_score(location, context),
            weather_fit: weather_score(location.category, context),
            time_optimization: time_of_day_score(location.category, context.time_slot),
            group_fit: group_score(location, context.group),
        };

        LocationScore {
            score: self.total(&breakdown),
            reasoning: reasoning(location, context, &self.weights, &breakdown, featured),
            breakdown,
        }
    }
}

fn interest_score(category: LocationCategory, context: &ScoringContext, featured: bool) -> f32 {
    let base = if context.current_interest.is_some_and(|i| i.matches(category)) {
        1.0
    } else {
        match context.interests.iter().position(|i| i.matches(category)) {
            Some(rank) => (0.9 - 0.15 * rank as f32).max(0.3),
            None => 0.1,
        }
    };
    if featured {
        (base + FEATURED_INTEREST_BOOST).min(1.0)
    } else {
        base
    }
}

fn rating_score(location: &Location) -> f32 {
    let Some(rating) = location.rating else {
        return NEUTRAL_FACTOR_SCORE;
    };
    let base = (rating / 5.0).clamp(0.0, 1.0);
    match location.review_count {
        // Few reviews pull the rating toward neutral
        Some(count) => {
            let confidence = count.min(RATING_CONFIDENT_REVIEWS) as f32 / RATING_CONFIDENT_REVIEWS as f32;
            NEUTRAL_FACTOR_SCORE * (1.0 - confidence) + base * confidence
        }
        None => base,
    }
}

fn logistics_score(location: &Location, last: Option<Coordinates>) -> f32 {
    let (Some(from), Some(to)) = (last, location.coordinates) else {
        return NEUTRAL_FACTOR_SCORE;
    };
    let km = from.distance_to(&to);
    if km <= LOGISTICS_FULL_SCORE_KM {
        1.0
    } else if km >= LOGISTICS_ZERO_SCORE_KM {
        0.0
    } else {
        (1.0 - (km - LOGISTICS_FULL_SCORE_KM) / (LOGISTICS_ZERO_SCORE_KM - LOGISTICS_FULL_SCORE_KM))
            as f32
    }
}

fn budget_score(location: &Location, budget: Option<BudgetLevel>) -> f32 {
    let (Some(budget), Some(price)) = (budget, location.price_level) else {
        return NEUTRAL_FACTOR_SCORE;
    };
    let max = budget.max_price_level();
    if price <= max {
        1.0
    } else if price == max + 1 {
        0.4
    } else {
        0.0
    }
}

fn accessibility_score(location: &Location, needs: &AccessibilityNeeds) -> f32 {
    if !needs.any() {
        return 1.0;
    }
    match location.wheelchair_accessible {
        Some(true) => 1.0,
        Some(false) => 0.0,
        None => NEUTRAL_FACTOR_SCORE,
    }
}

fn diversity_score(location: &Location, context: &ScoringContext) -> f32 {
    let category_repeats = context
        .day_categories
        .iter()
        .filter(|c| **c == location.category)
        .count() as f32;
    let neighborhood_repeats = location
        .neighborhood
        .as_ref()
        .map(|n| context.day_neighborhoods.iter().filter(|d| *d == n).count())
        .unwrap_or(0) as f32;
    (1.0 - CATEGORY_REPEAT_PENALTY * category_repeats
        - NEIGHBORHOOD_REPEAT_PENALTY * neighborhood_repeats)
        .max(0.0)
}

fn weather_score(category: LocationCategory, context: &ScoringContext) -> f32 {
    let Some(forecast) = context.weather else {
        return NEUTRAL_FACTOR_SCORE;
    };
    let outdoor = category.is_outdoor();
    let prefs = context.weather_preferences;

    if forecast.is_wet() {
        match (outdoor, prefs.prefer_indoor_when_raining) {
            (true, true) => 0.1,
            (true, false) => 0.4,
            (false, true) => 1.0,
            (false, false) => 0.8,
        }
    } else if forecast.is_hot() {
        match (outdoor, prefs.avoid_heat) {
            (true, true) => 0.2,
            (true, false) => 0.5,
            (false, _) => 0.9,
        }
    } else if outdoor {
        1.0
    } else {
        0.7
    }
}

fn time_of_day_score(category: LocationCategory, slot: TimeSlot) -> f32 {
    use LocationCategory::*;
    match slot {
        TimeSlot::Morning => match category {
            Shrine | Temple | Garden | Park | Nature | Market => 1.0,
            Bar | Entertainment => 0.1,
            _ => 0.4,
        },
        TimeSlot::Afternoon => match category {
            Museum | Shopping | Castle | Culture | Historic | Landmark => 1.0,
            Bar => 0.1,
            _ => 0.4,
        },
        TimeSlot::Evening => match category {
            Bar | Entertainment | Viewpoint | Onsen => 1.0,
            Museum | Temple | Castle | Garden => 0.1,
            _ => 0.4,
        },
    }
}

fn group_score(location: &Location, group: &GroupComposition) -> f32 {
    let flag = match group.group_type() {
        GroupType::Family => location.good_for_children,
        GroupType::LargeGroup => location.good_for_groups,
        GroupType::Solo | GroupType::Couple => return NEUTRAL_FACTOR_SCORE,
    };
    match flag {
        Some(true) => 1.0,
        Some(false) => 0.1,
        None => NEUTRAL_FACTOR_SCORE,
    }
}

fn reasoning(
    location: &Location,
    context: &ScoringContext,
    w: &ScoreWeights,
    b: &ScoreBreakdown,
    featured: bool,
) -> Vec<String> {
    let mut lines: Vec<(f32, String)> = Vec::new();
    let interest = w.interest * b.interest_match;

    if featured {
        lines.push((interest, "Featured by our editors".to_string()));
    }
    if let Some(matched) = context
        .current_interest
        .filter(|i| i.matches(location.category))
        .or_else(|| {
            context
                .interests
                .iter()
                .copied()
                .find(|i| i.matches(location.category))
        })
    {
        lines.push((interest, format!("Matches your interest in {}", matched)));
    }
    if let Some(rating) = location.rating.filter(|_| b.rating_quality >= 0.85) {
        lines.push((
            w.rating * b.rating_quality,
            format!("Highly rated ({:.1}/5)", rating),
        ));
    }
    if b.logistical_fit >= 0.9 && context.last_coordinates.is_some() {
        lines.push((
            w.logistics * b.logistical_fit,
            "A short walk from your previous stop".to_string(),
        ));
    }
    if let Some(forecast) = context.weather {
        let weather = w.weather * b.weather_fit;
        if forecast.is_wet() && !location.category.is_outdoor() {
            lines.push((weather, "Indoor option for a rainy day".to_string()));
        } else if !forecast.is_wet() && !forecast.is_hot() && location.category.is_outdoor() {
            lines.push((weather, "Good weather expected for an outdoor visit".to_string()));
        }
    }
    if b.time_optimization >= 1.0 {
        lines.push((
            w.time_of_day * b.time_optimization,
            format!("Best enjoyed in the {}", context.time_slot),
        ));
    }
    if context.accessibility.any() && b.accessibility_fit >= 1.0 {
        lines.push((
            w.accessibility * b.accessibility_fit,
            "Wheelchair accessible".to_string(),
        ));
    }
    if b.group_fit >= 1.0 {
        let group = w.group * b.group_fit;
        match context.group.group_type() {
            GroupType::Family => lines.push((group, "Good for children".to_string())),
            GroupType::LargeGroup => lines.push((group, "Suits larger groups".to_string())),
            _ => {}
        }
    }
    if b.budget_fit >= 1.0 && context.budget.is_some() && location.price_level.is_some() {
        lines.push((w.budget * b.budget_fit, "Within your budget".to_string()));
    }

    // Stable, so ties keep the order above
    lines.sort_by(|x, y| y.0.total_cmp(&x.0));
    lines.into_iter().map(|(_, line)| line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherCondition;
    use time::macros::date;

    struct Fixture {
        accessibility: AccessibilityNeeds,
        group: GroupComposition,
        prefs: WeatherPreferences,
        content: HashSet<String>,
        categories: Vec<LocationCategory>,
        neighborhoods: Vec<String>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                accessibility: AccessibilityNeeds::default(),
                group: GroupComposition::default(),
                prefs: WeatherPreferences::default(),
                content: HashSet::new(),
                categories: Vec::new(),
                neighborhoods: Vec::new(),
            }
        }

        fn context(&self) -> ScoringContext<'_> {
            ScoringContext {
                interests: &[Interest::Culture, Interest::Nature],
                current_interest: Some(Interest::Culture),
                budget: None,
                accessibility: &self.accessibility,
                group: &self.group,
                weather: None,
                weather_preferences: &self.prefs,
                time_slot: TimeSlot::Morning,
                last_coordinates: None,
                day_categories: &self.categories,
                day_neighborhoods: &self.neighborhoods,
                content_ids: &self.content,
            }
        }
    }

    fn temple() -> Location {
        Location::new("t1", "Kiyomizu-dera", "kyoto", "kansai", LocationCategory::Temple)
            .with_coordinates(34.9949, 135.7850)
    }

    #[test]
    fn test_unknown_data_scores_neutral() {
        let fixture = Fixture::new();
        let bare = Location::new("x", "X", "kyoto", "kansai", LocationCategory::Temple);
        let score = WeightedScorer::default().score_location(&bare, &fixture.context());

        assert_eq!(score.breakdown.rating_quality, NEUTRAL_FACTOR_SCORE);
        assert_eq!(score.breakdown.logistical_fit, NEUTRAL_FACTOR_SCORE);
        assert_eq!(score.breakdown.budget_fit, NEUTRAL_FACTOR_SCORE);
        assert_eq!(score.breakdown.weather_fit, NEUTRAL_FACTOR_SCORE);
        assert_eq!(score.breakdown.group_fit, NEUTRAL_FACTOR_SCORE);
    }

    #[test]
    fn test_factors_stay_in_unit_range() {
        let mut fixture = Fixture::new();
        fixture.categories = vec![LocationCategory::Temple; 5];
        fixture.neighborhoods = vec!["Higashiyama".to_string(); 5];
        let location = temple().with_rating(5.0).with_neighborhood("Higashiyama");
        let b = WeightedScorer::default()
            .score_location(&location, &fixture.context())
            .breakdown;
        for factor in [
            b.interest_match,
            b.rating_quality,
            b.logistical_fit,
            b.budget_fit,
            b.accessibility_fit,
            b.diversity_bonus,
            b.weather_fit,
            b.time_optimization,
            b.group_fit,
        ] {
            assert!((0.0..=1.0).contains(&factor), "factor out of range: {factor}");
        }
        assert_eq!(b.diversity_bonus, 0.0);
    }

    #[test]
    fn test_total_is_monotonic_in_each_factor() {
        let scorer = WeightedScorer::default();
        let base = ScoreBreakdown {
            interest_match: 0.5,
            rating_quality: 0.5,
            logistical_fit: 0.5,
            budget_fit: 0.5,
            accessibility_fit: 0.5,
            diversity_bonus: 0.5,
            weather_fit: 0.5,
            time_optimization: 0.5,
            group_fit: 0.5,
        };
        let base_total = scorer.total(&base);
        let bumps: [fn(&mut ScoreBreakdown); 9] = [
            |b| b.interest_match = 0.9,
            |b| b.rating_quality = 0.9,
            |b| b.logistical_fit = 0.9,
            |b| b.budget_fit = 0.9,
            |b| b.accessibility_fit = 0.9,
            |b| b.diversity_bonus = 0.9,
            |b| b.weather_fit = 0.9,
            |b| b.time_optimization = 0.9,
            |b| b.group_fit = 0.9,
        ];
        for bump in bumps {
            let mut improved = base;
            bump(&mut improved);
            assert!(scorer.total(&improved) >= base_total);
        }
    }

    #[test]
    fn test_rain_prefers_indoor() {
        let fixture = Fixture::new();
        let forecast = WeatherForecast::new(date!(2026 - 06 - 12), WeatherCondition::Rain);
        let context = ScoringContext {
            weather: Some(&forecast),
            ..fixture.context()
        };
        let scorer = WeightedScorer::default();
        let garden = Location::new("g", "Garden", "kyoto", "kansai", LocationCategory::Garden);
        let museum = Location::new("m", "Museum", "kyoto", "kansai", LocationCategory::Museum);

        let garden_score = scorer.score_location(&garden, &context);
        let museum_score = scorer.score_location(&museum, &context);
        assert!(museum_score.breakdown.weather_fit > garden_score.breakdown.weather_fit);
        assert!(museum_score
            .reasoning
            .iter()
            .any(|r| r.contains("rainy day")));
    }

    #[test]
    fn test_logistics_decays_with_distance() {
        let fixture = Fixture::new();
        let near = ScoringContext {
            last_coordinates: Some(Coordinates { lat: 34.9960, lng: 135.7850 }),
            ..fixture.context()
        };
        let far = ScoringContext {
            last_coordinates: Some(Coordinates { lat: 35.0800, lng: 135.7850 }),
            ..fixture.context()
        };
        let scorer = WeightedScorer::default();
        let near_fit = scorer.score_location(&temple(), &near).breakdown.logistical_fit;
        let far_fit = scorer.score_location(&temple(), &far).breakdown.logistical_fit;
        assert_eq!(near_fit, 1.0);
        assert!(far_fit < near_fit);
    }

    #[test]
    fn test_featured_location_gets_boost_and_reason() {
        let mut fixture = Fixture::new();
        let park = Location::new("p", "Maruyama Park", "kyoto", "kansai", LocationCategory::Park);
        let plain = WeightedScorer::default().score_location(&park, &fixture.context());

        fixture.content.insert("p".to_string());
        let featured = WeightedScorer::default().score_location(&park, &fixture.context());
        assert!(featured.breakdown.interest_match > plain.breakdown.interest_match);
        assert_eq!(featured.reasoning[0], "Featured by our editors");
    }

    #[test]
    fn test_reasoning_follows_weighted_contribution() {
        let fixture = Fixture::new();
        let museum = Location::new("m", "Kyoto National Museum", "kyoto", "kansai", LocationCategory::Museum)
            .with_rating(4.8);
        let context = ScoringContext {
            time_slot: TimeSlot::Afternoon,
            ..fixture.context()
        };

        let default = WeightedScorer::default().score_location(&museum, &context);
        assert_eq!(
            default.reasoning,
            vec![
                "Matches your interest in culture".to_string(),
                "Highly rated (4.8/5)".to_string(),
                "Best enjoyed in the afternoon".to_string(),
            ]
        );

        let weights = ScoreWeights {
            interest: 1.0,
            time_of_day: 20.0,
            ..ScoreWeights::default()
        };
        let reweighted = WeightedScorer::new(weights).score_location(&museum, &context);
        assert_eq!(
            reweighted.reasoning,
            vec![
                "Best enjoyed in the afternoon".to_string(),
                "Highly rated (4.8/5)".to_string(),
                "Matches your interest in culture".to_string(),
            ]
        );
    }

    #[test]
    fn test_budget_and_accessibility() {
        let mut fixture = Fixture::new();
        fixture.accessibility.wheelchair = true;
        let mut pricey = temple();
        pricey.price_level = Some(4);
        pricey.wheelchair_accessible = Some(false);
        let context = ScoringContext {
            budget: Some(BudgetLevel::Budget),
            ..fixture.context()
        };
        let b = WeightedScorer::default().score_location(&pricey, &context).breakdown;
        assert_eq!(b.budget_fit, 0.0);
        assert_eq!(b.accessibility_fit, 0.0);

        pricey.price_level = Some(2);
        let b = WeightedScorer::default().score_location(&pricey, &context).breakdown;
        assert_eq!(b.budget_fit, 0.4);
    }
}
