use crate::constants::DAY_TRIP_MIN_SLOT_MINUTES;
use crate::models::{Pace, TimeSlot};

/// Minutes available in a slot at the given pace
pub fn available_time_for_slot(slot: TimeSlot, pace: Pace) -> u32 {
    match (pace, slot) {
        (Pace::Relaxed, TimeSlot::Morning) => 150,
        (Pace::Relaxed, TimeSlot::Afternoon) => 180,
        (Pace::Relaxed, TimeSlot::Evening) => 120,
        (Pace::Balanced, TimeSlot::Morning) => 180,
        (Pace::Balanced, TimeSlot::Afternoon) => 240,
        (Pace::Balanced, TimeSlot::Evening) => 150,
        (Pace::Fast, TimeSlot::Morning) => 210,
        (Pace::Fast, TimeSlot::Afternoon) => 270,
        (Pace::Fast, TimeSlot::Evening) => 180,
    }
}

/// Flat travel buffer charged before every activity except a slot's first
pub fn travel_time(pace: Pace) -> u32 {
    match pace {
        Pace::Relaxed => 30,
        Pace::Balanced => 20,
        Pace::Fast => 15,
    }
}

/// Target number of activities per day, used to size day-trip decisions
pub fn activities_per_day(pace: Pace) -> usize {
    match pace {
        Pace::Relaxed => 2,
        Pace::Balanced => 3,
        Pace::Fast => 4,
    }
}

/// Slot budget on a day trip: outbound travel comes out of the morning,
/// the return leg out of the evening. Both are floored so the slot stays usable.
pub fn day_trip_adjusted_time(slot: TimeSlot, pace: Pace, travel_minutes: u32) -> u32 {
    let base = available_time_for_slot(slot, pace);
    match slot {
        TimeSlot::Morning | TimeSlot::Evening => base
            .saturating_sub(travel_minutes)
            .max(DAY_TRIP_MIN_SLOT_MINUTES),
        TimeSlot::Afternoon => base,
    }
}

/// Budget for a slot, taking an optional day-trip leg into account
pub fn slot_budget(slot: TimeSlot, pace: Pace, day_trip_minutes: Option<u32>) -> u32 {
    match day_trip_minutes {
        Some(minutes) => day_trip_adjusted_time(slot, pace, minutes),
        None => available_time_for_slot(slot, pace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faster_pace_never_shrinks_budgets() {
        for slot in TimeSlot::ALL {
            let relaxed = available_time_for_slot(slot, Pace::Relaxed);
            let balanced = available_time_for_slot(slot, Pace::Balanced);
            let fast = available_time_for_slot(slot, Pace::Fast);
            assert!(relaxed <= balanced && balanced <= fast, "{slot}");
        }
        assert!(travel_time(Pace::Fast) < travel_time(Pace::Relaxed));
    }

    #[test]
    fn test_activities_per_day() {
        assert_eq!(activities_per_day(Pace::Relaxed), 2);
        assert_eq!(activities_per_day(Pace::Balanced), 3);
        assert_eq!(activities_per_day(Pace::Fast), 4);
    }

    #[test]
    fn test_day_trip_adjustment_is_floored() {
        assert_eq!(day_trip_adjusted_time(TimeSlot::Morning, Pace::Balanced, 45), 135);
        assert_eq!(day_trip_adjusted_time(TimeSlot::Evening, Pace::Relaxed, 120), 60);
        assert_eq!(day_trip_adjusted_time(TimeSlot::Morning, Pace::Relaxed, 500), 60);
        assert_eq!(
            day_trip_adjusted_time(TimeSlot::Afternoon, Pace::Balanced, 90),
            available_time_for_slot(TimeSlot::Afternoon, Pace::Balanced)
        );
    }

    #[test]
    fn test_slot_budget_without_day_trip() {
        assert_eq!(slot_budget(TimeSlot::Evening, Pace::Fast, None), 180);
        assert_eq!(slot_budget(TimeSlot::Evening, Pace::Fast, Some(30)), 150);
    }
}
