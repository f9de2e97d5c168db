//! Static travel knowledge table
//!
//! Pure lookups only; no external state.

/// Always packed, regardless of weather or duration
const ESSENTIALS: [&str; 4] = ["passport", "phone charger", "medications", "comfortable shoes"];

const HOT_GEAR: [&str; 4] = ["sunscreen", "hat", "light clothing", "water bottle"];
const COLD_GEAR: [&str; 4] = ["warm jacket", "gloves", "hat", "thermal underwear"];
const RAIN_GEAR: [&str; 3] = ["umbrella", "waterproof jacket", "quick-dry clothes"];

/// Extras for trips longer than a week
const LONG_TRIP_EXTRAS: [&str; 3] = ["laundry detergent", "extra underwear", "backup electronics"];

/// Build a packing list from a weather description and trip length
///
/// Starts from the essentials, appends at most one weather bucket by
/// first-match priority (hot beats cold beats rainy, case-insensitive
/// substring match), then appends the long-trip extras when the trip
/// runs longer than 7 days.
pub fn packing_list(weather_description: &str, duration_days: u32) -> Vec<&'static str> {
    let weather = weather_description.to_lowercase();
    let mut items: Vec<&'static str> = ESSENTIALS.to_vec();

    if weather.contains("hot") || weather.contains("sunny") {
        items.extend(HOT_GEAR);
    } else if weather.contains("cold") || weather.contains("snow") {
        items.extend(COLD_GEAR);
    } else if weather.contains("rain") {
        items.extend(RAIN_GEAR);
    }

    if duration_days > 7 {
        items.extend(LONG_TRIP_EXTRAS);
    }

    items
}
