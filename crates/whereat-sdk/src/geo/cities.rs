//! Static coordinates for well-known office cities

use super::Coordinates;

// Order matters for substring matching: longer names come first
const CITIES: &[(&str, Coordinates)] = &[
    // United States
    ("mountain view", Coordinates::new(-122.0838, 37.3861)),
    ("san francisco", Coordinates::new(-122.4194, 37.7749)),
    ("seattle", Coordinates::new(-122.3321, 47.6062)),
    ("redmond", Coordinates::new(-122.1215, 47.6740)),
    ("new york", Coordinates::new(-74.0060, 40.7128)),
    ("los angeles", Coordinates::new(-118.2437, 34.0522)),
    ("chicago", Coordinates::new(-87.6298, 41.8781)),
    ("austin", Coordinates::new(-97.7431, 30.2672)),
    ("boston", Coordinates::new(-71.0589, 42.3601)),
    ("denver", Coordinates::new(-104.9903, 39.7392)),
    ("atlanta", Coordinates::new(-84.3880, 33.7490)),
    ("dallas", Coordinates::new(-96.7970, 32.7767)),
    ("irving", Coordinates::new(-96.9489, 32.8140)),
    ("fort worth", Coordinates::new(-97.3308, 32.7555)),
    ("miami", Coordinates::new(-80.1918, 25.7617)),
    ("tampa", Coordinates::new(-82.4572, 27.9506)),
    ("tarpon springs", Coordinates::new(-82.7568, 28.1461)),
    ("orlando", Coordinates::new(-81.3792, 28.5383)),
    ("phoenix", Coordinates::new(-112.0740, 33.4484)),
    ("washington", Coordinates::new(-77.0369, 38.9072)),
    ("glendale heights", Coordinates::new(-88.0687, 41.9145)),
    ("glendale", Coordinates::new(-118.2551, 34.1425)),
    ("naperville", Coordinates::new(-88.1535, 41.7508)),
    ("schaumburg", Coordinates::new(-88.0834, 42.0334)),
    // Europe
    ("london", Coordinates::new(-0.1276, 51.5074)),
    ("paris", Coordinates::new(2.3522, 48.8566)),
    ("berlin", Coordinates::new(13.4050, 52.5200)),
    ("amsterdam", Coordinates::new(4.9041, 52.3676)),
    ("dublin", Coordinates::new(-6.2603, 53.3498)),
    ("munich", Coordinates::new(11.5820, 48.1351)),
    ("zurich", Coordinates::new(8.5417, 47.3769)),
    ("stockholm", Coordinates::new(18.0686, 59.3293)),
    ("madrid", Coordinates::new(-3.7038, 40.4168)),
    ("milan", Coordinates::new(9.1900, 45.4642)),
    // Asia Pacific
    ("tokyo", Coordinates::new(139.6917, 35.6895)),
    ("singapore", Coordinates::new(103.8198, 1.3521)),
    ("sydney", Coordinates::new(151.2093, -33.8688)),
    ("melbourne", Coordinates::new(144.9631, -37.8136)),
    ("bangalore", Coordinates::new(77.5946, 12.9716)),
    ("mumbai", Coordinates::new(72.8777, 19.0760)),
    ("hyderabad", Coordinates::new(78.4867, 17.3850)),
    ("delhi", Coordinates::new(77.1025, 28.7041)),
    ("shanghai", Coordinates::new(121.4737, 31.2304)),
    ("beijing", Coordinates::new(116.4074, 39.9042)),
    ("hong kong", Coordinates::new(114.1694, 22.3193)),
    ("seoul", Coordinates::new(126.9780, 37.5665)),
    ("taipei", Coordinates::new(121.5654, 25.0330)),
    ("jakarta", Coordinates::new(106.8456, -6.2088)),
    ("kuala lumpur", Coordinates::new(101.6869, 3.1390)),
    // Canada
    ("toronto", Coordinates::new(-79.3832, 43.6532)),
    ("vancouver", Coordinates::new(-123.1207, 49.2827)),
    ("montreal", Coordinates::new(-73.5673, 45.5017)),
    ("ottawa", Coordinates::new(-75.6972, 45.4215)),
    // Latin America
    ("sao paulo", Coordinates::new(-46.6333, -23.5505)),
    ("buenos aires", Coordinates::new(-58.3816, -34.6037)),
    ("mexico city", Coordinates::new(-99.1332, 19.4326)),
    // Middle East
    ("dubai", Coordinates::new(55.2708, 25.2048)),
    ("tel aviv", Coordinates::new(34.7818, 32.0853)),
    // Africa
    ("johannesburg", Coordinates::new(28.0473, -26.2041)),
    ("cape town", Coordinates::new(18.4241, -33.9249)),
    ("cairo", Coordinates::new(31.2357, 30.0444)),
    ("lagos", Coordinates::new(3.3792, 6.5244)),
    ("nairobi", Coordinates::new(36.8219, -1.2921)),
];

/// Look up a city: exact name first, then either name containing the other
pub fn city_coordinates(city: &str) -> Option<Coordinates> {
    let city = city.trim().to_lowercase();
    if city.is_empty() {
        return None;
    }

    CITIES
        .iter()
        .find(|(name, _)| *name == city)
        .or_else(|| {
            CITIES
                .iter()
                .find(|(name, _)| city.contains(name) || name.contains(city.as_str()))
        })
        .map(|(_, coords)| *coords)
}
