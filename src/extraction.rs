//! Location extraction from free text
//!
//! A closed-vocabulary lookup: only the cities in [`KNOWN_CITIES`] can be
//! recognised. Anything else is unresolved, and [`extract_location`] then
//! answers with [`DEFAULT_CITY`], so a place outside the list silently gets
//! the default city's weather.

/// Recognised cities in priority order
pub const KNOWN_CITIES: [&str; 10] = [
    "Islamabad",
    "Lahore",
    "Karachi",
    "Peshawar",
    "Quetta",
    "Rawalpindi",
    "Multan",
    "Faisalabad",
    "Hyderabad",
    "Gujranwala",
];

/// Words after which the next token is checked against the city list
pub const LOCATION_PREPOSITIONS: [&str; 6] = ["in", "at", "for", "to", "around", "near"];

/// City used when the query names no known city
pub const DEFAULT_CITY: &str = "Islamabad";

/// Find a known city in the query, or `None` when unresolved
#[must_use]
pub fn resolve_known_city(query: &str) -> Option<&'static str> {
    let query = query.to_lowercase();

    if let Some(city) = KNOWN_CITIES
        .iter()
        .copied()
        .find(|city| query.contains(&city.to_lowercase()))
    {
        return Some(city);
    }

    let words: Vec<&str> = query.split_whitespace().collect();
    words.windows(2).find_map(|pair| {
        if LOCATION_PREPOSITIONS.contains(&pair[0]) {
            KNOWN_CITIES
                .iter()
                .copied()
                .find(|city| city.eq_ignore_ascii_case(pair[1]))
        } else {
            None
        }
    })
}

/// Location for a free-text query, falling back to [`DEFAULT_CITY`]
#[must_use]
pub fn extract_location(query: &str) -> &'static str {
    resolve_known_city(query).unwrap_or(DEFAULT_CITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("weather in Islamabad", "Islamabad")]
    #[case("how hot is lahore today", "Lahore")]
    #[case("KARACHI humidity", "Karachi")]
    #[case("rain near peshawar?", "Peshawar")]
    #[case("Quetta snow", "Quetta")]
    #[case("temperature at rawalpindi", "Rawalpindi")]
    #[case("multan forecast", "Multan")]
    #[case("is it windy in Faisalabad", "Faisalabad")]
    #[case("hyderabad weather", "Hyderabad")]
    #[case("weather for gujranwala tomorrow", "Gujranwala")]
    fn test_known_city_anywhere_in_query(#[case] query: &str, #[case] expected: &str) {
        assert_eq!(extract_location(query), expected);
        assert_eq!(resolve_known_city(query), Some(expected));
    }

    #[test]
    fn test_list_order_wins_when_several_cities_appear() {
        assert_eq!(extract_location("flights from Karachi to Lahore"), "Lahore");
        assert_eq!(extract_location("Gujranwala or Islamabad"), "Islamabad");
    }

    #[test]
    fn test_substring_match_is_not_word_bounded() {
        assert_eq!(extract_location("greater multanistan"), "Multan");
    }

    #[rstest]
    #[case("what's the weather like")]
    #[case("weather in Paris")]
    #[case("")]
    #[case("temperature near the coast")]
    fn test_unresolved_falls_back_to_default(#[case] query: &str) {
        assert_eq!(resolve_known_city(query), None);
        assert_eq!(extract_location(query), DEFAULT_CITY);
    }

    #[test]
    fn test_preposition_lookup_accepts_only_known_cities() {
        assert_eq!(resolve_known_city("weather in London"), None);
        assert_eq!(resolve_known_city("weather around Quetta"), Some("Quetta"));
    }
}
