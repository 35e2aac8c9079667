use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{SITE_ROOT, US_STATE_ABBREVIATIONS};

static CITY_STATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"cities/([a-z-]+)-([a-z]{2})/venues").expect("valid city/state pattern")
});

/// Pulls `(City, ST)` out of a venue link such as `cities/new-york-ny/venues/some-place`.
pub fn extract_city_state(href: &str) -> Option<(String, String)> {
    let cap = CITY_STATE_RE.captures(href)?;
    let city = title_case(&cap[1].replace('-', " "));
    let state = cap[2].to_uppercase();
    Some((city, state))
}

pub fn is_us_state(code: &str) -> bool {
    US_STATE_ABBREVIATIONS.contains(&code)
}

pub fn venue_link(href: &str) -> String {
    format!("{}{}", SITE_ROOT, href.trim_start_matches('/'))
}

// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_city_state() {
        assert_eq!(
            extract_city_state("cities/new-york-ny/venues/some-place"),
            Some(("New York".to_string(), "NY".to_string()))
        );
        assert_eq!(
            extract_city_state("/cities/austin-tx/venues/test-bar"),
            Some(("Austin".to_string(), "TX".to_string()))
        );
        assert_eq!(
            extract_city_state("cities/salt-lake-city-ut/venues/x?date=2024-10-09"),
            Some(("Salt Lake City".to_string(), "UT".to_string()))
        );
    }

    #[test]
    fn test_extract_city_state_no_match() {
        assert_eq!(extract_city_state("cities/not-a-valid-path"), None);
        assert_eq!(extract_city_state("cities/London-uk/venues/pub"), None);
        assert_eq!(extract_city_state(""), None);
    }

    #[test]
    fn test_is_us_state() {
        assert!(is_us_state("CA"));
        assert!(is_us_state("NY"));
        assert!(is_us_state("WY"));
        assert!(!is_us_state("DC"));
        assert!(!is_us_state("ZZ"));
        assert!(!is_us_state("ca"));
        assert_eq!(US_STATE_ABBREVIATIONS.len(), 50);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("winston  salem"), "Winston  Salem");
        assert_eq!(title_case("MIAMI beach"), "Miami Beach");
    }

    #[test]
    fn test_venue_link() {
        assert_eq!(
            venue_link("cities/austin-tx/venues/test-bar"),
            "https://resy.com/cities/austin-tx/venues/test-bar"
        );
        assert_eq!(
            venue_link("/cities/austin-tx/venues/test-bar"),
            "https://resy.com/cities/austin-tx/venues/test-bar"
        );
    }
}
