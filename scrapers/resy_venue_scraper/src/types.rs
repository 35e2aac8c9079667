use serde::{Deserialize, Serialize};

pub const LISTING_URL: &str = "https://resy.com/list-venues?amp;seats=2&seats=2&date=2024-10-09";
pub const SITE_ROOT: &str = "https://resy.com/";
pub const VENUE_ID_API_PREFIX: &str = "https://api.resy.com/2/config?venue_id=";

/// Column headers of every city sheet, in write order.
pub const VENUE_COLUMNS: [&str; 3] = ["Restaurant Name", "Link", "Venue ID"];

pub const US_STATE_ABBREVIATIONS: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

/// An `a.venue` anchor as it appears on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueAnchor {
    pub name: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRecord {
    #[serde(rename = "Restaurant Name")]
    pub name: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Venue ID")]
    pub venue_id: Option<String>,
}

impl VenueRecord {
    /// Cells in `VENUE_COLUMNS` order; a missing venue id is an empty cell.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.link.clone(),
            self.venue_id.clone().unwrap_or_default(),
        ]
    }
}
