use scraper::{Html, Selector};

use crate::error::{Result, ScrapeError};
use crate::types::VenueAnchor;

const VENUE_SELECTOR: &str = "a.venue";

/// Collects every `a.venue` anchor of the rendered listing page, in document order.
///
/// Anchors without an `href` are kept so that indexes into the list stay
/// stable between runs; the orchestrator treats them as unparseable.
pub fn parse_venue_anchors(html: &str) -> Result<Vec<VenueAnchor>> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(VENUE_SELECTOR).map_err(|_| ScrapeError::Selector(VENUE_SELECTOR.into()))?;

    let venues = document
        .select(&selector)
        .map(|anchor| VenueAnchor {
            name: anchor
                .text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<String>(),
            href: anchor.value().attr("href").map(str::to_string),
        })
        .collect();

    Ok(venues)
}
