use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::browser::PageDriver;
use crate::error::Result;
use crate::types::VENUE_ID_API_PREFIX;

static VENUE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"venue_id=(\d+)").expect("valid venue id pattern"));

/// Single-assignment slot for the venue id: the first qualifying request wins.
#[derive(Debug, Default)]
pub struct VenueIdLatch {
    venue_id: Option<String>,
}

impl VenueIdLatch {
    /// Inspects one outgoing request URL. Returns true only for the call that latched.
    pub fn observe(&mut self, url: &str) -> bool {
        if self.venue_id.is_some() || !url.contains(VENUE_ID_API_PREFIX) {
            return false;
        }
        debug!("Intercepted request URL: {}", url);

        match VENUE_ID_RE.captures(url) {
            Some(cap) => {
                let id = cap[1].to_string();
                info!("Extracted venue ID: {}", id);
                self.venue_id = Some(id);
                true
            }
            None => false,
        }
    }

    pub fn is_latched(&self) -> bool {
        self.venue_id.is_some()
    }

    pub fn into_inner(self) -> Option<String> {
        self.venue_id
    }
}

/// Loads `venue_url` and returns the id carried by the page's config API call,
/// or `None` if none was seen before the page went idle.
pub async fn extract_venue_id<D: PageDriver + ?Sized>(
    page: &mut D,
    venue_url: &str,
    timeout: Duration,
) -> Result<Option<String>> {
    let mut latch = VenueIdLatch::default();
    page.navigate(venue_url, timeout, &mut |url: &str| {
        latch.observe(url);
    })
    .await?;
    Ok(latch.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct ScriptedPage {
        requests: Vec<&'static str>,
        visited: Vec<String>,
    }

    #[async_trait]
    impl PageDriver for ScriptedPage {
        async fn navigate(
            &mut self,
            url: &str,
            _idle_timeout: Duration,
            observer: &mut (dyn for<'a> FnMut(&'a str) + Send),
        ) -> Result<()> {
            self.visited.push(url.to_string());
            for request in &self.requests {
                observer(*request);
            }
            Ok(())
        }

        async fn content(&mut self) -> Result<String> {
            Ok(String::new())
        }
    }

    /// Builds each request URL inside `navigate`, the way CDP events arrive.
    struct GeneratedPage {
        ids: Vec<u32>,
    }

    #[async_trait]
    impl PageDriver for GeneratedPage {
        async fn navigate(
            &mut self,
            _url: &str,
            _idle_timeout: Duration,
            observer: &mut (dyn for<'a> FnMut(&'a str) + Send),
        ) -> Result<()> {
            for id in &self.ids {
                let request = format!("https://api.resy.com/2/config?venue_id={}", id);
                observer(request.as_str());
            }
            Ok(())
        }

        async fn content(&mut self) -> Result<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_extract_venue_id_from_short_lived_urls() {
        let mut page = GeneratedPage { ids: vec![812, 813] };
        let id = extract_venue_id(&mut page, "https://resy.com/x", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(id, Some("812".to_string()));
    }

    #[test]
    fn test_latch_first_match_wins() {
        let mut latch = VenueIdLatch::default();
        assert!(!latch.observe("https://resy.com/static/app.js"));
        assert!(latch.observe("https://api.resy.com/2/config?venue_id=1234"));
        assert!(!latch.observe("https://api.resy.com/2/config?venue_id=9999"));
        assert!(latch.is_latched());
        assert_eq!(latch.into_inner(), Some("1234".to_string()));
    }

    #[test]
    fn test_latch_ignores_other_endpoints() {
        let mut latch = VenueIdLatch::default();
        assert!(!latch.observe("https://api.resy.com/4/find?venue_id=55"));
        assert!(!latch.observe("https://api.resy.com/2/config?venue_id=abc"));
        assert!(!latch.is_latched());
        assert!(latch.observe("https://api.resy.com/2/config?venue_id=77&lat=0"));
        assert_eq!(latch.into_inner(), Some("77".to_string()));
    }

    #[tokio::test]
    async fn test_extract_venue_id() {
        let mut page = ScriptedPage {
            requests: vec![
                "https://resy.com/cities/austin-tx/venues/test-bar",
                "https://api.resy.com/2/config?venue_id=58123",
                "https://api.resy.com/2/config?venue_id=1",
            ],
            visited: Vec::new(),
        };
        let id = extract_venue_id(
            &mut page,
            "https://resy.com/cities/austin-tx/venues/test-bar",
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(id, Some("58123".to_string()));
        assert_eq!(page.visited, vec!["https://resy.com/cities/austin-tx/venues/test-bar"]);
    }

    #[tokio::test]
    async fn test_extract_venue_id_none_observed() {
        let mut page = ScriptedPage {
            requests: vec!["https://resy.com/favicon.ico"],
            visited: Vec::new(),
        };
        let id = extract_venue_id(&mut page, "https://resy.com/x", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(id, None);
    }
}
