use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::Page;
use futures::{FutureExt, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};

/// A page counts as idle once no request has been in flight for this long.
pub const IDLE_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// The narrow surface the scraper needs from a browser tab.
#[async_trait]
pub trait PageDriver: Send {
    /// Navigates to `url` and blocks until the network is idle or `idle_timeout`
    /// elapses. Every outgoing request URL is handed to `observer`, which is
    /// attached before navigation starts. Running out of time is not an error.
    async fn navigate(
        &mut self,
        url: &str,
        idle_timeout: Duration,
        observer: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<()>;

    /// Markup of the page as currently rendered.
    async fn content(&mut self) -> Result<String>;
}

/// Tracks requests that have started but not yet finished or failed.
#[derive(Debug, Default)]
pub struct InflightTracker {
    inflight: HashSet<String>,
}

impl InflightTracker {
    pub fn started(&mut self, request_id: &str) {
        self.inflight.insert(request_id.to_string());
    }

    pub fn finished(&mut self, request_id: &str) {
        self.inflight.remove(request_id);
    }

    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_idle(&self) -> bool {
        self.inflight.is_empty()
    }
}

/// A headless Chromium process plus the task pumping its CDP connection.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    pub async fn launch(headless: bool) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ScrapeError::Launch)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {}", e);
                }
            }
        });

        info!("Launched Chromium (headless: {})", headless);
        Ok(Self { browser, handler })
    }

    pub async fn new_page(&self) -> Result<ChromePage> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromePage { page })
    }

    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed waiting for browser process: {}", e);
        }
        self.handler.abort();
    }
}

pub struct ChromePage {
    page: Page,
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn navigate(
        &mut self,
        url: &str,
        idle_timeout: Duration,
        observer: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<()> {
        // Listeners first, so the very first request of the navigation is seen.
        let mut requests = self.page.event_listener::<EventRequestWillBeSent>().await?;
        let mut finished = self.page.event_listener::<EventLoadingFinished>().await?;
        let mut failed = self.page.event_listener::<EventLoadingFailed>().await?;

        let deadline = Instant::now() + idle_timeout;
        let mut tracker = InflightTracker::default();

        match tokio::time::timeout_at(deadline, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => warn!("Navigation to {} did not finish within {:?}", url, idle_timeout),
        }

        loop {
            tokio::select! {
                biased;
                _ = tokio::time::sleep_until(deadline) => {
                    debug!(
                        "Gave up waiting for network idle on {} ({} in flight)",
                        url,
                        tracker.in_flight()
                    );
                    break;
                }
                Some(event) = requests.next() => {
                    tracker.started(event.request_id.inner());
                    observer(event.request.url.as_str());
                }
                Some(event) = finished.next() => tracker.finished(event.request_id.inner()),
                Some(event) = failed.next() => tracker.finished(event.request_id.inner()),
                _ = tokio::time::sleep(IDLE_QUIET_PERIOD), if tracker.is_idle() => {
                    debug!("Network idle on {}", url);
                    break;
                }
            }
        }

        // Requests already buffered when the deadline hit still reach the observer.
        while let Some(Some(event)) = requests.next().now_or_never() {
            observer(event.request.url.as_str());
        }

        Ok(())
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.page.content().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflight_tracker() {
        let mut tracker = InflightTracker::default();
        assert!(tracker.is_idle());

        tracker.started("1");
        tracker.started("2");
        // A redirect reuses its request id.
        tracker.started("2");
        assert_eq!(tracker.in_flight(), 2);

        tracker.finished("1");
        assert!(!tracker.is_idle());
        tracker.finished("2");
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_inflight_tracker_ignores_unknown_ids() {
        let mut tracker = InflightTracker::default();
        tracker.finished("from-previous-page");
        assert!(tracker.is_idle());
    }
}
