use tracing::{info, warn};

use crate::{
    browser::{ChromeSession, PageDriver},
    checkpoint::ScanCheckpoint,
    config::{ScanWindow, ScraperConfig},
    error::Result,
    interceptor::extract_venue_id,
    listing::parse_venue_anchors,
    retry::{retry_with_backoff, RetryPolicy},
    summary::RunSummary,
    types::{VenueAnchor, VenueRecord, LISTING_URL},
    utils::{extract_city_state, is_us_state, venue_link},
    workbook::save_batch,
};

/// Scrapes the configured window of the venue listing using an open page.
///
/// The listing is loaded once; each venue in the window is then visited in
/// order and written to its state workbook straight away. The checkpoint is
/// advanced after every venue, so a later attempt resumes where this one
/// stopped.
pub async fn scrape_listing<D: PageDriver + ?Sized>(
    page: &mut D,
    config: &ScraperConfig,
) -> Result<RunSummary> {
    let mut summary = RunSummary::start();

    page.navigate(LISTING_URL, config.listing_timeout(), &mut |_: &str| {})
        .await?;
    let html = page.content().await?;
    let venues = parse_venue_anchors(&html)?;
    info!("Found {} venues.", venues.len());

    let checkpoint_path = config.checkpoint_path();
    let checkpoint = ScanCheckpoint::load(&checkpoint_path)?;
    let start = ScanCheckpoint::resume_index(checkpoint.as_ref(), &config.window, venues.len());
    let end = config.window.end.min(venues.len());

    if start >= end {
        info!(
            "Nothing left to scan in window {}..{} (resume at {}, {} venues listed)",
            config.window.start,
            config.window.end,
            start,
            venues.len()
        );
    } else if start > config.window.start {
        info!("Resuming scan at venue {}", start + 1);
    }

    for index in start..end {
        summary.record_scanned();
        info!("{}", progress_line(index, &config.window));
        process_venue(page, config, &venues[index], &mut summary).await?;
        ScanCheckpoint::new(index + 1, venues.len(), &config.window).save(&checkpoint_path)?;
    }

    summary.finish();
    Ok(summary)
}

/// 1-based listing position over the size of the window being scanned.
fn progress_line(index: usize, window: &ScanWindow) -> String {
    format!("Processing url {} of {}", index + 1, window.len())
}

async fn process_venue<D: PageDriver + ?Sized>(
    page: &mut D,
    config: &ScraperConfig,
    venue: &VenueAnchor,
    summary: &mut RunSummary,
) -> Result<()> {
    let href = venue.href.as_deref().unwrap_or_default();
    let (city, state) = match extract_city_state(href) {
        Some((city, state)) if is_us_state(&state) => (city, state),
        _ => {
            info!("Skipping non-US venue: {}", venue.name);
            summary.record_skipped();
            return Ok(());
        }
    };

    let link = venue_link(href);
    let venue_id = extract_venue_id(page, &link, config.venue_timeout()).await?;
    if venue_id.is_none() {
        warn!("No venue ID observed for {}", link);
    }
    info!(
        "US Venue: {}, City: {}, State: {}, Venue ID: {}",
        venue.name,
        city,
        state,
        venue_id.as_deref().unwrap_or("None")
    );

    let record = VenueRecord {
        name: venue.name.clone(),
        link,
        venue_id,
    };
    let found = record.venue_id.is_some();
    if save_batch(&config.output_dir, &state, &city, std::slice::from_ref(&record))? {
        summary.record_written(found);
    }
    Ok(())
}

/// One attempt: launch Chromium, scrape, and close the browser whatever happened.
pub async fn scrape_with_chromium(config: &ScraperConfig) -> Result<RunSummary> {
    let session = ChromeSession::launch(config.browser.headless).await?;
    let result = async {
        let mut page = session.new_page().await?;
        scrape_listing(&mut page, config).await
    }
    .await;
    session.close().await;
    result
}

/// Scrapes with retries. Browser and navigation failures restart the attempt
/// from the saved checkpoint; anything else ends the run.
pub async fn run(config: &ScraperConfig) -> Result<RunSummary> {
    let policy = RetryPolicy::from(&config.retry);
    retry_with_backoff(&policy, || scrape_with_chromium(config)).await
}
