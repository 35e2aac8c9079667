use std::path::Path;

use indicatif::ProgressBar;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use resy_venue_scraper::{
    combine::combine_directory,
    types::VenueRecord,
    workbook::save_batch,
    ScrapeError,
};

fn venue(state: &str, city: &str, n: usize) -> VenueRecord {
    let slug = city.to_lowercase().replace(' ', "-");
    VenueRecord {
        name: format!("{} Venue {}", city, n),
        link: format!(
            "https://resy.com/cities/{}-{}/venues/venue-{}",
            slug,
            state.to_lowercase(),
            n
        ),
        venue_id: Some(format!("{}", 1000 + n)),
    }
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let headers = rdr.headers().unwrap().iter().map(str::to_string).collect();
    let rows = rdr
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

#[test]
fn test_combine_stamps_every_row() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let layout = [("CA", ["Los Angeles", "San Diego"]), ("TX", ["Austin", "Dallas"])];
    let rows_per_city = 3;

    for (state, cities) in &layout {
        for city in cities {
            let records: Vec<_> = (0..rows_per_city).map(|n| venue(state, city, n)).collect();
            assert!(save_batch(input.path(), state, city, &records).unwrap());
        }
    }

    let out_path = output.path().join("combined_data.csv");
    let rows = combine_directory(input.path(), &out_path, &ProgressBar::hidden()).unwrap();
    assert_eq!(rows, 2 * 2 * rows_per_city);

    let (headers, records) = read_csv(&out_path);
    assert_eq!(
        headers,
        vec!["Restaurant Name", "Link", "Venue ID", "City", "State"]
    );
    assert_eq!(records.len(), 12);

    for record in &records {
        let (name, city, state) = (&record[0], &record[3], &record[4]);
        assert!(name.starts_with(city.as_str()), "{} stamped with {}", name, city);
        assert!(record[1].contains(&format!("-{}/", state.to_lowercase())));
    }

    // File order, then sheet order, then original row order.
    let order: Vec<(String, String)> = records
        .iter()
        .step_by(rows_per_city)
        .map(|r| (r[4].clone(), r[3].clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("CA".to_string(), "Los Angeles".to_string()),
            ("CA".to_string(), "San Diego".to_string()),
            ("TX".to_string(), "Austin".to_string()),
            ("TX".to_string(), "Dallas".to_string()),
        ]
    );
    assert_eq!(records[0][0], "Los Angeles Venue 0");
    assert_eq!(records[2][0], "Los Angeles Venue 2");
}

#[test]
fn test_combine_empty_directory_fails() {
    let input = tempdir().unwrap();
    let out_path = input.path().join("combined_data.csv");

    let err = combine_directory(input.path(), &out_path, &ProgressBar::hidden()).unwrap_err();
    assert!(matches!(err, ScrapeError::NoInput { .. }));
    assert!(!out_path.exists());
}

#[test]
fn test_combine_unreadable_workbook_fails() {
    let input = tempdir().unwrap();
    std::fs::write(input.path().join("NV.xlsx"), b"definitely not a zip archive").unwrap();
    let out_path = input.path().join("combined_data.csv");

    let err = combine_directory(input.path(), &out_path, &ProgressBar::hidden()).unwrap_err();
    assert!(matches!(err, ScrapeError::Workbook { .. }));
}
