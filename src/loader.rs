//! Bulk load of the sample dataset from CSV.
//!
//! The file has a header row followed by rows of
//! `Datasource,Campaign,Daily,Clicks,Impressions`, with dates written as
//! `MM/DD/YY`.

use crate::access::AdRecord;
use crate::storage::AdStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;

/// Date format of the `Daily` column
pub const CSV_DATE_FORMAT: &str = "%m/%d/%y";

/// Load the CSV file into the store, but only if the store is empty.
///
/// Returns the number of records inserted.
pub fn load_sample_data(store: &AdStore, path: &Path) -> Result<usize> {
    if !store.is_empty() {
        log::debug!("Dataset already has {} records, skipping load", store.len());
        return Ok(0);
    }

    log::info!("Database empty, loading sample data from {}", path.display());
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open sample data file {}", path.display()))?;
    let records = read_records(file)?;
    let inserted = store.insert_batch(records);
    log::info!("Sample data loaded successfully ({} records)", inserted);

    Ok(inserted)
}

/// Parse every data row of a CSV source
pub fn read_records<R: Read>(source: R) -> Result<Vec<AdRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        // Line 1 is the header
        let line = index + 2;
        let row = row.with_context(|| format!("Malformed CSV at line {}", line))?;
        let record = parse_row(&row).with_context(|| format!("Invalid record at line {}", line))?;
        records.push(record);
    }
    Ok(records)
}

fn parse_row(row: &csv::StringRecord) -> Result<AdRecord> {
    let column = |index: usize, name: &str| {
        row.get(index)
            .with_context(|| format!("missing column {}", name))
    };

    let data_source = column(0, "Datasource")?;
    let campaign = column(1, "Campaign")?;
    let daily_text = column(2, "Daily")?;
    let daily = NaiveDate::parse_from_str(daily_text, CSV_DATE_FORMAT)
        .with_context(|| format!("bad date '{}'", daily_text))?;
    let clicks = column(3, "Clicks")?
        .parse::<i32>()
        .context("bad Clicks value")?;
    let impressions = column(4, "Impressions")?
        .parse::<i32>()
        .context("bad Impressions value")?;

    Ok(AdRecord::new(data_source, campaign, daily, clicks, impressions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "Datasource,Campaign,Daily,Clicks,Impressions\n\
        Google Ads,Adventmarkt Touristik,11/12/19,7,22425\n\
        Twitter Ads,\"Firmen, Mainz\",01/02/20,3,1024\n";

    #[test]
    fn test_read_records() -> Result<()> {
        let records = read_records(SAMPLE.as_bytes())?;
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].data_source, "Google Ads");
        assert_eq!(records[0].campaign, "Adventmarkt Touristik");
        assert_eq!(
            records[0].daily,
            NaiveDate::from_ymd_opt(2019, 11, 12).unwrap()
        );
        assert_eq!(records[0].clicks, 7);
        assert_eq!(records[0].impressions, 22425);

        assert_eq!(records[1].campaign, "Firmen, Mainz");
        assert_eq!(records[1].daily, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        Ok(())
    }

    #[test]
    fn test_bad_row_names_line() {
        let data = "Datasource,Campaign,Daily,Clicks,Impressions\n\
            A,B,11/12/19,7,1\n\
            A,B,2019-11-12,7,1\n";
        let err = read_records(data.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid record at line 3");
        assert!(format!("{:#}", err).contains("bad date '2019-11-12'"));
    }

    #[test]
    fn test_load_only_into_empty_store() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;

        let store = AdStore::new();
        assert_eq!(load_sample_data(&store, file.path())?, 2);
        assert_eq!(store.len(), 2);

        // Second run leaves the dataset untouched
        assert_eq!(load_sample_data(&store, file.path())?, 0);
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_not_read_when_populated() -> Result<()> {
        let store = AdStore::new();
        store.insert_batch(read_records(SAMPLE.as_bytes())?);
        assert_eq!(load_sample_data(&store, Path::new("/nonexistent.csv"))?, 0);

        let empty = AdStore::new();
        assert!(load_sample_data(&empty, Path::new("/nonexistent.csv")).is_err());
        Ok(())
    }
}
