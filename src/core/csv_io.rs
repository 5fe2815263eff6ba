use crate::utils::error::{CrawlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Reads header-keyed rows. Unknown columns are ignored and missing ones
/// fall back to the field defaults.
pub fn read_records<T: DeserializeOwned>(data: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Writes `headers` followed by one line per row. The header line is
/// present even when `rows` is empty.
pub fn write_records<T: Serialize>(headers: &[&str], rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| CrawlError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{LibraryRecord, ResultRow};

    #[test]
    fn test_read_records_ignores_extra_columns() {
        let data = "region,library_name,library_base_url\nCA, Oakland Public Library ,https://oaklandlibrary.bibliocommons.com\nCA,No Url,\n";
        let records: Vec<LibraryRecord> = read_records(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].library_name, "Oakland Public Library");
        assert_eq!(
            records[0].library_base_url,
            "https://oaklandlibrary.bibliocommons.com"
        );
        assert_eq!(records[1].library_base_url, "");
    }

    #[test]
    fn test_write_records_header_only_when_empty() {
        let bytes = write_records::<ResultRow>(&ResultRow::HEADERS, &[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "library_name,book_club_name,book_club_url,rss_url,notes\n"
        );
    }

    #[test]
    fn test_write_records_quotes_commas() {
        let row = ResultRow::placeholder("Cincinnati & Hamilton County, OH", "no series links found (maybe single events)");
        let bytes = write_records(&ResultRow::HEADERS, &[row]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.ends_with(
            "\"Cincinnati & Hamilton County, OH\",,,,no series links found (maybe single events)\n"
        ));
    }
}
