use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{Drama, Rating},
};

const REQUIRED_COLUMNS: [&str; 4] = ["title", "genres", "synopsis", "rating"];

/// Read-only drama catalog loaded once at startup
///
/// Row `i` of the catalog is row `i` of the feature matrix built from it.
#[derive(Debug, Clone)]
pub struct Catalog {
    dramas: Vec<Drama>,
    /// Lower-cased title → first row carrying it
    by_title: HashMap<String, usize>,
}

struct ColumnIndices {
    title: usize,
    genres: usize,
    synopsis: usize,
    rating: usize,
}

impl Catalog {
    /// Loads the catalog from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;

        tracing::info!(
            path = %path.display(),
            dramas = catalog.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Loads the catalog from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns = Self::locate_columns(reader.headers()?)?;

        let mut dramas = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cell = |idx: usize| record.get(idx).unwrap_or("");

            if cell(columns.title).trim().is_empty() {
                tracing::warn!(line = ?record_line(&record), "Skipping catalog row without a title");
                continue;
            }

            dramas.push(Drama::new(
                cell(columns.title),
                cell(columns.genres),
                cell(columns.synopsis),
                Rating::parse(cell(columns.rating)),
            ));
        }

        Self::from_dramas(dramas)
    }

    /// Builds a catalog from already-parsed entries
    pub fn from_dramas(dramas: Vec<Drama>) -> AppResult<Self> {
        if dramas.is_empty() {
            return Err(AppError::EmptyCatalog);
        }

        let mut by_title = HashMap::with_capacity(dramas.len());
        for (row, drama) in dramas.iter().enumerate() {
            by_title.entry(drama.title.to_lowercase()).or_insert(row);
        }

        if by_title.len() < dramas.len() {
            tracing::warn!(
                duplicates = dramas.len() - by_title.len(),
                "Catalog contains duplicate titles; the first occurrence wins"
            );
        }

        Ok(Self { dramas, by_title })
    }

    fn locate_columns(headers: &csv::StringRecord) -> AppResult<ColumnIndices> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    AppError::CatalogFormat(format!(
                        "missing the '{}' column (required: {})",
                        name,
                        REQUIRED_COLUMNS.join(", ")
                    ))
                })
        };

        Ok(ColumnIndices {
            title: position("title")?,
            genres: position("genres")?,
            synopsis: position("synopsis")?,
            rating: position("rating")?,
        })
    }

    /// Resolves a title by exact case-insensitive match
    pub fn find(&self, title: &str) -> Option<usize> {
        self.by_title.get(&title.trim().to_lowercase()).copied()
    }

    pub fn get(&self, row: usize) -> Option<&Drama> {
        self.dramas.get(row)
    }

    pub fn dramas(&self) -> &[Drama] {
        &self.dramas
    }

    pub fn len(&self) -> usize {
        self.dramas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dramas.is_empty()
    }

    /// Featurizer input, one string per row in catalog order
    pub fn combined_texts(&self) -> Vec<String> {
        self.dramas.iter().map(Drama::combined_text).collect()
    }
}

/// File line a record starts on; quoted fields may span several lines
fn record_line(record: &csv::StringRecord) -> Option<u64> {
    record.position().map(|p| p.line())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
title,genres,synopsis,rating,episodes
Crash Landing on You,\"Romance,Comedy\",A paraglider lands in North Korea.,8.7,16
It's Okay to Not Be Okay,\"Romance,Drama\",A caregiver meets a writer.,8.4,16
Kingdom,\"Thriller,Horror\",A prince fights a plague.,N/A,12
,Comedy,Untitled row.,7.0,1
crash landing on you,Comedy,Duplicate row.,6.0,1
";

    #[test]
    fn test_from_reader_normalizes_rows() {
        let catalog = Catalog::from_reader(CSV.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 4);
        let first = catalog.get(0).unwrap();
        assert_eq!(first.title, "Crash Landing on You");
        assert_eq!(first.genres, "Romance Comedy");
        assert_eq!(first.rating, Rating::Score(8.7));
        assert_eq!(catalog.get(2).unwrap().rating, Rating::NotAvailable);
    }

    #[test]
    fn test_find_is_case_insensitive_and_first_wins() {
        let catalog = Catalog::from_reader(CSV.as_bytes()).unwrap();

        assert_eq!(catalog.find("CRASH LANDING ON YOU"), Some(0));
        assert_eq!(catalog.find("  kingdom "), Some(2));
        assert_eq!(catalog.find("it's okay to not be okay"), Some(1));
        assert_eq!(catalog.find("Not A Real Drama Title"), None);
    }

    #[test]
    fn test_missing_cells_become_empty() {
        let csv = "title,genres,synopsis,rating\nSignal,,,\n";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        let drama = catalog.get(0).unwrap();

        assert_eq!(drama.genres, "");
        assert_eq!(drama.synopsis, "");
        assert_eq!(drama.rating, Rating::NotAvailable);
    }

    #[test]
    fn test_headers_matched_case_insensitively() {
        let csv = "Rating, Title ,Synopsis,GENRES\n9.1,Reply 1988,Friends grow up.,Family\n";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        let drama = catalog.get(0).unwrap();

        assert_eq!(drama.title, "Reply 1988");
        assert_eq!(drama.genres, "Family");
        assert_eq!(drama.rating, Rating::Score(9.1));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let result = Catalog::from_reader("title,genres,synopsis,rating\n".as_bytes());
        assert!(matches!(result, Err(AppError::EmptyCatalog)));
    }

    #[test]
    fn test_missing_column_rejected() {
        let result = Catalog::from_reader("title,genres,rating\nA,B,1\n".as_bytes());
        match result {
            Err(AppError::CatalogFormat(msg)) => assert!(msg.contains("synopsis")),
            other => panic!("expected missing column error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Catalog::from_path("/nonexistent/dramas.csv");
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_record_line_counts_multiline_fields() {
        let csv = "title,genres,synopsis,rating\n\
Mr. Sunshine,History,\"A soldier returns.\nHe falls in love.\nWar comes.\",9.0\n\
,Drama,Untitled row.,7.0\n";

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let lines: Vec<Option<u64>> = reader
            .records()
            .map(|record| record_line(&record.unwrap()))
            .collect();
        assert_eq!(lines, vec![Some(2), Some(5)]);

        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(0).unwrap().synopsis.contains("War comes."));
    }
}
