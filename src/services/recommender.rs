use chrono::{DateTime, Utc};

use crate::db::Catalog;
use crate::error::AppResult;
use crate::services::featurizer::TfidfFeaturizer;
use crate::services::similarity::{Neighbor, SimilarityIndex};

/// Catalog plus the similarity index built over it
///
/// Built once at startup and shared read-only between requests; row `i` of the
/// index always refers to `catalog.get(i)`.
#[derive(Debug)]
pub struct Recommender {
    catalog: Catalog,
    index: SimilarityIndex,
    vocabulary_size: usize,
    built_at: DateTime<Utc>,
}

impl Recommender {
    /// Featurizes every catalog entry and indexes the result
    pub fn build(catalog: Catalog) -> AppResult<Self> {
        let featurizer = TfidfFeaturizer::new()?;
        let fitted = featurizer.fit_transform(&catalog.combined_texts());

        let zero_rows = fitted
            .matrix
            .rows()
            .iter()
            .filter(|row| row.is_empty())
            .count();
        if zero_rows > 0 {
            tracing::warn!(
                zero_rows,
                "Some dramas have no usable genre or synopsis text"
            );
        }

        let vocabulary_size = fitted.vocabulary.len();
        let index = SimilarityIndex::build(fitted.matrix);

        tracing::info!(
            dramas = catalog.len(),
            vocabulary = vocabulary_size,
            "Similarity index built"
        );

        Ok(Self {
            catalog,
            index,
            vocabulary_size,
            built_at: Utc::now(),
        })
    }

    /// Subject row followed by up to `top_n` nearest neighbours
    ///
    /// `Ok(None)` when no catalog title matches `title` case-insensitively.
    pub fn similar(&self, title: &str, top_n: usize) -> AppResult<Option<Vec<Neighbor>>> {
        let Some(row) = self.catalog.find(title) else {
            return Ok(None);
        };

        let mut neighbors = self.index.query(row, top_n)?;
        // query() leads with the subject; keep it first and never repeat it
        let subject = neighbors.remove(0);
        neighbors.retain(|n| n.row != row);
        neighbors.truncate(top_n);
        neighbors.insert(0, subject);

        Ok(Some(neighbors))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Drama, Rating};

    fn recommender() -> Recommender {
        let catalog = Catalog::from_dramas(vec![
            Drama::new(
                "Crash Landing on You",
                "romance,comedy",
                "A paragliding heiress lands in North Korea",
                Rating::Score(8.7),
            ),
            Drama::new(
                "It's Okay to Not Be Okay",
                "romance,drama",
                "A caregiver meets a children's book author",
                Rating::Score(8.4),
            ),
            Drama::new(
                "Signal",
                "crime,thriller",
                "A detective talks to the past through a radio",
                Rating::Score(8.5),
            ),
            Drama::new(
                "Hospital Playlist",
                "medical,drama",
                "Five doctors who became friends in medical school",
                Rating::NotAvailable,
            ),
        ])
        .unwrap();
        Recommender::build(catalog).unwrap()
    }

    #[test]
    fn test_subject_first() {
        let recommender = recommender();
        let neighbors = recommender.similar("crash landing on you", 1).unwrap().unwrap();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].row, 0);
        assert_eq!(neighbors[0].distance, 0.0);
        // only entry sharing a term ("romance") with the subject
        assert_eq!(neighbors[1].row, 1);
    }

    #[test]
    fn test_every_title_resolves_to_itself() {
        let recommender = recommender();
        for (row, drama) in recommender.catalog().dramas().iter().enumerate() {
            let neighbors = recommender
                .similar(&drama.title.to_uppercase(), 2)
                .unwrap()
                .unwrap();
            assert_eq!(neighbors[0].row, row);
        }
    }

    #[test]
    fn test_neighbor_count_and_uniqueness() {
        let recommender = recommender();
        for top_n in 0..=3 {
            let neighbors = recommender.similar("Signal", top_n).unwrap().unwrap();
            assert_eq!(neighbors.len(), top_n + 1);
            let mut rows: Vec<usize> = neighbors.iter().map(|n| n.row).collect();
            rows.sort_unstable();
            rows.dedup();
            assert_eq!(rows.len(), neighbors.len());
        }
    }

    #[test]
    fn test_top_n_capped_by_catalog_size() {
        let recommender = recommender();
        let neighbors = recommender.similar("Signal", 10).unwrap().unwrap();
        assert_eq!(neighbors.len(), 4);
    }

    #[test]
    fn test_unknown_title() {
        let recommender = recommender();
        assert!(recommender
            .similar("Not A Real Drama Title", 5)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_metadata() {
        let recommender = recommender();
        assert_eq!(recommender.catalog().len(), 4);
        assert!(recommender.vocabulary_size() > 0);
        assert!(recommender.built_at() <= Utc::now());
    }

    #[test]
    fn test_duplicate_title_resolves_to_first_and_lists_later_row() {
        let catalog = Catalog::from_dramas(vec![
            Drama::new(
                "Signal",
                "crime,thriller",
                "A detective talks to the past through a radio",
                Rating::Score(8.5),
            ),
            Drama::new(
                "Hospital Playlist",
                "medical,drama",
                "Five doctors who became friends in medical school",
                Rating::Score(9.0),
            ),
            Drama::new(
                "signal",
                "crime,thriller",
                "A detective talks to the past through a radio",
                Rating::Score(7.0),
            ),
        ])
        .unwrap();
        let recommender = Recommender::build(catalog).unwrap();

        let neighbors = recommender.similar("SIGNAL", 2).unwrap().unwrap();
        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors[0].row, 0);
        // the later duplicate is a distinct row and ranks as the closest match
        assert_eq!(neighbors[1].row, 2);
        assert!(neighbors[1].distance < 1e-9);
        assert_eq!(neighbors[2].row, 1);
    }
}
