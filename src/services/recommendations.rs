use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::Recommendation,
    services::{posters::fetch_posters, posters::PosterProvider, Recommender},
};

/// Recommendations for a catalog title: the title itself, then its neighbours
///
/// Fails with `NotFound` when the title is not in the catalog. Poster lookups
/// run concurrently and never fail the request; misses, errors and lookups
/// slower than `poster_timeout` become `placeholder`.
pub async fn get_recommendations(
    recommender: &Recommender,
    posters: Arc<dyn PosterProvider>,
    placeholder: &str,
    poster_timeout: Duration,
    title: &str,
    top_n: usize,
) -> AppResult<Vec<Recommendation>> {
    let neighbors = recommender
        .similar(title, top_n)?
        .ok_or(AppError::NotFound)?;

    let dramas = neighbors
        .iter()
        .map(|n| {
            recommender.catalog().get(n.row).ok_or(AppError::InvalidQuery {
                row: n.row,
                rows: recommender.catalog().len(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let titles = dramas.iter().map(|d| d.title.clone()).collect();
    let images = fetch_posters(posters, titles, placeholder, poster_timeout).await;

    let recommendations = dramas
        .into_iter()
        .zip(images)
        .enumerate()
        .map(|(position, (drama, image_url))| {
            if position == 0 {
                Recommendation::subject(drama, image_url)
            } else {
                Recommendation::neighbor(drama, image_url)
            }
        })
        .collect();

    Ok(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Catalog;
    use crate::models::{Drama, Rating, SEARCH_SUBJECT_NOTE};
    use crate::services::posters::MockPosterProvider;
    use tokio_test::assert_ok;

    const PLACEHOLDER: &str = "https://via.placeholder.com/200";
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn recommender() -> Recommender {
        let catalog = Catalog::from_dramas(vec![
            Drama::new(
                "Crash Landing on You",
                "romance comedy",
                "",
                Rating::Score(8.7),
            ),
            Drama::new(
                "It's Okay to Not Be Okay",
                "romance drama",
                "",
                Rating::Score(8.4),
            ),
            Drama::new("Kingdom", "horror thriller", "", Rating::NotAvailable),
        ])
        .unwrap();
        Recommender::build(catalog).unwrap()
    }

    fn poster_provider() -> Arc<dyn PosterProvider> {
        let mut provider = MockPosterProvider::new();
        provider
            .expect_fetch_poster()
            .returning(|title| Ok(Some(format!("https://img/{}.jpg", title.len()))));
        provider.expect_name().return_const("mock");
        Arc::new(provider)
    }

    #[tokio::test]
    async fn test_subject_then_nearest_neighbor() {
        let recommender = recommender();
        let result = get_recommendations(
            &recommender,
            poster_provider(),
            PLACEHOLDER,
            TIMEOUT,
            "crash landing on you",
            1,
        )
        .await;
        let recommendations = assert_ok!(result);

        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].title, "Crash Landing On You");
        assert_eq!(recommendations[0].note.as_deref(), Some(SEARCH_SUBJECT_NOTE));
        assert_eq!(recommendations[0].rating, Rating::Score(8.7));
        assert_eq!(recommendations[1].title, "It's Okay To Not Be Okay");
        assert!(!recommendations[1].is_subject());
    }

    #[tokio::test]
    async fn test_unknown_title_is_not_found() {
        let recommender = recommender();
        let result = get_recommendations(
            &recommender,
            poster_provider(),
            PLACEHOLDER,
            TIMEOUT,
            "Not A Real Drama Title",
            5,
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_poster_failures_fall_back_to_placeholder() {
        let mut provider = MockPosterProvider::new();
        provider
            .expect_fetch_poster()
            .times(3)
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));
        provider.expect_name().return_const("mock");

        let recommender = recommender();
        let result = get_recommendations(
            &recommender,
            Arc::new(provider),
            PLACEHOLDER,
            TIMEOUT,
            "Kingdom",
            2,
        )
        .await;
        let recommendations = assert_ok!(result);

        assert_eq!(recommendations.len(), 3);
        assert!(recommendations.iter().all(|r| r.image_url == PLACEHOLDER));
        assert_eq!(recommendations[0].rating, Rating::NotAvailable);
    }

    #[tokio::test]
    async fn test_repeated_queries_are_identical() {
        let recommender = recommender();
        let first = get_recommendations(
            &recommender,
            poster_provider(),
            PLACEHOLDER,
            TIMEOUT,
            "Kingdom",
            2,
        )
        .await
        .unwrap();
        let second = get_recommendations(
            &recommender,
            poster_provider(),
            PLACEHOLDER,
            TIMEOUT,
            "Kingdom",
            2,
        )
        .await
        .unwrap();
        assert_eq!(first, second);
    }
}
