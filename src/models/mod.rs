mod drama;
mod recommendation;

pub use drama::{normalize_genres, title_case, Drama, Rating, RATING_NOT_AVAILABLE};
pub use recommendation::{
    RecommendQuery, Recommendation, RecommendationResponse, SEARCH_SUBJECT_NOTE,
};

/// Poster result stored in the cache; `None` records a title OMDb has no poster for
pub type CachedPoster = Option<String>;
