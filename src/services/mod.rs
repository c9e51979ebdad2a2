pub mod featurizer;
pub mod posters;
pub mod recommendations;
pub mod recommender;
pub mod similarity;
pub mod stopwords;

pub use featurizer::{FeatureMatrix, Featurized, SparseVector, TfidfFeaturizer, Vocabulary};
pub use posters::{OmdbProvider, PlaceholderProvider, PosterProvider};
pub use recommendations::get_recommendations;
pub use recommender::Recommender;
pub use similarity::{Neighbor, SimilarityIndex};
