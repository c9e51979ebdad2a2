use serde::{Deserialize, Serialize};

use super::{Drama, Rating};

/// Note attached to the drama the user searched for
pub const SEARCH_SUBJECT_NOTE: &str = "You searched for this drama";

/// One drama in a recommendation response
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub genres: String,
    pub image_url: String,
    pub rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Recommendation {
    pub fn subject(drama: &Drama, image_url: String) -> Self {
        Self {
            note: Some(SEARCH_SUBJECT_NOTE.to_string()),
            ..Self::neighbor(drama, image_url)
        }
    }

    pub fn neighbor(drama: &Drama, image_url: String) -> Self {
        Self {
            title: drama.display_title(),
            genres: drama.genres.clone(),
            image_url,
            rating: drama.rating,
            note: None,
        }
    }

    pub fn is_subject(&self) -> bool {
        self.note.is_some()
    }
}

/// Body of a successful `/recommend` response
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
}

/// Query string of `/recommend`
#[derive(Debug, Default, Deserialize)]
pub struct RecommendQuery {
    pub title: Option<String>,
    pub top_n: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_serialization() {
        let drama = Drama::new("crash landing on you", "Romance,Comedy", "", Rating::Score(8.7));
        let rec = Recommendation::subject(&drama, "http://img/1.jpg".to_string());
        let json = serde_json::to_value(&rec).unwrap();

        assert_eq!(json["title"], "Crash Landing On You");
        assert_eq!(json["genres"], "Romance Comedy");
        assert_eq!(json["rating"], 8.7);
        assert_eq!(json["note"], SEARCH_SUBJECT_NOTE);
        assert!(rec.is_subject());
    }

    #[test]
    fn test_neighbor_omits_note() {
        let drama = Drama::new("Signal", "Thriller", "", Rating::NotAvailable);
        let rec = Recommendation::neighbor(&drama, "p".to_string());
        let json = serde_json::to_value(&rec).unwrap();

        assert!(json.get("note").is_none());
        assert_eq!(json["rating"], "Not Available");
    }
}
