use serde::{Serialize, Serializer};

/// Marker shown in place of a missing or malformed rating
pub const RATING_NOT_AVAILABLE: &str = "Not Available";

/// Rating of a drama as loaded from the catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Score(f64),
    NotAvailable,
}

impl Rating {
    /// Parses a raw catalog cell; anything that is not a finite number is
    /// `NotAvailable`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(score) if score.is_finite() => Rating::Score(score),
            _ => Rating::NotAvailable,
        }
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Score(score) => serializer.serialize_f64(*score),
            Rating::NotAvailable => serializer.serialize_str(RATING_NOT_AVAILABLE),
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct Drama {
    /// Title as spelled in the catalog
    pub title: String,
    /// Space-separated genre tags
    pub genres: String,
    pub synopsis: String,
    pub rating: Rating,
}

impl Drama {
    pub fn new(title: &str, genres: &str, synopsis: &str, rating: Rating) -> Self {
        Self {
            title: title.trim().to_string(),
            genres: normalize_genres(genres),
            synopsis: synopsis.trim().to_string(),
            rating,
        }
    }

    /// Text fed to the featurizer: genres followed by synopsis
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.genres, self.synopsis)
    }

    /// Title rendered for display, e.g. "Crash Landing On You"
    pub fn display_title(&self) -> String {
        title_case(&self.title)
    }
}

/// Turns comma-separated genre tags into space-separated ones
pub fn normalize_genres(raw: &str) -> String {
    raw.replace(',', " ").trim().to_string()
}

/// Upper-cases the first letter of each word and lower-cases the rest.
/// An apostrophe inside a word does not start a new one ("It's", not "It'S").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = in_word && (c == '\'' || c == '\u{2019}');
        }
    }

    out
}
