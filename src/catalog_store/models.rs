//! Movie catalog models.

use serde::{Deserialize, Serialize};

/// Input for creating a movie. The genre is resolved by name and created
/// on first use.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub director: String,
    pub year: Option<i64>,
    pub rating: Option<f64>,
    pub genre: Option<String>,
}

/// A movie as returned by searches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSummary {
    pub title: String,
    pub director: String,
    pub year: Option<i64>,
    pub rating: Option<f64>,
    pub genre: Option<String>,
}

/// A single movie with its creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetails {
    pub title: String,
    pub director: String,
    pub year: Option<i64>,
    pub rating: Option<f64>,
    pub genre: Option<String>,
    pub created_at: Option<String>,
}

/// Filters for movie searches. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    pub title: Option<String>,
    pub genre: Option<String>,
    /// Not stored in the catalog; any non-empty value matches nothing.
    pub actor: Option<String>,
    pub year: Option<i64>,
    pub min_rating: Option<f64>,
}

impl MovieFilter {
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn by_genre(genre: impl Into<String>) -> Self {
        Self {
            genre: Some(genre.into()),
            ..Default::default()
        }
    }
}

/// Filters accepted by counts. Title and actor are not supported here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountFilter {
    pub genre: Option<String>,
    pub year: Option<i64>,
    pub min_rating: Option<f64>,
}

/// Result of a mutating action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub ok: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCount {
    /// `None` collects the movies without a genre.
    pub genre: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total_movies: usize,
    /// Rounded to two decimals, `None` when no movie has a rating.
    pub average_rating: Option<f64>,
    pub by_genre: Vec<GenreCount>,
}
