//! MovieStore trait definition.

use super::error::CatalogResult;
use super::models::{
    ActionOutcome, CollectionStats, CountFilter, MovieDetails, MovieFilter, MovieSummary,
    NewMovie,
};

pub const DEFAULT_FIND_LIMIT: i64 = 10;
pub const DEFAULT_TOP_LIMIT: i64 = 5;

/// Catalog actions. Every call is an independent unit of work: nothing is
/// shared between calls and no lock is held across them.
pub trait MovieStore: Send + Sync {
    /// Add a movie, creating its genre if it does not exist yet.
    fn add_movie(&self, movie: &NewMovie) -> CatalogResult<ActionOutcome>;

    /// Search movies, best rated first, at most `limit` results.
    fn find_movies(&self, filter: &MovieFilter, limit: i64) -> CatalogResult<Vec<MovieSummary>>;

    /// Set the rating of every movie whose title equals `title` exactly.
    fn update_rating(&self, title: &str, new_rating: f64) -> CatalogResult<ActionOutcome>;

    /// Delete every movie whose title equals `title` exactly.
    fn delete_movie(&self, title: &str) -> CatalogResult<ActionOutcome>;

    fn count_movies(&self, filter: &CountFilter) -> CatalogResult<usize>;

    /// Best rated movies, optionally restricted to a year and a genre.
    fn get_top_movies(
        &self,
        year: Option<i64>,
        genre: Option<&str>,
        limit: i64,
    ) -> CatalogResult<Vec<MovieSummary>> {
        let filter = MovieFilter {
            genre: genre.map(str::to_string),
            year,
            min_rating: None,
            ..Default::default()
        };
        self.find_movies(&filter, limit)
    }

    /// The oldest movie with exactly this title, `None` if there is none.
    fn get_movie_details(&self, title: &str) -> CatalogResult<Option<MovieDetails>>;

    fn collection_stats(&self) -> CatalogResult<CollectionStats>;
}
