//! SQL assembly for movie searches and counts.
//!
//! Predicates are appended in a fixed order (title, genre, year,
//! min_rating, actor) and every value is bound as a positional parameter.

use rusqlite::ToSql;

use super::models::{CountFilter, MovieFilter};

const FIND_BASE: &str = "SELECT movies.title, movies.director, movies.year, movies.rating, genres.name \
     FROM movies LEFT JOIN genres ON movies.genre_id = genres.id WHERE 1=1";

const COUNT_BASE: &str =
    "SELECT COUNT(*) FROM movies LEFT JOIN genres ON movies.genre_id = genres.id WHERE 1=1";

/// A SQL statement with its positional parameters.
pub struct MovieQuery {
    sql: String,
    params: Vec<Box<dyn ToSql>>,
}

impl MovieQuery {
    fn new(base: &str) -> Self {
        Self {
            sql: base.to_string(),
            params: Vec::new(),
        }
    }

    fn and(&mut self, predicate: &str, param: Box<dyn ToSql>) {
        self.sql.push_str(" AND ");
        self.sql.push_str(predicate);
        self.params.push(param);
    }

    fn genre_is(&mut self, genre: Option<&str>) {
        if let Some(genre) = non_empty(genre) {
            self.and("genres.name = ?", Box::new(genre.to_string()));
        }
    }

    fn year_is(&mut self, year: Option<i64>) {
        // A year of 0 is treated as "not provided"
        if let Some(year) = year.filter(|y| *y != 0) {
            self.and("movies.year = ?", Box::new(year));
        }
    }

    fn min_rating(&mut self, min_rating: Option<f64>) {
        if let Some(min_rating) = min_rating {
            self.and("movies.rating >= ?", Box::new(min_rating));
        }
    }

    /// Builds the search statement: filtered, sorted by rating descending
    /// (ties in storage row order) and capped at `limit` rows.
    pub fn find(filter: &MovieFilter, limit: i64) -> Self {
        let mut query = Self::new(FIND_BASE);

        if let Some(title) = non_empty(filter.title.as_deref()) {
            query.and("movies.title LIKE ?", Box::new(format!("%{}%", title)));
        }
        query.genre_is(filter.genre.as_deref());
        query.year_is(filter.year);
        query.min_rating(filter.min_rating);

        // Actors are not stored, so asking for one can never match
        if non_empty(filter.actor.as_deref()).is_some() {
            query.sql.push_str(" AND 1=0");
        }

        query.sql.push_str(" ORDER BY movies.rating DESC LIMIT ?");
        query.params.push(Box::new(limit.max(0)));
        query
    }

    pub fn count(filter: &CountFilter) -> Self {
        let mut query = Self::new(COUNT_BASE);
        query.genre_is(filter.genre.as_deref());
        query.year_is(filter.year);
        query.min_rating(filter.min_rating);
        query
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
