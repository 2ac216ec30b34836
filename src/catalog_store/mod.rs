mod error;
mod models;
mod query;
mod schema;
mod store;
mod trait_def;

pub use error::{CatalogError, CatalogResult};
pub use models::*;
pub use query::MovieQuery;
pub use schema::{MOVIE_VERSIONED_SCHEMAS, SEED_GENRES, SEED_MOVIES};
pub use store::SqliteMovieStore;
pub use trait_def::{MovieStore, DEFAULT_FIND_LIMIT, DEFAULT_TOP_LIMIT};
