//! SQLite schema definitions for the movie catalog database.
//!
//! Version 1 matches the layout of databases written by earlier,
//! unversioned releases, so those files can be adopted in place.

use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

// =============================================================================
// Version 1 - Genres and movies
// =============================================================================

/// Genres table - lazily populated lookup of genre names
const GENRES_TABLE_V1: Table = Table {
    name: "genres",
    columns: &[
        crate::sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        crate::sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    indices: &[],
};

const GENRE_FK: ForeignKey = ForeignKey {
    foreign_table: "genres",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

/// Movies table - one row per catalog entry, titles are not unique
const MOVIES_TABLE_V1: Table = Table {
    name: "movies",
    columns: &[
        crate::sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        crate::sqlite_column!("title", &SqlType::Text, non_null = true),
        crate::sqlite_column!("director", &SqlType::Text, non_null = true),
        crate::sqlite_column!("year", &SqlType::Integer),
        crate::sqlite_column!("rating", &SqlType::Real),
        crate::sqlite_column!("genre_id", &SqlType::Integer, foreign_key = Some(&GENRE_FK)),
        crate::sqlite_column!("created_at", &SqlType::Text), // ISO 8601, UTC
    ],
    indices: &[],
};

// =============================================================================
// Version 2 - Lookup indices
// =============================================================================

const MOVIES_TABLE_V2: Table = Table {
    name: "movies",
    columns: MOVIES_TABLE_V1.columns,
    indices: &[
        ("idx_movies_title", "title"),
        ("idx_movies_genre_id", "genre_id"),
    ],
};

/// Migration from version 1 to version 2: index title and genre lookups
fn migrate_v1_to_v2(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    conn.execute("CREATE INDEX idx_movies_title ON movies(title)", [])?;
    conn.execute("CREATE INDEX idx_movies_genre_id ON movies(genre_id)", [])?;
    Ok(())
}

// =============================================================================
// Versioned Schema Definition
// =============================================================================

/// All versioned schemas for the movie database.
///
/// Version 1: genres and movies tables
/// Version 2: indices on movies.title and movies.genre_id
pub const MOVIE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[GENRES_TABLE_V1, MOVIES_TABLE_V1],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[GENRES_TABLE_V1, MOVIES_TABLE_V2],
        migration: Some(migrate_v1_to_v2),
    },
];

// =============================================================================
// Seed data
// =============================================================================

pub const SEED_GENRES: &[&str] = &["Drama", "Sci-Fi", "Comedy", "Action"];

/// (title, director, year, rating, genre)
pub const SEED_MOVIES: &[(&str, &str, i64, f64, &str)] = &[
    ("The Shawshank Redemption", "Frank Darabont", 1994, 9.3, "Drama"),
    ("Interstellar", "Christopher Nolan", 2014, 8.6, "Sci-Fi"),
    ("Inception", "Christopher Nolan", 2010, 8.8, "Action"),
    ("The Dark Knight", "Christopher Nolan", 2008, 9.0, "Action"),
];
