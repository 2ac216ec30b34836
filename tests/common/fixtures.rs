//! Database fixtures for end-to-end tests

use super::constants::LEGACY_MOVIE;
use rusqlite::Connection;
use std::path::Path;

/// Writes a database in the layout of the unversioned tool the server
/// replaces: same tables, no `user_version` stamp, one movie.
pub fn create_legacy_db(path: &Path) -> rusqlite::Result<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE genres (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL
         );
         CREATE TABLE movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            director TEXT NOT NULL,
            year INTEGER,
            rating REAL,
            genre_id INTEGER,
            created_at TEXT,
            FOREIGN KEY (genre_id) REFERENCES genres(id)
         );
         INSERT INTO genres (name) VALUES ('Western');",
    )?;
    conn.execute(
        "INSERT INTO movies (title, director, year, rating, genre_id, created_at)
         VALUES (?1, 'Clint Eastwood', 1992, 8.2, 1, '2024-01-01T00:00:00')",
        [LEGACY_MOVIE],
    )?;
    Ok(())
}
