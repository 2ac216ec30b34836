//! SQLite-backed movie store.
//!
//! The store only remembers where the database file lives. Every action
//! opens its own connection and drops it before returning, so no state or
//! lock outlives a call.

use super::error::{CatalogError, CatalogResult};
use super::models::*;
use super::query::MovieQuery;
use super::schema::{MOVIE_VERSIONED_SCHEMAS, SEED_GENRES, SEED_MOVIES};
use super::trait_def::MovieStore;
use crate::sqlite_persistence::{
    read_raw_version, table_exists, write_schema_version, BASE_DB_VERSION,
};
use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct SqliteMovieStore {
    db_path: PathBuf,
}

impl SqliteMovieStore {
    /// Open the store at `db_path`, creating the file and its directory if
    /// needed and bringing the schema up to date.
    ///
    /// Demo rows are inserted only when the file is created, so movies
    /// deleted later never come back on restart.
    pub fn open<P: AsRef<Path>>(db_path: P, seed_demo_data: bool) -> Result<Self> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }

        let mut conn = Connection::open(path).context("Failed to open movie database")?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        Self::bootstrap(&mut conn, path, seed_demo_data)?;

        Ok(Self {
            db_path: path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn bootstrap(conn: &mut Connection, path: &Path, seed_demo_data: bool) -> Result<()> {
        let latest = MOVIE_VERSIONED_SCHEMAS
            .last()
            .context("No movie schema defined")?;
        let raw_version = read_raw_version(conn)?;

        let db_version = if raw_version == 0 {
            if !table_exists(conn, "movies")? && !table_exists(conn, "genres")? {
                info!("Creating new movie database at {:?}", path);
                let tx = conn.transaction()?;
                latest.create(&tx)?;
                if seed_demo_data {
                    Self::seed(&tx)?;
                }
                tx.commit()?;
                return Ok(());
            }

            // Written by the unversioned tool this store replaces
            info!("Adopting unversioned movie database at {:?}", path);
            MOVIE_VERSIONED_SCHEMAS[0]
                .validate(conn)
                .context("Unversioned movie database does not match schema version 1")?;
            write_schema_version(conn, 1)?;
            1
        } else {
            let db_version = raw_version - BASE_DB_VERSION as i64;
            if db_version < 1 {
                bail!(
                    "Movie database version {} is invalid (expected >= 1)",
                    db_version
                );
            }
            db_version as usize
        };

        let schema = MOVIE_VERSIONED_SCHEMAS
            .iter()
            .find(|s| s.version == db_version)
            .with_context(|| format!("Unknown movie database version {}", db_version))?;
        schema.validate(conn).with_context(|| {
            format!(
                "Movie database schema validation failed for version {}",
                db_version
            )
        })?;

        if db_version < latest.version {
            info!(
                "Migrating movie database from version {} to {}",
                db_version, latest.version
            );
            Self::migrate(conn, db_version)?;
        }
        Ok(())
    }

    fn migrate(conn: &mut Connection, from_version: usize) -> Result<()> {
        let tx = conn.transaction()?;
        let mut current = from_version;
        for schema in MOVIE_VERSIONED_SCHEMAS
            .iter()
            .filter(|s| s.version > from_version)
        {
            if let Some(migration_fn) = schema.migration {
                migration_fn(&tx).with_context(|| {
                    format!("Failed to run migration to version {}", schema.version)
                })?;
            }
            current = schema.version;
        }
        write_schema_version(&tx, current)?;
        tx.commit()?;
        Ok(())
    }

    fn seed(conn: &Connection) -> Result<()> {
        for genre in SEED_GENRES {
            conn.execute(
                "INSERT OR IGNORE INTO genres (name) VALUES (?1)",
                params![genre],
            )?;
        }
        let created_at = now_iso8601();
        for (title, director, year, rating, genre) in SEED_MOVIES {
            let genre_id = Self::resolve_genre(conn, genre)?;
            conn.execute(
                "INSERT INTO movies (title, director, year, rating, genre_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![title, director, year, rating, genre_id, created_at],
            )?;
        }
        info!("Seeded {} demo movies", SEED_MOVIES.len());
        Ok(())
    }

    /// Per-call connection. The file must already exist: a database removed
    /// while running is an error, not something to recreate empty.
    fn connect(&self) -> CatalogResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        Ok(conn)
    }

    /// Insert-if-absent by unique name, then look the id up.
    fn resolve_genre(conn: &Connection, name: &str) -> CatalogResult<i64> {
        conn.execute(
            "INSERT OR IGNORE INTO genres (name) VALUES (?1)",
            params![name],
        )?;
        conn.query_row(
            "SELECT id FROM genres WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| CatalogError::Validation("Could not create/find genre".to_string()))
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<MovieSummary> {
        Ok(MovieSummary {
            title: row.get(0)?,
            director: row.get(1)?,
            year: row.get(2)?,
            rating: row.get(3)?,
            genre: row.get(4)?,
        })
    }
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl MovieStore for SqliteMovieStore {
    fn add_movie(&self, movie: &NewMovie) -> CatalogResult<ActionOutcome> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let genre_id = match movie.genre.as_deref().filter(|g| !g.is_empty()) {
            Some(genre) => Some(Self::resolve_genre(&tx, genre)?),
            None => None,
        };
        tx.execute(
            "INSERT INTO movies (title, director, year, rating, genre_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                movie.title,
                movie.director,
                movie.year,
                movie.rating,
                genre_id,
                now_iso8601()
            ],
        )?;
        tx.commit()?;

        info!("Added movie '{}'", movie.title);
        Ok(ActionOutcome::ok(format!(
            "Movie '{}' added successfully.",
            movie.title
        )))
    }

    fn find_movies(&self, filter: &MovieFilter, limit: i64) -> CatalogResult<Vec<MovieSummary>> {
        let conn = self.connect()?;
        let query = MovieQuery::find(filter, limit);
        debug!("find_movies: {}", query.sql());

        let mut stmt = conn.prepare(query.sql())?;
        let movies = stmt
            .query_map(query.params().as_slice(), Self::row_to_summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(movies)
    }

    fn update_rating(&self, title: &str, new_rating: f64) -> CatalogResult<ActionOutcome> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE movies SET rating = ?1 WHERE title = ?2",
            params![new_rating, title],
        )?;
        if changed == 0 {
            return Err(CatalogError::movie_not_found(title));
        }

        info!("Updated rating of {} movie(s) titled '{}'", changed, title);
        Ok(ActionOutcome::ok(format!("Rating updated for '{}'.", title)))
    }

    fn delete_movie(&self, title: &str) -> CatalogResult<ActionOutcome> {
        let conn = self.connect()?;
        let changed = conn.execute("DELETE FROM movies WHERE title = ?1", params![title])?;
        if changed == 0 {
            return Err(CatalogError::movie_not_found(title));
        }

        info!("Deleted {} movie(s) titled '{}'", changed, title);
        Ok(ActionOutcome::ok(format!("Movie '{}' deleted.", title)))
    }

    fn count_movies(&self, filter: &CountFilter) -> CatalogResult<usize> {
        let conn = self.connect()?;
        let query = MovieQuery::count(filter);
        let count: i64 = conn.query_row(query.sql(), query.params().as_slice(), |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    fn get_movie_details(&self, title: &str) -> CatalogResult<Option<MovieDetails>> {
        let conn = self.connect()?;
        let details = conn
            .query_row(
                "SELECT movies.title, movies.director, movies.year, movies.rating,
                        genres.name, movies.created_at
                 FROM movies
                 LEFT JOIN genres ON movies.genre_id = genres.id
                 WHERE movies.title = ?1
                 ORDER BY movies.id
                 LIMIT 1",
                params![title],
                |row| {
                    Ok(MovieDetails {
                        title: row.get(0)?,
                        director: row.get(1)?,
                        year: row.get(2)?,
                        rating: row.get(3)?,
                        genre: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(details)
    }

    fn collection_stats(&self) -> CatalogResult<CollectionStats> {
        let mut conn = self.connect()?;
        // One read transaction so the three aggregates see the same rows
        let tx = conn.transaction()?;

        let total: i64 = tx.query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))?;
        let average_rating: Option<f64> =
            tx.query_row("SELECT ROUND(AVG(rating), 2) FROM movies", [], |row| {
                row.get(0)
            })?;

        let by_genre = {
            let mut stmt = tx.prepare(
                "SELECT g.name, COUNT(*) AS c
                 FROM movies m
                 LEFT JOIN genres g ON m.genre_id = g.id
                 GROUP BY g.name
                 ORDER BY c DESC, g.name",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(GenreCount {
                        genre: row.get(0)?,
                        count: row.get::<_, i64>(1)? as usize,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        tx.commit()?;

        Ok(CollectionStats {
            total_movies: total as usize,
            average_rating,
            by_genre,
        })
    }
}
