//! Shared constants for end-to-end tests
//!
//! These mirror the demo rows a fresh database is seeded with.

#![allow(dead_code)]

pub const SEED_MOVIE_COUNT: u64 = 4;

pub const SHAWSHANK: &str = "The Shawshank Redemption";
pub const INTERSTELLAR: &str = "Interstellar";
pub const INCEPTION: &str = "Inception";
pub const DARK_KNIGHT: &str = "The Dark Knight";

pub const NOLAN: &str = "Christopher Nolan";

/// Movie that only exists in the legacy fixture database
pub const LEGACY_MOVIE: &str = "Unforgiven";

/// Maximum time to wait for a single MCP response
pub const RESPONSE_TIMEOUT_MS: u64 = 5000;
