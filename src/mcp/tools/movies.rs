//! Movie catalog tools.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::catalog_store::{
    CountFilter, MovieFilter, NewMovie, DEFAULT_FIND_LIMIT, DEFAULT_TOP_LIMIT,
};
use crate::mcp::context::{catalog_error_to_tool_result, ToolContext};
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolCategory, ToolResult};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(add_movie_tool());
    registry.register_tool(find_movies_tool());
    registry.register_tool(update_rating_tool());
    registry.register_tool(delete_movie_tool());
    registry.register_tool(count_movies_tool());
    registry.register_tool(get_top_movies_tool());
    registry.register_tool(get_movie_details_tool());
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, McpError> {
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

/// Numbers as agents send them: JSON integers, floats or numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LenientNumber {
    fn into_f64(self) -> Result<f64, String> {
        match self {
            LenientNumber::Int(i) => Ok(i as f64),
            LenientNumber::Float(f) => Ok(f),
            LenientNumber::Text(s) => match s.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(format!("expected a number, got \"{}\"", s)),
            },
        }
    }

    /// Integral floats (`5.0`, `"5"`) are accepted, fractional ones are not.
    fn into_i64(self) -> Result<i64, String> {
        if let LenientNumber::Int(i) = self {
            return Ok(i);
        }
        let value = self.into_f64()?;
        if value.is_finite() && value.fract() == 0.0 {
            Ok(value as i64)
        } else {
            Err(format!("expected an integer, got {}", value))
        }
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<LenientNumber>::deserialize(deserializer)?
        .map(LenientNumber::into_i64)
        .transpose()
        .map_err(serde::de::Error::custom)
}

fn lenient_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<LenientNumber>::deserialize(deserializer)?
        .map(LenientNumber::into_f64)
        .transpose()
        .map_err(serde::de::Error::custom)
}

fn required_float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    LenientNumber::deserialize(deserializer)?
        .into_f64()
        .map_err(serde::de::Error::custom)
}

fn serialize_result<T: serde::Serialize>(value: &T) -> ToolResult {
    ToolsCallResult::json(value).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// add_movie
// ============================================================================

#[derive(Debug, Deserialize)]
struct AddMovieParams {
    title: String,
    director: String,
    #[serde(default, deserialize_with = "lenient_int")]
    year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_float")]
    rating: Option<f64>,
    #[serde(default)]
    genre: Option<String>,
}

fn add_movie_tool() -> RegisteredTool {
    ToolBuilder::new("add_movie")
        .description("Add a movie to the collection. The genre is created if it does not exist yet.")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Movie title" },
                "director": { "type": "string", "description": "Director name" },
                "year": { "type": "integer", "description": "Release year" },
                "rating": { "type": "number", "description": "Rating, e.g. 8.6" },
                "genre": { "type": "string", "description": "Genre name, e.g. Sci-Fi" }
            },
            "required": ["title", "director"]
        }))
        .category(ToolCategory::Write)
        .build(add_movie_handler)
}

async fn add_movie_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: AddMovieParams = parse_params(params)?;
    let movie = NewMovie {
        title: params.title,
        director: params.director,
        year: params.year,
        rating: params.rating,
        genre: params.genre,
    };

    match ctx.run(move |store| store.add_movie(&movie)).await? {
        Ok(outcome) => serialize_result(&outcome),
        Err(e) => catalog_error_to_tool_result(e),
    }
}

// ============================================================================
// find_movies
// ============================================================================

#[derive(Debug, Deserialize)]
struct FindMoviesParams {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    actor: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_float")]
    min_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_int")]
    limit: Option<i64>,
}

fn find_movies_tool() -> RegisteredTool {
    ToolBuilder::new("find_movies")
        .description(
            "Search movies by title (substring), genre, year or minimum rating. \
             Results are sorted by rating, best first.",
        )
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Part of the title" },
                "genre": { "type": "string", "description": "Exact genre name" },
                "actor": { "type": "string", "description": "Actor name (actors are not tracked, so this matches nothing)" },
                "year": { "type": "integer", "description": "Exact release year" },
                "min_rating": { "type": "number", "description": "Minimum rating, inclusive" },
                "limit": { "type": "integer", "description": "Maximum number of results (default 10)" }
            }
        }))
        .build(find_movies_handler)
}

async fn find_movies_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: FindMoviesParams = parse_params(params)?;
    let limit = params.limit.unwrap_or(DEFAULT_FIND_LIMIT);
    let filter = MovieFilter {
        title: params.title,
        genre: params.genre,
        actor: params.actor,
        year: params.year,
        min_rating: params.min_rating,
    };
    debug!("find_movies {:?} limit {}", filter, limit);

    match ctx.run(move |store| store.find_movies(&filter, limit)).await? {
        Ok(movies) => serialize_result(&movies),
        Err(e) => catalog_error_to_tool_result(e),
    }
}

// ============================================================================
// update_rating
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpdateRatingParams {
    title: String,
    #[serde(deserialize_with = "required_float")]
    new_rating: f64,
}

fn update_rating_tool() -> RegisteredTool {
    ToolBuilder::new("update_rating")
        .description("Set the rating of every movie with exactly this title")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Exact movie title" },
                "new_rating": { "type": "number", "description": "New rating" }
            },
            "required": ["title", "new_rating"]
        }))
        .category(ToolCategory::Write)
        .build(update_rating_handler)
}

async fn update_rating_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: UpdateRatingParams = parse_params(params)?;

    match ctx
        .run(move |store| store.update_rating(&params.title, params.new_rating))
        .await?
    {
        Ok(outcome) => serialize_result(&outcome),
        Err(e) => catalog_error_to_tool_result(e),
    }
}

// ============================================================================
// delete_movie
// ============================================================================

#[derive(Debug, Deserialize)]
struct TitleParams {
    title: String,
}

fn delete_movie_tool() -> RegisteredTool {
    ToolBuilder::new("delete_movie")
        .description("Delete every movie with exactly this title")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Exact movie title" }
            },
            "required": ["title"]
        }))
        .category(ToolCategory::Write)
        .build(delete_movie_handler)
}

async fn delete_movie_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: TitleParams = parse_params(params)?;

    match ctx.run(move |store| store.delete_movie(&params.title)).await? {
        Ok(outcome) => serialize_result(&outcome),
        Err(e) => catalog_error_to_tool_result(e),
    }
}

// ============================================================================
// count_movies
// ============================================================================

#[derive(Debug, Deserialize)]
struct CountMoviesParams {
    #[serde(default)]
    genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_float")]
    min_rating: Option<f64>,
}

fn count_movies_tool() -> RegisteredTool {
    ToolBuilder::new("count_movies")
        .description("Count movies, optionally by genre, year and minimum rating")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "genre": { "type": "string", "description": "Exact genre name" },
                "year": { "type": "integer", "description": "Exact release year" },
                "min_rating": { "type": "number", "description": "Minimum rating, inclusive" }
            }
        }))
        .build(count_movies_handler)
}

async fn count_movies_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CountMoviesParams = parse_params(params)?;
    let filter = CountFilter {
        genre: params.genre,
        year: params.year,
        min_rating: params.min_rating,
    };

    match ctx.run(move |store| store.count_movies(&filter)).await? {
        Ok(count) => serialize_result(&count),
        Err(e) => catalog_error_to_tool_result(e),
    }
}

// ============================================================================
// get_top_movies
// ============================================================================

#[derive(Debug, Deserialize)]
struct TopMoviesParams {
    #[serde(default, deserialize_with = "lenient_int")]
    year: Option<i64>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    limit: Option<i64>,
}

fn get_top_movies_tool() -> RegisteredTool {
    ToolBuilder::new("get_top_movies")
        .description("Best rated movies, optionally for one year and one genre")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "year": { "type": "integer", "description": "Exact release year" },
                "genre": { "type": "string", "description": "Exact genre name" },
                "limit": { "type": "integer", "description": "Maximum number of results (default 5)" }
            }
        }))
        .build(get_top_movies_handler)
}

async fn get_top_movies_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: TopMoviesParams = parse_params(params)?;
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);

    match ctx
        .run(move |store| store.get_top_movies(params.year, params.genre.as_deref(), limit))
        .await?
    {
        Ok(movies) => serialize_result(&movies),
        Err(e) => catalog_error_to_tool_result(e),
    }
}

// ============================================================================
// get_movie_details
// ============================================================================

fn get_movie_details_tool() -> RegisteredTool {
    ToolBuilder::new("get_movie_details")
        .description("Full record of the movie with exactly this title, or null")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Exact movie title" }
            },
            "required": ["title"]
        }))
        .build(get_movie_details_handler)
}

async fn get_movie_details_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: TitleParams = parse_params(params)?;

    match ctx
        .run(move |store| store.get_movie_details(&params.title))
        .await?
    {
        Ok(details) => serialize_result(&details),
        Err(e) => catalog_error_to_tool_result(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::SqliteMovieStore;
    use crate::mcp::protocol::ToolResultContent;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_context() -> (ToolContext, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteMovieStore::open(temp_dir.path().join("movies.db"), true).unwrap();
        (ToolContext::new(Arc::new(store)), temp_dir)
    }

    fn text_of(result: &ToolsCallResult) -> &str {
        match &result.content[0] {
            ToolResultContent::Text { text } => text,
        }
    }

    fn json_of(result: &ToolsCallResult) -> Value {
        serde_json::from_str(text_of(result)).unwrap()
    }

    #[test]
    fn test_integer_arguments_accept_integral_numbers_and_strings() {
        let params: TopMoviesParams =
            serde_json::from_value(json!({ "limit": "3", "year": "2010" })).unwrap();
        assert_eq!(params.limit, Some(3));
        assert_eq!(params.year, Some(2010));

        let params: TopMoviesParams =
            serde_json::from_value(json!({ "limit": 3.0, "year": 2010 })).unwrap();
        assert_eq!(params.limit, Some(3));
        assert_eq!(params.year, Some(2010));

        let params: TopMoviesParams = serde_json::from_value(json!({ "limit": null })).unwrap();
        assert_eq!(params.limit, None);
    }

    #[test]
    fn test_integer_arguments_reject_fractions() {
        assert!(serde_json::from_value::<TopMoviesParams>(json!({ "limit": 2.5 })).is_err());
        assert!(serde_json::from_value::<TopMoviesParams>(json!({ "limit": "2.5" })).is_err());
        assert!(serde_json::from_value::<AddMovieParams>(json!({
            "title": "Dune",
            "director": "Denis Villeneuve",
            "year": 2010.9
        }))
        .is_err());
    }

    #[test]
    fn test_rating_arguments_accept_numeric_strings() {
        let params: AddMovieParams = serde_json::from_value(json!({
            "title": "Dune",
            "director": "Denis Villeneuve",
            "rating": "8.5"
        }))
        .unwrap();
        assert_eq!(params.rating, Some(8.5));

        let params: UpdateRatingParams =
            serde_json::from_value(json!({ "title": "Dune", "new_rating": "7" })).unwrap();
        assert_eq!(params.new_rating, 7.0);

        let params: CountMoviesParams =
            serde_json::from_value(json!({ "min_rating": 9 })).unwrap();
        assert_eq!(params.min_rating, Some(9.0));

        assert!(serde_json::from_value::<UpdateRatingParams>(
            json!({ "title": "Dune", "new_rating": "great" })
        )
        .is_err());
    }

    #[tokio::test]
    async fn test_fractional_year_is_invalid_params() {
        let (ctx, _dir) = test_context();
        let err = add_movie_handler(
            ctx,
            json!({ "title": "Dune", "director": "Denis Villeneuve", "year": 2010.9 }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), -32602);
    }

    #[tokio::test]
    async fn test_add_then_find() {
        let (ctx, _dir) = test_context();

        let result = add_movie_handler(
            ctx.clone(),
            json!({
                "title": "Dune",
                "director": "Denis Villeneuve",
                "year": 2021,
                "rating": 8.0,
                "genre": "Sci-Fi"
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            json_of(&result),
            json!({ "ok": true, "message": "Movie 'Dune' added successfully." })
        );

        let result = find_movies_handler(ctx, json!({ "genre": "Sci-Fi" }))
            .await
            .unwrap();
        let movies = json_of(&result);
        let titles: Vec<&str> = movies
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Interstellar", "Dune"]);
    }

    #[tokio::test]
    async fn test_add_requires_director() {
        let (ctx, _dir) = test_context();
        let err = add_movie_handler(ctx, json!({ "title": "Nameless" }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), -32602);
    }

    #[tokio::test]
    async fn test_update_missing_title_is_tool_error() {
        let (ctx, _dir) = test_context();
        let result = update_rating_handler(
            ctx,
            json!({ "title": "Nonexistent Title", "new_rating": 5.0 }),
        )
        .await
        .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "Movie 'Nonexistent Title' not found.");
    }

    #[tokio::test]
    async fn test_delete_then_details_is_null() {
        let (ctx, _dir) = test_context();
        let result = delete_movie_handler(ctx.clone(), json!({ "title": "Inception" }))
            .await
            .unwrap();
        assert_eq!(json_of(&result)["message"], "Movie 'Inception' deleted.");

        let result = get_movie_details_handler(ctx, json!({ "title": "Inception" }))
            .await
            .unwrap();
        assert_eq!(json_of(&result), Value::Null);
    }

    #[tokio::test]
    async fn test_count_and_top() {
        let (ctx, _dir) = test_context();

        let result = count_movies_handler(ctx.clone(), json!({ "genre": "Action" }))
            .await
            .unwrap();
        assert_eq!(json_of(&result), json!(2));

        let result = get_top_movies_handler(ctx, json!({ "limit": 1 }))
            .await
            .unwrap();
        let top = json_of(&result);
        assert_eq!(top.as_array().unwrap().len(), 1);
        assert_eq!(top[0]["title"], "The Shawshank Redemption");
    }

    #[tokio::test]
    async fn test_details_fields() {
        let (ctx, _dir) = test_context();
        let result = get_movie_details_handler(ctx, json!({ "title": "Interstellar" }))
            .await
            .unwrap();
        let details = json_of(&result);
        assert_eq!(details["director"], "Christopher Nolan");
        assert_eq!(details["year"], 2014);
        assert_eq!(details["genre"], "Sci-Fi");
        assert!(details["created_at"].is_string());
    }
}
