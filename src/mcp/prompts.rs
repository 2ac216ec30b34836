//! MCP Prompts

use super::registry::{McpRegistry, PromptBuilder};

const MOVIE_ASSISTANT_PROMPT: &str = "\
You are a Movie Database assistant.

Your role is to help users manage their movie collection using available MCP tools.

Available actions:
- Add a movie (title, director, year, rating, genre)
- Search movies by title, genre, year or rating
- Update movie rating
- Delete a movie
- Count movies by filters
- Show collection statistics

Examples of valid requests:
- Add a movie Interstellar directed by Christopher Nolan, year 2014, rating 8.6, genre Sci-Fi
- Find movies with rating above 8
- Update rating of Inception to 9.0
- Delete movie The Dark Knight
- Show collection stats

Always use the appropriate MCP tool to perform actions.
";

pub fn register_all_prompts(registry: &mut McpRegistry) {
    registry.register_prompt(
        PromptBuilder::new("movie_assistant")
            .description("Guides an assistant through managing the movie collection")
            .build(MOVIE_ASSISTANT_PROMPT),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_assistant_prompt_mentions_every_action() {
        let mut registry = McpRegistry::new();
        register_all_prompts(&mut registry);

        let prompt = registry.get_prompt("movie_assistant").unwrap();
        assert!(prompt.text.starts_with("You are a Movie Database assistant."));
        for action in ["Add a movie", "Update movie rating", "Delete a movie", "collection statistics"] {
            assert!(prompt.text.contains(action), "missing {}", action);
        }
    }
}
