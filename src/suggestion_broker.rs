use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ProviderError, RecipeError};
use crate::orchestrator::ProviderOutcome;
use crate::providers::SuggestionProvider;
use crate::recipe::{SuggestionItem, SuggestionSet};
use crate::validator::{validate_thoughts, RawRecipeInput};

pub const MIN_SUGGESTIONS: usize = 4;
pub const MAX_SUGGESTIONS: usize = 5;
pub const NO_SUGGESTIONS: &str =
    "We couldn't come up with dishes for that. Try describing your craving differently.";

#[derive(Debug, Deserialize)]
struct SuggestionsPayload {
    suggestions: Vec<SuggestionItem>,
}

/// Turns a mood or craving into a short ranked list of dishes.
#[derive(Debug, Clone)]
pub struct SuggestionBroker {
    provider: Arc<dyn SuggestionProvider>,
}

impl SuggestionBroker {
    pub fn new(provider: Arc<dyn SuggestionProvider>) -> Self {
        Self { provider }
    }

    /// Returns 4 or 5 items in provider order. Extra items are dropped from
    /// the tail; an empty set is an `EmptyResult`, a short one a schema error.
    pub async fn suggest(&self, thoughts: &str) -> Result<SuggestionSet, RecipeError> {
        let thoughts = validate_thoughts(thoughts)?;
        tracing::info!(chars = thoughts.len(), "requesting dish suggestions");

        let reply = self.provider.suggest_dishes(&thoughts).await;
        let mut suggestions = ProviderOutcome::<SuggestionsPayload>::decode(reply)
            .into_result()?
            .suggestions;

        if suggestions.is_empty() {
            return Err(RecipeError::EmptyResult(NO_SUGGESTIONS.to_string()));
        }
        if suggestions.len() < MIN_SUGGESTIONS {
            return Err(ProviderError::SchemaViolation(format!(
                "expected {MIN_SUGGESTIONS} to {MAX_SUGGESTIONS} suggestions, got {}",
                suggestions.len()
            ))
            .into());
        }
        if suggestions.len() > MAX_SUGGESTIONS {
            tracing::warn!(returned = suggestions.len(), "truncating suggestion set");
            suggestions.truncate(MAX_SUGGESTIONS);
        }
        Ok(suggestions)
    }

    /// A fresh request form carrying only the chosen dish name.
    pub fn select(item: &SuggestionItem) -> RawRecipeInput {
        RawRecipeInput::for_dish(&item.dish_name)
    }
}
