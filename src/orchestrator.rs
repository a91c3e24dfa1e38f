//! One round-trip per operation: call the provider, decode the reply against
//! the expected schema, post-process, map failures. No retries.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api_connection::ApiConnectionError;
use crate::error::{ProviderError, RecipeError};
use crate::providers::{
    GenerationProvider, PantryProvider, ProviderResult, RecipeBackend, RegenerationProvider,
    SummaryProvider,
};
use crate::recipe::{GenerationRequest, Ingredient, Recipe, RegenerationRequest};

pub const NO_PANTRY_RECIPES: &str =
    "No recipes found. Try adding more ingredients or changing your selection.";
pub const NO_INGREDIENTS: &str =
    "The generated recipe has no ingredients. Try a different dish or different modifications.";

/// A provider reply after decoding.
#[derive(Debug)]
pub enum ProviderOutcome<T> {
    Valid(T),
    SchemaViolation(String),
    Failure(ApiConnectionError),
}

impl<T: DeserializeOwned> ProviderOutcome<T> {
    pub fn decode(result: ProviderResult) -> Self {
        match result {
            Err(error) => ProviderOutcome::Failure(error),
            Ok(value) => match serde_json::from_value::<T>(value) {
                Ok(decoded) => ProviderOutcome::Valid(decoded),
                Err(error) => ProviderOutcome::SchemaViolation(error.to_string()),
            },
        }
    }
}

impl<T> ProviderOutcome<T> {
    /// Runs an extra structural check on a decoded value.
    pub fn check(self, rule: impl FnOnce(&T) -> Result<(), String>) -> Self {
        match self {
            ProviderOutcome::Valid(value) => match rule(&value) {
                Ok(()) => ProviderOutcome::Valid(value),
                Err(reason) => ProviderOutcome::SchemaViolation(reason),
            },
            other => other,
        }
    }

    pub fn into_result(self) -> Result<T, ProviderError> {
        match self {
            ProviderOutcome::Valid(value) => Ok(value),
            ProviderOutcome::SchemaViolation(reason) => Err(ProviderError::SchemaViolation(reason)),
            ProviderOutcome::Failure(error) => Err(ProviderError::Failure(error)),
        }
    }
}

/// A recipe as the model returns it. The echoed `servings` may be any JSON
/// value; it is replaced by the requested count.
#[derive(Debug, Deserialize)]
struct RecipePayload {
    title: String,
    description: String,
    ingredients: Vec<Ingredient>,
    instructions: String,
    #[serde(default)]
    servings: Option<Value>,
}

impl RecipePayload {
    fn into_recipe(self, servings: u32) -> Recipe {
        let echoed = self.servings.as_ref().and_then(Value::as_f64);
        if echoed != Some(f64::from(servings)) {
            tracing::debug!(
                returned = ?self.servings,
                requested = servings,
                "overriding provider servings"
            );
        }
        let mut ingredients = self.ingredients;
        for ingredient in &mut ingredients {
            if ingredient.unit.as_deref().is_some_and(|u| u.trim().is_empty()) {
                ingredient.unit = None;
            }
        }
        Recipe {
            title: self.title,
            description: self.description,
            ingredients,
            instructions: self.instructions,
            servings,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstructionsPayload {
    instructions: String,
}

#[derive(Debug, Deserialize)]
struct PantryPayload {
    recipes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    summary: String,
}

fn non_blank(field: &str, text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        Err(format!("{field} is empty"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GenerationOrchestrator {
    generation: Arc<dyn GenerationProvider>,
    regeneration: Arc<dyn RegenerationProvider>,
    pantry: Arc<dyn PantryProvider>,
    summary: Arc<dyn SummaryProvider>,
}

impl GenerationOrchestrator {
    pub fn new(
        generation: Arc<dyn GenerationProvider>,
        regeneration: Arc<dyn RegenerationProvider>,
        pantry: Arc<dyn PantryProvider>,
        summary: Arc<dyn SummaryProvider>,
    ) -> Self {
        Self {
            generation,
            regeneration,
            pantry,
            summary,
        }
    }

    pub fn from_backend<B: RecipeBackend + 'static>(backend: Arc<B>) -> Self {
        Self::new(backend.clone(), backend.clone(), backend.clone(), backend)
    }

    /// Initial generation, or full regeneration when `request.modifications` is set.
    /// The returned `servings` is always the requested one.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Recipe, RecipeError> {
        tracing::info!(
            dish = %request.dish_name,
            servings = request.servings,
            modified = request.modifications.is_some(),
            "generating recipe"
        );
        let reply = self.generation.generate_recipe(request).await;
        let recipe = ProviderOutcome::<RecipePayload>::decode(reply)
            .into_result()?
            .into_recipe(request.servings);

        let recipe = ProviderOutcome::Valid(recipe)
            .check(Recipe::check_schema)
            .into_result()?;
        if recipe.ingredients.is_empty() {
            return Err(RecipeError::EmptyResult(NO_INGREDIENTS.to_string()));
        }
        tracing::info!(
            title = %recipe.title,
            ingredients = recipe.ingredients.len(),
            "recipe generated"
        );
        Ok(recipe)
    }

    pub async fn regenerate_instructions(
        &self,
        request: &RegenerationRequest,
    ) -> Result<String, RecipeError> {
        tracing::info!(
            dish = %request.dish_name,
            ingredients = request.ingredients.len(),
            "regenerating instructions"
        );
        let reply = self.regeneration.regenerate_instructions(request).await;
        let payload = ProviderOutcome::<InstructionsPayload>::decode(reply)
            .check(|p| non_blank("instructions", &p.instructions))
            .into_result()?;
        Ok(payload.instructions)
    }

    pub async fn recipes_from_ingredients(
        &self,
        ingredients: &str,
    ) -> Result<Vec<String>, RecipeError> {
        let reply = self.pantry.recipes_from_ingredients(ingredients).await;
        let payload = ProviderOutcome::<PantryPayload>::decode(reply).into_result()?;
        let recipes: Vec<String> = payload
            .recipes
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if recipes.is_empty() {
            return Err(RecipeError::EmptyResult(NO_PANTRY_RECIPES.to_string()));
        }
        Ok(recipes)
    }

    pub async fn summarize_instructions(&self, instructions: &str) -> Result<String, RecipeError> {
        let reply = self.summary.summarize_instructions(instructions).await;
        let payload = ProviderOutcome::<SummaryPayload>::decode(reply)
            .check(|p| non_blank("summary", &p.summary))
            .into_result()?;
        Ok(payload.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_branches() {
        let valid = ProviderOutcome::<SummaryPayload>::decode(Ok(json!({"summary": "Stir."})));
        assert!(matches!(valid, ProviderOutcome::Valid(_)));

        let wrong_shape = ProviderOutcome::<SummaryPayload>::decode(Ok(json!({"text": "Stir."})));
        assert!(matches!(wrong_shape, ProviderOutcome::SchemaViolation(_)));

        let failed = ProviderOutcome::<SummaryPayload>::decode(Err(ApiConnectionError::Other(
            "boom".to_string(),
        )));
        assert!(matches!(failed.into_result(), Err(ProviderError::Failure(_))));
    }

    #[test]
    fn test_check_turns_rule_failure_into_schema_violation() {
        let outcome = ProviderOutcome::Valid(SummaryPayload {
            summary: "   ".to_string(),
        })
        .check(|p| non_blank("summary", &p.summary));
        assert!(matches!(
            outcome.into_result(),
            Err(ProviderError::SchemaViolation(reason)) if reason == "summary is empty"
        ));
    }

    #[test]
    fn test_recipe_payload_takes_requested_servings() {
        let payload: RecipePayload = serde_json::from_value(json!({
            "title": "Dal",
            "description": "Lentil stew.",
            "ingredients": [{"name": "Lentils", "quantity": 200, "unit": ""}],
            "instructions": "1. Simmer.",
            "servings": "a few"
        }))
        .unwrap();
        let recipe = payload.into_recipe(3);
        assert_eq!(recipe.servings, 3);
        assert_eq!(recipe.ingredients[0].unit, None);
    }
}
