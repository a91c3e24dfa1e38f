//! The surface a UI or CLI calls. Provider detail is logged here and replaced
//! by one generic message per action; validation and empty-result messages
//! pass through unchanged.

use thiserror::Error;

use crate::error::RecipeError;
use crate::orchestrator::GenerationOrchestrator;
use crate::recipe::{Recipe, RegenerationRequest, SuggestionSet};
use crate::suggestion_broker::SuggestionBroker;
use crate::validator::{validate, validate_ingredient_list, RawRecipeInput};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    EmptyResult(String),
    #[error("An unexpected error occurred while {0}. Please try again later.")]
    Unexpected(&'static str),
}

pub(crate) fn surface(action: &'static str, error: RecipeError) -> ActionError {
    match error {
        RecipeError::Validation(e) => ActionError::Validation(e.to_string()),
        RecipeError::EmptyResult(message) => ActionError::EmptyResult(message),
        RecipeError::Provider(cause) => {
            tracing::error!(action, error = %cause, "provider call failed");
            ActionError::Unexpected(action)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Actions {
    orchestrator: GenerationOrchestrator,
    broker: SuggestionBroker,
}

impl Actions {
    pub fn new(orchestrator: GenerationOrchestrator, broker: SuggestionBroker) -> Self {
        Self {
            orchestrator,
            broker,
        }
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    pub async fn create_recipe(&self, raw: &RawRecipeInput) -> Result<Recipe, ActionError> {
        const ACTION: &str = "generating the recipe";
        let request = validate(raw).map_err(|e| surface(ACTION, e.into()))?;
        self.orchestrator
            .generate(&request)
            .await
            .map_err(|e| surface(ACTION, e))
    }

    pub async fn regenerate_instructions(
        &self,
        request: &RegenerationRequest,
    ) -> Result<String, ActionError> {
        self.orchestrator
            .regenerate_instructions(request)
            .await
            .map_err(|e| surface("regenerating the instructions", e))
    }

    pub async fn suggest_dishes(&self, thoughts: &str) -> Result<SuggestionSet, ActionError> {
        self.broker
            .suggest(thoughts)
            .await
            .map_err(|e| surface("suggesting dishes", e))
    }

    pub async fn recipes_from_ingredients(
        &self,
        ingredients: &str,
    ) -> Result<Vec<String>, ActionError> {
        const ACTION: &str = "generating recipes";
        let list = validate_ingredient_list(ingredients).map_err(|e| surface(ACTION, e.into()))?;
        self.orchestrator
            .recipes_from_ingredients(&list)
            .await
            .map_err(|e| surface(ACTION, e))
    }

    pub async fn summarize_instructions(&self, instructions: &str) -> Result<String, ActionError> {
        self.orchestrator
            .summarize_instructions(instructions)
            .await
            .map_err(|e| surface("summarizing the instructions", e))
    }
}
