//! External model collaborators.
//!
//! Every provider returns the raw JSON payload it received; decoding and
//! schema checks happen in the orchestrator so a malformed reply is an
//! ordinary, testable branch.

mod fake;
mod openrouter;

pub use fake::{FakeProvider, Operation};
pub use openrouter::OpenRouterProvider;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::api_connection::ApiConnectionError;
use crate::recipe::{GenerationRequest, RegenerationRequest};

pub type ProviderResult = Result<Value, ApiConnectionError>;

/// Produces a Recipe-shaped payload. `request.modifications`, when present,
/// must be honored as hard constraints.
#[async_trait]
pub trait GenerationProvider: Send + Sync + fmt::Debug {
    async fn generate_recipe(&self, request: &GenerationRequest) -> ProviderResult;
}

/// Produces `{ "instructions": "..." }` covering only the given ingredients.
#[async_trait]
pub trait RegenerationProvider: Send + Sync + fmt::Debug {
    async fn regenerate_instructions(&self, request: &RegenerationRequest) -> ProviderResult;
}

/// Produces `{ "suggestions": [...] }` for a mood or craving.
#[async_trait]
pub trait SuggestionProvider: Send + Sync + fmt::Debug {
    async fn suggest_dishes(&self, thoughts: &str) -> ProviderResult;
}

/// Produces `{ "recipes": [...] }` ideas for a free-text ingredient list.
#[async_trait]
pub trait PantryProvider: Send + Sync + fmt::Debug {
    async fn recipes_from_ingredients(&self, ingredients: &str) -> ProviderResult;
}

/// Produces `{ "summary": "..." }` for a set of instructions.
#[async_trait]
pub trait SummaryProvider: Send + Sync + fmt::Debug {
    async fn summarize_instructions(&self, instructions: &str) -> ProviderResult;
}

/// Convenience bound for a single backend serving every operation.
pub trait RecipeBackend:
    GenerationProvider
    + RegenerationProvider
    + SuggestionProvider
    + PantryProvider
    + SummaryProvider
{
}

impl<T> RecipeBackend for T where
    T: GenerationProvider
        + RegenerationProvider
        + SuggestionProvider
        + PantryProvider
        + SummaryProvider
{
}
