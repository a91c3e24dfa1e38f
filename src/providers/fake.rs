//! Scripted provider for tests and offline runs.
//!
//! Replies are queued per operation and handed out in order; every request
//! is recorded so tests can assert what was sent.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    GenerationProvider, PantryProvider, ProviderResult, RegenerationProvider, SuggestionProvider,
    SummaryProvider,
};
use crate::api_connection::ApiConnectionError;
use crate::recipe::{GenerationRequest, RegenerationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Regenerate,
    Suggest,
    Pantry,
    Summarize,
}

#[derive(Debug, Default)]
struct Script {
    generate: VecDeque<ProviderResult>,
    regenerate: VecDeque<ProviderResult>,
    suggest: VecDeque<ProviderResult>,
    pantry: VecDeque<ProviderResult>,
    summarize: VecDeque<ProviderResult>,
    generation_calls: Vec<GenerationRequest>,
    regeneration_calls: Vec<RegenerationRequest>,
    text_calls: Vec<(Operation, String)>,
}

impl Script {
    fn queue(&mut self, operation: Operation) -> &mut VecDeque<ProviderResult> {
        match operation {
            Operation::Generate => &mut self.generate,
            Operation::Regenerate => &mut self.regenerate,
            Operation::Suggest => &mut self.suggest,
            Operation::Pantry => &mut self.pantry,
            Operation::Summarize => &mut self.summarize,
        }
    }

    fn next(&mut self, operation: Operation) -> ProviderResult {
        self.queue(operation).pop_front().unwrap_or_else(|| {
            Err(ApiConnectionError::Other(format!(
                "FakeProvider: no scripted reply for {operation:?}"
            )))
        })
    }
}

#[derive(Debug, Default)]
pub struct FakeProvider {
    script: Mutex<Script>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, operation: Operation, reply: ProviderResult) -> &Self {
        self.script().queue(operation).push_back(reply);
        self
    }

    pub fn push_recipe(&self, recipe: Value) -> &Self {
        self.push(Operation::Generate, Ok(recipe))
    }

    pub fn push_instructions(&self, instructions: &str) -> &Self {
        self.push(Operation::Regenerate, Ok(json!({ "instructions": instructions })))
    }

    pub fn push_suggestions(&self, suggestions: Value) -> &Self {
        self.push(Operation::Suggest, Ok(json!({ "suggestions": suggestions })))
    }

    pub fn push_pantry(&self, recipes: &[&str]) -> &Self {
        self.push(Operation::Pantry, Ok(json!({ "recipes": recipes })))
    }

    pub fn push_summary(&self, summary: &str) -> &Self {
        self.push(Operation::Summarize, Ok(json!({ "summary": summary })))
    }

    pub fn push_failure(&self, operation: Operation, message: &str) -> &Self {
        self.push(operation, Err(ApiConnectionError::Other(message.to_string())))
    }

    pub fn generation_calls(&self) -> Vec<GenerationRequest> {
        self.script().generation_calls.clone()
    }

    pub fn regeneration_calls(&self) -> Vec<RegenerationRequest> {
        self.script().regeneration_calls.clone()
    }

    /// Number of calls of any kind received so far.
    pub fn call_count(&self) -> usize {
        let script = self.script();
        script.generation_calls.len() + script.regeneration_calls.len() + script.text_calls.len()
    }

    pub fn text_calls(&self, operation: Operation) -> Vec<String> {
        self.script()
            .text_calls
            .iter()
            .filter(|(op, _)| *op == operation)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn record_text(&self, operation: Operation, text: &str) -> ProviderResult {
        let mut script = self.script();
        script.text_calls.push((operation, text.to_string()));
        script.next(operation)
    }
}

#[async_trait]
impl GenerationProvider for FakeProvider {
    async fn generate_recipe(&self, request: &GenerationRequest) -> ProviderResult {
        let mut script = self.script();
        script.generation_calls.push(request.clone());
        script.next(Operation::Generate)
    }
}

#[async_trait]
impl RegenerationProvider for FakeProvider {
    async fn regenerate_instructions(&self, request: &RegenerationRequest) -> ProviderResult {
        let mut script = self.script();
        script.regeneration_calls.push(request.clone());
        script.next(Operation::Regenerate)
    }
}

#[async_trait]
impl SuggestionProvider for FakeProvider {
    async fn suggest_dishes(&self, thoughts: &str) -> ProviderResult {
        self.record_text(Operation::Suggest, thoughts)
    }
}

#[async_trait]
impl PantryProvider for FakeProvider {
    async fn recipes_from_ingredients(&self, ingredients: &str) -> ProviderResult {
        self.record_text(Operation::Pantry, ingredients)
    }
}

#[async_trait]
impl SummaryProvider for FakeProvider {
    async fn summarize_instructions(&self, instructions: &str) -> ProviderResult {
        self.record_text(Operation::Summarize, instructions)
    }
}
