//! Owns one display session and runs the provider calls its transitions ask for.

use thiserror::Error;

use crate::actions::{surface, ActionError};
use crate::error::RecipeError;
use crate::orchestrator::GenerationOrchestrator;
use crate::recipe::GenerationRequest;
use crate::regeneration::{DisplayState, Effect, Ticket, TransitionError};

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Recipe(#[from] RecipeError),
}

impl WorkbenchError {
    /// What the user should see; transition errors are already user-facing.
    pub fn user_message(self, action: &'static str) -> String {
        match self {
            WorkbenchError::Transition(e) => e.to_string(),
            WorkbenchError::Recipe(e) => {
                let surfaced: ActionError = surface(action, e);
                surfaced.to_string()
            }
        }
    }
}

#[derive(Debug)]
pub struct Workbench {
    orchestrator: GenerationOrchestrator,
    state: DisplayState,
}

impl Workbench {
    pub fn new(orchestrator: GenerationOrchestrator) -> Self {
        Self {
            orchestrator,
            state: DisplayState::new(),
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    async fn run(&mut self, effect: Effect) -> Result<(), WorkbenchError> {
        let ticket = effect.ticket();
        let resolved = match effect {
            Effect::Generate { request, .. } => match self.orchestrator.generate(&request).await {
                Ok(recipe) => self.state.complete_generation(ticket, recipe),
                Err(error) => return self.fail(ticket, error),
            },
            Effect::RegenerateInstructions { request, .. } => {
                match self.orchestrator.regenerate_instructions(&request).await {
                    Ok(instructions) => self.state.complete_instructions(ticket, instructions),
                    Err(error) => return self.fail(ticket, error),
                }
            }
        };
        self.state = resolved?;
        Ok(())
    }

    fn fail(
        &mut self,
        ticket: Ticket,
        error: RecipeError,
    ) -> Result<(), WorkbenchError> {
        self.state = self.state.fail(ticket)?;
        Err(error.into())
    }

    /// Starts over with a new, already validated request.
    pub async fn create(&mut self, request: GenerationRequest) -> Result<(), WorkbenchError> {
        let (next, effect) = self.state.request_generation(request)?;
        self.state = next;
        self.run(effect).await
    }

    pub fn remove_ingredient(&mut self, name: &str) -> Result<(), WorkbenchError> {
        self.state = self.state.remove_ingredient(name)?;
        Ok(())
    }

    pub async fn regenerate_instructions(&mut self) -> Result<(), WorkbenchError> {
        let (next, effect) = self.state.regenerate_instructions()?;
        self.state = next;
        self.run(effect).await
    }

    pub async fn regenerate_full(&mut self, modifications: &str) -> Result<(), WorkbenchError> {
        let (next, effect) = self.state.regenerate_full(modifications)?;
        self.state = next;
        self.run(effect).await
    }

    pub fn set_servings(&mut self, servings: u32) {
        self.state = self.state.change_servings(servings);
    }

    pub fn increment_servings(&mut self) {
        self.state = self.state.increment_servings();
    }

    pub fn decrement_servings(&mut self) {
        self.state = self.state.decrement_servings();
    }

    /// Summary of the instructions currently displayed.
    pub async fn summarize(&self) -> Result<String, WorkbenchError> {
        if self.state.base_recipe().is_none() {
            return Err(TransitionError::NoRecipe.into());
        }
        Ok(self
            .orchestrator
            .summarize_instructions(self.state.displayed_instructions())
            .await?)
    }
}
