//! The display-state machine.
//!
//! `DisplayState` is a plain value. Every transition borrows the current state
//! and returns the next one, plus an [`Effect`] when a provider call is needed.
//! The caller performs the call and feeds the result back with the [`Ticket`]
//! it was given; a ticket that is not the pending one is refused, so a late
//! reply can never overwrite newer state.

use serde::Serialize;
use thiserror::Error;

use crate::recipe::{
    ingredient_names, GenerationRequest, Ingredient, Recipe, RegenerationRequest,
};
use crate::serving_scaler::{self, ScaledIngredient};
use crate::validator::{validate_modifications, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    /// No recipe yet, or the last one was discarded by a new request.
    Empty,
    Clean,
    /// An ingredient was removed since the instructions were generated.
    Dirty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PendingKind {
    Initial,
    InstructionsOnly,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    kind: PendingKind,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn kind(&self) -> PendingKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Generate {
        ticket: Ticket,
        request: GenerationRequest,
    },
    RegenerateInstructions {
        ticket: Ticket,
        request: RegenerationRequest,
    },
}

impl Effect {
    pub fn ticket(&self) -> Ticket {
        match self {
            Effect::Generate { ticket, .. } | Effect::RegenerateInstructions { ticket, .. } => {
                *ticket
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A recipe is already being generated. Please wait for it to finish.")]
    Busy,
    #[error("There is no recipe to change yet.")]
    NoRecipe,
    #[error("The instructions already match the ingredient list.")]
    NotDirty,
    #[error("The recipe has no ingredient named '{0}'.")]
    UnknownIngredient(String),
    #[error("Every ingredient was removed. Keep at least one, or start a new recipe.")]
    NoIngredients,
    #[error(transparent)]
    InvalidModifications(#[from] ValidationError),
    #[error("There is no earlier request to modify.")]
    NoOriginalRequest,
    #[error("Ignoring a response that does not belong to the pending request.")]
    StaleResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    original_request: Option<GenerationRequest>,
    base_recipe: Option<Recipe>,
    displayed_ingredients: Vec<Ingredient>,
    displayed_instructions: String,
    target_servings: u32,
    dirty: bool,
    modification_draft: String,
    pending: Option<Ticket>,
    last_seq: u64,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            original_request: None,
            base_recipe: None,
            displayed_ingredients: Vec::new(),
            displayed_instructions: String::new(),
            target_servings: serving_scaler::MIN_SERVINGS,
            dirty: false,
            modification_draft: String::new(),
            pending: None,
            last_seq: 0,
        }
    }
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Status {
        match (&self.base_recipe, self.dirty) {
            (None, _) => Status::Empty,
            (Some(_), true) => Status::Dirty,
            (Some(_), false) => Status::Clean,
        }
    }

    pub fn pending(&self) -> Option<PendingKind> {
        self.pending.map(|t| t.kind)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn base_recipe(&self) -> Option<&Recipe> {
        self.base_recipe.as_ref()
    }

    pub fn original_request(&self) -> Option<&GenerationRequest> {
        self.original_request.as_ref()
    }

    pub fn displayed_ingredients(&self) -> &[Ingredient] {
        &self.displayed_ingredients
    }

    pub fn displayed_instructions(&self) -> &str {
        &self.displayed_instructions
    }

    pub fn target_servings(&self) -> u32 {
        self.target_servings
    }

    pub fn modification_draft(&self) -> &str {
        &self.modification_draft
    }

    /// Displayed ingredients projected onto the target serving count.
    pub fn scaled_ingredients(&self) -> Vec<ScaledIngredient> {
        let base = self
            .base_recipe
            .as_ref()
            .map_or(self.target_servings, |r| r.servings);
        serving_scaler::scale_ingredients(&self.displayed_ingredients, base, self.target_servings)
    }

    fn ensure_idle(&self) -> Result<(), TransitionError> {
        if self.pending.is_some() {
            Err(TransitionError::Busy)
        } else {
            Ok(())
        }
    }

    fn issue(&mut self, kind: PendingKind) -> Ticket {
        self.last_seq += 1;
        let ticket = Ticket {
            seq: self.last_seq,
            kind,
        };
        self.pending = Some(ticket);
        ticket
    }

    fn settle(&self, ticket: Ticket, expected: &[PendingKind]) -> Result<Self, TransitionError> {
        if self.pending != Some(ticket) || !expected.contains(&ticket.kind) {
            tracing::warn!(seq = ticket.seq, kind = ?ticket.kind, "discarding stale response");
            return Err(TransitionError::StaleResponse);
        }
        let mut next = self.clone();
        next.pending = None;
        Ok(next)
    }

    /// Discards the current recipe and asks for a new one.
    pub fn request_generation(
        &self,
        request: GenerationRequest,
    ) -> Result<(Self, Effect), TransitionError> {
        self.ensure_idle()?;
        let mut next = Self {
            original_request: Some(request.clone()),
            target_servings: serving_scaler::clamp_servings(request.servings),
            last_seq: self.last_seq,
            ..Self::default()
        };
        let ticket = next.issue(PendingKind::Initial);
        Ok((next, Effect::Generate { ticket, request }))
    }

    /// Accepts a recipe for a pending initial or full generation. The baseline
    /// servings are those of the original request, whatever the recipe says.
    pub fn complete_generation(
        &self,
        ticket: Ticket,
        mut recipe: Recipe,
    ) -> Result<Self, TransitionError> {
        let mut next = self.settle(ticket, &[PendingKind::Initial, PendingKind::Full])?;
        if let Some(request) = &next.original_request {
            recipe.servings = request.servings;
        }
        next.displayed_ingredients = recipe.ingredients.clone();
        next.displayed_instructions = recipe.instructions.clone();
        next.target_servings = serving_scaler::clamp_servings(recipe.servings);
        next.base_recipe = Some(recipe);
        next.dirty = false;
        if ticket.kind == PendingKind::Full {
            next.modification_draft.clear();
        }
        Ok(next)
    }

    /// Drops the named ingredient from the display; instructions stay as they
    /// were until regenerated.
    pub fn remove_ingredient(&self, name: &str) -> Result<Self, TransitionError> {
        self.ensure_idle()?;
        if self.base_recipe.is_none() {
            return Err(TransitionError::NoRecipe);
        }
        if !self.displayed_ingredients.iter().any(|i| i.name == name) {
            return Err(TransitionError::UnknownIngredient(name.to_string()));
        }
        let mut next = self.clone();
        next.displayed_ingredients.retain(|i| i.name != name);
        next.dirty = true;
        Ok(next)
    }

    pub fn regenerate_instructions(&self) -> Result<(Self, Effect), TransitionError> {
        self.ensure_idle()?;
        let recipe = self.base_recipe.as_ref().ok_or(TransitionError::NoRecipe)?;
        if !self.dirty {
            return Err(TransitionError::NotDirty);
        }
        if self.displayed_ingredients.is_empty() {
            return Err(TransitionError::NoIngredients);
        }
        let request = RegenerationRequest {
            dish_name: recipe.title.clone(),
            ingredients: ingredient_names(&self.displayed_ingredients),
        };
        let mut next = self.clone();
        let ticket = next.issue(PendingKind::InstructionsOnly);
        Ok((next, Effect::RegenerateInstructions { ticket, request }))
    }

    pub fn complete_instructions(
        &self,
        ticket: Ticket,
        instructions: String,
    ) -> Result<Self, TransitionError> {
        let mut next = self.settle(ticket, &[PendingKind::InstructionsOnly])?;
        next.displayed_instructions = instructions;
        next.dirty = false;
        Ok(next)
    }

    /// Re-issues the original request with `text` as hard constraints. The
    /// text is kept as the draft until the regeneration succeeds.
    pub fn regenerate_full(&self, text: &str) -> Result<(Self, Effect), TransitionError> {
        self.ensure_idle()?;
        let modifications = validate_modifications(text)?;
        let original = self
            .original_request
            .as_ref()
            .ok_or(TransitionError::NoOriginalRequest)?;
        let request = original.with_modifications(&modifications);
        let mut next = self.clone();
        next.modification_draft = text.to_string();
        let ticket = next.issue(PendingKind::Full);
        Ok((next, Effect::Generate { ticket, request }))
    }

    /// The pending call failed: nothing displayed changes.
    pub fn fail(&self, ticket: Ticket) -> Result<Self, TransitionError> {
        self.settle(
            ticket,
            &[PendingKind::Initial, PendingKind::InstructionsOnly, PendingKind::Full],
        )
    }

    /// Display-only; never marks dirty and never needs a call.
    pub fn change_servings(&self, servings: u32) -> Self {
        let mut next = self.clone();
        next.target_servings = serving_scaler::clamp_servings(servings);
        next
    }

    pub fn increment_servings(&self) -> Self {
        self.change_servings(serving_scaler::increment(self.target_servings))
    }

    pub fn decrement_servings(&self) -> Self {
        self.change_servings(serving_scaler::decrement(self.target_servings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Diet;

    fn pizza_request(servings: u32) -> GenerationRequest {
        GenerationRequest {
            dish_name: "Pizza".to_string(),
            servings,
            location: "California, USA".to_string(),
            language: "English".to_string(),
            diet: Diet::Vegetarian,
            modifications: None,
        }
    }

    fn margherita(servings: u32) -> Recipe {
        Recipe {
            title: "Margherita Pizza".to_string(),
            description: "Tomato and basil".to_string(),
            ingredients: vec![
                Ingredient::new("Tomato", 2.0, Some("pcs")),
                Ingredient::new("Basil", 10.0, Some("g")),
            ],
            instructions: "1. Slice tomato.\n2. Tear basil.\n3. Bake.".to_string(),
            servings,
        }
    }

    fn clean_state() -> DisplayState {
        let (state, effect) = DisplayState::new().request_generation(pizza_request(4)).unwrap();
        state.complete_generation(effect.ticket(), margherita(4)).unwrap()
    }

    #[test]
    fn test_initial_generation_reaches_clean() {
        let (pending, effect) = DisplayState::new().request_generation(pizza_request(4)).unwrap();
        assert_eq!(pending.status(), Status::Empty);
        assert_eq!(pending.pending(), Some(PendingKind::Initial));
        assert!(matches!(
            &effect,
            Effect::Generate { request, .. } if request.modifications.is_none()
        ));

        let state = pending.complete_generation(effect.ticket(), margherita(4)).unwrap();
        assert_eq!(state.status(), Status::Clean);
        assert!(!state.is_pending());
        assert_eq!(state.displayed_ingredients().len(), 2);
        assert_eq!(state.target_servings(), 4);
    }

    #[test]
    fn test_requested_servings_are_authoritative() {
        let (pending, effect) = DisplayState::new().request_generation(pizza_request(6)).unwrap();
        let state = pending.complete_generation(effect.ticket(), margherita(2)).unwrap();
        assert_eq!(state.base_recipe().unwrap().servings, 6);
        assert_eq!(state.target_servings(), 6);
    }

    #[test]
    fn test_remove_marks_dirty_and_keeps_instructions() {
        let clean = clean_state();
        let dirty = clean.remove_ingredient("Basil").unwrap();
        assert_eq!(dirty.status(), Status::Dirty);
        let names: Vec<_> = dirty.displayed_ingredients().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Tomato"]);
        assert_eq!(dirty.displayed_instructions(), clean.displayed_instructions());
        assert_eq!(dirty.base_recipe(), clean.base_recipe());
    }

    #[test]
    fn test_remove_is_exact_and_case_sensitive() {
        let clean = clean_state();
        assert_eq!(
            clean.remove_ingredient("basil").unwrap_err(),
            TransitionError::UnknownIngredient("basil".to_string())
        );
        assert_eq!(
            DisplayState::new().remove_ingredient("Basil").unwrap_err(),
            TransitionError::NoRecipe
        );
    }

    #[test]
    fn test_instructions_only_regeneration_cycle() {
        let dirty = clean_state().remove_ingredient("Basil").unwrap();
        let (pending, effect) = dirty.regenerate_instructions().unwrap();
        match &effect {
            Effect::RegenerateInstructions { request, .. } => {
                assert_eq!(request.dish_name, "Margherita Pizza");
                assert_eq!(request.ingredients, vec!["Tomato"]);
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert_eq!(pending.status(), Status::Dirty);

        let clean = pending
            .complete_instructions(effect.ticket(), "1. Slice tomato.\n2. Bake.".to_string())
            .unwrap();
        assert_eq!(clean.status(), Status::Clean);
        assert_eq!(clean.displayed_ingredients(), dirty.displayed_ingredients());
        assert_eq!(clean.displayed_instructions(), "1. Slice tomato.\n2. Bake.");
    }

    #[test]
    fn test_instructions_regeneration_requires_dirty() {
        assert_eq!(
            clean_state().regenerate_instructions().unwrap_err(),
            TransitionError::NotDirty
        );
        assert_eq!(
            DisplayState::new().regenerate_instructions().unwrap_err(),
            TransitionError::NoRecipe
        );
    }

    #[test]
    fn test_instructions_regeneration_needs_an_ingredient() {
        let emptied = clean_state()
            .remove_ingredient("Basil")
            .and_then(|s| s.remove_ingredient("Tomato"))
            .unwrap();
        assert!(emptied.displayed_ingredients().is_empty());
        assert_eq!(
            emptied.regenerate_instructions().unwrap_err(),
            TransitionError::NoIngredients
        );
        assert_eq!(emptied.status(), Status::Dirty);
        assert!(!emptied.is_pending());
    }

    #[test]
    fn test_failed_instructions_leave_state_dirty() {
        let dirty = clean_state().remove_ingredient("Basil").unwrap();
        let (pending, effect) = dirty.regenerate_instructions().unwrap();
        let after = pending.fail(effect.ticket()).unwrap();
        assert_eq!(after.status(), Status::Dirty);
        assert_eq!(after.displayed_instructions(), dirty.displayed_instructions());
        assert!(!after.is_pending());
    }

    #[test]
    fn test_second_request_while_pending_is_busy() {
        let dirty = clean_state().remove_ingredient("Basil").unwrap();
        let (pending, _) = dirty.regenerate_instructions().unwrap();
        assert_eq!(pending.regenerate_instructions().unwrap_err(), TransitionError::Busy);
        assert_eq!(pending.regenerate_full("no cheese").unwrap_err(), TransitionError::Busy);
        assert_eq!(pending.remove_ingredient("Tomato").unwrap_err(), TransitionError::Busy);
        assert_eq!(
            pending.request_generation(pizza_request(2)).unwrap_err(),
            TransitionError::Busy
        );
    }

    #[test]
    fn test_stale_ticket_is_refused() {
        let dirty = clean_state().remove_ingredient("Basil").unwrap();
        let (first, first_effect) = dirty.regenerate_instructions().unwrap();
        let failed = first.fail(first_effect.ticket()).unwrap();
        let (second, second_effect) = failed.regenerate_instructions().unwrap();
        assert!(second_effect.ticket().seq() > first_effect.ticket().seq());

        let late = second.complete_instructions(first_effect.ticket(), "old".to_string());
        assert_eq!(late.unwrap_err(), TransitionError::StaleResponse);

        let wrong_kind = second.complete_generation(second_effect.ticket(), margherita(4));
        assert_eq!(wrong_kind.unwrap_err(), TransitionError::StaleResponse);
    }

    #[test]
    fn test_full_regeneration_replaces_baseline() {
        let dirty = clean_state().remove_ingredient("Basil").unwrap().change_servings(2);
        let (pending, effect) = dirty.regenerate_full("  make it gluten free ").unwrap();
        assert_eq!(pending.modification_draft(), "  make it gluten free ");
        let Effect::Generate { request, ticket } = effect else {
            panic!("expected a generate effect");
        };
        assert_eq!(request.modifications.as_deref(), Some("make it gluten free"));
        assert_eq!(request.servings, 4);

        let mut replacement = margherita(9);
        replacement.title = "Gluten-free Margherita".to_string();
        let clean = pending.complete_generation(ticket, replacement).unwrap();
        assert_eq!(clean.status(), Status::Clean);
        assert_eq!(clean.base_recipe().unwrap().title, "Gluten-free Margherita");
        assert_eq!(clean.base_recipe().unwrap().servings, 4);
        assert_eq!(clean.displayed_ingredients().len(), 2);
        assert_eq!(clean.target_servings(), 4);
        assert_eq!(clean.modification_draft(), "");
        assert!(clean.original_request().unwrap().modifications.is_none());
    }

    #[test]
    fn test_failed_full_regeneration_keeps_state_and_draft() {
        let dirty = clean_state().remove_ingredient("Basil").unwrap();
        let (pending, effect) = dirty.regenerate_full("no tomatoes").unwrap();
        let after = pending.fail(effect.ticket()).unwrap();
        assert_eq!(after.status(), Status::Dirty);
        assert_eq!(after.base_recipe(), dirty.base_recipe());
        assert_eq!(after.displayed_ingredients(), dirty.displayed_ingredients());
        assert_eq!(after.modification_draft(), "no tomatoes");
    }

    #[test]
    fn test_blank_modifications_are_rejected() {
        let clean = clean_state();
        assert!(matches!(
            clean.regenerate_full(" \t\n").unwrap_err(),
            TransitionError::InvalidModifications(_)
        ));
        assert_eq!(
            DisplayState::new().regenerate_full("vegan").unwrap_err(),
            TransitionError::NoOriginalRequest
        );
    }

    #[test]
    fn test_servings_never_change_status() {
        let dirty = clean_state().remove_ingredient("Basil").unwrap();
        let scaled = dirty.change_servings(2);
        assert_eq!(scaled.status(), Status::Dirty);
        assert_eq!(scaled.scaled_ingredients()[0].quantity, 1.0);
        assert_eq!(scaled.base_recipe().unwrap().ingredients[0].quantity, 2.0);

        let clean = clean_state().change_servings(0);
        assert_eq!(clean.target_servings(), 1);
        assert_eq!(clean.decrement_servings().target_servings(), 1);
        assert_eq!(clean.increment_servings().target_servings(), 2);
        assert_eq!(clean.status(), Status::Clean);
    }

    #[test]
    fn test_new_request_discards_display_state() {
        let dirty = clean_state().remove_ingredient("Basil").unwrap();
        let (pending, _) = dirty.request_generation(pizza_request(2)).unwrap();
        assert_eq!(pending.status(), Status::Empty);
        assert!(pending.displayed_ingredients().is_empty());
        assert!(pending.displayed_instructions().is_empty());
        assert_eq!(pending.target_servings(), 2);
    }
}
