use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Ingredient {
    pub fn new(name: &str, quantity: f64, unit: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            unit: unit.map(str::to_string),
        }
    }
}

/// A generated recipe. `servings` is the baseline the ingredient quantities
/// are denominated in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub servings: u32,
}

/// Ordered ingredient names, as sent with a `RegenerationRequest`.
pub fn ingredient_names(ingredients: &[Ingredient]) -> Vec<String> {
    ingredients.iter().map(|i| i.name.clone()).collect()
}

impl Recipe {
    /// Structural checks serde cannot express. Returns the first violation.
    pub fn check_schema(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("recipe title is empty".to_string());
        }
        if self.instructions.trim().is_empty() {
            return Err("recipe instructions are empty".to_string());
        }
        if self.servings < 1 {
            return Err("recipe servings must be at least 1".to_string());
        }
        let mut seen = HashSet::new();
        for ingredient in &self.ingredients {
            if ingredient.name.trim().is_empty() {
                return Err("ingredient with an empty name".to_string());
            }
            if !(ingredient.quantity.is_finite() && ingredient.quantity > 0.0) {
                return Err(format!(
                    "ingredient '{}' has non-positive quantity {}",
                    ingredient.name, ingredient.quantity
                ));
            }
            if !seen.insert(ingredient.name.as_str()) {
                return Err(format!("duplicate ingredient name '{}'", ingredient.name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Diet {
    Vegetarian,
    #[serde(rename = "Non-Vegetarian")]
    NonVegetarian,
}

impl Diet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Diet::Vegetarian => "Vegetarian",
            Diet::NonVegetarian => "Non-Vegetarian",
        }
    }

    /// Exact match on the wire names.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Vegetarian" => Some(Diet::Vegetarian),
            "Non-Vegetarian" => Some(Diet::NonVegetarian),
            _ => None,
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub dish_name: String,
    pub servings: u32,
    pub location: String,
    pub language: String,
    pub diet: Diet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifications: Option<String>,
}

impl GenerationRequest {
    /// Same request, carrying `text` as hard constraints for a full regeneration.
    pub fn with_modifications(&self, text: &str) -> Self {
        Self {
            modifications: Some(text.trim().to_string()),
            ..self.clone()
        }
    }
}

/// Input for an instructions-only regeneration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegenerationRequest {
    pub dish_name: String,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SuggestionItem {
    pub dish_name: String,
    pub description: String,
    pub difficulty: Difficulty,
}

impl fmt::Display for SuggestionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}): {}",
            self.dish_name, self.difficulty, self.description
        )
    }
}

/// Ranked suggestions, in the order the provider returned them.
pub type SuggestionSet = Vec<SuggestionItem>;
