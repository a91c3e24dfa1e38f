//! Input normalization. Nothing here performs I/O; every check runs before a
//! provider is contacted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recipe::{Diet, GenerationRequest};

pub const MIN_INGREDIENT_LIST_CHARS: usize = 3;
pub const MAX_INGREDIENT_LIST_CHARS: usize = 500;
pub const MIN_THOUGHTS_CHARS: usize = 10;

/// All violations found in one input, in field-declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .violations.join(", "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    fn single(clause: &str) -> Self {
        Self {
            violations: vec![clause.to_string()],
        }
    }
}

/// Untyped form input as it arrives from a CLI or UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipeInput {
    pub dish_name: Option<String>,
    pub servings: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub diet: Option<String>,
}

impl RawRecipeInput {
    /// Input pre-filled with only a dish name; everything else stays for the user.
    pub fn for_dish(dish_name: &str) -> Self {
        Self {
            dish_name: Some(dish_name.to_string()),
            ..Self::default()
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

enum ServingsCheck {
    Valid(u32),
    TooSmall,
    Fractional,
}

fn coerce_servings(value: &Option<String>) -> ServingsCheck {
    let Some(text) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return ServingsCheck::TooSmall;
    };
    if let Ok(n) = text.parse::<i64>() {
        return match u32::try_from(n) {
            Ok(n) if n >= 1 => ServingsCheck::Valid(n),
            _ => ServingsCheck::TooSmall,
        };
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f < 1.0 => ServingsCheck::TooSmall,
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
            ServingsCheck::Valid(f as u32)
        }
        Ok(f) if f.is_finite() => ServingsCheck::Fractional,
        _ => ServingsCheck::TooSmall,
    }
}

pub fn validate(raw: &RawRecipeInput) -> Result<GenerationRequest, ValidationError> {
    let mut violations = Vec::new();

    let dish_name = non_empty(&raw.dish_name);
    if dish_name.is_none() {
        violations.push("Dish name is required.".to_string());
    }

    let servings = match coerce_servings(&raw.servings) {
        ServingsCheck::Valid(n) => Some(n),
        ServingsCheck::TooSmall => {
            violations.push("Number of servings must be at least 1.".to_string());
            None
        }
        ServingsCheck::Fractional => {
            violations.push("Number of servings must be a whole number.".to_string());
            None
        }
    };

    let location = non_empty(&raw.location);
    if location.is_none() {
        violations.push("State, Country is required.".to_string());
    }

    let language = non_empty(&raw.language);
    if language.is_none() {
        violations.push("Language is required.".to_string());
    }

    let diet = match raw.diet.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        None => {
            violations.push("Please select a dietary preference.".to_string());
            None
        }
        Some(value) => {
            let parsed = Diet::parse(value);
            if parsed.is_none() {
                violations
                    .push("Dietary preference must be Vegetarian or Non-Vegetarian.".to_string());
            }
            parsed
        }
    };

    match (dish_name, servings, location, language, diet) {
        (Some(dish_name), Some(servings), Some(location), Some(language), Some(diet))
            if violations.is_empty() =>
        {
            Ok(GenerationRequest {
                dish_name,
                servings,
                location,
                language,
                diet,
                modifications: None,
            })
        }
        _ => Err(ValidationError { violations }),
    }
}

/// Free-text pantry list ("chicken, broccoli, garlic").
pub fn validate_ingredient_list(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len < MIN_INGREDIENT_LIST_CHARS {
        return Err(ValidationError::single("Please list at least one ingredient."));
    }
    if len > MAX_INGREDIENT_LIST_CHARS {
        return Err(ValidationError::single("Ingredient list is too long."));
    }
    Ok(trimmed.to_string())
}

pub fn validate_thoughts(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_THOUGHTS_CHARS {
        return Err(ValidationError::single(
            "Please tell us a bit more about what you're feeling or craving.",
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_modifications(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::single("Please describe the changes you want."));
    }
    Ok(trimmed.to_string())
}
