//! Read-time projection of ingredient quantities onto a target serving count.
//! Stored quantities are never written back.

use serde::Serialize;

use crate::recipe::Ingredient;

pub const MIN_SERVINGS: u32 = 1;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ScaledIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
}

pub fn clamp_servings(servings: u32) -> u32 {
    servings.max(MIN_SERVINGS)
}

pub fn increment(servings: u32) -> u32 {
    clamp_servings(servings.saturating_add(1))
}

/// Decrementing at the floor is a no-op.
pub fn decrement(servings: u32) -> u32 {
    clamp_servings(servings.saturating_sub(1))
}

/// Unrounded `quantity * target / base`.
pub fn scale_quantity(quantity: f64, base_servings: u32, target_servings: u32) -> f64 {
    let base = f64::from(clamp_servings(base_servings));
    let target = f64::from(clamp_servings(target_servings));
    quantity * (target / base)
}

pub fn scale(ingredient: &Ingredient, base_servings: u32, target_servings: u32) -> f64 {
    scale_quantity(ingredient.quantity, base_servings, target_servings)
}

/// Integers pass through, anything else is rounded to two decimals.
pub fn display_quantity(value: f64) -> f64 {
    if value.fract() == 0.0 {
        value
    } else {
        (value * 100.0).round() / 100.0
    }
}

pub fn format_quantity(value: f64) -> String {
    let shown = display_quantity(value);
    if shown.fract() == 0.0 {
        format!("{}", shown as i64)
    } else {
        let text = format!("{shown:.2}");
        text.trim_end_matches('0').to_string()
    }
}

pub fn scale_ingredients(
    ingredients: &[Ingredient],
    base_servings: u32,
    target_servings: u32,
) -> Vec<ScaledIngredient> {
    ingredients
        .iter()
        .map(|ingredient| ScaledIngredient {
            name: ingredient.name.clone(),
            quantity: display_quantity(scale(ingredient, base_servings, target_servings)),
            unit: ingredient.unit.clone(),
        })
        .collect()
}
