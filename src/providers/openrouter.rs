use async_trait::async_trait;

use super::{
    GenerationProvider, PantryProvider, ProviderResult, RegenerationProvider, SuggestionProvider,
    SummaryProvider,
};
use crate::api_connection::endpoints::{
    ChatCompletionRequest, ChatMessage, JsonSchema, JsonSchemaDefinition, JsonSchemaProperty,
    Provider, ResponseFormat,
};
use crate::api_connection::extract_json_content;
use crate::config::AppConfig;
use crate::recipe::{GenerationRequest, RegenerationRequest};

const JSON_ONLY: &str = "Return the output as a JSON object. \
    The JSON object must be the only content in your response. \
    Do not include any explanatory text, comments, or markdown formatting \
    (like ```json) before or after the JSON object.";

/// Chat-completion backed implementation of every provider trait.
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    provider: Provider,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenRouterProvider {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            provider: Provider::openrouter(config),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    async fn complete_json(
        &self,
        system_prompt: String,
        user_prompt: String,
        schema: JsonSchemaDefinition,
    ) -> ProviderResult {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)],
            response_format: Some(ResponseFormat::json_schema(schema)),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };
        let response = self.provider.call_chat_completion(request).await?;
        extract_json_content(&response)
    }
}

const INSTRUCTIONS_DESCRIPTION: &str =
    "Step-by-step instructions as a numbered markdown list, one step per line.";

fn ingredient_schema() -> JsonSchema {
    JsonSchema::object(vec![
        ("name", JsonSchemaProperty::typed("string", "The name of the ingredient.")),
        (
            "quantity",
            JsonSchemaProperty::typed("number", "The amount of the ingredient, greater than zero."),
        ),
        (
            "unit",
            JsonSchemaProperty::typed(
                "string",
                "The unit of measurement (e.g. \"grams\", \"ml\", \"cups\"); empty if unitless.",
            ),
        ),
    ])
}

fn recipe_json_schema() -> JsonSchemaDefinition {
    JsonSchemaDefinition {
        name: "recipe_schema".to_string(),
        strict: Some(true),
        schema: JsonSchema::object(vec![
            ("title", JsonSchemaProperty::typed("string", "The title of the recipe.")),
            (
                "description",
                JsonSchemaProperty::typed("string", "A short, engaging description of the dish."),
            ),
            (
                "ingredients",
                JsonSchemaProperty::array_of(
                    ingredient_schema(),
                    "The ingredients, each with name, quantity and unit. Names must be unique.",
                ),
            ),
            ("instructions", JsonSchemaProperty::typed("string", INSTRUCTIONS_DESCRIPTION)),
            (
                "servings",
                JsonSchemaProperty::typed("number", "The number of servings this recipe is for."),
            ),
        ]),
    }
}

fn instructions_json_schema() -> JsonSchemaDefinition {
    JsonSchemaDefinition {
        name: "instructions_schema".to_string(),
        strict: Some(true),
        schema: JsonSchema::object(vec![(
            "instructions",
            JsonSchemaProperty::typed("string", INSTRUCTIONS_DESCRIPTION),
        )]),
    }
}

fn suggestions_json_schema() -> JsonSchemaDefinition {
    let item = JsonSchema::object(vec![
        ("dish_name", JsonSchemaProperty::typed("string", "The exact name of a real dish.")),
        (
            "description",
            JsonSchemaProperty::typed(
                "string",
                "One appetizing line on why this fits the user's thought.",
            ),
        ),
        (
            "difficulty",
            JsonSchemaProperty::one_of(
                &["Easy", "Medium", "Hard"],
                "How hard the dish is to cook.",
            ),
        ),
    ]);
    JsonSchemaDefinition {
        name: "suggestions_schema".to_string(),
        strict: Some(true),
        schema: JsonSchema::object(vec![(
            "suggestions",
            JsonSchemaProperty::array_of(item, "4 to 5 distinct dishes, best match first."),
        )]),
    }
}

fn pantry_json_schema() -> JsonSchemaDefinition {
    JsonSchemaDefinition {
        name: "pantry_recipes_schema".to_string(),
        strict: Some(true),
        schema: JsonSchema::object(vec![(
            "recipes",
            JsonSchemaProperty::array_of(
                JsonSchema::scalar("string"),
                "Recipe suggestions using the available ingredients.",
            ),
        )]),
    }
}

fn summary_json_schema() -> JsonSchemaDefinition {
    JsonSchemaDefinition {
        name: "summary_schema".to_string(),
        strict: Some(true),
        schema: JsonSchema::object(vec![(
            "summary",
            JsonSchemaProperty::typed("string", "A short summary of the recipe instructions."),
        )]),
    }
}

pub(crate) fn recipe_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "Create a recipe for the following dish:

Dish Name: {}
Number of Servings: {}
State, Country: {}
Language: {}
Dietary Preference: {}

Tailor the recipe to ingredients that are easy to find in the given location and write every field in the given language.
Ingredient quantities must be for exactly {} servings, and the \"servings\" field must be {}.",
        request.dish_name,
        request.servings,
        request.location,
        request.language,
        request.diet,
        request.servings,
        request.servings,
    );
    if let Some(modifications) = &request.modifications {
        prompt.push_str(&format!(
            "

MANDATORY MODIFICATIONS. These are non-negotiable constraints; the whole recipe (title, description, ingredients and instructions) must follow them:
{modifications}"
        ));
    }
    prompt
}

pub(crate) fn instructions_prompt(request: &RegenerationRequest) -> String {
    let ingredients: String = request
        .ingredients
        .iter()
        .map(|name| format!("- {name}\n"))
        .collect();
    format!(
        "The user has removed some ingredients from a recipe and needs new instructions.

Dish Name: {}
Remaining Ingredients:
{}
Generate new step-by-step instructions for the dish using only the remaining ingredients, as a numbered markdown list with one step per line.",
        request.dish_name, ingredients
    )
}

#[async_trait]
impl GenerationProvider for OpenRouterProvider {
    async fn generate_recipe(&self, request: &GenerationRequest) -> ProviderResult {
        let system_prompt = format!("/no_thinking\nYou are an expert chef. {JSON_ONLY}");
        self.complete_json(system_prompt, recipe_prompt(request), recipe_json_schema())
            .await
    }
}

#[async_trait]
impl RegenerationProvider for OpenRouterProvider {
    async fn regenerate_instructions(&self, request: &RegenerationRequest) -> ProviderResult {
        let system_prompt = format!("/no_thinking\nYou are an expert chef. {JSON_ONLY}");
        self.complete_json(
            system_prompt,
            instructions_prompt(request),
            instructions_json_schema(),
        )
        .await
    }
}

#[async_trait]
impl SuggestionProvider for OpenRouterProvider {
    async fn suggest_dishes(&self, thoughts: &str) -> ProviderResult {
        let system_prompt = format!(
            "/no_thinking
You are a culinary assistant. Interpret the user's abstract thoughts, mood, weather context or vague cravings and suggest 4 to 5 distinct, real dishes that match their intent.
Consider emotional context, available time and flavor profile. For each dish give its exact name, a one-line reason it fits, and a difficulty of Easy, Medium or Hard.
{JSON_ONLY}"
        );
        let user_prompt = format!("\"{thoughts}\"");
        self.complete_json(system_prompt, user_prompt, suggestions_json_schema())
            .await
    }
}

#[async_trait]
impl PantryProvider for OpenRouterProvider {
    async fn recipes_from_ingredients(&self, ingredients: &str) -> ProviderResult {
        let system_prompt = format!(
            "/no_thinking\nYou are a helpful recipe assistant. Given the ingredients the user \
             has available, suggest recipes they can make. {JSON_ONLY}"
        );
        let user_prompt = format!("Ingredients: {ingredients}");
        self.complete_json(system_prompt, user_prompt, pantry_json_schema())
            .await
    }
}

#[async_trait]
impl SummaryProvider for OpenRouterProvider {
    async fn summarize_instructions(&self, instructions: &str) -> ProviderResult {
        let system_prompt = format!(
            "/no_thinking\nSummarize the following recipe instructions in a few concise \
             sentences. {JSON_ONLY}"
        );
        self.complete_json(system_prompt, instructions.to_string(), summary_json_schema())
            .await
    }
}
