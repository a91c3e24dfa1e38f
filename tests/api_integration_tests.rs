use recipe_adapt::api_connection::{
    connection::ApiConnectionError,
    endpoints::{ChatCompletionRequest, ChatMessage, Provider},
};
use recipe_adapt::config::AppConfig;
use recipe_adapt::orchestrator::GenerationOrchestrator;
use recipe_adapt::providers::OpenRouterProvider;
use recipe_adapt::recipe::{Diet, GenerationRequest};
use std::env;
use std::sync::Arc;

fn setup_test_environment() {
    dotenv::dotenv().ok();
}

fn config_with_key_var(var: &str) -> AppConfig {
    AppConfig {
        api_key_env_var: var.to_string(),
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_missing_api_key_error() {
    setup_test_environment();
    let provider =
        Provider::openrouter(&config_with_key_var("THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ"));
    let request = ChatCompletionRequest {
        model: AppConfig::default().model,
        messages: vec![ChatMessage::user("Hello")],
        response_format: None,
        temperature: None,
        max_tokens: None,
    };
    let result = provider.call_chat_completion(request).await;
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
    if let Err(ApiConnectionError::MissingApiKey(key_name)) = result {
        assert_eq!(key_name, "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    }
}

#[tokio::test]
async fn test_missing_key_surfaces_as_provider_error() {
    let backend = Arc::new(OpenRouterProvider::new(&config_with_key_var(
        "ANOTHER_KEY_THAT_DOES_NOT_EXIST_QWERTY",
    )));
    let orchestrator = GenerationOrchestrator::from_backend(backend);
    let request = GenerationRequest {
        dish_name: "Pizza".to_string(),
        servings: 4,
        location: "California, USA".to_string(),
        language: "English".to_string(),
        diet: Diet::Vegetarian,
        modifications: None,
    };
    let err = orchestrator.generate(&request).await.unwrap_err();
    assert!(!err.is_user_correctable());
}

#[tokio::test]
#[ignore]
async fn test_live_recipe_generation() {
    setup_test_environment();
    let config = AppConfig::from_env().expect("configuration");
    if env::var(&config.api_key_env_var).is_err() {
        println!("Skipping test_live_recipe_generation: {} not set.", config.api_key_env_var);
        return;
    }
    let orchestrator =
        GenerationOrchestrator::from_backend(Arc::new(OpenRouterProvider::new(&config)));
    let request = GenerationRequest {
        dish_name: "Pizza".to_string(),
        servings: 4,
        location: "California, USA".to_string(),
        language: "English".to_string(),
        diet: Diet::Vegetarian,
        modifications: None,
    };
    let recipe = orchestrator.generate(&request).await.expect("recipe");
    assert_eq!(recipe.servings, 4);
    assert!(!recipe.ingredients.is_empty());
    assert!(!recipe.instructions.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_api_error_with_invalid_key() {
    setup_test_environment();

    const INVALID_KEY_ENV_NAME_FOR_THIS_TEST: &str = "RECIPE_ADAPT_ENV_VAR_WITH_BAD_KEY_VALUE";
    unsafe {
        env::set_var(
            INVALID_KEY_ENV_NAME_FOR_THIS_TEST,
            "this_is_a_deliberately_bad_api_key_string_for_testing",
        );
    }

    let provider = Provider::openrouter(&config_with_key_var(INVALID_KEY_ENV_NAME_FOR_THIS_TEST));
    let request = ChatCompletionRequest {
        model: AppConfig::default().model,
        messages: vec![ChatMessage::user("This call should fail due to invalid key.")],
        response_format: None,
        temperature: None,
        max_tokens: None,
    };

    let result = provider.call_chat_completion(request).await;
    assert!(
        matches!(result, Err(ApiConnectionError::ApiError { .. })),
        "Expected ApiError, got {:?}",
        result
    );
    if let Err(ApiConnectionError::ApiError { status, .. }) = result {
        assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    }

    unsafe {
        env::remove_var(INVALID_KEY_ENV_NAME_FOR_THIS_TEST);
    }
}
