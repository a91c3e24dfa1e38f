use anyhow::{Context, Result};
use recipe_adapt::actions::Actions;
use recipe_adapt::cli::{parse_args, Command};
use recipe_adapt::config::AppConfig;
use recipe_adapt::logging;
use recipe_adapt::orchestrator::GenerationOrchestrator;
use recipe_adapt::providers::OpenRouterProvider;
use recipe_adapt::recipe::Recipe;
use recipe_adapt::regeneration::{DisplayState, Status};
use recipe_adapt::serving_scaler::{format_quantity, scale_ingredients};
use recipe_adapt::suggestion_broker::SuggestionBroker;
use recipe_adapt::validator::{validate, RawRecipeInput};
use recipe_adapt::workbench::Workbench;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const SESSION_HELP: &str = "Commands: show | remove <ingredient> | regen | modify <changes> | \
    servings <n> | + | - | summary | new | quit";

fn render_recipe(recipe: &Recipe, target_servings: u32) -> String {
    let mut out = format!(
        "# {}\n\n{}\n\nServings: {}\n\n## Ingredients\n",
        recipe.title, recipe.description, target_servings
    );
    for ingredient in scale_ingredients(&recipe.ingredients, recipe.servings, target_servings) {
        let unit = ingredient.unit.map(|u| format!(" {u}")).unwrap_or_default();
        out.push_str(&format!(
            "- {}{} {}\n",
            format_quantity(ingredient.quantity),
            unit,
            ingredient.name
        ));
    }
    out.push_str(&format!("\n## Instructions\n{}\n", recipe.instructions));
    out
}

fn render_state(state: &DisplayState, as_json: bool) -> String {
    let Some(base) = state.base_recipe() else {
        return "No recipe yet.".to_string();
    };
    if as_json {
        let view = json!({
            "status": state.status(),
            "title": base.title,
            "description": base.description,
            "baseServings": base.servings,
            "targetServings": state.target_servings(),
            "ingredients": state.scaled_ingredients(),
            "instructions": state.displayed_instructions(),
        });
        return serde_json::to_string_pretty(&view).unwrap_or_else(|e| e.to_string());
    }
    let displayed = Recipe {
        ingredients: state.displayed_ingredients().to_vec(),
        instructions: state.displayed_instructions().to_string(),
        ..base.clone()
    };
    let mut out = render_recipe(&displayed, state.target_servings());
    if state.status() == Status::Dirty {
        out.push_str(
            "\n(Ingredients changed: the instructions above are out of date. \
             Type `regen` to update them.)\n",
        );
    }
    out
}

async fn run_session(workbench: &mut Workbench, as_json: bool) -> Result<()> {
    println!("{}", render_state(workbench.state(), as_json));
    println!("{SESSION_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        let line = line.trim();
        let (command, argument) = line.split_once(' ').map_or((line, ""), |(c, a)| (c, a.trim()));
        let outcome = match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{SESSION_HELP}");
                continue;
            }
            "show" => Ok(()),
            "remove" => workbench
                .remove_ingredient(argument)
                .map_err(|e| e.user_message("removing the ingredient")),
            "regen" => workbench
                .regenerate_instructions()
                .await
                .map_err(|e| e.user_message("regenerating the instructions")),
            "modify" => workbench
                .regenerate_full(argument)
                .await
                .map_err(|e| e.user_message("regenerating the recipe")),
            "servings" => match argument.parse::<u32>() {
                Ok(n) => {
                    workbench.set_servings(n);
                    Ok(())
                }
                Err(_) => Err(format!("'{argument}' is not a serving count.")),
            },
            "+" => {
                workbench.increment_servings();
                Ok(())
            }
            "-" => {
                workbench.decrement_servings();
                Ok(())
            }
            "summary" => match workbench.summarize().await {
                Ok(summary) => {
                    println!("{summary}");
                    continue;
                }
                Err(e) => Err(e.user_message("summarizing the instructions")),
            },
            "new" => match workbench.state().original_request().cloned() {
                Some(request) => workbench
                    .create(request)
                    .await
                    .map_err(|e| e.user_message("generating the recipe")),
                None => Err("There is no earlier request to repeat.".to_string()),
            },
            other => Err(format!("Unknown command '{other}'. {SESSION_HELP}")),
        };
        match outcome {
            Ok(()) => println!("{}", render_state(workbench.state(), as_json)),
            Err(message) => eprintln!("{message}"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli_args = parse_args();
    logging::init(&cli_args.log);

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if let Some(model) = cli_args.model.clone() {
        config.model = model;
    }

    let backend = Arc::new(OpenRouterProvider::new(&config));
    let orchestrator = GenerationOrchestrator::from_backend(backend.clone());
    let actions = Actions::new(orchestrator.clone(), SuggestionBroker::new(backend));

    match cli_args.command {
        Command::Create(args) => {
            let recipe = actions.create_recipe(&RawRecipeInput::from(args)).await?;
            if cli_args.json {
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            } else {
                println!("{}", render_recipe(&recipe, recipe.servings));
            }
        }
        Command::Suggest { thoughts } => {
            let suggestions = actions.suggest_dishes(&thoughts).await?;
            if cli_args.json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else {
                for (rank, item) in suggestions.iter().enumerate() {
                    println!("{}. {}", rank + 1, item);
                }
                println!(
                    "\nRun `recipe-adapt create --dish \"<name>\" ...` with the dish you like."
                );
            }
        }
        Command::Pantry { ingredients } => {
            let recipes = actions.recipes_from_ingredients(&ingredients).await?;
            if cli_args.json {
                println!("{}", serde_json::to_string_pretty(&recipes)?);
            } else {
                for recipe in recipes {
                    println!("- {recipe}");
                }
            }
        }
        Command::Summarize { instructions_file } => {
            let instructions = tokio::fs::read_to_string(&instructions_file)
                .await
                .with_context(|| {
                    format!("Failed to read instructions file '{instructions_file}'")
                })?;
            println!("{}", actions.summarize_instructions(&instructions).await?);
        }
        Command::Session(args) => {
            let request = validate(&RawRecipeInput::from(args))?;
            let mut workbench = Workbench::new(orchestrator);
            println!("Crafting your recipe...");
            if let Err(e) = workbench.create(request).await {
                anyhow::bail!(e.user_message("generating the recipe"));
            }
            run_session(&mut workbench, cli_args.json).await?;
        }
    }

    Ok(())
}
