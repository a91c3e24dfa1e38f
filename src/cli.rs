use clap::{Args, Parser, Subcommand};

use crate::validator::RawRecipeInput;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Model to request from OpenRouter
    #[arg(long, global = true, env = "RECIPE_ADAPT_MODEL")]
    pub model: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn,recipe_adapt=info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a recipe for a dish
    Create(RecipeArgs),
    /// Suggest dishes for a mood or craving
    Suggest {
        /// What you're feeling or craving
        thoughts: String,
    },
    /// Recipe ideas from the ingredients you have
    Pantry {
        /// Comma-separated ingredient list
        ingredients: String,
    },
    /// Summarize recipe instructions read from a file
    Summarize {
        #[arg(short, long)]
        instructions_file: String,
    },
    /// Generate a recipe, then edit it interactively
    Session(RecipeArgs),
}

/// Raw form fields; validation happens in the library.
#[derive(Args, Debug, Clone, Default)]
pub struct RecipeArgs {
    #[arg(short, long)]
    pub dish: Option<String>,
    #[arg(short, long)]
    pub servings: Option<String>,
    /// State and country, e.g. "California, USA"
    #[arg(short, long)]
    pub location: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
    /// Vegetarian or Non-Vegetarian
    #[arg(long)]
    pub diet: Option<String>,
}

impl From<RecipeArgs> for RawRecipeInput {
    fn from(args: RecipeArgs) -> Self {
        Self {
            dish_name: args.dish,
            servings: args.servings,
            location: args.location,
            language: args.language,
            diet: args.diet,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_arguments_map_to_raw_input() {
        let cli = Cli::try_parse_from([
            "recipe-adapt", "create", "--dish", "Pizza", "--servings", "4",
            "--location", "California, USA", "--language", "English", "--diet", "Vegetarian",
        ])
        .unwrap();
        let Command::Create(args) = cli.command else {
            panic!("expected create");
        };
        let raw = RawRecipeInput::from(args);
        assert_eq!(raw.dish_name.as_deref(), Some("Pizza"));
        assert_eq!(raw.servings.as_deref(), Some("4"));
        assert_eq!(raw.diet.as_deref(), Some("Vegetarian"));
    }

    #[test]
    fn test_missing_fields_reach_the_validator() {
        let cli =
            Cli::try_parse_from(["recipe-adapt", "--json", "session", "--dish", "Soup"]).unwrap();
        assert!(cli.json);
        let Command::Session(args) = cli.command else {
            panic!("expected session");
        };
        assert!(args.servings.is_none());
    }
}
