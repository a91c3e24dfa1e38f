pub mod actions;
pub mod api_connection;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod providers;
pub mod recipe;
pub mod regeneration;
pub mod serving_scaler;
pub mod suggestion_broker;
pub mod validator;
pub mod workbench;
