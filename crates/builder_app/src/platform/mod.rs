mod app;
mod config;
mod controller;
mod effects;
mod logging;
#[cfg(test)]
mod testing;
mod ui;

pub use app::{run_app, FormInput, RunOptions};
pub use config::load_config;
pub use logging::initialize as initialize_logging;
