pub mod configuration;
pub mod data;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod router;
pub mod tools;
