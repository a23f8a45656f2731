use serde::Serialize;
use tera::{Context, Tera};

use crate::errors::AgentResult;

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> AgentResult<String> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// The prompt templates used by the router and the tool handlers.
///
/// Defaults are compiled in from `src/prompts`; any of them can be replaced before the
/// router is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplates {
    /// Instruction added to transcripts that have no system message
    pub system: String,
    /// Context: `prompt`, `columns`, `table_name`
    pub sql_generation: String,
    /// Context: `data`, `prompt`
    pub data_analysis: String,
    /// Context: `data`, `visualization_goal`
    pub chart_configuration: String,
    /// Context: `config`
    pub create_chart: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            system: include_str!("prompts/system.md").to_string(),
            sql_generation: include_str!("prompts/sql_generation.md").to_string(),
            data_analysis: include_str!("prompts/data_analysis.md").to_string(),
            chart_configuration: include_str!("prompts/chart_configuration.md").to_string(),
            create_chart: include_str!("prompts/create_chart.md").to_string(),
        }
    }
}
