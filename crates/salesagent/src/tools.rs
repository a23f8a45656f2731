//! The three sales tools and the static registry that maps tool names to them.
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::data::DataBackend;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;
use crate::prompt_template::PromptTemplates;
use crate::providers::base::Provider;

mod analysis;
mod lookup;
mod visualization;

pub use analysis::NO_ANALYSIS;
pub use lookup::SALES_TABLE_NAME;
pub use visualization::ChartConfig;

lazy_static! {
    // a language tag only counts when it ends the fence line
    static ref CODE_FENCE: Regex = Regex::new(r"(?m)```(?:[A-Za-z0-9_+-]*[ \t]*$)?").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ToolKind {
    LookupSalesData,
    AnalyzeSalesData,
    GenerateVisualization,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Resolve a model-supplied tool name
    pub fn from_name(name: &str) -> AgentResult<Self> {
        ToolKind::from_str(name).map_err(|_| AgentError::UnknownTool(name.to_string()))
    }

    pub fn declaration(self) -> Tool {
        match self {
            ToolKind::LookupSalesData => Tool::new(
                self.name(),
                "Look up data from the store sales transaction dataset",
                json!({
                    "type": "object",
                    "properties": {
                        "prompt": {"type": "string", "description": "The unchanged prompt that the user provided."}
                    },
                    "required": ["prompt"]
                }),
            ),
            ToolKind::AnalyzeSalesData => Tool::new(
                self.name(),
                "Analyze sales data to extract insights",
                json!({
                    "type": "object",
                    "properties": {
                        "data": {"type": "string", "description": "The lookup_sales_data tool's output."},
                        "prompt": {"type": "string", "description": "The unchanged prompt that the user provided."}
                    },
                    "required": ["data", "prompt"]
                }),
            ),
            ToolKind::GenerateVisualization => Tool::new(
                self.name(),
                "Generate Python code to create data visualizations",
                json!({
                    "type": "object",
                    "properties": {
                        "data": {"type": "string", "description": "The lookup_sales_data tool's output."},
                        "visualization_goal": {"type": "string", "description": "The goal of the visualization."}
                    },
                    "required": ["data", "visualization_goal"]
                }),
            ),
        }
    }

    /// Declarations for every tool, in registry order
    pub fn declarations() -> Vec<Tool> {
        ToolKind::iter().map(ToolKind::declaration).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LookupArgs {
    prompt: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalyzeArgs {
    prompt: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VisualizationArgs {
    data: String,
    visualization_goal: String,
}

fn parse_arguments<T: DeserializeOwned>(kind: ToolKind, arguments: Value) -> AgentResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| AgentError::MalformedToolArguments(format!("{}: {}", kind.name(), e)))
}

/// Remove markdown code fences (with or without a language tag) and surrounding whitespace
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Handlers for the sales tools. Each handler takes its declared arguments and returns text.
pub struct SalesTools {
    provider: Arc<dyn Provider>,
    backend: Box<dyn DataBackend>,
    data_path: PathBuf,
    templates: PromptTemplates,
}

impl SalesTools {
    pub fn new(
        provider: Arc<dyn Provider>,
        backend: Box<dyn DataBackend>,
        data_path: impl Into<PathBuf>,
        templates: PromptTemplates,
    ) -> Self {
        Self {
            provider,
            backend,
            data_path: data_path.into(),
            templates,
        }
    }

    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }

    /// Decode the arguments for `kind` and run its handler
    pub async fn call(&self, kind: ToolKind, arguments: Value) -> AgentResult<String> {
        match kind {
            ToolKind::LookupSalesData => {
                let args: LookupArgs = parse_arguments(kind, arguments)?;
                Ok(self.lookup_sales_data(&args.prompt).await)
            }
            ToolKind::AnalyzeSalesData => {
                let args: AnalyzeArgs = parse_arguments(kind, arguments)?;
                self.analyze_sales_data(&args.prompt, &args.data).await
            }
            ToolKind::GenerateVisualization => {
                let args: VisualizationArgs = parse_arguments(kind, arguments)?;
                self.generate_visualization(&args.data, &args.visualization_goal)
                    .await
            }
        }
    }
}
