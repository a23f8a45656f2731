use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{strip_code_fences, SalesTools};
use crate::errors::{AgentError, AgentResult};
use crate::prompt_template::load_prompt;

/// How a chart should be drawn, produced by the first visualization stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub chart_type: String,
    pub x_axis: String,
    pub y_axis: String,
    pub title: String,
    #[serde(default)]
    pub data: String,
}

impl ChartConfig {
    /// Used whenever the model's configuration cannot be parsed
    pub fn fallback(visualization_goal: &str, data: &str) -> Self {
        Self {
            chart_type: "line".to_string(),
            x_axis: "date".to_string(),
            y_axis: "value".to_string(),
            title: visualization_goal.to_string(),
            data: data.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartSpec {
    chart_type: String,
    x_axis: String,
    y_axis: String,
    title: String,
}

fn parse_chart_spec(reply: &str) -> Option<ChartSpec> {
    let text = strip_code_fences(reply);
    // tolerate prose around the object
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

impl SalesTools {
    pub async fn generate_visualization(
        &self,
        data: &str,
        visualization_goal: &str,
    ) -> AgentResult<String> {
        let config = self.extract_chart_config(data, visualization_goal).await?;
        self.create_chart(&config).await
    }

    /// Ask the model for a chart configuration, falling back to a line chart of the goal
    pub async fn extract_chart_config(
        &self,
        data: &str,
        visualization_goal: &str,
    ) -> AgentResult<ChartConfig> {
        let formatted_prompt = load_prompt(
            &self.templates.chart_configuration,
            &json!({"data": data, "visualization_goal": visualization_goal}),
        )?;

        let reply = self.provider.generate(&formatted_prompt).await?;
        match parse_chart_spec(&reply) {
            Some(spec) => Ok(ChartConfig {
                chart_type: spec.chart_type,
                x_axis: spec.x_axis,
                y_axis: spec.y_axis,
                title: spec.title,
                data: data.to_string(),
            }),
            None => {
                tracing::warn!("chart configuration could not be parsed, using default");
                Ok(ChartConfig::fallback(visualization_goal, data))
            }
        }
    }

    /// Ask the model for code that draws `config`
    pub async fn create_chart(&self, config: &ChartConfig) -> AgentResult<String> {
        let config_json = serde_json::to_string(config)
            .map_err(|e| AgentError::Template(e.to_string()))?;
        let formatted_prompt =
            load_prompt(&self.templates.create_chart, &json!({"config": config_json}))?;

        let code = self.provider.generate(&formatted_prompt).await?;
        Ok(strip_code_fences(&code))
    }
}
