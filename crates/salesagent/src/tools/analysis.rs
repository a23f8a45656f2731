use serde_json::json;

use super::SalesTools;
use crate::errors::AgentResult;
use crate::prompt_template::load_prompt;

pub const NO_ANALYSIS: &str = "No analysis could be generated";

impl SalesTools {
    pub async fn analyze_sales_data(&self, prompt: &str, data: &str) -> AgentResult<String> {
        let formatted_prompt = load_prompt(
            &self.templates.data_analysis,
            &json!({"data": data, "prompt": prompt}),
        )?;

        let analysis = self.provider.generate(&formatted_prompt).await?;
        if analysis.trim().is_empty() {
            Ok(NO_ANALYSIS.to_string())
        } else {
            Ok(analysis)
        }
    }
}
