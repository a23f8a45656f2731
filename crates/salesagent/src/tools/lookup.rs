use serde_json::json;

use super::{strip_code_fences, SalesTools};
use crate::errors::{AgentError, AgentResult};
use crate::prompt_template::load_prompt;

/// Name of the ephemeral table the data file is loaded into
pub const SALES_TABLE_NAME: &str = "sales";

impl SalesTools {
    /// Answer `prompt` with a SQL query over the sales data, rendered as text.
    ///
    /// Failures are returned as text so the model can see and react to them.
    pub async fn lookup_sales_data(&self, prompt: &str) -> String {
        match self.query_sales_data(prompt).await {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(error = %e, "sales data lookup failed");
                format!("Error accessing data: {}", e)
            }
        }
    }

    async fn query_sales_data(&self, prompt: &str) -> AgentResult<String> {
        let table = self.backend.load(&self.data_path, SALES_TABLE_NAME)?;
        let columns = table.columns().to_vec();
        let table_name = table.table_name().to_string();

        let sql = self
            .generate_sql_query(prompt, &columns, &table_name)
            .await
            .map_err(|e| AgentError::DataAccess(format!("SQL generation failed: {}", e)))?;
        tracing::debug!(%sql, "running generated query");

        let result = table.query(&sql)?;
        Ok(result.to_string())
    }

    /// Ask the model for a single SQL statement, with any code fences removed
    pub async fn generate_sql_query(
        &self,
        prompt: &str,
        columns: &[String],
        table_name: &str,
    ) -> AgentResult<String> {
        let formatted_prompt = load_prompt(
            &self.templates.sql_generation,
            &json!({
                "prompt": prompt,
                "columns": columns,
                "table_name": table_name,
            }),
        )?;

        let response = self.provider.generate(&formatted_prompt).await?;
        let sql = strip_code_fences(&response);
        if sql.is_empty() {
            return Err(AgentError::DataAccess(
                "the model returned an empty query".to_string(),
            ));
        }
        Ok(sql)
    }
}
