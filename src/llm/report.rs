use serde::Serialize;

use crate::chart::ChartSpec;
use crate::error::{Error, Result};
use crate::metrics::MetricsSummary;
use crate::prompt::split_reasoning;

/// The model's free-text report, with any delimited reasoning segment
/// already split out for separate display.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeReport {
    pub answer: String,
    pub reasoning: Option<String>,
}

/// Run the assembled prompt through the agent. The call blocks the analysis
/// until the provider responds or errors; failures surface as `Error::Llm`
/// for the caller to report.
pub async fn generate_report(
    agent: &mixtape_core::Agent,
    prompt: &str,
) -> Result<NarrativeReport> {
    let response = agent
        .run(prompt)
        .await
        .map_err(|e| Error::Llm(e.to_string()))?;
    let (answer, reasoning) = split_reasoning(response.text().trim());
    Ok(NarrativeReport { answer, reasoning })
}

/// Ask the model which chart best illustrates the summary. The model only
/// ever returns a declarative spec; rendering happens host-side.
pub async fn suggest_chart(
    agent: &mixtape_core::Agent,
    summary: &MetricsSummary,
) -> Result<ChartSpec> {
    let metrics_json = serde_json::to_string_pretty(summary).unwrap_or_default();

    let prompt = format!(
        r#"Given these project delivery metrics, choose the single most useful chart.

Metrics:
{metrics_json}

Respond with ONLY a JSON object (no markdown, no code fences):
{{
  "kind": "bar" or "line",
  "group_by": "assignee" or "iteration",
  "aggregate": "count", "sum_points", or "mean_execution_time",
  "title": "Short chart title"
}}"#
    );

    let response = agent
        .run(&prompt)
        .await
        .map_err(|e| Error::Llm(e.to_string()))?;
    ChartSpec::parse(response.text().trim())
}
