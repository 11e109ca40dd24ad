pub mod chart;
pub mod dataset;
pub mod error;
pub mod llm;
pub mod metrics;
pub mod prompt;
pub mod scope;
pub mod text_util;

pub use chart::{render_chart, ChartSpec};
pub use dataset::{Dataset, WorkItem};
pub use error::{Error, Result};
pub use llm::report::NarrativeReport;
pub use llm::LlmSettings;
pub use metrics::{
    execution_time, filter_for_scope, render_metrics_block, summarize, MetricsSummary,
};
pub use prompt::{build_prompt, split_reasoning, ScopeConfigs, ScopeProfile};
pub use scope::Scope;

use serde::Serialize;

/// One full analysis: the statistics block plus the model's narrative.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub summary: MetricsSummary,
    pub metrics_block: String,
    pub narrative: NarrativeReport,
}

/// Main entry point: holds the scope configuration and LLM settings, and
/// orchestrates dataset → metrics → prompt → narrative. Each call operates
/// on the dataset it is given; nothing is cached or mutated between runs.
pub struct RetroScope {
    scopes: ScopeConfigs,
    llm: LlmSettings,
}

impl RetroScope {
    pub fn new(llm: LlmSettings) -> Self {
        Self {
            scopes: ScopeConfigs::default(),
            llm,
        }
    }

    /// Replace the built-in scope-to-prompt table.
    pub fn with_scope_configs(mut self, scopes: ScopeConfigs) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn scope_configs(&self) -> &ScopeConfigs {
        &self.scopes
    }

    /// Filter, aggregate, and render the metrics block — no LLM involved.
    pub fn metrics(
        &self,
        dataset: &Dataset,
        scope: Scope,
        sprint_label: Option<&str>,
    ) -> Result<(MetricsSummary, String)> {
        let (_, summary, block) = self.prepare(dataset, scope, sprint_label)?;
        Ok((summary, block))
    }

    /// The full pipeline: metrics, prompt assembly, one LLM call.
    pub async fn analyze(
        &self,
        dataset: &Dataset,
        scope: Scope,
        sprint_label: Option<&str>,
    ) -> Result<Analysis> {
        let (items, summary, block) = self.prepare(dataset, scope, sprint_label)?;
        let prompt = build_prompt(&self.scopes, scope, sprint_label, &block, &summary, &items);
        log::debug!("prompt: {} chars", prompt.len());

        let agent = llm::build_agent(&self.llm).await?;
        let narrative = llm::report::generate_report(&agent, &prompt).await?;

        Ok(Analysis {
            summary,
            metrics_block: block,
            narrative,
        })
    }

    /// Ask the model for a chart spec over the filtered items and render it
    /// host-side.
    pub async fn chart(
        &self,
        dataset: &Dataset,
        scope: Scope,
        sprint_label: Option<&str>,
    ) -> Result<String> {
        let (items, summary, _) = self.prepare(dataset, scope, sprint_label)?;
        let agent = llm::build_agent(&self.llm).await?;
        let spec = llm::report::suggest_chart(&agent, &summary).await?;
        log::info!("model selected chart: {spec:?}");
        Ok(render_chart(&spec, &items))
    }

    fn prepare(
        &self,
        dataset: &Dataset,
        scope: Scope,
        sprint_label: Option<&str>,
    ) -> Result<(Vec<WorkItem>, MetricsSummary, String)> {
        let items = filter_for_scope(dataset, scope, sprint_label)?;
        let summary = summarize(dataset.raw_count, &items);
        let block = render_metrics_block(&summary, scope, sprint_label);
        Ok((items, summary, block))
    }
}
