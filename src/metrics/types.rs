use serde::Serialize;

/// Distribution of execution time (days between activation and closure)
/// across the filtered items. Every field is `None` when no item has both
/// timestamps — absence is never reported as zero, because zero is a valid
/// value for both the statistics and the variance.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExecutionTimeStats {
    pub mean_days: Option<f64>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
    /// Sample standard deviation; requires at least two samples.
    pub std_days: Option<f64>,
}

/// The assignee whose execution times vary the most, with that sample
/// standard deviation. Only assignees with two or more timed items qualify.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariabilityLeader {
    pub assignee: String,
    pub std_days: f64,
}

/// One entry in the top-contributor ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopContributor {
    pub assignee: String,
    pub items: usize,
    pub total_story_points: f64,
    /// Mean execution time over this assignee's timed items, 1 decimal place.
    pub mean_execution_days: Option<f64>,
}

/// The full statistics block for one analysis run. Immutable once computed;
/// recomputed from scratch on every scope or sprint change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    /// Row count of the upload before any scope filtering.
    pub raw_items: usize,
    /// Item count after scope filtering.
    pub total_items: usize,
    /// Sum of present story-point values (missing counts as 0 here).
    pub total_story_points: f64,
    /// Items with a closure timestamp.
    pub closed_items: usize,
    /// Mean over present story-point values only; `None` when every item
    /// is missing an estimate.
    pub mean_story_points: Option<f64>,
    pub execution_time: ExecutionTimeStats,
    pub missing_estimate_count: usize,
    pub top_variability: Option<VariabilityLeader>,
    /// At most three assignees, descending by total story points, ties in
    /// first-occurrence order.
    pub top_contributors: Vec<TopContributor>,
}
