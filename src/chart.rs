//! Declarative charting: the model returns a chart *specification*, never
//! code, and the host renders it with a fixed routine against the in-memory
//! items. Nothing the model sends is ever executed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::WorkItem;
use crate::error::{Error, Result};
use crate::metrics::execution_time;
use crate::text_util::strip_code_fences;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    Assignee,
    Iteration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Count,
    SumPoints,
    MeanExecutionTime,
}

/// A complete chart request: what to group by, how to aggregate, how to
/// draw it. This is the entire vocabulary the model has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub group_by: GroupField,
    pub aggregate: Aggregate,
    #[serde(default)]
    pub title: Option<String>,
}

impl ChartSpec {
    /// Parse a spec from model output. Code fences are tolerated; anything
    /// that is not the documented JSON shape is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let json = strip_code_fences(text);
        serde_json::from_str(json)
            .map_err(|e| Error::Llm(format!("invalid chart spec: {e}\nResponse: {text}")))
    }
}

/// Aggregate the items per the spec and draw a fixed-width text chart.
/// Groups appear in first-occurrence order; groups with no defined value
/// (mean execution time without samples) are marked N/A.
pub fn render_chart(spec: &ChartSpec, items: &[WorkItem]) -> String {
    let mut groups: IndexMap<String, Vec<&WorkItem>> = IndexMap::new();
    for item in items {
        let key = match spec.group_by {
            GroupField::Assignee => item
                .assignee
                .clone()
                .unwrap_or_else(|| "(unassigned)".to_string()),
            GroupField::Iteration => item
                .iteration
                .clone()
                .unwrap_or_else(|| "(no iteration)".to_string()),
        };
        groups.entry(key).or_default().push(item);
    }

    let rows: Vec<(String, Option<f64>)> = groups
        .iter()
        .map(|(label, members)| (label.clone(), aggregate_value(spec.aggregate, members)))
        .collect();

    let title = spec.title.clone().unwrap_or_else(|| default_title(spec));
    let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    let max_value = rows
        .iter()
        .filter_map(|(_, v)| *v)
        .fold(0.0_f64, f64::max);

    let mut lines = vec![title, String::new()];
    for (label, value) in &rows {
        let line = match value {
            Some(v) => {
                let filled = if max_value > 0.0 {
                    ((v / max_value) * BAR_WIDTH as f64).round() as usize
                } else {
                    0
                };
                match spec.kind {
                    ChartKind::Bar => format!(
                        "{label:<label_width$} | {:<BAR_WIDTH$} {v:.1}",
                        "#".repeat(filled)
                    ),
                    ChartKind::Line => {
                        // Dot plot: one marker at the scaled position.
                        let pos = filled.min(BAR_WIDTH.saturating_sub(1));
                        let mut track = vec![b'.'; BAR_WIDTH];
                        track[pos] = b'*';
                        format!(
                            "{label:<label_width$} | {} {v:.1}",
                            String::from_utf8(track).expect("ascii track")
                        )
                    }
                }
            }
            None => format!("{label:<label_width$} | N/A"),
        };
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

fn aggregate_value(aggregate: Aggregate, members: &[&WorkItem]) -> Option<f64> {
    match aggregate {
        Aggregate::Count => Some(members.len() as f64),
        Aggregate::SumPoints => Some(members.iter().filter_map(|i| i.story_points).sum()),
        Aggregate::MeanExecutionTime => {
            let days: Vec<i64> = members.iter().copied().filter_map(execution_time).collect();
            if days.is_empty() {
                None
            } else {
                Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
            }
        }
    }
}

fn default_title(spec: &ChartSpec) -> String {
    let what = match spec.aggregate {
        Aggregate::Count => "Item count",
        Aggregate::SumPoints => "Total story points",
        Aggregate::MeanExecutionTime => "Mean execution time (days)",
    };
    let by = match spec.group_by {
        GroupField::Assignee => "assignee",
        GroupField::Iteration => "iteration",
    };
    format!("{what} by {by}")
}
