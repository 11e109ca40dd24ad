pub mod types;

pub use types::*;

use indexmap::IndexMap;

use crate::dataset::{Dataset, WorkItem};
use crate::error::{Error, Result};
use crate::scope::Scope;

/// Apply the scope's input filter to the dataset.
///
/// - `planning` keeps items with an activation timestamp (the planning
///   report cares about everything that entered the board, closed or not).
/// - `sprint_review` requires a sprint label and keeps items whose iteration
///   path contains it, case-insensitively. Labels are hierarchical
///   (`Project\Sprint 3`), so containment is the match rule, not equality.
///   A dataset without an iteration column passes through unfiltered.
/// - Every other scope keeps items with both timestamps, so execution time
///   is defined for each surviving item.
///
/// An empty post-filter set is an error; callers must not report all-zero
/// statistics as if they were real.
pub fn filter_for_scope(
    dataset: &Dataset,
    scope: Scope,
    sprint_label: Option<&str>,
) -> Result<Vec<WorkItem>> {
    let filtered: Vec<WorkItem> = match scope {
        Scope::Planning => dataset
            .items
            .iter()
            .filter(|item| item.activated.is_some())
            .cloned()
            .collect(),
        Scope::SprintReview => {
            let label = sprint_label
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .ok_or(Error::MissingSprintLabel)?;
            if !dataset.has_iteration_column {
                log::warn!("no iteration column in dataset; sprint filter not applied");
                dataset.items.clone()
            } else {
                let needle = label.to_lowercase();
                dataset
                    .items
                    .iter()
                    .filter(|item| {
                        item.iteration
                            .as_deref()
                            .is_some_and(|path| path.to_lowercase().contains(&needle))
                    })
                    .cloned()
                    .collect()
            }
        }
        Scope::Execution | Scope::Delivery | Scope::Risk | Scope::Team => dataset
            .items
            .iter()
            .filter(|item| item.activated.is_some() && item.closed.is_some())
            .cloned()
            .collect(),
    };

    if filtered.is_empty() {
        return Err(Error::EmptyResult {
            scope: scope.to_string(),
        });
    }
    Ok(filtered)
}

/// Whole days elapsed between activation and closure, floored. Undefined
/// when either timestamp is missing; an undefined execution time never
/// enters any aggregate.
pub fn execution_time(item: &WorkItem) -> Option<i64> {
    match (item.activated, item.closed) {
        (Some(activated), Some(closed)) => {
            Some((closed - activated).num_seconds().div_euclid(86_400))
        }
        _ => None,
    }
}

/// Compute the full statistics block over an already-filtered item set.
///
/// Pure and deterministic: per-assignee grouping preserves first-occurrence
/// order so ranking tie-breaks are stable across runs.
pub fn summarize(raw_items: usize, items: &[WorkItem]) -> MetricsSummary {
    let points: Vec<f64> = items.iter().filter_map(|i| i.story_points).collect();
    let exec_days: Vec<i64> = items.iter().filter_map(execution_time).collect();

    let total_story_points = points.iter().sum::<f64>();
    let mean_story_points = if points.is_empty() {
        None
    } else {
        Some(round_to(total_story_points / points.len() as f64, 2))
    };

    let execution_time_stats = ExecutionTimeStats {
        mean_days: mean(&exec_days).map(|m| round_to(m, 2)),
        min_days: exec_days.iter().min().copied(),
        max_days: exec_days.iter().max().copied(),
        std_days: sample_std(&exec_days).map(|s| round_to(s, 2)),
    };

    // Per-assignee accumulation, first-occurrence order. Unassigned items
    // count toward the totals above but belong to no contributor.
    let mut by_assignee: IndexMap<&str, AssigneeAccum> = IndexMap::new();
    for item in items {
        let Some(assignee) = item.assignee.as_deref() else {
            continue;
        };
        let accum = by_assignee.entry(assignee).or_default();
        accum.items += 1;
        accum.points += item.story_points.unwrap_or(0.0);
        if let Some(days) = execution_time(item) {
            accum.exec_days.push(days);
        }
    }

    let mut top_variability: Option<(&str, f64)> = None;
    for (assignee, accum) in &by_assignee {
        if let Some(std) = sample_std(&accum.exec_days) {
            // Strict greater-than keeps the earliest assignee on ties.
            if top_variability.is_none_or(|(_, best)| std > best) {
                top_variability = Some((assignee, std));
            }
        }
    }

    let mut ranked: Vec<(&str, &AssigneeAccum)> = by_assignee.iter().map(|(k, v)| (*k, v)).collect();
    // Stable sort: equal totals keep first-occurrence order.
    ranked.sort_by(|a, b| {
        b.1.points
            .partial_cmp(&a.1.points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let top_contributors = ranked
        .into_iter()
        .take(3)
        .map(|(assignee, accum)| TopContributor {
            assignee: assignee.to_string(),
            items: accum.items,
            total_story_points: accum.points,
            mean_execution_days: mean(&accum.exec_days).map(|m| round_to(m, 1)),
        })
        .collect();

    MetricsSummary {
        raw_items,
        total_items: items.len(),
        total_story_points,
        closed_items: items.iter().filter(|i| i.closed.is_some()).count(),
        mean_story_points,
        execution_time: execution_time_stats,
        missing_estimate_count: items.iter().filter(|i| i.story_points.is_none()).count(),
        top_variability: top_variability.map(|(assignee, std)| VariabilityLeader {
            assignee: assignee.to_string(),
            std_days: round_to(std, 2),
        }),
        top_contributors,
    }
}

/// Render the fixed-order metrics block handed verbatim into the prompt.
/// Field order and labels are the contract here; downstream templates and
/// tests depend on them.
pub fn render_metrics_block(
    summary: &MetricsSummary,
    scope: Scope,
    sprint_label: Option<&str>,
) -> String {
    let mut lines = vec!["Key Metrics:".to_string()];

    if scope == Scope::SprintReview {
        if let Some(label) = sprint_label.map(str::trim).filter(|l| !l.is_empty()) {
            lines.push(format!("- Sprint: {label}"));
        }
    }

    let exec = &summary.execution_time;
    lines.push(format!("- Total items (raw): {}", summary.raw_items));
    lines.push(format!(
        "- Items considered after filtering: {}",
        summary.total_items
    ));
    lines.push(format!("- Items closed: {}", summary.closed_items));
    lines.push(format!(
        "- Tasks without Story Point estimate: {}",
        summary.missing_estimate_count
    ));
    lines.push(format!(
        "- Average execution time: {} days",
        fmt_opt(exec.mean_days)
    ));
    lines.push(format!(
        "- Max execution time: {} days",
        fmt_opt(exec.max_days)
    ));
    lines.push(format!(
        "- Min execution time: {} days",
        fmt_opt(exec.min_days)
    ));
    lines.push(format!("- Std deviation: {} days", fmt_opt(exec.std_days)));
    lines.push(format!(
        "- Contributor with highest variability: {}",
        fmt_variability(summary.top_variability.as_ref())
    ));

    lines.join("\n")
}

#[derive(Default)]
struct AssigneeAccum {
    items: usize,
    points: f64,
    exec_days: Vec<i64>,
}

fn mean(xs: &[i64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<i64>() as f64 / xs.len() as f64)
}

/// Sample standard deviation (ddof = 1). Undefined below two samples.
fn sample_std(xs: &[i64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 {
        return None;
    }
    let m = xs.iter().sum::<i64>() as f64 / n as f64;
    let var = xs
        .iter()
        .map(|&x| {
            let d = x as f64 - m;
            d * d
        })
        .sum::<f64>()
        / (n - 1) as f64;
    Some(var.sqrt())
}

/// Round half away from zero at the given number of decimal places.
/// Applied uniformly so repeated runs produce identical summaries.
fn round_to(v: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (v * factor).round() / factor
}

/// Render an optional statistic, with "N/A" marking absence. `f64` display
/// uses the shortest round-trip form, so 3.0 renders as "3" and 2.16 as
/// "2.16".
pub fn fmt_opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// "Name (std days)" line content, or the N/A sentinel with 0.
pub fn fmt_variability(leader: Option<&VariabilityLeader>) -> String {
    match leader {
        Some(leader) => format!("{} ({} days)", leader.assignee, leader.std_days),
        None => "N/A (0 days)".to_string(),
    }
}
