use crate::dataset::WorkItem;
use crate::metrics::{fmt_opt, fmt_variability, MetricsSummary};
use crate::scope::Scope;

/// The fixed effort-scale reference included in every prompt.
pub const STORY_POINTS_GUIDE: &str = "\
Story Points Guide (Fibonacci Scale):
- 1: Extra small – One-line change or similar work, can be done in 1 hour.
- 2: Small – Developer understands the task, requires small problem-solving.
- 3: Average – Developer knows what to do, no research required.
- 5: Large – Task is not very common, may require help or some research.
- 8: Extra Large – Time-consuming, needs research and possibly multiple developers.
- 13: Warning – Complex, many unknowns, likely won't fit in one sprint.
- 21: Hazard – Very complex, unclear how to start, many assumptions and unknowns.
(Note: 21 is the upper limit of the story point scale used in this analysis.)";

/// Narrative framing for one scope: the analyst persona paragraph and the
/// bullet instructions appended at the end of the prompt.
#[derive(Debug, Clone)]
pub struct ScopeProfile {
    pub persona: String,
    pub instructions: String,
}

/// The scope-to-prompt-text table. An explicit value passed into the prompt
/// builder, never ambient state, so individual scopes can be overridden in
/// isolation (and in tests).
#[derive(Debug, Clone)]
pub struct ScopeConfigs {
    planning: ScopeProfile,
    execution: ScopeProfile,
    sprint_review: ScopeProfile,
    delivery: ScopeProfile,
    risk: ScopeProfile,
    team: ScopeProfile,
}

impl ScopeConfigs {
    pub fn profile(&self, scope: Scope) -> &ScopeProfile {
        match scope {
            Scope::Planning => &self.planning,
            Scope::Execution => &self.execution,
            Scope::SprintReview => &self.sprint_review,
            Scope::Delivery => &self.delivery,
            Scope::Risk => &self.risk,
            Scope::Team => &self.team,
        }
    }

    pub fn set_profile(&mut self, scope: Scope, profile: ScopeProfile) {
        match scope {
            Scope::Planning => self.planning = profile,
            Scope::Execution => self.execution = profile,
            Scope::SprintReview => self.sprint_review = profile,
            Scope::Delivery => self.delivery = profile,
            Scope::Risk => self.risk = profile,
            Scope::Team => self.team = profile,
        }
    }
}

impl Default for ScopeConfigs {
    fn default() -> Self {
        let profile = |persona: &str, instructions: &str| ScopeProfile {
            persona: persona.to_string(),
            instructions: instructions.to_string(),
        };
        ScopeConfigs {
            planning: profile(
                "You are an experienced product analyst specialized in agile delivery. \
                 Your task is to analyze the initial planning of a digital project that will run using the Scrum framework. \
                 Your goal is to deliver a stakeholder-facing report evaluating the quality of the planning phase.\n\n\
                 Focus on identifying the following:\n\
                 - Unrealistic delivery deadlines.\n\
                 - Tasks with missing story point estimates.\n\
                 - Tasks with high complexity but short delivery windows.\n\
                 - Potential overcommitment in sprint scope.",
                "- Group findings into meaningful sections (e.g., Estimation Hygiene, Timeline Realism).\n\
                 - Use bullet points for insights and recommendations.\n\
                 - Keep the tone professional and oriented to business stakeholders.\n\
                 - End the report with actionable suggestions for the team to improve future planning.",
            ),
            execution: profile(
                "You are an expert product analyst advising a Product Manager who is responsible for the success of a digital project and company's financial KPIs.\n\n\
                 Your task is to evaluate the current sprint or execution period to avoid any bad outcomes. Focus on:\n\
                 - Progress made versus planned.\n\
                 - Distribution of effort among team members.\n\
                 - Alignment between estimated complexity and actual delivery time.\n\
                 - Realism of target dates based on current and historical execution performance.\n\n\
                 Also:\n\
                 - Detect any execution anomalies or outliers.\n\
                 - Identify blockers, delays, or overcommitments.\n\
                 - Evaluate individual contributor consistency and effectiveness.\n\
                 - Suggest mentoring opportunities or workload adjustments.\n\
                 - Flag emerging risks or areas needing course correction.",
                "- Structure the analysis in sections (e.g., Delivery Status, Team Consistency, Risk Signals).\n\
                 - Use bullet points for each insight.\n\
                 - Be direct but constructive — the reader is the Product Manager.\n\
                 - Conclude with recommendations and/or action items to improve delivery going forward.",
            ),
            sprint_review: profile(
                "You are a Scrum Analyst preparing a Sprint Review report. \
                 This report will be shared with both internal stakeholders (Product Manager, developers, leadership) \
                 and external stakeholders (clients, sponsors, and other partners).\n\n\
                 Please analyze the provided project data and answer the following:\n\
                 - Delivery performance: What was planned vs. what was completed?\n\
                 - Problems encountered: Were there any blockers, delays, or inconsistencies?\n\
                 - Scope changes: Did any new items get added mid-sprint?\n\
                 - Top performer: Who contributed most and how?\n\
                 - Needs attention: Any contributor needing support or reassessment?\n\
                 - Recommendations: What should be improved in the next sprint?",
                "- Compare what was planned vs. completed.\n\
                 - Highlight demo-ready items and partially completed tasks.\n\
                 - Mention any feedback received and alignment with the sprint goal.\n\
                 - Emphasize positive outcomes and team contributions.\n\
                 - Use a tone that informs both technical and non-technical audiences while being always positive.",
            ),
            delivery: profile(
                "You are a senior delivery analyst closing out a digital project. \
                 Generate a retrospective summary with highlights, bottlenecks, and improvement suggestions. \
                 Assess individual contributor performance and consistency, and suggest improvements or mentoring.",
                "- Generate an executive summary.\n\
                 - Highlight strengths, bottlenecks, and performance patterns.\n\
                 - Suggest areas for improvement in future deliveries.",
            ),
            risk: profile(
                "You are a delivery risk analyst reviewing a digital project in flight. \
                 Your task is to surface schedule, scoping, and staffing risks from the execution data: \
                 items that took far longer than their estimate suggests, contributors with erratic delivery \
                 times, unestimated work entering the board, and concentration of effort on few people.",
                "- Rank the identified risks by likely impact on delivery.\n\
                 - Tie each risk to the specific metric that signals it.\n\
                 - Use bullet points and keep each risk to two or three sentences.\n\
                 - Close with mitigations the team can apply within one sprint.",
            ),
            team: profile(
                "You are an engineering manager's advisor reviewing team dynamics on a digital project. \
                 Your task is to read the per-contributor data for workload balance, delivery consistency, \
                 and standout performances, without assigning blame for variance that the data cannot explain.",
                "- Describe the workload distribution and whether it looks sustainable.\n\
                 - Call out consistent performers and contributors who may need support.\n\
                 - Frame observations as coaching opportunities, not criticism.\n\
                 - Suggest one or two concrete follow-ups for the next one-on-ones.",
            ),
        }
    }
}

/// Assemble the final prompt: metrics block, scope persona, project-data
/// prose, the (sprint-scoped) work-item listing, the effort-scale guide,
/// and the scope's instruction bullets — in that order.
pub fn build_prompt(
    configs: &ScopeConfigs,
    scope: Scope,
    sprint_label: Option<&str>,
    metrics_block: &str,
    summary: &MetricsSummary,
    items: &[WorkItem],
) -> String {
    let profile = configs.profile(scope);

    let mut persona = profile.persona.clone();
    if scope == Scope::SprintReview {
        if let Some(label) = sprint_label.map(str::trim).filter(|l| !l.is_empty()) {
            persona.push_str(&format!(
                "\nThis is Sprint {label}. Focus your analysis specifically on tasks completed during this sprint."
            ));
        }
    }

    let mut sections = vec![
        format!("## {metrics_block}"),
        persona,
        "Also, take into account the Story Points scale used to estimate task effort.".to_string(),
        project_data_prose(summary),
    ];

    if scope == Scope::SprintReview {
        if let Some(label) = sprint_label.map(str::trim).filter(|l| !l.is_empty()) {
            sections.push(sprint_item_listing(label, items));
        }
    }

    sections.push(STORY_POINTS_GUIDE.to_string());
    sections.push(format!("Instructions:\n{}", profile.instructions));

    sections.join("\n\n")
}

/// The numeric summary restated as prose bullets for the model.
fn project_data_prose(summary: &MetricsSummary) -> String {
    let exec = &summary.execution_time;
    let mut lines = vec![
        "Project Data:".to_string(),
        format!("- Total items: {}", summary.total_items),
        format!("- Total Story Points: {}", summary.total_story_points),
        format!("- Total Closed Items: {}", summary.closed_items),
        format!(
            "- Average Story Points per item: {}",
            fmt_opt(summary.mean_story_points)
        ),
        format!(
            "- Average execution time per item: {} days",
            fmt_opt(exec.mean_days)
        ),
        format!(
            "- Maximum execution time for a single item: {} days",
            fmt_opt(exec.max_days)
        ),
        format!(
            "- Minimum execution time for a single item: {} days",
            fmt_opt(exec.min_days)
        ),
        format!(
            "- Standard deviation of execution time: {} days",
            fmt_opt(exec.std_days)
        ),
        format!(
            "- Tasks without Story Point estimate: {}",
            summary.missing_estimate_count
        ),
        format!(
            "- Contributor with highest time variability: {}",
            fmt_variability(summary.top_variability.as_ref())
        ),
        "- Top contributors:".to_string(),
    ];
    for contributor in &summary.top_contributors {
        lines.push(format!(
            "  - {}: {} items, {} points, avg. {} days",
            contributor.assignee,
            contributor.items,
            contributor.total_story_points,
            fmt_opt(contributor.mean_execution_days)
        ));
    }
    lines.join("\n")
}

fn sprint_item_listing(label: &str, items: &[WorkItem]) -> String {
    let mut lines = vec![format!("Work items in Sprint {label}:")];
    for item in items {
        lines.push(format!(
            "  - {} (ID: {})",
            item.title,
            item.id.as_deref().unwrap_or("?")
        ));
    }
    lines.join("\n")
}

/// Some providers return a delimited reasoning segment before the answer.
/// Split it out so the caller can show the answer and the reasoning
/// separately. Text without both markers is returned whole.
pub fn split_reasoning(text: &str) -> (String, Option<String>) {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let (Some(start), Some(end)) = (text.find(OPEN), text.find(CLOSE)) else {
        return (text.trim().to_string(), None);
    };
    if end < start {
        return (text.trim().to_string(), None);
    }

    let reasoning = text[start + OPEN.len()..end].trim().to_string();
    let answer = format!("{}{}", &text[..start], &text[end + CLOSE.len()..])
        .trim()
        .to_string();
    let reasoning = (!reasoning.is_empty()).then_some(reasoning);
    (answer, reasoning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{render_metrics_block, summarize};

    fn sample_items() -> Vec<WorkItem> {
        use crate::dataset::parse_timestamp;
        vec![
            WorkItem {
                id: Some("101".to_string()),
                title: "Login page".to_string(),
                assignee: Some("Alice".to_string()),
                story_points: Some(3.0),
                activated: parse_timestamp("2025-03-01"),
                closed: parse_timestamp("2025-03-04"),
                iteration: Some("Project\\Sprint 3".to_string()),
            },
            WorkItem {
                id: None,
                title: "Search API".to_string(),
                assignee: Some("Bob".to_string()),
                story_points: Some(5.0),
                activated: parse_timestamp("2025-03-02"),
                closed: parse_timestamp("2025-03-08"),
                iteration: Some("Project\\Sprint 3".to_string()),
            },
        ]
    }

    #[test]
    fn test_build_prompt_section_order() {
        let configs = ScopeConfigs::default();
        let items = sample_items();
        let summary = summarize(2, &items);
        let block = render_metrics_block(&summary, Scope::Execution, None);
        let prompt = build_prompt(&configs, Scope::Execution, None, &block, &summary, &items);

        let metrics_at = prompt.find("Key Metrics:").unwrap();
        let persona_at = prompt.find("expert product analyst").unwrap();
        let data_at = prompt.find("Project Data:").unwrap();
        let guide_at = prompt.find("Story Points Guide").unwrap();
        let instructions_at = prompt.find("Instructions:").unwrap();
        assert!(metrics_at < persona_at);
        assert!(persona_at < data_at);
        assert!(data_at < guide_at);
        assert!(guide_at < instructions_at);

        assert!(prompt.contains("- Total Story Points: 8"));
        assert!(prompt.contains("- Alice: 1 items, 3 points, avg. 3 days"));
        // Item listing is sprint-review only.
        assert!(!prompt.contains("Work items in Sprint"));
    }

    #[test]
    fn test_build_prompt_sprint_review_extras() {
        let configs = ScopeConfigs::default();
        let items = sample_items();
        let summary = summarize(2, &items);
        let block = render_metrics_block(&summary, Scope::SprintReview, Some("Sprint 3"));
        let prompt = build_prompt(
            &configs,
            Scope::SprintReview,
            Some("Sprint 3"),
            &block,
            &summary,
            &items,
        );

        assert!(prompt.contains("This is Sprint Sprint 3."));
        assert!(prompt.contains("Work items in Sprint Sprint 3:"));
        assert!(prompt.contains("  - Login page (ID: 101)"));
        assert!(prompt.contains("  - Search API (ID: ?)"));
    }

    #[test]
    fn test_profile_override() {
        let mut configs = ScopeConfigs::default();
        configs.set_profile(
            Scope::Delivery,
            ScopeProfile {
                persona: "Custom persona.".to_string(),
                instructions: "- Custom instruction.".to_string(),
            },
        );
        let items = sample_items();
        let summary = summarize(2, &items);
        let prompt = build_prompt(&configs, Scope::Delivery, None, "Key Metrics:", &summary, &items);
        assert!(prompt.contains("Custom persona."));
        assert!(prompt.contains("- Custom instruction."));
        // Other scopes untouched
        assert!(configs.profile(Scope::Planning).persona.contains("planning"));
    }

    #[test]
    fn test_split_reasoning_present() {
        let (answer, reasoning) =
            split_reasoning("<think>weighing the data</think>\nFinal report here.");
        assert_eq!(answer, "Final report here.");
        assert_eq!(reasoning.as_deref(), Some("weighing the data"));
    }

    #[test]
    fn test_split_reasoning_absent() {
        let (answer, reasoning) = split_reasoning("  Just a report.  ");
        assert_eq!(answer, "Just a report.");
        assert!(reasoning.is_none());
    }

    #[test]
    fn test_split_reasoning_malformed_markers() {
        let (answer, reasoning) = split_reasoning("</think>backwards<think>");
        assert_eq!(answer, "</think>backwards<think>");
        assert!(reasoning.is_none());

        let (answer, reasoning) = split_reasoning("<think>never closed");
        assert_eq!(answer, "<think>never closed");
        assert!(reasoning.is_none());
    }

    #[test]
    fn test_split_reasoning_empty_segment() {
        let (answer, reasoning) = split_reasoning("<think>  </think>Answer.");
        assert_eq!(answer, "Answer.");
        assert!(reasoning.is_none());
    }
}
