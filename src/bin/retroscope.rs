use clap::{Parser, Subcommand};

use retroscope::{Dataset, LlmSettings, RetroScope, Scope};

#[derive(Parser)]
#[command(name = "retroscope", about = "AI-assisted retrospective reports from work-item CSV exports")]
struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and print the metrics block for a dataset
    Metrics {
        /// Path to the work-item CSV export
        #[arg(long)]
        file: String,
        /// Analysis scope: planning, execution, sprint_review, delivery, risk, team
        #[arg(long)]
        scope: String,
        /// Sprint label (required for sprint_review)
        #[arg(long)]
        sprint: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the full analysis: metrics, prompt, LLM narrative
    Analyze {
        /// Path to the work-item CSV export
        #[arg(long)]
        file: String,
        /// Analysis scope: planning, execution, sprint_review, delivery, risk, team
        #[arg(long)]
        scope: String,
        /// Sprint label (required for sprint_review)
        #[arg(long)]
        sprint: Option<String>,
        /// LLM provider: bedrock, anthropic
        #[arg(long)]
        provider: Option<String>,
        /// LLM model name
        #[arg(long)]
        model: Option<String>,
        /// Print the model's reasoning segment when present
        #[arg(long)]
        show_reasoning: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the model for a chart over the dataset and render it
    Chart {
        /// Path to the work-item CSV export
        #[arg(long)]
        file: String,
        /// Analysis scope: planning, execution, sprint_review, delivery, risk, team
        #[arg(long)]
        scope: String,
        /// Sprint label (required for sprint_review)
        #[arg(long)]
        sprint: Option<String>,
        /// LLM provider: bedrock, anthropic
        #[arg(long)]
        provider: Option<String>,
        /// LLM model name
        #[arg(long)]
        model: Option<String>,
    },
    /// List the sprint labels present in a dataset
    Sprints {
        /// Path to the work-item CSV export
        #[arg(long)]
        file: String,
    },
    /// List the recognized analysis scopes
    Scopes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Metrics {
            file,
            scope,
            sprint,
            json,
        } => {
            let scope = Scope::parse(&scope)?;
            let dataset = Dataset::from_path(&file)?;
            let rs = RetroScope::new(LlmSettings::default());
            let (summary, block) = rs.metrics(&dataset, scope, sprint.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{block}");
            }
        }
        Commands::Analyze {
            file,
            scope,
            sprint,
            provider,
            model,
            show_reasoning,
            json,
        } => {
            let scope = Scope::parse(&scope)?;
            let dataset = Dataset::from_path(&file)?;
            let settings = LlmSettings::resolve(provider.as_deref(), model.as_deref());
            let rs = RetroScope::new(settings);

            let analysis = match rs.analyze(&dataset, scope, sprint.as_deref()).await {
                Ok(analysis) => analysis,
                Err(e @ retroscope::Error::Llm(_)) => {
                    // The metrics were fine; only the narrative call failed.
                    eprintln!("Model consultation error: {e}");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("{} — {}", scope.title(), file);
                println!();
                println!("{}", analysis.metrics_block);
                println!();
                println!("Analysis Result");
                println!("{}", analysis.narrative.answer);
                if show_reasoning {
                    if let Some(reasoning) = &analysis.narrative.reasoning {
                        println!();
                        println!("Model Reasoning");
                        println!("{reasoning}");
                    }
                }
            }
        }
        Commands::Chart {
            file,
            scope,
            sprint,
            provider,
            model,
        } => {
            let scope = Scope::parse(&scope)?;
            let dataset = Dataset::from_path(&file)?;
            let settings = LlmSettings::resolve(provider.as_deref(), model.as_deref());
            let rs = RetroScope::new(settings);
            match rs.chart(&dataset, scope, sprint.as_deref()).await {
                Ok(chart) => println!("{chart}"),
                Err(e @ retroscope::Error::Llm(_)) => {
                    eprintln!("Model consultation error: {e}");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Sprints { file } => {
            let dataset = Dataset::from_path(&file)?;
            let labels = dataset.sprint_labels();
            if labels.is_empty() {
                println!("No iteration labels found in {file}.");
            } else {
                for label in labels {
                    println!("{label}");
                }
            }
        }
        Commands::Scopes => {
            for scope in Scope::all() {
                println!("{:<14} {}", scope.as_key(), scope.title());
            }
        }
    }

    Ok(())
}
