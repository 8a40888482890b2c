use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use survey_insights::config::AppConfig;
use survey_insights::{db, placement, ratings, report, telemetry, RatingScale};

#[derive(Parser)]
#[command(name = "survey-insights")]
#[command(about = "Employer resolution and rating analytics for alumni and exit surveys", long_about = None)]
struct Cli {
    /// Overrides SURVEY_SIMILARITY_THRESHOLD for name clustering
    #[arg(long, global = true)]
    similarity_threshold: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScaleArg {
    Five,
    Ten,
}

impl From<ScaleArg> for RatingScale {
    fn from(value: ScaleArg) -> Self {
        match value {
            ScaleArg::Five => RatingScale::FivePoint,
            ScaleArg::Ten => RatingScale::TenPoint,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import survey responses from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List the most common employers after name resolution
    Recruiters {
        #[arg(long)]
        survey: Option<String>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Summarise one rating field per item
    Ratings {
        #[arg(long)]
        field: String,
        #[arg(long)]
        survey: Option<String>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long, value_enum, default_value_t = ScaleArg::Five)]
        scale: ScaleArg,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        survey: Option<String>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long, value_delimiter = ',', default_value = "po,peo,pso,course")]
        fields: Vec<String>,
        #[arg(long, value_enum, default_value_t = ScaleArg::Five)]
        scale: ScaleArg,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export per-item rating summaries to CSV
    Export {
        #[arg(long)]
        field: String,
        #[arg(long)]
        survey: Option<String>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long, value_enum, default_value_t = ScaleArg::Five)]
        scale: ScaleArg,
        #[arg(long)]
        out: PathBuf,
    },
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    telemetry::init(&config.log_level)?;

    if let Some(threshold) = cli.similarity_threshold {
        config.resolver = config.resolver.with_similarity_threshold(threshold)?;
    }

    let pool = connect(&config).await?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let inserted = db::seed(&pool).await?;
            println!("Seed data inserted ({inserted} responses).");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} responses from {}.", csv.display());
        }
        Commands::Recruiters {
            survey,
            batch,
            limit,
        } => {
            let responses = db::fetch_responses(&pool, survey.as_deref(), batch.as_deref()).await?;
            let top = placement::top_recruiters(&responses, &config.resolver, limit);

            if top.is_empty() {
                println!("No employers found for this scope.");
                return Ok(());
            }

            println!("Top recruiters:");
            for (company, count) in top {
                println!("- {company}: {count}");
            }
        }
        Commands::Ratings {
            field,
            survey,
            batch,
            scale,
        } => {
            let scale = RatingScale::from(scale);
            let responses = db::fetch_responses(&pool, survey.as_deref(), batch.as_deref()).await?;
            let distribution = ratings::aggregate_flat(&responses, &field, scale);
            let items = ratings::summarize_items(
                &ratings::aggregate_per_item(&responses, &field, scale),
                scale,
            );

            if distribution.total == 0 {
                println!("No {field} ratings found for this scope.");
                return Ok(());
            }

            println!(
                "{} ratings for {field}, overall average {:.2}",
                distribution.total,
                distribution.average()
            );
            for item in items {
                println!(
                    "- {} average {:.2} ({}) across {} ratings",
                    item.item, item.average, item.level, item.total
                );
            }
        }
        Commands::Report {
            survey,
            batch,
            fields,
            scale,
            out,
        } => {
            let responses = db::fetch_responses(&pool, survey.as_deref(), batch.as_deref()).await?;
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            let report = report::build_report(
                survey.as_deref().or(batch.as_deref()),
                &responses,
                &fields,
                scale.into(),
                &config.resolver,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            field,
            survey,
            batch,
            scale,
            out,
        } => {
            let scale = RatingScale::from(scale);
            let responses = db::fetch_responses(&pool, survey.as_deref(), batch.as_deref()).await?;
            let items = ratings::summarize_items(
                &ratings::aggregate_per_item(&responses, &field, scale),
                scale,
            );
            report::write_item_csv(&out, &field, &items, scale)?;
            println!("Exported {} items to {}.", items.len(), out.display());
        }
    }

    Ok(())
}
