//! LodeStar CLI - engagement management against a LodeStar backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lodestar_context::{
    AppConfig, Apiv1ServiceFactory, EngagementProvider, FeatureSet, ServiceFactory, Session,
    StaticConfig, StaticSession,
};
use lodestar_core::{
    Engagement, EngagementFilter, EngagementSortField, EngagementStatus, SortOption,
};
use lodestar_forms::{
    sort_select_options, DefaultUserValidator, DeletedUsers, RowAction, UserRow,
};
use lodestar_service::{EngagementService, FakedEngagementService};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lodestar")]
#[command(about = "Engagement management client", long_about = None)]
struct Cli {
    /// Path to config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend URL (overrides config and environment)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Use the in-memory demo backend
    #[arg(long, global = true)]
    faked: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List engagements
    List {
        /// Match customer or project name
        #[arg(long)]
        search: Option<String>,
        /// Sort field (start-date, end-date, customer-name, project-name)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Keep only this status (upcoming, active, past)
        #[arg(long)]
        status: Option<String>,
    },
    /// Show engagement details
    Show {
        /// Engagement ID
        id: String,
    },
    /// Create an engagement
    Create {
        /// Customer name
        #[arg(long)]
        customer: String,
        /// Project name
        #[arg(long)]
        project: String,
        /// Description
        #[arg(long)]
        description: Option<String>,
    },
    /// Show engagement users with advisory validation
    Users {
        /// Engagement ID
        id: String,
    },
    /// List available sort options
    SortOptions,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let session = session_from_env();
    let factory: Arc<dyn ServiceFactory> = if cli.faked {
        let demo: Arc<dyn EngagementService> = Arc::new(FakedEngagementService::demo());
        Arc::new(move |_: &AppConfig, _: &Session| -> lodestar_service::Result<Arc<dyn EngagementService>> {
            Ok(demo.clone())
        })
    } else {
        Arc::new(Apiv1ServiceFactory)
    };

    let provider = EngagementProvider::new(
        Arc::new(StaticConfig::new(config)),
        Arc::new(StaticSession::new(session)),
        factory,
    );

    let result = run(&provider, cli.command).await;
    provider.unmount();
    result
}

async fn run(provider: &EngagementProvider, command: Commands) -> Result<()> {
    match command {
        Commands::List { search, sort, desc, status } => {
            provider.get_engagements().await.context("Failed to fetch engagements")?;

            let filter = EngagementFilter {
                search_term: search,
                allowed_statuses: status.map(|s| parse_status(&s)).transpose()?.map(|s| vec![s]),
                sort: sort
                    .map(|s| s.parse::<EngagementSortField>().map_err(anyhow::Error::msg))
                    .transpose()?
                    .map(|field| SortOption::new(field, !desc)),
            };
            let now = chrono::Utc::now();
            let engagements = filter.apply(&provider.engagements().await, now);

            println!("Engagements ({})", engagements.len());
            for engagement in engagements {
                println!("  {} | {:8} | {} - {}",
                    engagement.id,
                    format_status(EngagementStatus::of(&engagement, now)),
                    engagement.customer_name,
                    engagement.project_name,
                );
            }
        }
        Commands::Show { id } => {
            let Some(engagement) = find(provider, &id).await? else {
                println!("Engagement not found");
                return Ok(());
            };

            println!("Engagement: {}", engagement.id);
            println!("  Customer: {}", engagement.customer_name);
            println!("  Project: {}", engagement.project_name);
            if let Some(description) = &engagement.description {
                println!("  Description: {}", description);
            }
            if let Some(start) = engagement.start_date {
                println!("  Start: {}", start.date_naive());
            }
            if let Some(end) = engagement.end_date {
                println!("  End: {}", end.date_naive());
            }
            println!("  Users: {}", engagement.engagement_users.len());
            println!("  Launched: {}", if engagement.is_launched() { "yes" } else { "no" });
        }
        Commands::Create { customer, project, description } => {
            let mut draft = Engagement::draft(customer, project);
            draft.description = description;

            let created = provider
                .create_engagement(draft)
                .await
                .context("Failed to create engagement")?;
            info!("Engagement count now {}", provider.engagements().await.len());
            println!("Created engagement: {} - {}/{}", created.id, created.customer_name, created.project_name);
        }
        Commands::Users { id } => {
            let Some(engagement) = find(provider, &id).await? else {
                println!("Engagement not found");
                return Ok(());
            };

            let form_config = match provider.load_form_config().await {
                Ok(config) => config,
                Err(e) => {
                    warn!("Form config unavailable, roles cannot be checked: {}", e);
                    Default::default()
                }
            };
            provider.set_active_engagement(engagement.clone()).await;

            let validator = DefaultUserValidator::from_form_config(&form_config);
            let features = features_from_env();
            let deleted = DeletedUsers::new();
            let users = &engagement.engagement_users;

            println!("Users of {} ({})", engagement.project_name, users.len());
            for index in 0..users.len() {
                let Some(row) = UserRow::new(users, index, &deleted, &validator, &features) else {
                    continue;
                };
                let cells: Vec<String> = row
                    .fields()
                    .into_iter()
                    .map(|f| if f.validated.is_error() { format!("{}!", f.value) } else { f.value })
                    .collect();
                let action = match row.action() {
                    Some(RowAction::Remove) => "remove",
                    Some(RowAction::Undo) => "undo",
                    None => "-",
                };
                println!("  {} [{}]", cells.join(" | "), action);
            }
        }
        Commands::SortOptions => {
            for option in sort_select_options() {
                println!("{}", option);
            }
        }
    }

    Ok(())
}

async fn find(provider: &EngagementProvider, id: &str) -> Result<Option<Engagement>> {
    provider.get_engagements().await.context("Failed to fetch engagements")?;
    Ok(provider
        .engagements()
        .await
        .into_iter()
        .find(|e| e.id.as_str() == id))
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AppConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    Ok(config)
}

fn session_from_env() -> Session {
    match (std::env::var("LODESTAR_USER").ok(), std::env::var("LODESTAR_TOKEN").ok()) {
        (Some(user), Some(token)) => Session::authenticated(user, token),
        (None, Some(token)) => Session {
            identity: None,
            access_token: Some(token),
        },
        _ => Session::anonymous(),
    }
}

fn features_from_env() -> FeatureSet {
    match std::env::var("LODESTAR_FEATURES") {
        Ok(raw) => FeatureSet::new(raw.split(',').map(str::trim).filter(|s| !s.is_empty())),
        Err(_) => FeatureSet::writer(),
    }
}

fn parse_status(s: &str) -> Result<EngagementStatus> {
    match s.to_lowercase().as_str() {
        "upcoming" => Ok(EngagementStatus::Upcoming),
        "active" => Ok(EngagementStatus::Active),
        "past" => Ok(EngagementStatus::Past),
        other => anyhow::bail!("Unknown status: {}", other),
    }
}

fn format_status(status: EngagementStatus) -> &'static str {
    match status {
        EngagementStatus::Upcoming => "UPCOMING",
        EngagementStatus::Active => "ACTIVE",
        EngagementStatus::Past => "PAST",
    }
}
