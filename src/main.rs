use std::process::ExitCode;
use std::sync::Arc;

use chrono::{Datelike, TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use autopost::services::image::ImageGenerator;
use autopost::services::llm::LlmClient;
use autopost::services::quota::{Tier, TierManager};
use autopost::services::store::PgPostStore;
use autopost::services::tools::ToolRegistry;
use autopost::services::twitter::TwitterClient;
use autopost::{AutopostConfig, AutopostService};

/// Seed the tier manager with posts already made this month and today
async fn tier_manager(store: &PgPostStore, tier: Tier) -> TierManager {
    let now = Utc::now();
    let month_start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let day_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|d| d.and_utc())
        .unwrap_or(now);

    let month_count = store.count_posts_since(month_start).await;
    let day_count = store.count_posts_since(day_start).await;

    match (month_count, day_count) {
        (Ok(month), Ok(day)) => TierManager::with_usage(tier, month as u32, day as u32),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "could not seed quota usage, starting from zero");
            TierManager::new(tier)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AutopostConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to database");
            return ExitCode::FAILURE;
        }
    };

    let store = PgPostStore::new(pool);
    if let Err(e) = store.ensure_schema().await {
        tracing::error!(error = %e, "failed to prepare posts table");
        return ExitCode::FAILURE;
    }

    let llm = LlmClient::new(&config.llm_api_key, &config.llm_base_url, &config.llm_model);
    let twitter = TwitterClient::new(&config.twitter_access_token);

    let mut tools = ToolRegistry::new();
    if let Some(image) = &config.image {
        tools.register(Arc::new(ImageGenerator::new(
            &image.api_key,
            &image.base_url,
            &image.model,
        )));
    }

    let mut service = AutopostService::new(
        Arc::new(store.clone()),
        Arc::new(llm),
        Arc::new(twitter),
    )
    .with_mode(config.mode)
    .with_tools(tools);

    if let Some(tier) = config.tier {
        service = service.with_quota(Arc::new(tier_manager(&store, tier).await));
    }

    let result = service.run().await;
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "failed to serialize run result"),
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
