//! CLI command handling

pub mod commands;
pub mod output;

pub use commands::Cli;
pub use commands::Commands;

use std::sync::Arc;

use crate::api;
use crate::config::AppConfig;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::models::Category;
use crate::models::SearchOptions;
use crate::search;
use crate::search::SearchService;
use crate::store::PostgresKnowledgeStore;
use crate::store::PostgresScheduleStore;
use crate::store::ScheduleStore;
use crate::typo::TypoCorrector;

/// Construct the production search service and schedule store from config
pub async fn build_services(
    config: &AppConfig,
) -> Result<(Arc<SearchService>, Arc<dyn ScheduleStore>)> {
    let pool = crate::store::pool_from_config(config).await?;
    let knowledge = Arc::new(PostgresKnowledgeStore::new(pool.clone()));
    let schedule: Arc<dyn ScheduleStore> = Arc::new(PostgresScheduleStore::new(pool));

    let embeddings = Arc::new(EmbeddingService::from_config(config)?);
    let corrector = TypoCorrector::with_vocabulary(search::domain_vocabulary());

    let service = SearchService::new(
        knowledge,
        schedule.clone(),
        embeddings,
        corrector,
        config.retrieval.clone(),
    );

    Ok((Arc::new(service), schedule))
}

/// Dispatch a parsed CLI invocation
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Commands::Search {
            query,
            limit,
            category,
            no_typo_correction,
            json,
        } => {
            let (service, _) = build_services(&config).await?;

            let query_type = match category.as_deref() {
                Some(raw) => Some(raw.parse::<Category>()?),
                None => None,
            };
            let options = SearchOptions {
                max_sections: limit,
                query_type,
                correct_typos: !no_typo_correction && config.retrieval.correct_typos,
                ..service.default_options()
            };

            let outcome = service.search(&query, options).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                output::print_search_outcome(&outcome);
            }
            Ok(())
        }
        Commands::Classify { query } => {
            let category = search::classify(&query);
            println!("{category}");
            Ok(())
        }
        Commands::Serve { host, port, no_cors } => {
            let (service, schedule) = build_services(&config).await?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let enable_cors = config.server.enable_cors && !no_cors;

            api::serve_api(service, schedule, host, port, enable_cors).await
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config).map_err(|e| {
                crate::CampusRagError::Config(format!("failed to render config: {e}"))
            })?);
            Ok(())
        }
    }
}
