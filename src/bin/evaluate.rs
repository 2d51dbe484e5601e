use itinerary_engine::config::Config;
use itinerary_engine::db::{InMemoryLocationRepository, LocationRepository, PgLocationRepository};
use itinerary_engine::evaluation::{
    default_scenarios, format_report, EvalScenario, ItineraryMetrics, ScenarioResult,
};
use itinerary_engine::services::ItineraryGenerator;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_help() {
    eprintln!(
        "\
Usage: evaluate [OPTIONS]

Options:
  --scenario=FILTER     Only run scenarios whose name contains FILTER
  --db                  Plan against the locations in DATABASE_URL instead of
                        each scenario's synthetic pool
  --json                Output results as JSON
  --help                Show this help message"
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "itinerary_engine=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let scenario_filter = args.iter().find_map(|a| a.strip_prefix("--scenario="));
    let json_output = args.iter().any(|a| a == "--json");
    let use_db = args.iter().any(|a| a == "--db");

    let config = Config::from_env()?;

    let db_repo: Option<Arc<dyn LocationRepository>> = if use_db {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or("--db requires DATABASE_URL")?;
        let pool = itinerary_engine::db::create_pool(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        let repo = PgLocationRepository::new(pool);
        eprintln!("Using {} locations from the database", repo.count().await?);
        Some(Arc::new(repo))
    } else {
        None
    };

    let all_scenarios = default_scenarios();
    let scenarios: Vec<&EvalScenario> = if let Some(filter) = scenario_filter {
        all_scenarios
            .iter()
            .filter(|s| s.name.contains(filter))
            .collect()
    } else {
        all_scenarios.iter().collect()
    };

    if scenarios.is_empty() {
        eprintln!("No scenarios matched filter. Available:");
        for s in &all_scenarios {
            eprintln!("  {}", s.name);
        }
        std::process::exit(1);
    }

    eprintln!("Running {} scenarios...", scenarios.len());

    let mut results = Vec::new();
    for scenario in &scenarios {
        eprintln!("  {}", scenario.name);

        let repo: Arc<dyn LocationRepository> = match &db_repo {
            Some(repo) => repo.clone(),
            None => Arc::new(InMemoryLocationRepository::new(scenario.locations.clone())),
        };
        let generator = ItineraryGenerator::new(repo.clone(), None, config.generator.clone());

        match generator.generate_itinerary_from_trip(&scenario.trip).await {
            Ok(itinerary) => {
                let pool = match &db_repo {
                    Some(repo) => repo.fetch_all_locations(&Default::default()).await?,
                    None => scenario.locations.clone(),
                };
                results.push(ScenarioResult {
                    name: scenario.name.clone(),
                    metrics: ItineraryMetrics::compute(&itinerary, &pool, &scenario.trip),
                });
            }
            Err(e) => {
                eprintln!("    Failed: {}", e);
            }
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", format_report(&results));
    }

    Ok(())
}
