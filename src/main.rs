use anyhow::Context;
use clap::Parser;
use hh_vacancies::utils::{logger, validation};
use hh_vacancies::{
    filter_by_description, top_by_salary, CliConfig, Command, Criteria, HhClient, JsonStorage,
    Normalizer, SearchEngine, TomlConfig, VacancyError, VacancyStore,
};
use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.log_json);
    tracing::debug!("CLI config: {:?}", cli);

    let settings = cli
        .settings()
        .inspect_err(report)
        .context("Failed to load configuration")?;

    match &cli.command {
        Command::Search {
            keyword,
            top,
            description,
            ..
        } => search(&settings, keyword, *top, description.as_deref())
            .await
            .inspect_err(report)
            .with_context(|| format!("Search for '{}' failed", keyword))?,
        Command::List {
            filters,
            salary_from,
            salary_to,
        } => list(&settings, filters, *salary_from, *salary_to)
            .inspect_err(report)
            .context("Listing stored vacancies failed")?,
        Command::Delete { id } => delete(&settings, id)
            .inspect_err(report)
            .with_context(|| format!("Deleting vacancy {} failed", id))?,
    }

    Ok(())
}

fn report(e: &VacancyError) {
    tracing::error!("❌ {}", e);
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

async fn search(
    settings: &TomlConfig,
    keyword: &str,
    top: usize,
    description: Option<&str>,
) -> hh_vacancies::Result<()> {
    let keyword = keyword.trim();
    if validation::validate_non_empty_string("keyword", keyword).is_err() {
        eprintln!("Keyword cannot be empty!");
        return Ok(());
    }

    let client = HhClient::new(settings.fetch_config())?
        .with_span(tracing::info_span!("search", keyword = %keyword));
    let storage = JsonStorage::open(settings.storage_path())?;
    let engine = SearchEngine::new(client, storage)
        .with_normalizer(Normalizer::new(settings.salary_mode()));

    println!("Loading vacancies...");
    let summary = engine.run(keyword).await?;

    if summary.vacancies.is_empty() {
        println!("No vacancies found for your query.");
        return Ok(());
    }

    println!(
        "Loaded {} vacancies ({} new, {} already stored).",
        summary.vacancies.len(),
        summary.inserted,
        summary.duplicates
    );

    println!("\nTop {} vacancies by salary:", top);
    for vacancy in top_by_salary(&summary.vacancies, top) {
        println!("{}\n{}", vacancy, "-".repeat(50));
    }

    if let Some(word) = description.map(str::trim).filter(|w| !w.is_empty()) {
        let matches = filter_by_description(&summary.vacancies, word);
        if matches.is_empty() {
            println!("\nNo vacancies mention '{}' in the description.", word);
        } else {
            println!(
                "\nFound {} vacancies mentioning '{}' in the description:",
                matches.len(),
                word
            );
            for vacancy in matches {
                println!("{}\n{}", vacancy, "-".repeat(50));
            }
        }
    }

    Ok(())
}

fn list(
    settings: &TomlConfig,
    filters: &[(String, Value)],
    salary_from: Option<f64>,
    salary_to: Option<f64>,
) -> hh_vacancies::Result<()> {
    let mut criteria: Criteria = filters.iter().cloned().collect();
    if let Some(from) = salary_from {
        criteria = criteria.salary_from(from);
    }
    if let Some(to) = salary_to {
        criteria = criteria.salary_to(to);
    }

    let storage = JsonStorage::open(settings.storage_path())?;
    let records = storage.query(&criteria)?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    tracing::info!("{} stored vacancies match", records.len());
    Ok(())
}

fn delete(settings: &TomlConfig, id: &str) -> hh_vacancies::Result<()> {
    let storage = JsonStorage::open(settings.storage_path())?;

    // Ids from the API are strings; hand-written records may use numbers.
    let mut removed = storage.delete(&Value::String(id.to_string()))?;
    if let Ok(number) = id.parse::<i64>() {
        removed += storage.delete(&Value::from(number))?;
    }

    println!("Removed {} vacancies with id {}", removed, id);
    Ok(())
}
