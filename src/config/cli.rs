use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, Clone, Parser)]
#[command(name = "hh-vacancies")]
#[command(about = "Fetch, store and search HeadHunter vacancies")]
pub struct CliConfig {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding the store file
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Store file name inside the data directory
    #[arg(long, global = true)]
    pub file: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch vacancies for a keyword, store them and print the best paid
    Search {
        keyword: String,

        /// How many top vacancies by salary to print
        #[arg(long, default_value = "10")]
        top: usize,

        /// Also print vacancies whose description contains this word
        #[arg(long)]
        description: Option<String>,

        /// Keep salaries as structured amounts instead of text
        #[arg(long)]
        structured_salary: bool,

        #[arg(long)]
        endpoint: Option<String>,

        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Print stored vacancies matching all given criteria
    List {
        /// Exact match as key=value; the value is read as JSON when it parses
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, Value)>,

        #[arg(long)]
        salary_from: Option<f64>,

        #[arg(long)]
        salary_to: Option<f64>,
    },

    /// Remove stored vacancies with the given id
    Delete { id: String },
}

impl CliConfig {
    /// Config file (or defaults) with command-line overrides applied, validated.
    pub fn settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(data_dir) = &self.data_dir {
            settings.storage.data_dir = data_dir.clone();
        }
        if let Some(file) = &self.file {
            settings.storage.filename = file.clone();
        }
        if let Command::Search {
            structured_salary,
            endpoint,
            max_pages,
            ..
        } = &self.command
        {
            if *structured_salary {
                settings.normalize.structured_salary = true;
            }
            if let Some(endpoint) = endpoint {
                settings.source.endpoint = endpoint.clone();
            }
            if let Some(max_pages) = max_pages {
                settings.source.max_pages = *max_pages;
            }
        }

        settings.validate()?;
        Ok(settings)
    }
}

pub fn parse_filter(s: &str) -> std::result::Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("city=Moscow").unwrap(),
            ("city".to_string(), json!("Moscow"))
        );
        assert_eq!(parse_filter("id=7").unwrap(), ("id".to_string(), json!(7)));
        assert_eq!(
            parse_filter("name=a=b").unwrap(),
            ("name".to_string(), json!("a=b"))
        );
        assert!(parse_filter("city").is_err());
        assert!(parse_filter("=Moscow").is_err());
    }

    #[test]
    fn test_search_overrides() {
        let cli = CliConfig::parse_from([
            "hh-vacancies",
            "--data-dir",
            "/tmp/hh",
            "search",
            "rust",
            "--structured-salary",
            "--max-pages",
            "2",
        ]);

        let settings = cli.settings().unwrap();
        assert_eq!(settings.storage.data_dir, "/tmp/hh");
        assert_eq!(settings.source.max_pages, 2);
        assert!(settings.normalize.structured_salary);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let cli = CliConfig::parse_from(["hh-vacancies", "search", "rust", "--max-pages", "0"]);
        assert!(cli.settings().is_err());
    }

    #[test]
    fn test_list_filters() {
        let cli = CliConfig::parse_from([
            "hh-vacancies",
            "list",
            "--filter",
            "city=Moscow",
            "--salary-from",
            "30000",
        ]);

        match cli.command {
            Command::List {
                filters,
                salary_from,
                salary_to,
            } => {
                assert_eq!(filters, vec![("city".to_string(), json!("Moscow"))]);
                assert_eq!(salary_from, Some(30000.0));
                assert!(salary_to.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
