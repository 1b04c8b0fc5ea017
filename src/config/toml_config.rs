use crate::core::fetcher::{
    FetchConfig, DEFAULT_ENDPOINT, DEFAULT_MAX_PAGES, DEFAULT_PAGE_DELAY, DEFAULT_PER_PAGE,
    DEFAULT_USER_AGENT,
};
use crate::core::normalizer::SalaryMode;
use crate::core::store::{DEFAULT_DATA_DIR, DEFAULT_FILENAME};
use crate::utils::error::{Result, VacancyError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub normalize: NormalizeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub per_page: usize,
    pub max_pages: usize,
    pub page_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay_ms: DEFAULT_PAGE_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub filename: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            filename: DEFAULT_FILENAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub structured_salary: bool,
}

impl TomlConfig {
    /// Loads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after replacing `${VAR}` with environment values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| VacancyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| VacancyError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Checks every section and reports the first invalid field.
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_non_empty_string("source.user_agent", &self.source.user_agent)?;
        validation::validate_range("source.per_page", self.source.per_page, 1, DEFAULT_PER_PAGE)?;
        validation::validate_positive_number("source.max_pages", self.source.max_pages, 1)?;
        validation::validate_path("storage.data_dir", &self.storage.data_dir)?;
        validation::validate_non_empty_string("storage.filename", &self.storage.filename)?;
        Ok(())
    }

    /// Settings for `HhClient`.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            endpoint: self.source.endpoint.clone(),
            user_agent: self.source.user_agent.clone(),
            per_page: self.source.per_page,
            max_pages: self.source.max_pages,
            page_delay: Duration::from_millis(self.source.page_delay_ms),
        }
    }

    /// Store file inside the data directory.
    pub fn storage_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.filename)
    }

    /// Salary shape the normalizer produces.
    pub fn salary_mode(&self) -> SalaryMode {
        if self.normalize.structured_salary {
            SalaryMode::Structured
        } else {
            SalaryMode::Display
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
