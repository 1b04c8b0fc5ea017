pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use config::TomlConfig;
pub use crate::core::{
    engine::{SearchEngine, SearchSummary},
    fetcher::{FetchConfig, FetchReport, HhClient, StopReason},
    normalizer::{normalize, parse_salary, Normalizer, SalaryMode},
    selection::{compare_salary, filter_by_description, top_by_salary},
    store::JsonStorage,
};
pub use domain::model::{Criteria, RawRecord, Salary, SalaryRange, StoredRecord, Vacancy};
pub use domain::ports::{AddOutcome, VacancySource, VacancyStore};
pub use utils::error::{Result, VacancyError};
