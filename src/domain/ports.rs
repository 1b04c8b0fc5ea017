use crate::domain::model::{Criteria, RawRecord, StoredRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Something that can list raw vacancies for a search keyword.
#[async_trait]
pub trait VacancySource: Send + Sync {
    async fn fetch(&self, keyword: &str) -> Vec<RawRecord>;
}

/// What happened to a record handed to [`VacancyStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    /// A record with the same `(name, company, city)` was already stored.
    Duplicate,
    /// `name` or `alternate_url` was missing or empty.
    Skipped,
}

pub trait VacancyStore {
    fn add(&self, record: StoredRecord) -> Result<AddOutcome>;
    fn query(&self, criteria: &Criteria) -> Result<Vec<StoredRecord>>;
    /// Returns how many records were removed.
    fn delete(&self, id: &Value) -> Result<usize>;
}
