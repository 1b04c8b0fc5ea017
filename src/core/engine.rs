use crate::core::normalizer::Normalizer;
use crate::domain::model::{StoredRecord, Vacancy};
use crate::domain::ports::{AddOutcome, VacancySource, VacancyStore};
use crate::utils::error::Result;

/// Counts from one fetch, normalize and store pass.
#[derive(Debug, Default)]
pub struct SearchSummary {
    pub vacancies: Vec<Vacancy>,
    pub fetched: usize,
    /// Raw records rejected by normalization.
    pub invalid: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

pub struct SearchEngine<S: VacancySource, St: VacancyStore> {
    source: S,
    store: St,
    normalizer: Normalizer,
}

impl<S: VacancySource, St: VacancyStore> SearchEngine<S, St> {
    pub fn new(source: S, store: St) -> Self {
        Self {
            source,
            store,
            normalizer: Normalizer::default(),
        }
    }

    /// Replaces the default text-salary normalizer.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The store vacancies are written to.
    pub fn store(&self) -> &St {
        &self.store
    }

    pub async fn run(&self, keyword: &str) -> Result<SearchSummary> {
        tracing::info!("Fetching vacancies for '{}'", keyword);
        let raw_records = self.source.fetch(keyword).await;

        let mut summary = SearchSummary {
            fetched: raw_records.len(),
            ..SearchSummary::default()
        };

        for raw in &raw_records {
            match self.normalizer.normalize(raw) {
                Ok(vacancy) => summary.vacancies.push(vacancy),
                Err(e) => {
                    tracing::warn!("Skipping vacancy {:?}: {}", raw.get("id"), e);
                    summary.invalid += 1;
                }
            }
        }
        tracing::info!(
            "Normalized {} of {} vacancies",
            summary.vacancies.len(),
            summary.fetched
        );

        for vacancy in &summary.vacancies {
            match self.store.add(StoredRecord::from(vacancy))? {
                AddOutcome::Inserted => summary.inserted += 1,
                AddOutcome::Duplicate => summary.duplicates += 1,
                AddOutcome::Skipped => summary.skipped += 1,
            }
        }
        tracing::info!(
            "Stored {} new vacancies ({} duplicates)",
            summary.inserted,
            summary.duplicates
        );

        Ok(summary)
    }
}
