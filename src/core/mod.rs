pub mod engine;
pub mod fetcher;
pub mod normalizer;
pub mod selection;
pub mod store;

pub use crate::domain::model::{Criteria, RawRecord, StoredRecord, Vacancy};
pub use crate::domain::ports::{AddOutcome, VacancySource, VacancyStore};
pub use crate::utils::error::Result;
