use crate::domain::model::{dedup_key, Criteria, StoredRecord, SALARY_FROM, SALARY_TO};
use crate::domain::ports::{AddOutcome, VacancyStore};
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::Span;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_FILENAME: &str = "vacancies.json";

/// Vacancy collection kept as one JSON array file.
///
/// No file handle is held between calls: every operation reads the whole
/// file and mutations rewrite it through a temp file and a rename. There is
/// no locking, so two processes writing the same file can lose updates.
/// Array elements that are not objects are kept on disk but never returned.
#[derive(Debug)]
pub struct JsonStorage {
    path: PathBuf,
    span: Span,
}

impl JsonStorage {
    /// Creates the parent directory and an empty `[]` file when missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self {
            path: path.into(),
            span: tracing::info_span!("json_storage"),
        };

        let dir = storage.dir();
        fs::create_dir_all(dir)?;

        if !storage.path.exists() {
            tracing::debug!("Creating empty store at {}", storage.path.display());
            fs::write(&storage.path, "[]")?;
        }

        Ok(storage)
    }

    /// Opens `filename` inside `data_dir`.
    pub fn in_data_dir(data_dir: impl AsRef<Path>, filename: &str) -> Result<Self> {
        Self::open(data_dir.as_ref().join(filename))
    }

    /// Events from this store are recorded inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Location of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// `Ok(None)` means the file exists but is not a JSON array.
    fn read_items(&self) -> io::Result<Option<Vec<Value>>> {
        let bytes = fs::read(&self.path)?;
        match serde_json::from_slice(&bytes) {
            Ok(Value::Array(items)) => Ok(Some(items)),
            _ => Ok(None),
        }
    }

    fn read_or_empty(&self) -> Result<Vec<Value>> {
        match self.read_items()? {
            Some(items) => Ok(items),
            None => {
                tracing::warn!(
                    "Store {} is unreadable, treating it as empty",
                    self.path.display()
                );
                Ok(Vec::new())
            }
        }
    }

    /// Rewrites the whole file, keeping the permissions of the one it replaces.
    fn write_items(&self, items: &[Value]) -> Result<()> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        items.serialize(&mut serializer)?;

        let mut file = NamedTempFile::new_in(self.dir())?;
        file.write_all(&buffer)?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            file.as_file().set_permissions(metadata.permissions())?;
        }
        file.persist(&self.path)?;
        Ok(())
    }
}

impl VacancyStore for JsonStorage {
    fn add(&self, record: StoredRecord) -> Result<AddOutcome> {
        let _entered = self.span.enter();

        if !record.has_identity() {
            tracing::debug!("Skipping record without name or alternate_url");
            return Ok(AddOutcome::Skipped);
        }

        let mut items = match self.read_items() {
            Ok(Some(items)) => items,
            Ok(None) => {
                tracing::warn!(
                    "Store {} is corrupt, rewriting it with the new record",
                    self.path.display()
                );
                Vec::new()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("Store {} is missing, recreating it", self.path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let key = record.dedup_key();
        let duplicate = items
            .iter()
            .filter_map(Value::as_object)
            .any(|existing| dedup_key(existing) == key);
        if duplicate {
            tracing::debug!("Duplicate vacancy {:?}, not stored", record.name());
            return Ok(AddOutcome::Duplicate);
        }

        items.push(Value::Object(record.data));
        self.write_items(&items)?;
        Ok(AddOutcome::Inserted)
    }

    fn query(&self, criteria: &Criteria) -> Result<Vec<StoredRecord>> {
        let _entered = self.span.enter();

        let items = self.read_or_empty()?;
        let total = items.len();
        let records: Vec<StoredRecord> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(data) => Some(StoredRecord::from(data)),
                _ => None,
            })
            .collect();
        if records.len() < total {
            tracing::warn!(
                "Ignoring {} non-object entries in {}",
                total - records.len(),
                self.path.display()
            );
        }

        let matched: Vec<StoredRecord> = records
            .into_iter()
            .filter(|record| matches(record, criteria))
            .collect();

        tracing::debug!("Query matched {} of {} records", matched.len(), total);
        Ok(matched)
    }

    fn delete(&self, id: &Value) -> Result<usize> {
        let _entered = self.span.enter();

        let mut items = self.read_or_empty()?;
        let before = items.len();
        items.retain(|item| item.get("id") != Some(id));
        let removed = before - items.len();

        self.write_items(&items)?;
        tracing::debug!("Deleted {} records with id {}", removed, id);
        Ok(removed)
    }
}

fn matches(record: &StoredRecord, criteria: &Criteria) -> bool {
    criteria.iter().all(|(key, expected)| match key {
        SALARY_FROM => salary_bound(record, "from", 0.0)
            .zip(expected.as_f64())
            .is_some_and(|(from, threshold)| from >= threshold),
        SALARY_TO => salary_bound(record, "to", f64::INFINITY)
            .zip(expected.as_f64())
            .is_some_and(|(to, threshold)| to <= threshold),
        _ => values_equal(record.get(key).unwrap_or(&Value::Null), expected),
    })
}

/// `None` when the salary is not an object; a missing bound takes `default`.
fn salary_bound(record: &StoredRecord, bound: &str, default: f64) -> Option<f64> {
    record
        .salary_object()
        .map(|salary| salary.get(bound).and_then(Value::as_f64).unwrap_or(default))
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: Value) -> StoredRecord {
        StoredRecord::from(value.as_object().cloned().unwrap())
    }

    fn open_temp() -> (TempDir, JsonStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            JsonStorage::in_data_dir(temp_dir.path().join("data"), DEFAULT_FILENAME).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_open_creates_directory_and_empty_file() {
        let (_temp_dir, storage) = open_temp();

        assert!(storage.path().exists());
        assert_eq!(fs::read_to_string(storage.path()).unwrap(), "[]");
    }

    #[test]
    fn test_open_keeps_existing_content() {
        let (_temp_dir, storage) = open_temp();
        storage
            .add(record(json!({"name": "Dev", "alternate_url": "https://hh.ru/v/1"})))
            .unwrap();

        let reopened = JsonStorage::open(storage.path()).unwrap();
        assert_eq!(reopened.query(&Criteria::new()).unwrap().len(), 1);
    }

    #[test]
    fn test_file_uses_four_space_indent_and_raw_unicode() {
        let (_temp_dir, storage) = open_temp();
        storage
            .add(record(json!({
                "name": "Разработчик",
                "alternate_url": "https://hh.ru/v/1",
                "city": "Москва"
            })))
            .unwrap();

        let content = fs::read_to_string(storage.path()).unwrap();
        assert!(content.contains("\n        \"name\": \"Разработчик\""));
        assert!(content.contains("Москва"));
        assert!(!content.contains("\\u"));
    }

    #[test]
    fn test_matches_exact_fields() {
        let stored = record(json!({"name": "Dev", "city": "Moscow", "id": 3}));

        assert!(matches(&stored, &Criteria::new()));
        assert!(matches(&stored, &Criteria::new().with("city", "Moscow")));
        assert!(matches(&stored, &Criteria::new().with("id", 3.0)));
        assert!(!matches(&stored, &Criteria::new().with("city", "Kazan")));
        assert!(!matches(
            &stored,
            &Criteria::new().with("city", "Moscow").with("name", "QA")
        ));
        assert!(matches(&stored, &Criteria::new().with("company", Value::Null)));
    }

    #[test]
    fn test_matches_salary_bounds() {
        let range = record(json!({"salary": {"from": 40000, "to": 60000}}));
        let open_ended = record(json!({"salary": {"currency": "RUR"}}));
        let text = record(json!({"salary": "40000 - 60000 RUR"}));

        assert!(matches(&range, &Criteria::new().salary_from(30000)));
        assert!(!matches(&range, &Criteria::new().salary_from(50000)));
        assert!(matches(&range, &Criteria::new().salary_to(60000)));
        assert!(!matches(&range, &Criteria::new().salary_to(55000)));

        assert!(!matches(&open_ended, &Criteria::new().salary_from(1)));
        assert!(!matches(&open_ended, &Criteria::new().salary_to(1_000_000)));

        assert!(!matches(&text, &Criteria::new().salary_from(0)));
        assert!(!matches(&text, &Criteria::new().salary_to(1_000_000)));
    }
}
