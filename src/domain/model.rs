use crate::utils::error::{Result, VacancyError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Default for company, city and experience when the API leaves them out.
pub const UNSPECIFIED: &str = "unspecified";

/// Criterion key compared against a stored salary's `from` amount.
pub const SALARY_FROM: &str = "salary_from";
/// Criterion key compared against a stored salary's `to` amount.
pub const SALARY_TO: &str = "salary_to";

const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// One listing exactly as it appeared in an API page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    pub data: Map<String, Value>,
}

impl RawRecord {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Looks up `outer.inner` as a string, e.g. `employer.name`.
    pub fn nested_str(&self, outer: &str, inner: &str) -> Option<&str> {
        self.data
            .get(outer)
            .and_then(|v| v.get(inner))
            .and_then(Value::as_str)
    }
}

/// Structured salary amount as the API reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default)]
    pub from: Option<Number>,
    #[serde(default)]
    pub to: Option<Number>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl SalaryRange {
    /// Reads a range out of a JSON object. Non-numeric amounts count as absent.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let number = |key: &str| match object.get(key) {
            Some(Value::Number(n)) => Some(n.clone()),
            _ => None,
        };

        Self {
            from: number("from"),
            to: number("to"),
            currency: object
                .get("currency")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Lower bound when known, otherwise the upper bound.
    pub fn amount(&self) -> Option<f64> {
        self.from
            .as_ref()
            .or(self.to.as_ref())
            .and_then(Number::as_f64)
    }

    fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            "from".to_string(),
            self.from.clone().map(Value::Number).unwrap_or(Value::Null),
        );
        object.insert(
            "to".to_string(),
            self.to.clone().map(Value::Number).unwrap_or(Value::Null),
        );
        object.insert(
            "currency".to_string(),
            self.currency.clone().map(Value::String).unwrap_or(Value::Null),
        );
        Value::Object(object)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Salary {
    Amount(SalaryRange),
    Text(String),
}

impl Salary {
    /// Numeric representation used for ranking. Text salaries have none.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Salary::Amount(range) => range.amount(),
            Salary::Text(_) => None,
        }
    }

    /// JSON form written to the store.
    pub fn to_value(&self) -> Value {
        match self {
            Salary::Amount(range) => range.to_value(),
            Salary::Text(text) => Value::String(text.clone()),
        }
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Salary::Text(text) => write!(f, "{}", text),
            Salary::Amount(range) => {
                let part = |n: &Option<Number>| {
                    n.as_ref()
                        .map(Number::to_string)
                        .unwrap_or_else(|| "not specified".to_string())
                };
                let text = format!(
                    "{} - {} {}",
                    part(&range.from),
                    part(&range.to),
                    range.currency.as_deref().unwrap_or("")
                );
                write!(f, "{}", text.trim())
            }
        }
    }
}

/// A normalized job posting. Title and link are never empty.
#[derive(Debug, Clone)]
pub struct Vacancy {
    title: String,
    link: String,
    salary: Salary,
    description: String,
    company: String,
    city: String,
    experience: String,
    id: Option<String>,
}

impl Vacancy {
    /// Fails with a validation error when `title` or `link` is empty.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        salary: Salary,
        description: impl Into<String>,
    ) -> Result<Self> {
        let title = title.into();
        let link = link.into();

        if title.is_empty() {
            return Err(VacancyError::validation("Vacancy title cannot be empty"));
        }
        if link.is_empty() {
            return Err(VacancyError::validation("Vacancy link cannot be empty"));
        }

        Ok(Self {
            title,
            link,
            salary,
            description: description.into(),
            company: UNSPECIFIED.to_string(),
            city: UNSPECIFIED.to_string(),
            experience: UNSPECIFIED.to_string(),
            id: None,
        })
    }

    /// Employer name, `unspecified` by default.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_experience(mut self, experience: impl Into<String>) -> Self {
        self.experience = experience.into();
        self
    }

    /// Identifier assigned by the API.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Vacancy title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Public URL of the posting.
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Salary as text or as a structured range.
    pub fn salary(&self) -> &Salary {
        &self.salary
    }

    /// Short description, possibly empty.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn experience(&self) -> &str {
        &self.experience
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl fmt::Display for Vacancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Link: {}", self.link)?;
        writeln!(f, "Salary: {}", self.salary)?;
        if self.description.is_empty() {
            writeln!(f, "Description: no description")
        } else {
            let preview: String = self
                .description
                .chars()
                .take(DESCRIPTION_PREVIEW_CHARS)
                .collect();
            writeln!(f, "Description: {}...", preview)
        }
    }
}

/// On-disk form of a vacancy, keyed by the API's own field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredRecord {
    pub data: Map<String, Value>,
}

impl StoredRecord {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.data.get("name").and_then(Value::as_str)
    }

    pub fn alternate_url(&self) -> Option<&str> {
        self.data.get("alternate_url").and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&Value> {
        self.data.get("id")
    }

    /// True when both `name` and `alternate_url` hold a non-empty value.
    pub fn has_identity(&self) -> bool {
        ["name", "alternate_url"]
            .iter()
            .all(|key| self.data.get(*key).is_some_and(is_truthy))
    }

    /// `(name, company, city)`; two records sharing it are duplicates.
    pub fn dedup_key(&self) -> DedupKey<'_> {
        dedup_key(&self.data)
    }

    /// The `salary` field when it is a JSON object.
    pub fn salary_object(&self) -> Option<&Map<String, Value>> {
        self.data.get("salary").and_then(Value::as_object)
    }
}

pub type DedupKey<'a> = (Option<&'a Value>, Option<&'a Value>, Option<&'a Value>);

/// Dedup key of a raw stored object.
pub fn dedup_key(data: &Map<String, Value>) -> DedupKey<'_> {
    (data.get("name"), data.get("company"), data.get("city"))
}

impl From<Map<String, Value>> for StoredRecord {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

impl From<&Vacancy> for StoredRecord {
    fn from(vacancy: &Vacancy) -> Self {
        let mut data = Map::new();
        data.insert("name".to_string(), Value::String(vacancy.title.clone()));
        data.insert(
            "alternate_url".to_string(),
            Value::String(vacancy.link.clone()),
        );
        data.insert("salary".to_string(), vacancy.salary.to_value());
        data.insert(
            "description".to_string(),
            Value::String(vacancy.description.clone()),
        );
        data.insert("company".to_string(), Value::String(vacancy.company.clone()));
        data.insert("city".to_string(), Value::String(vacancy.city.clone()));
        data.insert(
            "experience".to_string(),
            Value::String(vacancy.experience.clone()),
        );
        if let Some(id) = &vacancy.id {
            data.insert("id".to_string(), Value::String(id.clone()));
        }
        Self { data }
    }
}

/// Query predicate: every entry must hold for a record to match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    entries: Vec<(String, Value)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exact-match entry, replacing an earlier one for the same key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Lower bound on `salary.from`; a missing bound counts as 0.
    pub fn salary_from(self, value: impl Into<Value>) -> Self {
        self.with(SALARY_FROM, value)
    }

    /// Upper bound on `salary.to`; a missing bound counts as unbounded.
    pub fn salary_to(self, value: impl Into<Value>) -> Self {
        self.with(SALARY_TO, value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Criteria::new(), |criteria, (k, v)| criteria.with(k, v))
    }
}

/// Python-style truthiness: null, false, zero and empty containers are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vacancy_requires_title_and_link() {
        let empty_title = Vacancy::new(
            "",
            "https://hh.ru/vacancy/1",
            Salary::Text(String::new()),
            "",
        );
        assert!(matches!(
            empty_title,
            Err(VacancyError::ValidationError { .. })
        ));

        let empty_link = Vacancy::new("Rust Developer", "", Salary::Text(String::new()), "");
        assert!(matches!(empty_link, Err(VacancyError::ValidationError { .. })));

        let ok = Vacancy::new(
            "Rust Developer",
            "https://hh.ru/vacancy/1",
            Salary::Text(String::new()),
            "",
        )
        .unwrap();
        assert_eq!(ok.company(), UNSPECIFIED);
        assert_eq!(ok.city(), UNSPECIFIED);
        assert_eq!(ok.experience(), UNSPECIFIED);
        assert!(ok.id().is_none());
    }

    #[test]
    fn test_stored_record_uses_api_field_names() {
        let vacancy = Vacancy::new(
            "Python Developer",
            "https://example.com",
            Salary::Text("100000 - 150000 RUB".to_string()),
            "Development of web applications",
        )
        .unwrap()
        .with_company("Test Company")
        .with_city("Moscow")
        .with_experience("3-5 years")
        .with_id("42");

        let record = StoredRecord::from(&vacancy);
        let keys: Vec<&str> = record.data.keys().map(String::as_str).collect();

        assert_eq!(
            keys,
            vec![
                "name",
                "alternate_url",
                "salary",
                "description",
                "company",
                "city",
                "experience",
                "id"
            ]
        );
        assert_eq!(record.name(), Some("Python Developer"));
        assert_eq!(record.alternate_url(), Some("https://example.com"));
        assert_eq!(record.id(), Some(&json!("42")));
        assert!(record.get("title").is_none());
    }

    #[test]
    fn test_structured_salary_is_stored_as_object() {
        let range = SalaryRange {
            from: Some(Number::from(50000)),
            to: None,
            currency: Some("RUR".to_string()),
        };
        let vacancy = Vacancy::new("Backend", "https://hh.ru/v/2", Salary::Amount(range), "")
            .unwrap();

        let record = StoredRecord::from(&vacancy);
        assert_eq!(
            record.get("salary"),
            Some(&json!({"from": 50000, "to": null, "currency": "RUR"}))
        );
        assert_eq!(vacancy.salary().to_string(), "50000 - not specified RUR");
    }

    #[test]
    fn test_display_truncates_description() {
        let long = "x".repeat(150);
        let vacancy = Vacancy::new("Title", "https://hh.ru/v/3", Salary::Text("n/a".into()), long)
            .unwrap();
        let rendered = vacancy.to_string();

        assert!(rendered.contains(&format!("Description: {}...", "x".repeat(100))));
        assert!(!rendered.contains(&"x".repeat(101)));

        let bare = Vacancy::new("Title", "https://hh.ru/v/3", Salary::Text("n/a".into()), "")
            .unwrap();
        assert!(bare.to_string().contains("Description: no description"));
    }

    #[test]
    fn test_has_identity() {
        let full = StoredRecord::from(
            json!({"name": "Dev", "alternate_url": "https://hh.ru/v/1"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert!(full.has_identity());

        let missing_url = StoredRecord::from(json!({"name": "Dev"}).as_object().cloned().unwrap());
        assert!(!missing_url.has_identity());

        let empty_name = StoredRecord::from(
            json!({"name": "", "alternate_url": "https://hh.ru/v/1"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert!(!empty_name.has_identity());
    }

    #[test]
    fn test_criteria_replaces_repeated_key() {
        let criteria = Criteria::new().with("city", "Moscow").with("city", "Kazan");
        let entries: Vec<(&str, &Value)> = criteria.iter().collect();
        assert_eq!(entries, vec![("city", &json!("Kazan"))]);
    }
}
