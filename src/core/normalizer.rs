use crate::domain::model::{is_truthy, RawRecord, Salary, SalaryRange, Vacancy, UNSPECIFIED};
use crate::utils::error::Result;
use serde_json::Value;

pub const SALARY_NOT_SPECIFIED: &str = "salary not specified";
const AMOUNT_NOT_SPECIFIED: &str = "not specified";

/// How the raw `salary` field ends up on the [`Vacancy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SalaryMode {
    /// Always a human-readable string from [`parse_salary`].
    #[default]
    Display,
    /// Keep structured amounts so persisted records answer `salary_*` queries.
    Structured,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    salary_mode: SalaryMode,
}

impl Normalizer {
    pub fn new(salary_mode: SalaryMode) -> Self {
        Self { salary_mode }
    }

    /// Maps API field names onto a `Vacancy`.
    pub fn normalize(&self, raw: &RawRecord) -> Result<Vacancy> {
        let salary = match (self.salary_mode, raw.get("salary")) {
            (SalaryMode::Structured, Some(Value::Object(object))) => {
                Salary::Amount(SalaryRange::from_object(object))
            }
            (_, field) => Salary::Text(parse_salary(field)),
        };

        let vacancy = Vacancy::new(
            raw.str_field("name").unwrap_or_default(),
            raw.str_field("alternate_url").unwrap_or_default(),
            salary,
            raw.nested_str("snippet", "responsibility")
                .unwrap_or_default(),
        )?
        .with_company(raw.nested_str("employer", "name").unwrap_or(UNSPECIFIED))
        .with_city(raw.nested_str("area", "name").unwrap_or(UNSPECIFIED))
        .with_experience(raw.nested_str("experience", "name").unwrap_or(UNSPECIFIED));

        Ok(match raw.get("id") {
            Some(Value::String(id)) if !id.is_empty() => vacancy.with_id(id.clone()),
            Some(Value::Number(id)) => vacancy.with_id(id.to_string()),
            _ => vacancy,
        })
    }
}

/// Normalizes with the default [`SalaryMode::Display`].
pub fn normalize(raw: &RawRecord) -> Result<Vacancy> {
    Normalizer::default().normalize(raw)
}

/// Renders any shape of the API `salary` field as text. Never fails.
pub fn parse_salary(salary: Option<&Value>) -> String {
    match salary {
        Some(Value::Object(object)) => {
            let amount = |key: &str| match object.get(key) {
                None | Some(Value::Null) => AMOUNT_NOT_SPECIFIED.to_string(),
                Some(value) => value_text(value),
            };
            let currency = match object.get("currency") {
                None | Some(Value::Null) => String::new(),
                Some(value) => value_text(value),
            };
            format!("{} - {} {}", amount("from"), amount("to"), currency)
                .trim()
                .to_string()
        }
        Some(value) if is_truthy(value) => value_text(value),
        _ => SALARY_NOT_SPECIFIED.to_string(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
