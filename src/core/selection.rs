use crate::domain::model::Vacancy;
use std::cmp::Ordering;

/// Orders two vacancies by numeric salary. `None` unless both have one.
pub fn compare_salary(a: &Vacancy, b: &Vacancy) -> Option<Ordering> {
    let left = a.salary().amount()?;
    let right = b.salary().amount()?;
    left.partial_cmp(&right)
}

/// The `n` best-paid vacancies, highest first. Vacancies without a numeric
/// salary rank as zero and keep their relative order.
pub fn top_by_salary(vacancies: &[Vacancy], n: usize) -> Vec<&Vacancy> {
    let mut ranked: Vec<&Vacancy> = vacancies.iter().collect();
    ranked.sort_by(|a, b| {
        let left = a.salary().amount().unwrap_or(0.0);
        let right = b.salary().amount().unwrap_or(0.0);
        right.partial_cmp(&left).unwrap_or(Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

/// Case-insensitive substring search over non-empty descriptions.
pub fn filter_by_description<'a>(vacancies: &'a [Vacancy], keyword: &str) -> Vec<&'a Vacancy> {
    let needle = keyword.to_lowercase();
    vacancies
        .iter()
        .filter(|v| !v.description().is_empty())
        .filter(|v| v.description().to_lowercase().contains(&needle))
        .collect()
}
