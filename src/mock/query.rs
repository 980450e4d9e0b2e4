//! Rule-based interpreter for natural-language questions over sheet rows.
//!
//! Questions are matched against a date and a column name:
//!
//! | Match                                  | Confidence |
//! |----------------------------------------|------------|
//! | one row on the date has the column     | 0.9        |
//! | several rows on the date have it       | 0.75       |
//! | rows on the date, column not found     | 0.6        |
//! | keyword search over all cells          | 0.5        |

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::api::{QueryResponse, SupportingRow};
use crate::mock::store::SheetRow;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{2,4})\b").expect("numeric date regex is valid")
});

static MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b")
        .expect("month-first regex is valid")
});

static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\b")
        .expect("day-first regex is valid")
});

const STOPWORDS: [&str; 16] = [
    "the", "what", "was", "were", "is", "are", "on", "for", "show", "me", "of", "in", "and",
    "how", "much", "data",
];

/// Day and month, with the year when the question names one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMonth {
    pub day: u32,
    pub month: u32,
    pub year: Option<i32>,
}

impl DayMonth {
    fn new(day: u32, month: u32, year: Option<i32>) -> Option<Self> {
        ((1..=31).contains(&day) && (1..=12).contains(&month)).then_some(Self { day, month, year })
    }

    /// Same day and month; years are compared only when both are known.
    pub fn matches(&self, other: &DayMonth) -> bool {
        let year_ok = match (self.year, other.year) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        self.day == other.day && self.month == other.month && year_ok
    }
}

fn expand_year(year: i32) -> i32 {
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

fn month_index(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

/// Parse `d.m.yyyy`, `d/m/yy` or `d-m-yyyy`.
pub fn parse_numeric_date(text: &str) -> Option<DayMonth> {
    let caps = NUMERIC_DATE.captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let year = caps[3].parse().ok().map(expand_year);
    DayMonth::new(day, month, year)
}

/// Find the date a question refers to.
pub fn extract_date(question: &str) -> Option<DayMonth> {
    if let Some(date) = parse_numeric_date(question) {
        return Some(date);
    }
    if let Some(caps) = MONTH_FIRST.captures(question) {
        return DayMonth::new(caps[2].parse().ok()?, month_index(&caps[1])?, None);
    }
    let caps = DAY_FIRST.captures(question)?;
    DayMonth::new(caps[1].parse().ok()?, month_index(&caps[2])?, None)
}

/// Longest column name mentioned in the question.
fn extract_field(question: &str, rows: &[SheetRow]) -> Option<String> {
    let question = question.to_lowercase();
    rows.iter()
        .flat_map(|row| row.data.keys())
        .filter(|column| !column.eq_ignore_ascii_case("date"))
        .filter(|column| question.contains(&column.to_lowercase()))
        .max_by_key(|column| column.len())
        .cloned()
}

fn supporting(row: &SheetRow) -> SupportingRow {
    SupportingRow {
        tab_name: row.tab_name.clone(),
        row_index: row.row_index,
        data: Value::Object(row.data.clone()),
        synced_at: Some(row.synced_at.clone()),
    }
}

fn raw_data(rows: &[&SheetRow]) -> Value {
    Value::Array(rows.iter().map(|r| Value::Object(r.data.clone())).collect())
}

fn found(
    query: &str,
    query_type: &str,
    answer: String,
    confidence: f64,
    rows: &[&SheetRow],
) -> QueryResponse {
    QueryResponse {
        success: true,
        query: Some(query.to_string()),
        answer,
        query_type: query_type.to_string(),
        confidence,
        data_found: rows.len() as u64,
        supporting_data: rows.iter().map(|r| supporting(r)).collect(),
        raw_data: raw_data(rows),
        ..QueryResponse::default()
    }
}

fn describe(row: &SheetRow) -> String {
    row.data
        .iter()
        .filter_map(|(k, v)| v.as_str().filter(|s| !s.is_empty()).map(|s| format!("{}: {}", k, s)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Answer `query` from `rows`.
pub fn interpret(query: &str, rows: &[SheetRow]) -> QueryResponse {
    let date = extract_date(query);
    let field = extract_field(query, rows);

    if let Some(date) = date {
        let on_date: Vec<&SheetRow> = rows
            .iter()
            .filter(|r| r.date().and_then(parse_numeric_date).is_some_and(|d| date.matches(&d)))
            .collect();

        if let Some(field) = &field {
            let hits: Vec<&SheetRow> = on_date
                .iter()
                .copied()
                .filter(|r| r.cell(field).is_some())
                .collect();
            match hits.as_slice() {
                [] => {}
                [row] => {
                    let value = row.cell(field).unwrap_or_default().to_string();
                    return found(query, "field_by_date", value, 0.9, &hits);
                }
                _ => {
                    let values: Vec<String> = hits
                        .iter()
                        .map(|r| format!("{}: {}", r.tab_name, r.cell(field).unwrap_or_default()))
                        .collect();
                    let answer = format!("Found {} values for {}: {}", hits.len(), field, values.join("; "));
                    return found(query, "field_by_date", answer, 0.75, &hits);
                }
            }
        }

        if !on_date.is_empty() {
            let answer = on_date
                .iter()
                .map(|r| format!("{} row {}: {}", r.tab_name, r.row_index, describe(r)))
                .collect::<Vec<_>>()
                .join("\n");
            let mut response = found(query, "data_by_date", answer, 0.6, &on_date);
            response.suggestions = available_fields(&on_date);
            return response;
        }
    }

    let terms = keywords(query);
    let matches: Vec<&SheetRow> = rows
        .iter()
        .filter(|r| {
            r.data.values().filter_map(Value::as_str).any(|cell| {
                let cell = cell.to_lowercase();
                terms.iter().any(|t| cell.contains(t.as_str()))
            })
        })
        .collect();
    if !terms.is_empty() && !matches.is_empty() {
        let answer = format!("Found {} matching rows", matches.len());
        return found(query, "keyword_search", answer, 0.5, &matches);
    }

    QueryResponse {
        success: false,
        query: Some(query.to_string()),
        answer: "I couldn't find data matching your question.".to_string(),
        query_type: "general".to_string(),
        error: Some("No matching data found".to_string()),
        suggestions: vec![
            "Include a date, e.g. 'What is the amount on 12.12.2025?'".to_string(),
            "Name a column, e.g. 'Feed TDS on October 25th'".to_string(),
        ],
        raw_data: Value::Array(Vec::new()),
        ..QueryResponse::default()
    }
}

fn available_fields(rows: &[&SheetRow]) -> Vec<String> {
    let mut fields: Vec<String> = rows
        .iter()
        .flat_map(|r| r.data.keys().cloned())
        .filter(|k| !k.eq_ignore_ascii_case("date"))
        .collect();
    fields.sort();
    fields.dedup();
    fields
        .into_iter()
        .map(|f| format!("Ask about {}", f))
        .collect()
}

fn keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == ':' || c == '.'))
        .map(|w| w.trim_matches('.'))
        .filter(|w| w.len() >= 3 && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::store::seed_rows;

    #[test]
    fn test_extract_date_forms() {
        let dec12 = DayMonth { day: 12, month: 12, year: None };
        assert_eq!(extract_date("What is the amount on December 12th?"), Some(dec12));
        assert_eq!(extract_date("amount on the 12th of dec"), Some(dec12));
        assert_eq!(
            extract_date("Feed TDS on 25/10/25"),
            Some(DayMonth { day: 25, month: 10, year: Some(2025) })
        );
        assert_eq!(extract_date("no date here"), None);
    }

    #[test]
    fn test_unique_field_on_date() {
        let response = interpret("What is the amount on December 12th?", &seed_rows());
        assert!(response.success);
        assert_eq!(response.answer, "45");
        assert_eq!(response.confidence, 0.9);
        assert_eq!(response.data_found, 1);
        assert_eq!(response.supporting_data[0].tab_name, "DAILY EXPENSES");
    }

    #[test]
    fn test_several_rows_on_date() {
        let mut rows = seed_rows();
        let mut petty = rows[0].clone();
        petty.tab_name = "PETTY CASH".to_string();
        rows.push(petty);

        let response = interpret("amount on 12.12.2025", &rows);
        assert_eq!(response.confidence, 0.75);
        assert_eq!(response.data_found, 2);
        assert!(response.answer.starts_with("Found 2 values for Amount"));
    }

    #[test]
    fn test_date_without_field() {
        let response = interpret("Show me everything for 25.10.2025", &seed_rows());
        assert_eq!(response.confidence, 0.6);
        assert_eq!(response.query_type, "data_by_date");
        assert!(response.answer.contains("Feed TDS: 473"));
        assert!(!response.suggestions.is_empty());
    }

    #[test]
    fn test_keyword_fallback() {
        let response = interpret("diesel purchases", &seed_rows());
        assert_eq!(response.confidence, 0.5);
        assert_eq!(response.data_found, 1);
    }

    #[test]
    fn test_nothing_matches() {
        let response = interpret("zz", &seed_rows());
        assert!(!response.success);
        assert_eq!(response.confidence, 0.0);
        assert!(response.error.is_some());
        assert_eq!(response.suggestions.len(), 2);
    }
}
