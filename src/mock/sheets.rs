//! Read-only views over the synced sheet rows.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::api::{
    SearchCriteria, SearchResponse, SheetDataResponse, SupportingRow, TabSnapshot, TabStats,
    TabsSummary,
};
use crate::mock::store::SheetRow;

const DATA_SOURCE: &str = "synced_database";

fn tab_names(rows: &[SheetRow]) -> Vec<String> {
    let mut names: Vec<String> = rows.iter().map(|r| r.tab_name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// Latest row of each tab, or of `tab` alone.
pub fn latest_rows(rows: &[SheetRow], tab: Option<&str>, limit: usize) -> SheetDataResponse {
    let tabs: Vec<String> = match tab {
        Some(tab) => tab_names(rows)
            .into_iter()
            .filter(|t| t.eq_ignore_ascii_case(tab))
            .collect(),
        None => tab_names(rows),
    };

    if let (Some(tab), true) = (tab, tabs.is_empty()) {
        return SheetDataResponse {
            success: false,
            error: Some(format!("Tab '{}' not found", tab)),
            data_source: Some(DATA_SOURCE.to_string()),
            ..SheetDataResponse::default()
        };
    }

    let data: Vec<TabSnapshot> = tabs
        .iter()
        .filter_map(|name| {
            rows.iter()
                .filter(|r| &r.tab_name == name)
                .max_by_key(|r| r.row_index)
        })
        .take(limit)
        .map(|row| TabSnapshot {
            tab_name: row.tab_name.clone(),
            row_index: Some(row.row_index),
            fields: row.data.clone(),
            field_count: row.data.len(),
            non_empty_fields: row.non_empty_fields(),
        })
        .collect();

    SheetDataResponse {
        success: true,
        message: Some(format!("Retrieved latest data from {} tabs", data.len())),
        total_available: tabs.len(),
        data,
        data_source: Some(DATA_SOURCE.to_string()),
        error: None,
    }
}

pub fn search(rows: &[SheetRow], criteria: &SearchCriteria) -> SearchResponse {
    let terms: Vec<String> = criteria
        .search_terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let in_scope = |row: &SheetRow| {
        criteria.tab_names.is_empty()
            || criteria
                .tab_names
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&row.tab_name))
    };
    let hits: Vec<&SheetRow> = rows
        .iter()
        .filter(|&r| in_scope(r))
        .filter(|r| {
            r.data.values().filter_map(Value::as_str).any(|cell| {
                let cell = cell.to_lowercase();
                terms.iter().any(|t| cell.contains(t.as_str()))
            })
        })
        .collect();

    let results: Vec<SupportingRow> = hits
        .iter()
        .take(criteria.limit)
        .map(|r| SupportingRow {
            tab_name: r.tab_name.clone(),
            row_index: r.row_index,
            data: Value::Object(r.data.clone()),
            synced_at: Some(r.synced_at.clone()),
        })
        .collect();

    SearchResponse {
        success: true,
        results_count: hits.len(),
        results_shown: results.len(),
        message: Some(format!("Found {} matching rows", hits.len())),
        results,
        error: None,
    }
}

pub fn tabs_summary(rows: &[SheetRow]) -> TabsSummary {
    let mut summary: BTreeMap<String, TabStats> = BTreeMap::new();
    for row in rows {
        let stats = summary.entry(row.tab_name.clone()).or_default();
        stats.row_count += 1;
        for column in row.data.keys() {
            if !stats.columns.contains(column) {
                stats.columns.push(column.clone());
            }
        }
    }
    let names: Vec<String> = summary.keys().cloned().collect();

    TabsSummary {
        success: true,
        total_tabs: names.len(),
        message: Some(format!("Found {} tabs", names.len())),
        tab_names: names,
        tabs_summary: summary,
        error: None,
    }
}

/// Row count of exported raw data.
pub fn exported_rows(raw_data: &Value) -> usize {
    match raw_data {
        Value::Array(items) => items.len(),
        Value::Null => 0,
        _ => 1,
    }
}
