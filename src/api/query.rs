//! Natural-language queries and spreadsheet data access.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::{require, AssistantApi};
use crate::error::{ClientError, ClientResult};
use crate::http::RequestOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
}

/// A synced spreadsheet row backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingRow {
    pub tab_name: String,
    pub row_index: u64,
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryResponse {
    pub success: bool,
    pub query: Option<String>,
    pub answer: String,
    pub query_type: String,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub data_found: u64,
    pub supporting_data: Vec<SupportingRow>,
    pub suggestions: Vec<String>,
    pub sheet_id: Option<String>,
    pub error: Option<String>,
    /// Kept for on-demand export of the result set.
    pub raw_data: serde_json::Value,
}

/// Latest row of one tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub tab_name: String,
    pub row_index: Option<u64>,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub field_count: usize,
    pub non_empty_fields: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetDataResponse {
    pub success: bool,
    pub data: Vec<TabSnapshot>,
    pub total_available: usize,
    pub data_source: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub search_terms: Vec<String>,
    #[serde(default)]
    pub tab_names: Vec<String>,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    50
}

impl SearchCriteria {
    pub fn terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_terms: terms.into_iter().map(Into::into).collect(),
            tab_names: Vec::new(),
            limit: default_search_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub success: bool,
    pub results_count: usize,
    pub results_shown: usize,
    pub results: Vec<SupportingRow>,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabStats {
    pub row_count: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabsSummary {
    pub success: bool,
    pub total_tabs: usize,
    pub tab_names: Vec<String>,
    pub tabs_summary: BTreeMap<String, TabStats>,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExportRequest {
    pub query: String,
    #[serde(default)]
    pub raw_data: serde_json::Value,
    #[serde(default)]
    pub formatted_response: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryExportResponse {
    pub success: bool,
    pub sheet_url: Option<String>,
    pub tab_name: Option<String>,
    pub rows_exported: usize,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankCapacityRequest {
    /// Day of the reading, e.g. `25.10.2025`.
    pub date: String,
    /// ETP inlet tank storage in KL.
    pub etp_inlet_tank_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
}

/// Capacity, storage and free space of one tank, in KL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TankReading {
    pub actual_capacity: f64,
    pub storage: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TankTotals {
    pub total_capacity: f64,
    pub total_storage: f64,
    pub total_balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankCapacityResponse {
    pub success: bool,
    pub date: Option<String>,
    pub tanks: BTreeMap<String, TankReading>,
    pub totals: TankTotals,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl AssistantApi {
    /// Ask a free-text question about the synced spreadsheet.
    pub async fn process_natural_language_query(
        &self,
        query: &str,
        sheet_id: Option<&str>,
    ) -> ClientResult<QueryResponse> {
        let query = require("query", query)?;
        let body = QueryRequest {
            query: query.to_string(),
            sheet_id: sheet_id.map(str::to_string),
        };
        self.call("/api/query", RequestOptions::post().json(&body)?).await
    }

    pub async fn get_sheet_data(
        &self,
        tab_name: Option<&str>,
        limit: usize,
    ) -> ClientResult<SheetDataResponse> {
        let options = RequestOptions::get()
            .query_opt("tab_name", tab_name.map(str::trim).filter(|t| !t.is_empty()))
            .query("limit", limit);
        self.call("/api/sheet-data", options).await
    }

    pub async fn search_sheet_data(&self, criteria: &SearchCriteria) -> ClientResult<SearchResponse> {
        let terms: Vec<String> = criteria
            .search_terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Err(ClientError::validation(
                "search_terms",
                "search_terms must contain at least one term",
            ));
        }

        let body = SearchCriteria {
            search_terms: terms,
            ..criteria.clone()
        };
        self.call("/api/search-data", RequestOptions::post().json(&body)?)
            .await
    }

    pub async fn get_tabs_summary(&self) -> ClientResult<TabsSummary> {
        self.call("/api/tabs-summary", RequestOptions::get()).await
    }

    /// Export a previous query's raw data to a new sheet tab.
    pub async fn export_query_results(
        &self,
        query: &str,
        raw_data: &serde_json::Value,
        formatted_response: &str,
    ) -> ClientResult<QueryExportResponse> {
        let query = require("query", query)?;
        let body = QueryExportRequest {
            query: query.to_string(),
            raw_data: raw_data.clone(),
            formatted_response: formatted_response.to_string(),
        };
        self.call("/api/export-query-results", RequestOptions::post().json(&body)?)
            .await
    }

    pub async fn get_etp_tank_capacity(
        &self,
        date: &str,
        etp_inlet_tank_value: f64,
        sheet_id: Option<&str>,
    ) -> ClientResult<TankCapacityResponse> {
        let date = require("date", date)?;
        if !etp_inlet_tank_value.is_finite() || etp_inlet_tank_value < 0.0 {
            return Err(ClientError::validation(
                "etp_inlet_tank_value",
                "etp_inlet_tank_value must be a non-negative number",
            ));
        }

        let body = TankCapacityRequest {
            date: date.to_string(),
            etp_inlet_tank_value,
            sheet_id: sheet_id.map(str::to_string),
        };
        self.call("/api/etp-tank-capacity", RequestOptions::post().json(&body)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_response_tolerates_sparse_body() {
        let response: QueryResponse = serde_json::from_value(json!({
            "success": true,
            "answer": "45",
            "confidence": 0.9,
            "data_found": 1,
            "supporting_data": [
                { "tab_name": "DAILY EXPENSES", "row_index": 3, "data": { "Amount": "45" } }
            ],
            "suggestions": []
        }))
        .unwrap();

        assert_eq!(response.answer, "45");
        assert_eq!(response.supporting_data[0].synced_at, None);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_search_criteria_defaults() {
        let criteria: SearchCriteria =
            serde_json::from_value(json!({ "search_terms": ["473"] })).unwrap();
        assert_eq!(criteria.limit, 50);
        assert!(criteria.tab_names.is_empty());
        assert_eq!(SearchCriteria::terms(["11:00"]).search_terms, vec!["11:00"]);
    }
}
