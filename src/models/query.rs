// src/models/query.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlQueryPayload {
    #[validate(length(min = 1, max = 20000, message = "query must be between 1 and 20000 characters"))]
    #[schema(example = "select * from revenue")]
    pub query: String,

    // Parâmetros nomeados: `:client` no SQL -> { "client": "Acme" }
    #[serde(default)]
    #[schema(value_type = Object)]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlQueryResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub execution_time_ms: f64,
    #[schema(example = "sql")]
    pub mode: String,
}

// --- Metadados do schema (GET /api/schema) ---

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    #[serde(skip)]
    pub table_name: String,
    #[schema(example = "actual_revenue")]
    pub name: String,
    #[schema(example = "real")]
    pub data_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    #[schema(example = "revenue")]
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
    pub indexes: Vec<IndexInfo>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyInfo {
    #[schema(example = "revenue_emp_id_fkey")]
    pub name: String,
    pub constrained_columns: Vec<String>,
    #[schema(example = "employees")]
    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    #[schema(example = "revenue_pkey")]
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaInfo {
    pub tables: Vec<TableSchema>,
}
