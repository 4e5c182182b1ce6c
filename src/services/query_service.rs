// src/services/query_service.rs

use std::time::Instant;

use serde_json::{Map, Value};

use crate::{
    common::{
        error::AppError,
        sql_guard::{bind_named_parameters, strip_terminator, validate_query},
    },
    db::RevenueRepository,
    models::query::{SchemaInfo, SqlQueryResponse},
};

#[derive(Clone)]
pub struct QueryService {
    repo: RevenueRepository,
    statement_timeout_ms: u64,
}

impl QueryService {
    pub fn new(repo: RevenueRepository, statement_timeout_ms: u64) -> Self {
        Self {
            repo,
            statement_timeout_ms,
        }
    }

    pub async fn execute_sql(
        &self,
        sql: &str,
        parameters: Option<&Map<String, Value>>,
    ) -> Result<SqlQueryResponse, AppError> {
        let started = Instant::now();

        // 1. Guarda: nada além de leitura chega ao banco
        validate_query(sql)?;

        // 2. Parâmetros nomeados -> posicionais
        let empty = Map::new();
        let prepared = bind_named_parameters(strip_terminator(sql), parameters.unwrap_or(&empty))?;

        // 3. Execução
        let data = self
            .repo
            .run_read_only(&prepared, self.statement_timeout_ms)
            .await?;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            "Consulta SQL executada: {} linhas em {:.1} ms",
            data.len(),
            elapsed_ms
        );

        Ok(SqlQueryResponse {
            success: true,
            columns: columns_of(&data),
            row_count: data.len(),
            data,
            execution_time_ms: elapsed_ms,
            mode: "sql".to_string(),
        })
    }

    pub async fn schema(&self) -> Result<SchemaInfo, AppError> {
        self.repo.schema().await
    }
}

/// Nomes das colunas na ordem do primeiro registro.
pub fn columns_of(data: &[Value]) -> Vec<String> {
    data.first()
        .and_then(Value::as_object)
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}
