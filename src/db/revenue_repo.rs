// src/db/revenue_repo.rs

use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::PgPool;

use crate::{
    common::{error::AppError, sql_guard::PreparedQuery},
    models::{
        query::{ColumnInfo, ForeignKeyInfo, IndexInfo, SchemaInfo, TableSchema},
        revenue::RevenueRow,
    },
};

// O repositório da tabela `revenue` e das consultas livres do dashboard
#[derive(Clone)]
pub struct RevenueRepository {
    pool: PgPool,
}

impl RevenueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Carga completa (o equivalente ao antigo `select * from revenue`)
    pub async fn fetch_all(&self) -> Result<Vec<RevenueRow>, AppError> {
        let rows = sqlx::query_as::<_, RevenueRow>(
            r#"
            SELECT
                customer,
                designation,
                skill,
                project_manager AS manager,
                month,
                actual_revenue::float8 AS actual_revenue
            FROM revenue
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    // 2. Consulta livre, já validada pela guarda.
    // Roda numa transação somente leitura com timeout, e o Postgres devolve
    // as linhas já como um array JSON (ordem das colunas preservada).
    pub async fn run_read_only(
        &self,
        prepared: &PreparedQuery,
        statement_timeout_ms: u64,
    ) -> Result<Vec<Value>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;

        // SET não aceita parâmetro ligado; o valor é numérico e vem da configuração
        sqlx::query(&format!("SET LOCAL statement_timeout = {statement_timeout_ms}"))
            .execute(&mut *tx)
            .await?;

        let wrapped = json_wrapped(&prepared.sql);

        // `null` já saiu como literal na reescrita; aqui só valores tipados
        let mut query = sqlx::query_scalar::<_, Value>(&wrapped);
        for value in &prepared.values {
            query = match value {
                Value::Bool(b) => query.bind(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => query.bind(i),
                    None => query.bind(n.as_f64()),
                },
                Value::String(s) => query.bind(s.clone()),
                other => query.bind(sqlx::types::Json(other.clone())),
            };
        }

        let result = query
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                // Erro do próprio SQL do usuário vira 400, não 500
                if let Some(db_err) = e.as_database_error() {
                    return AppError::QueryFailed(db_err.message().to_string());
                }
                AppError::DatabaseError(e)
            })?;

        tx.commit().await?;

        match result {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    // 3. Metadados: tabelas públicas, colunas e chaves primárias
    pub async fn schema(&self) -> Result<SchemaInfo, AppError> {
        let columns = sqlx::query_as::<_, ColumnInfo>(
            r#"
            SELECT
                c.table_name::text AS table_name,
                c.column_name::text AS name,
                c.data_type::text AS data_type,
                (c.is_nullable = 'YES') AS nullable,
                c.column_default::text AS default_value
            FROM information_schema.columns c
            JOIN information_schema.tables t
              ON t.table_schema = c.table_schema
             AND t.table_name = c.table_name
            WHERE c.table_schema = 'public'
              AND t.table_type = 'BASE TABLE'
            ORDER BY c.table_name, c.ordinal_position
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        let primary_keys = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT tc.table_name::text, kcu.column_name::text
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
            WHERE tc.table_schema = 'public'
              AND tc.constraint_type = 'PRIMARY KEY'
            ORDER BY tc.table_name, kcu.ordinal_position
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        let foreign_keys = sqlx::query_as::<_, ForeignKeyRow>(
            r#"
            SELECT
                tc.table_name::text,
                tc.constraint_name::text,
                kcu.column_name::text,
                ccu.table_name::text,
                ccu.column_name::text
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
              ON ccu.constraint_name = tc.constraint_name
             AND ccu.table_schema = tc.table_schema
            WHERE tc.table_schema = 'public'
              AND tc.constraint_type = 'FOREIGN KEY'
            ORDER BY tc.table_name, tc.constraint_name, kcu.ordinal_position
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        let indexes = sqlx::query_as::<_, IndexRow>(
            r#"
            SELECT tablename::text, indexname::text, indexdef
            FROM pg_indexes
            WHERE schemaname = 'public'
            ORDER BY tablename, indexname
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        Ok(assemble_schema(columns, primary_keys, foreign_keys, indexes))
    }
}

// (tabela, constraint, coluna, tabela referida, coluna referida)
type ForeignKeyRow = (String, String, String, String, String);
// (tabela, índice, definição)
type IndexRow = (String, String, String);

/// Envolve o SQL do usuário para o Postgres devolver as linhas como array JSON.
/// O fecha-parênteses fica em linha própria: um `--` no fim da consulta não o engole.
fn json_wrapped(sql: &str) -> String {
    format!("SELECT COALESCE(json_agg(q), '[]'::json) FROM (\n{sql}\n) AS q")
}

/// Colunas de um `CREATE [UNIQUE] INDEX ... USING btree (a, "b")`.
fn index_columns(indexdef: &str) -> Vec<String> {
    let Some(start) = indexdef.find('(') else {
        return Vec::new();
    };

    // Vai até o parêntese que fecha o primeiro; ignora um `WHERE (...)` de índice parcial
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in indexdef[start..].chars() {
        match ch {
            '(' => {
                depth += 1;
                if depth == 1 {
                    continue;
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    columns.push(current);
                    return columns
                        .iter()
                        .map(|col| col.trim().trim_matches('"').to_string())
                        .filter(|col| !col.is_empty())
                        .collect();
                }
            }
            ',' if depth == 1 => {
                columns.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }

    Vec::new()
}

fn assemble_schema(
    columns: Vec<ColumnInfo>,
    primary_keys: Vec<(String, String)>,
    foreign_keys: Vec<ForeignKeyRow>,
    indexes: Vec<IndexRow>,
) -> SchemaInfo {
    let mut tables: BTreeMap<String, TableSchema> = BTreeMap::new();

    for column in columns {
        tables
            .entry(column.table_name.clone())
            .or_insert_with(|| TableSchema {
                name: column.table_name.clone(),
                columns: Vec::new(),
                primary_keys: Vec::new(),
                foreign_keys: Vec::new(),
                indexes: Vec::new(),
            })
            .columns
            .push(column);
    }

    for (table, column) in primary_keys {
        if let Some(schema) = tables.get_mut(&table) {
            schema.primary_keys.push(column);
        }
    }

    // FK composta chega como várias linhas com o mesmo nome de constraint
    for (table, constraint, column, referred_table, referred_column) in foreign_keys {
        let Some(schema) = tables.get_mut(&table) else {
            continue;
        };

        match schema.foreign_keys.iter_mut().find(|fk| fk.name == constraint) {
            Some(fk) => {
                if !fk.constrained_columns.contains(&column) {
                    fk.constrained_columns.push(column);
                }
                if !fk.referred_columns.contains(&referred_column) {
                    fk.referred_columns.push(referred_column);
                }
            }
            None => schema.foreign_keys.push(ForeignKeyInfo {
                name: constraint,
                constrained_columns: vec![column],
                referred_table,
                referred_columns: vec![referred_column],
            }),
        }
    }

    for (table, name, indexdef) in indexes {
        if let Some(schema) = tables.get_mut(&table) {
            schema.indexes.push(IndexInfo {
                name,
                columns: index_columns(&indexdef),
                unique: indexdef.trim_start().to_uppercase().starts_with("CREATE UNIQUE"),
            });
        }
    }

    SchemaInfo {
        tables: tables.into_values().collect(),
    }
}
