// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::RevenueRepository,
    services::{AssistantService, DashboardService, QueryService},
};

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub nl_sql_service_url: String,
    pub nl_sql_timeout_secs: u64,
    pub sql_statement_timeout_ms: u64,
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, env::var(key).ok(), default)
}

// Separado de `var_or` para testar sem mexer no ambiente do processo
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} tem um valor inválido: '{raw}'")),
        None => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:8000".to_string())?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            nl_sql_service_url: var_or(
                "NL_SQL_SERVICE_URL",
                "http://127.0.0.1:8001".to_string(),
            )?,
            nl_sql_timeout_secs: var_or("NL_SQL_TIMEOUT_SECS", 30)?,
            sql_statement_timeout_ms: var_or("SQL_STATEMENT_TIMEOUT_MS", 15_000)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub dashboard_service: DashboardService,
    pub query_service: QueryService,
    pub assistant_service: AssistantService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_pool(db_pool, settings)
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, settings: &Settings) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.nl_sql_timeout_secs))
            .build()
            .context("Falha ao criar o cliente HTTP")?;

        let revenue_repo = RevenueRepository::new(db_pool.clone());

        Ok(Self {
            dashboard_service: DashboardService::new(revenue_repo.clone()),
            query_service: QueryService::new(revenue_repo, settings.sql_statement_timeout_ms),
            assistant_service: AssistantService::new(http_client, &settings.nl_sql_service_url),
            db_pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_and_rejects_garbage() {
        assert_eq!(parse_or("DB_MAX_CONNECTIONS", None, 7u32).unwrap(), 7);
        assert_eq!(parse_or("DB_MAX_CONNECTIONS", Some(" 42 ".into()), 7u32).unwrap(), 42);

        let err = parse_or("DB_MAX_CONNECTIONS", Some("five".into()), 7u32).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }
}
