//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod routes;
mod services;

use crate::config::{AppState, Settings};

#[tokio::main]
async fn main() {
    // RUST_LOG controla o nível; sem ele, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env().expect("Falha ao carregar a configuração.");

    let app_state = AppState::new(&settings)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    let app = routes::app(app_state);

    let listener = TcpListener::bind(&settings.bind_addr)
        .await
        .expect("Falha ao abrir a porta do servidor.");

    tracing::info!("🚀 Servidor escutando em {}", settings.bind_addr);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", settings.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Falha ao iniciar o servidor.");
}
