// src/models/assistant.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("question must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskQuestionPayload {
    #[validate(
        length(max = 1000, message = "question must be at most 1000 characters"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "What is the total revenue for Disney Streaming?")]
    pub question: String,
}

// Corpo enviado ao serviço NL -> SQL (a pergunta segue sem alterações)
#[derive(Debug, Serialize)]
pub struct GenerateSqlRequest<'a> {
    pub query: &'a str,
}

/// Envelope explícito devolvido pelo serviço NL -> SQL.
/// O formato da resposta é decidido por `kind`, nunca pelo formato das linhas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ServiceEnvelope {
    Scalar {
        value: Value,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        sql: Option<String>,
    },
    Table {
        columns: Vec<String>,
        #[serde(default)]
        rows: Vec<Vec<Value>>,
        #[serde(default)]
        sql: Option<String>,
    },
    Empty {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        sql: Option<String>,
    },
    Error {
        error: String,
        #[serde(default)]
        sql: Option<String>,
    },
}

// O que o painel de chat renderiza
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChatAnswer {
    Scalar {
        #[schema(value_type = Object)]
        value: Value,
        #[schema(example = "1,234,567.89")]
        formatted: String,
        label: Option<String>,
    },
    Table {
        columns: Vec<String>,
        #[schema(value_type = Vec<Vec<Object>>)]
        rows: Vec<Vec<Value>>,
    },
    Empty {
        message: String,
    },
    Unavailable {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub question: String,
    pub answer: ChatAnswer,
    // SQL gerado pelo serviço, quando informado
    pub sql: Option<String>,
}
