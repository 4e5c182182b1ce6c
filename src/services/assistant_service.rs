// src/services/assistant_service.rs

use serde_json::Value;

use crate::models::assistant::{ChatAnswer, ChatReply, GenerateSqlRequest, ServiceEnvelope};

pub const APOLOGY: &str =
    "Sorry, I couldn't answer that right now. Please try again in a moment.";
pub const NO_RECORDS: &str = "No records found matching your query.";

/// Repassa a pergunta ao serviço NL -> SQL externo e traduz o envelope
/// para o que o chat mostra.
#[derive(Clone)]
pub struct AssistantService {
    http_client: reqwest::Client,
    endpoint: String,
}

impl AssistantService {
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/api/v1/generate-sql", base_url.trim_end_matches('/')),
        }
    }

    pub async fn ask(&self, question: &str) -> ChatReply {
        match self.relay(question).await {
            Ok(envelope) => reply_from_envelope(question, envelope),
            Err(e) => {
                tracing::warn!("Serviço NL -> SQL indisponível ({}): {}", self.endpoint, e);
                ChatReply {
                    question: question.to_string(),
                    answer: ChatAnswer::Unavailable {
                        message: APOLOGY.to_string(),
                    },
                    sql: None,
                }
            }
        }
    }

    async fn relay(&self, question: &str) -> Result<ServiceEnvelope, reqwest::Error> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&GenerateSqlRequest { query: question })
            .send()
            .await?
            .error_for_status()?;

        response.json::<ServiceEnvelope>().await
    }
}

pub fn reply_from_envelope(question: &str, envelope: ServiceEnvelope) -> ChatReply {
    let (answer, sql) = match envelope {
        ServiceEnvelope::Scalar { value, label, sql } => (
            ChatAnswer::Scalar {
                formatted: format_scalar(&value),
                value,
                label,
            },
            sql,
        ),
        ServiceEnvelope::Table { columns, rows, sql } => (ChatAnswer::Table { columns, rows }, sql),
        ServiceEnvelope::Empty { message, sql } => (
            ChatAnswer::Empty {
                message: message.unwrap_or_else(|| NO_RECORDS.to_string()),
            },
            sql,
        ),
        ServiceEnvelope::Error { error, sql } => {
            tracing::warn!("Serviço NL -> SQL devolveu erro: {}", error);
            (
                ChatAnswer::Unavailable {
                    message: APOLOGY.to_string(),
                },
                sql,
            )
        }
    };

    ChatReply {
        question: question.to_string(),
        answer,
        sql,
    }
}

/// Número com separador de milhar e no máximo duas casas; demais tipos como texto.
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => group_thousands(&i.to_string()),
            (None, Some(f)) => format_decimal(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "N/A".to_string(),
        other => other.to_string(),
    }
}

fn format_decimal(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let int_part = group_thousands(int_part);
    if frac_part.is_empty() {
        // "-0.00" vira "-0"; o sinal sozinho não faz sentido
        if int_part == "-0" { "0".to_string() } else { int_part }
    } else {
        format!("{int_part}.{frac_part}")
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}
