// src/common/sql_guard.rs

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::common::error::AppError;

// Palavras que nunca podem aparecer numa consulta vinda do dashboard
const DANGEROUS_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "TRUNCATE", "ALTER", "CREATE", "INSERT", "UPDATE", "GRANT", "REVOKE",
    "EXEC", "EXECUTE",
];

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)--.*$").expect("valid regex"));
static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));
static DANGEROUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b({})\b", DANGEROUS_KEYWORDS.join("|"))).expect("valid regex")
});
static READ_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(SELECT|WITH)\s").expect("valid regex"));
static UNION_SELECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)UNION\s+(ALL\s+)?SELECT").expect("valid regex"));

// Literais de string, identificadores entre aspas, comentários e casts `::`
// são consumidos inteiros para nunca virarem parâmetro.
static NAMED_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|--[^\n]*|(?s:/\*.*?\*/)|::|:([A-Za-z_][A-Za-z0-9_]*)"#,
    )
    .expect("valid regex")
});

/// Consulta já reescrita para placeholders posicionais (`$1`, `$2`, ...),
/// com os valores na ordem em que devem ser ligados.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub sql: String,
    pub values: Vec<Value>,
}

/// Remove comentários e normaliza espaços. Usado só para as checagens;
/// o texto executado é o original.
fn normalize(sql: &str) -> String {
    let without_lines = LINE_COMMENT.replace_all(sql, "");
    let without_blocks = BLOCK_COMMENT.replace_all(&without_lines, "");
    without_blocks.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tira `;` finais e espaços; o SQL vai virar subconsulta.
pub fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

/// Aceita apenas consultas de leitura (SELECT / WITH).
pub fn validate_query(sql: &str) -> Result<(), AppError> {
    if sql.trim().is_empty() {
        return Err(AppError::InvalidQuery("Query cannot be empty".into()));
    }

    let normalized = normalize(strip_terminator(sql));

    if let Some(caps) = DANGEROUS.captures(&normalized) {
        let keyword = caps[1].to_uppercase();
        return Err(AppError::InvalidQuery(format!(
            "Dangerous SQL keyword '{keyword}' is not allowed. Only SELECT queries are permitted."
        )));
    }

    if !READ_STATEMENT.is_match(&normalized) {
        return Err(AppError::InvalidQuery("Only SELECT queries are allowed".into()));
    }

    if normalized.matches('(').count() != normalized.matches(')').count() {
        return Err(AppError::InvalidQuery("Unbalanced parentheses in query".into()));
    }

    if normalized.contains(';') {
        return Err(AppError::InvalidQuery(
            "Multiple statements are not allowed".into(),
        ));
    }

    if normalized.contains("/*") || UNION_SELECT.is_match(&normalized) {
        return Err(AppError::InvalidQuery(
            "Potentially malicious SQL pattern detected".into(),
        ));
    }

    Ok(())
}

/// Reescreve `:nome` para `$n`. Sem parâmetros o SQL passa intacto
/// (evita mexer em literais como '10:30').
/// `null` entra como `NULL` literal: ligado, o Postgres o tiparia como `text`.
pub fn bind_named_parameters(
    sql: &str,
    parameters: &Map<String, Value>,
) -> Result<PreparedQuery, AppError> {
    if parameters.is_empty() {
        return Ok(PreparedQuery {
            sql: sql.to_string(),
            values: Vec::new(),
        });
    }

    let mut order: Vec<String> = Vec::new();
    let mut missing: Option<String> = None;

    let rewritten = NAMED_PARAM.replace_all(sql, |caps: &Captures<'_>| {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            return caps[0].to_string();
        };

        match parameters.get(name) {
            None => {
                missing.get_or_insert_with(|| name.to_string());
                return caps[0].to_string();
            }
            Some(Value::Null) => return "NULL".to_string(),
            Some(_) => {}
        }

        // O mesmo nome repetido reaproveita o mesmo placeholder
        let position = match order.iter().position(|n| n == name) {
            Some(idx) => idx + 1,
            None => {
                order.push(name.to_string());
                order.len()
            }
        };
        format!("${position}")
    });

    if let Some(name) = missing {
        return Err(AppError::MissingParameter(name));
    }

    let values = order
        .iter()
        .map(|name| parameters.get(name).cloned().unwrap_or(Value::Null))
        .collect();

    Ok(PreparedQuery {
        sql: rewritten.into_owned(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn accepts_dashboard_queries() {
        assert!(validate_query("select * from revenue").is_ok());
        assert!(validate_query(
            "\n  SELECT month, SUM(actual_revenue) AS revenue\n  FROM revenue\n  GROUP BY month\n  ORDER BY month\n"
        )
        .is_ok());
        assert!(validate_query("WITH t AS (SELECT customer FROM revenue) SELECT * FROM t;").is_ok());
    }

    #[test]
    fn rejects_write_statements() {
        for sql in [
            "DROP TABLE revenue",
            "select * from revenue; delete from revenue",
            "SELECT 1 WHERE 1 = 1 AND EXISTS (INSERT INTO x VALUES (1))",
            "update revenue set actual_revenue = 0",
        ] {
            let err = validate_query(sql).unwrap_err();
            assert!(matches!(err, AppError::InvalidQuery(_)), "{sql}");
        }
    }

    #[test]
    fn keyword_check_respects_word_boundaries() {
        assert!(validate_query("SELECT created_at, last_update_by FROM revenue").is_ok());
    }

    #[test]
    fn rejects_empty_and_non_select() {
        assert!(validate_query("   ").is_err());
        assert!(validate_query("EXPLAIN SELECT 1").is_err());
    }

    #[test]
    fn rejects_unbalanced_and_suspicious_sql() {
        assert!(validate_query("SELECT (1 FROM revenue").is_err());
        assert!(validate_query("SELECT a FROM t UNION SELECT b FROM u").is_err());
        assert!(validate_query("SELECT 1; SELECT 2").is_err());
        assert!(validate_query("SELECT 1 /* unterminated").is_err());
    }

    #[test]
    fn comments_are_ignored_by_checks() {
        assert!(validate_query("SELECT customer FROM revenue -- drop everything").is_ok());
        assert!(validate_query("SELECT /* delete */ customer FROM revenue").is_ok());
    }

    #[test]
    fn strips_trailing_terminators() {
        assert_eq!(strip_terminator("select 1 ;; \n"), "select 1");
    }

    #[test]
    fn rewrites_named_parameters_in_order() {
        let prepared = bind_named_parameters(
            "SELECT * FROM revenue WHERE customer = :client AND actual_revenue > :min OR customer = :client",
            &params(json!({ "min": 1000, "client": "Acme", "unused": true })),
        )
        .unwrap();

        assert_eq!(
            prepared.sql,
            "SELECT * FROM revenue WHERE customer = $1 AND actual_revenue > $2 OR customer = $1"
        );
        assert_eq!(prepared.values, vec![json!("Acme"), json!(1000)]);
    }

    #[test]
    fn casts_and_literals_are_not_parameters() {
        let prepared = bind_named_parameters(
            "SELECT month::text, ':skip' FROM revenue WHERE customer = :c",
            &params(json!({ "c": "Acme" })),
        )
        .unwrap();

        assert_eq!(prepared.sql, "SELECT month::text, ':skip' FROM revenue WHERE customer = $1");
    }

    #[test]
    fn missing_parameter_is_reported() {
        let err = bind_named_parameters(
            "SELECT * FROM revenue WHERE customer = :client",
            &params(json!({ "other": 1 })),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::MissingParameter(name) if name == "client"));
    }

    #[test]
    fn comments_and_quoted_identifiers_are_not_parameters() {
        let prepared = bind_named_parameters(
            "select \"at:desk\" from revenue where customer = :c -- compare with :other\n\
             /* or :another\n spanning lines */ and skill <> :c",
            &params(json!({ "c": "B" })),
        )
        .unwrap();

        assert_eq!(
            prepared.sql,
            "select \"at:desk\" from revenue where customer = $1 -- compare with :other\n\
             /* or :another\n spanning lines */ and skill <> $1"
        );
        assert_eq!(prepared.values, vec![json!("B")]);
    }

    #[test]
    fn null_parameter_becomes_untyped_literal() {
        let prepared = bind_named_parameters(
            "select * from revenue where customer = :c and actual_revenue > coalesce(:m, 0)",
            &params(json!({ "m": null, "c": "Acme" })),
        )
        .unwrap();

        assert_eq!(
            prepared.sql,
            "select * from revenue where customer = $1 and actual_revenue > coalesce(NULL, 0)"
        );
        assert_eq!(prepared.values, vec![json!("Acme")]);
    }

    #[test]
    fn without_parameters_sql_is_untouched() {
        let sql = "SELECT '10:30' AS slot";
        let prepared = bind_named_parameters(sql, &Map::new()).unwrap();
        assert_eq!(prepared.sql, sql);
        assert!(prepared.values.is_empty());
    }
}
