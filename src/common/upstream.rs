// src/common/upstream.rs

use serde_json::Value;

use crate::common::error::AppError;

/// Extrai a mensagem de erro de uma resposta não-2xx.
/// Ordem: `message` → `details` → `error` (texto ou `error.message`) → texto cru → linha de status.
pub fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let candidates = [
            json.get("message"),
            json.get("details"),
            json.get("error"),
            json.get("error").and_then(|e| e.get("message")),
        ];
        if let Some(msg) = candidates
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str().filter(|s| !s.trim().is_empty()))
        {
            return msg.trim().to_string();
        }
    }

    let raw = body.trim();
    if raw.is_empty() {
        format!("HTTP {status}")
    } else {
        raw.to_string()
    }
}

/// Converte uma resposta HTTP em `Ok(response)` ou `AppError::Upstream` com a mensagem extraída.
pub async fn ensure_success(service: &'static str, response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(status.as_u16(), &body);
    tracing::warn!("Serviço {} respondeu {}: {}", service, status, message);

    Err(AppError::Upstream {
        service,
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_message_then_details() {
        assert_eq!(
            extract_error_message(400, r#"{"message":"bad size","details":"size > 4096"}"#),
            "bad size"
        );
        assert_eq!(extract_error_message(400, r#"{"details":"size > 4096"}"#), "size > 4096");
    }

    #[test]
    fn understands_nested_google_errors() {
        let body = r#"{"error":{"code":403,"message":"API key not valid"}}"#;
        assert_eq!(extract_error_message(403, body), "API key not valid");
        assert_eq!(extract_error_message(500, r#"{"error":"boom"}"#), "boom");
    }

    #[test]
    fn falls_back_to_raw_text_and_status() {
        assert_eq!(extract_error_message(502, "  upstream exploded \n"), "upstream exploded");
        assert_eq!(extract_error_message(502, ""), "HTTP 502");
        assert_eq!(extract_error_message(500, r#"{"message":""}"#), r#"{"message":""}"#);
    }
}
