//! HTTP utilities for the notifications backend

use crate::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

/// Build JSON headers carrying `Authorization: Bearer <token>`.
pub fn bearer_header_map(token: &str) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json"));
    h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let bearer = format!("Bearer {}", token.trim());
    h.insert(AUTHORIZATION, HeaderValue::from_str(&bearer)?);
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_map() {
        let headers = bearer_header_map("abc123").unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_bearer_header_map_trims_token() {
        let headers = bearer_header_map("  abc123\n").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
    }

    #[test]
    fn test_bearer_header_map_rejects_control_characters() {
        let result = bearer_header_map("abc\n123");
        assert!(result.is_err());
    }
}
