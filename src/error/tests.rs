//! Unit tests for error handling

use super::*;
use std::io;

#[cfg(test)]
mod alert_error_tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let alert_error = AlertError::from(json_error);

        match alert_error {
            AlertError::Json(_) => (),
            _ => panic!("Expected Json error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let alert_error = AlertError::from(io_error);

        match alert_error {
            AlertError::Io(_) => (),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_invalid_header_error_conversion() {
        let header_error = reqwest::header::HeaderValue::from_str("invalid\nheader").unwrap_err();
        let alert_error = AlertError::from(header_error);

        match alert_error {
            AlertError::InvalidHeader(_) => (),
            _ => panic!("Expected InvalidHeader error variant"),
        }
    }

    #[test]
    fn test_storage_error_conversion() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let sql_error = conn.execute("SELECT * FROM missing_table", []).unwrap_err();
        let alert_error = AlertError::from(sql_error);

        match alert_error {
            AlertError::Storage(_) => (),
            _ => panic!("Expected Storage error variant"),
        }
    }

    #[test]
    fn test_parse_int_error_conversion() {
        let parse_error = "not_a_number".parse::<u32>().unwrap_err();
        let alert_error = AlertError::from(parse_error);

        match alert_error {
            AlertError::InvalidId(_) => (),
            _ => panic!("Expected InvalidId error variant"),
        }
    }

    #[test]
    fn test_missing_auth_token_error() {
        let error = AlertError::MissingAuthToken {
            env_var: "FPL_ALERTS_TOKEN".to_string(),
        };

        let error_string = error.to_string();
        assert!(error_string.contains("Auth token not provided"));
        assert!(error_string.contains("FPL_ALERTS_TOKEN"));
    }

    #[test]
    fn test_invalid_config_error() {
        let error = AlertError::InvalidConfig {
            name: "FPL_ALERTS_POLL_INTERVAL_MS".to_string(),
            value: "soon".to_string(),
        };

        let error_string = error.to_string();
        assert!(error_string.contains("FPL_ALERTS_POLL_INTERVAL_MS"));
        assert!(error_string.contains("soon"));
    }

    #[test]
    fn test_no_data_error() {
        let error = AlertError::NoData;
        assert_eq!(error.to_string(), "Live stats source returned no data");
    }

    #[test]
    fn test_invalid_event_kind_error() {
        let error = AlertError::InvalidEventKind {
            kind: "corner".to_string(),
        };

        let error_string = error.to_string();
        assert!(error_string.contains("Unknown event kind"));
        assert!(error_string.contains("corner"));
    }

    #[test]
    fn test_worker_unavailable_error() {
        let error = AlertError::WorkerUnavailable {
            path: "/assets/sw.js".to_string(),
        };
        assert!(error.to_string().contains("/assets/sw.js"));
    }

    #[test]
    fn test_permission_denied_error() {
        let error = AlertError::PermissionDenied;
        assert_eq!(error.to_string(), "Notification permission denied");
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let alert_error = AlertError::from(io_error);

        let error_trait: &dyn std::error::Error = &alert_error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_debug_formatting() {
        let error = AlertError::NoData;
        let debug_string = format!("{:?}", error);
        assert_eq!(debug_string, "NoData");
    }

    #[test]
    fn test_result_type_alias_error() {
        fn test_function() -> Result<String> {
            Err(AlertError::PermissionDenied)
        }

        match test_function().unwrap_err() {
            AlertError::PermissionDenied => (),
            _ => panic!("Expected PermissionDenied error"),
        }
    }
}
