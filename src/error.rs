use thiserror::Error;

/// Failures of the persisted form state store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures talking to the remote catalog and create endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_names_status_and_url() {
        let err = ApiError::Status { status: 503, url: "http://localhost/products/create".to_string() };
        assert_eq!(err.to_string(), "Unexpected status 503 from http://localhost/products/create");
    }

    #[test]
    fn test_store_error_from_io() {
        let err: StoreError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(err.to_string(), "IO error: denied");
    }

    #[test]
    fn test_errors_box_into_dyn_error() {
        fn startup() -> Result<(), Box<dyn std::error::Error>> {
            Err(ApiError::Status { status: 500, url: "u".to_string() })?;
            Ok(())
        }
        let err = startup().unwrap_err();
        assert!(err.downcast_ref::<ApiError>().is_some());
    }
}
