//! HTTP client for the workplace catalog and the application endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::domain::Workplace;
use crate::error::ApiError;

/// Remote operations the wizard depends on.
pub trait LoanApi: Send + Sync {
    /// Fetches the selectable workplaces from the catalog endpoint.
    fn fetch_workplaces(&self) -> Result<Vec<Workplace>, ApiError>;

    /// Posts a new application. Only the response status matters.
    fn create_application(&self, title: &str) -> Result<(), ApiError>;
}

#[derive(Serialize)]
struct CreateApplicationBody<'a> {
    title: &'a str,
}

pub struct HttpLoanApi {
    client: Client,
    catalog_url: String,
    create_url: String,
}

impl HttpLoanApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            catalog_url: config.catalog_url.clone(),
            create_url: config.create_url.clone(),
        })
    }
}

fn ensure_success(response: &reqwest::blocking::Response, url: &str) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

impl LoanApi for HttpLoanApi {
    fn fetch_workplaces(&self) -> Result<Vec<Workplace>, ApiError> {
        tracing::debug!(url = %self.catalog_url, "Fetching workplaces");
        let response = self.client.get(&self.catalog_url).send()?;
        ensure_success(&response, &self.catalog_url)?;
        let workplaces: Vec<Workplace> = response.json()?;
        tracing::info!(count = workplaces.len(), "Fetched workplaces");
        Ok(workplaces)
    }

    fn create_application(&self, title: &str) -> Result<(), ApiError> {
        tracing::debug!(url = %self.create_url, title, "Submitting application");
        let response = self
            .client
            .post(&self.create_url)
            .json(&CreateApplicationBody { title })
            .send()?;
        ensure_success(&response, &self.create_url)?;
        tracing::info!(status = response.status().as_u16(), "Application accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_body_shape() {
        let body = serde_json::to_value(CreateApplicationBody { title: "Ivan Petrov" }).unwrap();
        assert_eq!(body, serde_json::json!({ "title": "Ivan Petrov" }));
    }

    #[test]
    fn test_workplace_catalog_decodes() {
        let json = r#"[
            {"slug": "beauty", "name": "Beauty", "url": "https://dummyjson.com/products/category/beauty"},
            {"slug": "laptops", "name": "Laptops", "url": "https://dummyjson.com/products/category/laptops"}
        ]"#;
        let workplaces: Vec<Workplace> = serde_json::from_str(json).unwrap();
        assert_eq!(workplaces.len(), 2);
        assert_eq!(workplaces[1].slug, "laptops");
        assert_eq!(workplaces[1].name, "Laptops");
    }

    #[test]
    fn test_client_builds_from_config() {
        let api = HttpLoanApi::new(&ApiConfig::default()).unwrap();
        assert_eq!(api.catalog_url, "https://dummyjson.com/products/categories");
        assert_eq!(api.create_url, "https://dummyjson.com/products/add");
    }
}
