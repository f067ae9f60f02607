//! Runs remote requests off the UI thread.
//!
//! Each request gets its own thread and reports back exactly once through the
//! event channel. Requests are neither cancelled nor retried.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::application::{ApiEvent, ApiRequest};
use super::api::LoanApi;

pub struct RequestWorker {
    api: Arc<dyn LoanApi>,
    events: Sender<ApiEvent>,
}

impl RequestWorker {
    pub fn new(api: Arc<dyn LoanApi>, events: Sender<ApiEvent>) -> Self {
        Self { api, events }
    }

    pub fn dispatch(&self, request: ApiRequest) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        thread::spawn(move || {
            let event = execute(api.as_ref(), request);
            // The receiver is gone only when the UI has exited.
            let _ = events.send(event);
        });
    }
}

/// Performs one request synchronously and converts the outcome into an event.
pub fn execute(api: &dyn LoanApi, request: ApiRequest) -> ApiEvent {
    match request {
        ApiRequest::FetchWorkplaces => match api.fetch_workplaces() {
            Ok(workplaces) => ApiEvent::WorkplacesLoaded(workplaces),
            Err(e) => ApiEvent::WorkplacesFailed(e.to_string()),
        },
        ApiRequest::CreateApplication {
            title,
            personal,
            params,
        } => match api.create_application(&title) {
            Ok(()) => ApiEvent::ApplicationCreated { personal, params },
            Err(e) => ApiEvent::ApplicationFailed(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoanParameters, PersonalData, Workplace};
    use crate::error::ApiError;
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeApi {
        fail: bool,
        titles: Mutex<Vec<String>>,
    }

    impl LoanApi for FakeApi {
        fn fetch_workplaces(&self) -> Result<Vec<Workplace>, ApiError> {
            if self.fail {
                return Err(ApiError::Status { status: 503, url: "catalog".to_string() });
            }
            Ok(vec![Workplace {
                slug: "laptops".to_string(),
                name: "Laptops".to_string(),
                url: "https://example.test/laptops".to_string(),
            }])
        }

        fn create_application(&self, title: &str) -> Result<(), ApiError> {
            self.titles.lock().unwrap().push(title.to_string());
            if self.fail {
                return Err(ApiError::Status { status: 500, url: "create".to_string() });
            }
            Ok(())
        }
    }

    fn create_request() -> ApiRequest {
        ApiRequest::CreateApplication {
            title: "Ivan Petrov".to_string(),
            personal: PersonalData::default(),
            params: LoanParameters::default(),
        }
    }

    #[test]
    fn test_execute_success() {
        let api = FakeApi::default();
        match execute(&api, ApiRequest::FetchWorkplaces) {
            ApiEvent::WorkplacesLoaded(list) => assert_eq!(list[0].name, "Laptops"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(execute(&api, create_request()), ApiEvent::ApplicationCreated { .. }));
        assert_eq!(api.titles.lock().unwrap().as_slice(), ["Ivan Petrov"]);
    }

    #[test]
    fn test_execute_failure() {
        let api = FakeApi { fail: true, ..FakeApi::default() };
        match execute(&api, ApiRequest::FetchWorkplaces) {
            ApiEvent::WorkplacesFailed(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(execute(&api, create_request()), ApiEvent::ApplicationFailed(_)));
    }

    #[test]
    fn test_dispatch_reports_on_channel() {
        let (tx, rx) = mpsc::channel();
        let worker = RequestWorker::new(Arc::new(FakeApi::default()), tx);
        worker.dispatch(ApiRequest::FetchWorkplaces);
        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(event, ApiEvent::WorkplacesLoaded(_)));
    }
}
