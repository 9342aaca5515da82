#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cryptotab_core::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// In-memory transport: answers by URL path suffix and records every request.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<(String, Result<HttpResponse, HttpError>)>>,
    fallback: Mutex<Option<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every request gets the same answer.
    pub fn always(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
        let client = Self::new();
        *client.fallback.lock().expect("fallback lock") = Some(response);
        client
    }

    pub fn respond(self: &Arc<Self>, path_suffix: &str, response: Result<HttpResponse, HttpError>) {
        self.routes
            .lock()
            .expect("routes lock")
            .push((path_suffix.to_owned(), response));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().iter().map(HttpRequest::full_url).collect()
    }

    fn answer(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let routes = self.routes.lock().expect("routes lock");
        let scripted = routes.iter().find(|(suffix, _)| url.ends_with(suffix.as_str()));
        if let Some((_, response)) = scripted {
            return response.clone();
        }

        self.fallback
            .lock()
            .expect("fallback lock")
            .clone()
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "{}")))
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.answer(&request.url);
        self.requests.lock().expect("requests lock").push(request);
        Box::pin(async move { response })
    }
}

pub fn ok(body: impl Into<String>) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::ok_json(body))
}

pub fn status(code: u16) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::new(code, r#"{"status":{"error_message":"upstream"}}"#))
}

pub fn transport_error(message: &str) -> Result<HttpResponse, HttpError> {
    Err(HttpError::new(message))
}
