//! Plumbing shared by every DAO: URL layout, status checks, JSON encoding and
//! conversion of raw failures into `DaoError`.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{ApiError, DaoError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// A DAO operation: a name for logs and the message shown when the backend
/// gives none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub fallback: &'static str,
}

impl Operation {
    pub const fn new(name: &'static str, fallback: &'static str) -> Self {
        Self { name, fallback }
    }

    /// Convert a raw failure into the user-facing error for this operation.
    pub fn fail(&self, source: ApiError) -> DaoError {
        let err = DaoError::new(source, self.fallback);
        tracing::warn!(
            operation = self.name,
            status = ?err.cause().status(),
            cause = %err.cause(),
            message = err.message(),
            "request failed"
        );
        err
    }

    pub fn check(&self, response: &HttpResponse) -> Result<(), DaoError> {
        check_status(response).map_err(|e| self.fail(e))
    }

    pub fn encode<P: Serialize>(&self, payload: &P) -> Result<String, DaoError> {
        serde_json::to_string(payload)
            .map_err(|e| self.fail(ApiError::Serialization(e.to_string())))
    }
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound {
            body: response.body.clone(),
        });
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

/// One REST collection, `<api_root>/api/<resource>`, plus the transport used
/// to reach it.
#[derive(Debug)]
pub struct ResourceClient<T> {
    base_url: String,
    transport: Arc<T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> ResourceClient<T> {
    pub fn new(api_root: &str, resource: &str, transport: Arc<T>) -> Self {
        Self {
            base_url: format!("{}/api/{resource}", api_root.trim_end_matches('/')),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn item_url(&self, id: i64) -> String {
        format!("{}/{id}", self.base_url)
    }

    pub fn get(&self, url: String) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, url)
    }

    pub fn delete(&self, url: String) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, url)
    }

    pub fn post<P: Serialize>(
        &self,
        url: String,
        payload: &P,
        op: Operation,
    ) -> Result<HttpRequest, DaoError> {
        Ok(HttpRequest::new(HttpMethod::Post, url).with_json(op.encode(payload)?))
    }

    pub fn put<P: Serialize>(
        &self,
        url: String,
        payload: &P,
        op: Operation,
    ) -> Result<HttpRequest, DaoError> {
        Ok(HttpRequest::new(HttpMethod::Put, url).with_json(op.encode(payload)?))
    }
}

impl<T: Transport> ResourceClient<T> {
    /// Run `request`; transport failures become `op`'s error.
    pub async fn send(&self, request: HttpRequest, op: Operation) -> Result<HttpResponse, DaoError> {
        self.transport.execute(request).await.map_err(|e| op.fail(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OP: Operation = Operation::new("test.op", "Impossible");

    fn resource() -> ResourceClient<()> {
        ResourceClient::new("http://localhost:8000/", "Parcours", Arc::new(()))
    }

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(resource().base_url(), "http://localhost:8000/api/Parcours");
        assert_eq!(resource().item_url(4), "http://localhost:8000/api/Parcours/4");
    }

    #[test]
    fn check_maps_404_to_not_found() {
        let err = OP
            .check(&HttpResponse::new(404, r#"{"error":"Parcours introuvable"}"#))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message(), "Parcours introuvable");
    }

    #[test]
    fn check_maps_other_statuses_to_http_error() {
        let err = OP.check(&HttpResponse::new(500, "boom")).unwrap_err();
        assert!(matches!(err.cause(), ApiError::Http { status: 500, .. }));
        assert_eq!(err.message(), "Impossible");
    }

    #[test]
    fn check_accepts_any_2xx() {
        assert!(OP.check(&HttpResponse::new(204, "")).is_ok());
        assert!(OP.check(&HttpResponse::new(201, "{}")).is_ok());
    }

    #[test]
    fn get_and_delete_have_no_body() {
        let req = resource().get(resource().base_url().to_string());
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());

        let req = resource().delete(resource().item_url(1));
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }
}
