//! Scripted transport shared by the DAO contract tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use enrollment_core::{ApiClient, ApiError, HttpRequest, HttpResponse, Transport};

pub const BASE_URL: &str = "http://localhost:8000";

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn reply(self, status: u16, body: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn fail(self, error: ApiError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.seen.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left")
    }
}

/// Client sharing `transport`, so the test can still inspect requests.
#[allow(dead_code)]
pub fn client(transport: &Arc<ScriptedTransport>) -> ApiClient<ScriptedTransport> {
    ApiClient::with_shared(BASE_URL, Arc::clone(transport))
}
