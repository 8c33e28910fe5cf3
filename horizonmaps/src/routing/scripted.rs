//! Routing client that replays canned answers.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::{BoxFuture, RouteRequest, RoutingClient, RoutingError};
use crate::route::RouteModel;

/// Answers route requests from a queue of prepared results.
///
/// Once the queue is drained, the last answer is repeated if
/// [`ScriptedRoutingClient::repeat_last`] was set; otherwise the client
/// answers `NoRouteFound`. Every request is recorded for inspection.
#[derive(Default)]
pub struct ScriptedRoutingClient {
    answers: Mutex<VecDeque<Result<RouteModel, RoutingError>>>,
    fallback: Mutex<Option<Result<RouteModel, RoutingError>>>,
    repeat_last: bool,
    delay: Option<Duration>,
    requests: Mutex<Vec<RouteRequest>>,
}

impl ScriptedRoutingClient {
    /// Create an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer.
    pub fn with_answer(self, answer: Result<RouteModel, RoutingError>) -> Self {
        self.push(answer);
        self
    }

    /// Keep returning the final answer once the queue is empty.
    pub fn repeat_last(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Delay every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue an answer on a shared client.
    pub fn push(&self, answer: Result<RouteModel, RoutingError>) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(answer);
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn next_answer(&self, request: &RouteRequest) -> Result<RouteModel, RoutingError> {
        let no_route = || RoutingError::NoRouteFound {
            origin: request.origin,
            destination: request.destination,
        };

        let queued = self.answers.lock().ok().and_then(|mut a| a.pop_front());
        match queued {
            Some(answer) => {
                if self.repeat_last {
                    if let Ok(mut fallback) = self.fallback.lock() {
                        *fallback = Some(answer.clone());
                    }
                }
                answer
            }
            None => self
                .fallback
                .lock()
                .ok()
                .and_then(|f| f.clone())
                .unwrap_or_else(|| Err(no_route())),
        }
    }
}

impl RoutingClient for ScriptedRoutingClient {
    fn route(&self, request: &RouteRequest) -> BoxFuture<'_, Result<RouteModel, RoutingError>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let answer = self.next_answer(request);
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            answer
        })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
