//! Fire-and-forget client for a local collector process.
//!
//! Delivery is best-effort: a connection failure drops the payload and is
//! logged at most once per client, never surfaced to the capture loop.

use std::time::Duration;

use serde::Serialize;
use ureq::Agent;

use crate::models::Message;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8377";
const REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedTurn<'a> {
    pub platform: &'a str,
    pub source_url: &'a str,
    pub message: &'a Message,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatcherEvent<'a> {
    pub platform: &'a str,
    pub kind: &'a str,
    pub detail: &'a str,
}

pub struct CollectorClient {
    agent: Agent,
    endpoint: String,
    failure_logged: bool,
}

impl CollectorClient {
    pub fn new(endpoint: Option<&str>) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        CollectorClient {
            agent: config.into(),
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).trim_end_matches('/').to_string(),
            failure_logged: false,
        }
    }

    /// POST a newly captured turn to `/turn`.
    pub fn send_turn(&mut self, turn: &CapturedTurn<'_>) {
        self.post("/turn", turn);
    }

    /// POST a lifecycle event to `/event`.
    pub fn send_event(&mut self, event: &WatcherEvent<'_>) {
        self.post("/event", event);
    }

    fn post<T: Serialize>(&mut self, path: &str, body: &T) {
        let url = format!("{}{path}", self.endpoint);
        match self.agent.post(&url).send_json(body) {
            Ok(_) => {}
            Err(err) => {
                if !self.failure_logged {
                    tracing::warn!(url, error = %err, "collector unreachable, further failures silent");
                    self.failure_logged = true;
                }
            }
        }
    }
}
