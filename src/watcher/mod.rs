//! Continuous-capture state machine.
//!
//! The watcher is driven by injected [`MutationEvent`]s rather than by an
//! observer callback, so state transitions are testable with synthetic
//! clocks. Debounce deadline and the seen-turn hash set are owned fields.
//!
//! States: Idle -> Observing -> Debouncing -> Extracting -> Observing.

pub mod collector;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use url::Url;

use crate::classify::ClassifierThresholds;
use crate::extract::Extractor;
use crate::models::{ConversationDocument, Message};
use crate::normalize;
use crate::platforms::SelectorConfig;

pub use collector::{CapturedTurn, CollectorClient, WatcherEvent};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Observing,
    Debouncing,
    Extracting,
}

/// One observed change to the watched page, timestamped by the caller.
#[derive(Debug, Clone)]
pub struct MutationEvent {
    pub at: Instant,
    /// Nodes added in this batch; zero-add batches (attribute churn) do not
    /// reset the debounce deadline.
    pub added_nodes: usize,
}

/// Watches a conversation for appended turns and emits only turns not seen
/// before in this session.
pub struct TurnWatcher {
    config: SelectorConfig,
    thresholds: ClassifierThresholds,
    source_url: Option<Url>,
    state: WatcherState,
    debounce: Duration,
    deadline: Option<Instant>,
    seen: HashSet<[u8; 32]>,
    collector: Option<CollectorClient>,
}

impl TurnWatcher {
    pub fn new(config: SelectorConfig, source_url: Option<Url>) -> Self {
        TurnWatcher {
            config,
            thresholds: ClassifierThresholds::default(),
            source_url,
            state: WatcherState::Idle,
            debounce: DEFAULT_DEBOUNCE,
            deadline: None,
            seen: HashSet::new(),
            collector: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Attach a collector: lifecycle events go out on start/stop and freshly
    /// captured turns are delivered as they are found.
    pub fn with_collector(mut self, client: CollectorClient) -> Self {
        self.collector = Some(client);
        self
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Begin observing. A no-op unless idle.
    pub fn start(&mut self) {
        if self.state == WatcherState::Idle {
            self.state = WatcherState::Observing;
            self.notify("started");
        }
    }

    /// Stop observing and clear transient state. The seen-set survives so a
    /// restart within one session does not re-emit old turns.
    pub fn stop(&mut self) {
        if self.state != WatcherState::Idle {
            self.notify("stopped");
        }
        self.state = WatcherState::Idle;
        self.deadline = None;
    }

    fn notify(&mut self, kind: &str) {
        if let Some(client) = self.collector.as_mut() {
            client.send_event(&WatcherEvent {
                platform: self.config.platform,
                kind,
                detail: self.source_url.as_ref().map(Url::as_str).unwrap_or(""),
            });
        }
    }

    /// Feed one mutation batch. Content mutations (re)arm the debounce
    /// deadline; attribute-only churn leaves it alone.
    pub fn on_mutation(&mut self, event: MutationEvent) {
        match self.state {
            WatcherState::Idle | WatcherState::Extracting => {}
            WatcherState::Observing => {
                if event.added_nodes > 0 {
                    self.state = WatcherState::Debouncing;
                    self.deadline = Some(event.at + self.debounce);
                }
            }
            WatcherState::Debouncing => {
                if event.added_nodes > 0 {
                    self.deadline = Some(event.at + self.debounce);
                }
            }
        }
    }

    /// Advance the clock. When the debounce deadline has passed, re-extracts
    /// the page and returns the turns not seen before, oldest first. Returns
    /// an empty vec in every other situation, including extraction failure
    /// (the page may be mid-render; the next quiet period retries).
    pub fn tick(&mut self, now: Instant, html: &str) -> Vec<Message> {
        let due = matches!(self.state, WatcherState::Debouncing)
            && self.deadline.is_some_and(|deadline| now >= deadline);
        if !due {
            return Vec::new();
        }

        self.state = WatcherState::Extracting;
        self.deadline = None;

        let fresh = self.capture(html);

        if let Some(client) = self.collector.as_mut() {
            let platform = self.config.platform;
            let source_url = self.source_url.as_ref().map(Url::as_str).unwrap_or("");
            for message in &fresh {
                client.send_turn(&CapturedTurn { platform, source_url, message });
            }
        }

        self.state = WatcherState::Observing;
        fresh
    }

    fn capture(&mut self, html: &str) -> Vec<Message> {
        let mut extractor = Extractor::new(&self.config).with_thresholds(self.thresholds);
        if let Some(url) = &self.source_url {
            extractor = extractor.with_source_url(url.clone());
        }
        let extracted = match extractor.extract(html) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::debug!(error = %err, "capture pass found no conversation");
                return Vec::new();
            }
        };
        let document = match normalize::normalize(&extracted) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::debug!(error = %err, "capture pass produced empty document");
                return Vec::new();
            }
        };

        document
            .messages
            .into_iter()
            .filter(|message| self.seen.insert(turn_hash(message)))
            .collect()
    }

    /// Turns already emitted this session.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Stream a normalized document's turns through the watcher's dedup set, for
/// a one-shot "send what's on screen now" path.
pub fn send_document(
    client: &mut CollectorClient,
    watcher: &mut TurnWatcher,
    document: &ConversationDocument,
) {
    for message in &document.messages {
        if watcher.seen.insert(turn_hash(message)) {
            client.send_turn(&CapturedTurn {
                platform: &document.metadata.platform,
                source_url: &document.metadata.source_url,
                message,
            });
        }
    }
}

/// Session-scoped identity of a turn: author plus content digest. Timestamps
/// are excluded since re-extraction regenerates them.
fn turn_hash(message: &Message) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(message.author.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(message.content.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::claude;

    const PAGE: &str = r#"
        <html><head><title>Watched chat</title></head><body>
        <div data-testid="conversation">
          <div data-testid="user-message"><div class="message-content">First question</div></div>
          <div data-testid="assistant-message"><div class="message-content">First answer</div></div>
        </div>
        </body></html>"#;

    const PAGE_APPENDED: &str = r#"
        <html><head><title>Watched chat</title></head><body>
        <div data-testid="conversation">
          <div data-testid="user-message"><div class="message-content">First question</div></div>
          <div data-testid="assistant-message"><div class="message-content">First answer</div></div>
          <div data-testid="user-message"><div class="message-content">Second question</div></div>
        </div>
        </body></html>"#;

    fn watcher() -> TurnWatcher {
        let url = Url::parse("https://claude.ai/chat/w1").unwrap();
        TurnWatcher::new(claude(), Some(url)).with_debounce(Duration::from_millis(100))
    }

    #[test]
    fn test_starts_idle_and_ignores_mutations() {
        let mut w = watcher();
        assert_eq!(w.state(), WatcherState::Idle);
        w.on_mutation(MutationEvent { at: Instant::now(), added_nodes: 3 });
        assert_eq!(w.state(), WatcherState::Idle);
    }

    #[test]
    fn test_mutation_arms_debounce() {
        let mut w = watcher();
        w.start();
        let t0 = Instant::now();
        w.on_mutation(MutationEvent { at: t0, added_nodes: 1 });
        assert_eq!(w.state(), WatcherState::Debouncing);

        // Before the deadline nothing fires.
        assert!(w.tick(t0 + Duration::from_millis(50), PAGE).is_empty());
        assert_eq!(w.state(), WatcherState::Debouncing);

        let turns = w.tick(t0 + Duration::from_millis(150), PAGE);
        assert_eq!(turns.len(), 2);
        assert_eq!(w.state(), WatcherState::Observing);
    }

    #[test]
    fn test_attribute_churn_does_not_arm() {
        let mut w = watcher();
        w.start();
        w.on_mutation(MutationEvent { at: Instant::now(), added_nodes: 0 });
        assert_eq!(w.state(), WatcherState::Observing);
    }

    #[test]
    fn test_repeated_mutations_extend_deadline() {
        let mut w = watcher();
        w.start();
        let t0 = Instant::now();
        w.on_mutation(MutationEvent { at: t0, added_nodes: 1 });
        w.on_mutation(MutationEvent { at: t0 + Duration::from_millis(80), added_nodes: 1 });
        // Original deadline passed, extended one has not.
        assert!(w.tick(t0 + Duration::from_millis(120), PAGE).is_empty());
        assert_eq!(w.tick(t0 + Duration::from_millis(200), PAGE).len(), 2);
    }

    #[test]
    fn test_only_new_turns_emitted_on_second_pass() {
        let mut w = watcher();
        w.start();
        let t0 = Instant::now();
        w.on_mutation(MutationEvent { at: t0, added_nodes: 1 });
        let first = w.tick(t0 + Duration::from_millis(150), PAGE);
        assert_eq!(first.len(), 2);

        w.on_mutation(MutationEvent { at: t0 + Duration::from_millis(300), added_nodes: 1 });
        let second = w.tick(t0 + Duration::from_millis(500), PAGE_APPENDED);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].content, "Second question");
        assert_eq!(w.seen_count(), 3);
    }

    #[test]
    fn test_unparseable_page_degrades_to_empty() {
        let mut w = watcher();
        w.start();
        let t0 = Instant::now();
        w.on_mutation(MutationEvent { at: t0, added_nodes: 1 });
        let turns = w.tick(t0 + Duration::from_millis(150), "<html><body><p>nothing</p></body></html>");
        assert!(turns.is_empty());
        assert_eq!(w.state(), WatcherState::Observing);
    }

    #[test]
    fn test_collector_delivery_is_best_effort() {
        // Nothing listens on this endpoint; lifecycle and turn delivery
        // failures must not disturb the state machine or the emitted turns.
        let client = CollectorClient::new(Some("http://127.0.0.1:1"));
        let mut w = watcher().with_collector(client);
        w.start();
        let t0 = Instant::now();
        w.on_mutation(MutationEvent { at: t0, added_nodes: 1 });
        let turns = w.tick(t0 + Duration::from_millis(150), PAGE);
        assert_eq!(turns.len(), 2);
        assert_eq!(w.state(), WatcherState::Observing);
        w.stop();
        assert_eq!(w.state(), WatcherState::Idle);
    }

    #[test]
    fn test_stop_keeps_seen_set() {
        let mut w = watcher();
        w.start();
        let t0 = Instant::now();
        w.on_mutation(MutationEvent { at: t0, added_nodes: 1 });
        assert_eq!(w.tick(t0 + Duration::from_millis(150), PAGE).len(), 2);

        w.stop();
        assert_eq!(w.state(), WatcherState::Idle);
        w.start();
        w.on_mutation(MutationEvent { at: t0 + Duration::from_millis(300), added_nodes: 1 });
        assert!(w.tick(t0 + Duration::from_millis(500), PAGE).is_empty());
    }
}
