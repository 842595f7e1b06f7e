//! Integration tests for the crawler
//!
//! These tests run small NIP-01 relays on localhost with tokio-tungstenite and
//! exercise the full crawl cycle end-to-end: WebSocket client, persistence
//! worker and filesystem writes.

use dumpthread::config::{Config, CrawlerConfig, OutputConfig};
use dumpthread::crawler::crawl;
use dumpthread::protocol::{encode_note, ClientMessage, Event, EventId, RelayMessage, Tag};
use dumpthread::{DumpError, RelayOutcome};
use futures::{SinkExt, StreamExt};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

/// How a test relay answers subscriptions
#[derive(Clone, Copy, PartialEq)]
enum Mode {
    /// Sends matching events then EOSE
    Normal,
    /// Refuses every subscription with CLOSED
    Refuse,
    /// Sends a NOTICE, an event for another subscription and the matching
    /// events, then closes the connection without EOSE
    HangUp,
}

/// A running test relay
struct TestRelay {
    url: String,
    connections: Arc<AtomicUsize>,
}

impl TestRelay {
    fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Binds a listener for a relay that will be started later
async fn reserve_relay() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test relay");
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

/// Starts a relay serving `events` and returns its ws:// URL
async fn start_relay(events: Vec<Event>, mode: Mode) -> TestRelay {
    let (listener, url) = reserve_relay().await;
    start_relay_on(listener, url, events, mode)
}

/// Serves `events` on an already bound listener
fn start_relay_on(listener: TcpListener, url: String, events: Vec<Event>, mode: Mode) -> TestRelay {
    let connections = Arc::new(AtomicUsize::new(0));
    let events = Arc::new(events);

    {
        let connections = connections.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                connections.fetch_add(1, Ordering::SeqCst);
                let events = events.clone();
                tokio::spawn(async move {
                    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                        return;
                    };
                    while let Some(Ok(frame)) = ws.next().await {
                        let Message::Text(text) = frame else {
                            continue;
                        };
                        let Ok(ClientMessage::Req {
                            subscription_id,
                            filter,
                        }) = ClientMessage::from_json(&text)
                        else {
                            continue;
                        };

                        let mut replies = Vec::new();
                        if mode == Mode::Refuse {
                            replies.push(RelayMessage::Closed {
                                subscription_id: subscription_id.clone(),
                                message: "blocked: not allowed".to_string(),
                            });
                        } else {
                            if mode == Mode::HangUp {
                                replies.push(RelayMessage::Notice("rate limited".to_string()));
                                replies.push(RelayMessage::Event {
                                    subscription_id: "someone-else".to_string(),
                                    event: Box::new(event(&hex_id(0x77), vec![])),
                                });
                            }
                            let matching = events.iter().filter(|e| filter.matches(e));
                            let limit = filter.limit.unwrap_or(usize::MAX);
                            for event in matching.take(limit) {
                                replies.push(RelayMessage::Event {
                                    subscription_id: subscription_id.clone(),
                                    event: Box::new(event.clone()),
                                });
                            }
                            if mode == Mode::Normal {
                                replies.push(RelayMessage::Eose {
                                    subscription_id: subscription_id.clone(),
                                });
                            }
                        }

                        for reply in replies {
                            let json = reply.to_json().unwrap();
                            if ws.send(Message::Text(json)).await.is_err() {
                                return;
                            }
                        }

                        if mode == Mode::HangUp {
                            let _ = ws.close(None).await;
                            while ws.next().await.is_some() {}
                            return;
                        }
                    }
                });
            }
        });
    }

    TestRelay { url, connections }
}

/// Returns a ws:// URL nobody listens on
fn unreachable_relay() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("ws://127.0.0.1:{}", port)
}

fn root_id() -> EventId {
    EventId::from_bytes(&[0x2a; 32]).unwrap()
}

fn hex_id(byte: u8) -> String {
    hex::encode([byte; 32])
}

fn event(id: &str, tags: Vec<Tag>) -> Event {
    Event {
        id: id.to_string(),
        pubkey: hex_id(0xee),
        created_at: 1_700_000_000,
        kind: 1,
        tags,
        content: format!("content of {}", &id[..8]),
        sig: hex::encode([0x55; 64]),
    }
}

fn root_event() -> Event {
    event(root_id().as_str(), vec![])
}

fn reply(byte: u8, relay_hint: &str) -> Event {
    event(
        &hex_id(byte),
        vec![Tag::new(["e", root_id().as_str(), relay_hint, "reply"])],
    )
}

/// Creates a test configuration with short timeouts
fn create_test_config(relays: Vec<String>, out: &Path) -> Config {
    Config {
        relays,
        crawler: CrawlerConfig {
            query_timeout_secs: 5,
            connect_timeout_secs: 5,
            ..CrawlerConfig::default()
        },
        output: OutputConfig {
            directory: out.to_path_buf(),
        },
    }
}

fn json_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read output dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".json"))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_thread_follows_relay_hint() {
    let r2 = start_relay(vec![reply(0x03, "")], Mode::Normal).await;
    let r1 = start_relay(vec![root_event(), reply(0x02, &r2.url)], Mode::Normal).await;
    let out = TempDir::new().unwrap();

    let config = create_test_config(vec![r1.url.clone()], out.path());
    let report = crawl(&config, &encode_note(&root_id()), CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(out.path().join(format!("{}.json", root_id())).exists());
    assert!(out.path().join(format!("{}.json", hex_id(0x02))).exists());
    assert!(out.path().join(format!("{}.json", hex_id(0x03))).exists());

    assert_eq!(r2.connections(), 1);
    assert_eq!(report.outcome_of(&r2.url), Some(RelayOutcome::Fetched));
    assert_eq!(report.events_written, 3);

    // Files hold the canonical encoding of the event
    let written = std::fs::read_to_string(out.path().join(format!("{}.json", hex_id(0x02)))).unwrap();
    let parsed: Event = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed, reply(0x02, &r2.url));
}

#[tokio::test]
async fn test_same_root_on_two_relays_single_file() {
    let r1 = start_relay(vec![root_event()], Mode::Normal).await;
    let r2 = start_relay(vec![root_event()], Mode::Normal).await;
    let out = TempDir::new().unwrap();

    let config = create_test_config(vec![r1.url.clone(), r2.url.clone()], out.path());
    let report = crawl(&config, &encode_note(&root_id()), CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(json_files(out.path()), vec![format!("{}.json", root_id())]);
    assert_eq!(report.events_fetched, 2);
    assert_eq!(report.duplicate_events, 1);
}

#[tokio::test]
async fn test_unreachable_relay_completes_with_no_files() {
    let down = unreachable_relay();
    let out = TempDir::new().unwrap();

    let config = create_test_config(vec![down.clone()], out.path());
    let report = crawl(&config, &encode_note(&root_id()), CancellationToken::new())
        .await
        .expect("Crawl should complete despite the unreachable relay");

    assert!(json_files(out.path()).is_empty());
    assert_eq!(report.visit_count(&down), 1);
    assert_eq!(report.outcome_of(&down), Some(RelayOutcome::Unreachable));
}

#[tokio::test]
async fn test_malformed_root_fails_before_contacting_relays() {
    let r1 = start_relay(vec![root_event()], Mode::Normal).await;
    let out = TempDir::new().unwrap();

    let config = create_test_config(vec![r1.url.clone()], out.path());
    let result = crawl(&config, "note1thisisnotvalid", CancellationToken::new()).await;

    assert!(matches!(result, Err(DumpError::Protocol(_))));
    assert_eq!(r1.connections(), 0);
    assert!(json_files(out.path()).is_empty());
}

#[tokio::test]
async fn test_mutual_hints_visit_each_relay_once() {
    // r1 and r2 suggest each other; r2 also suggests a dead relay
    let (r1_listener, r1_url) = reserve_relay().await;
    let (r2_listener, r2_url) = reserve_relay().await;
    let dead = unreachable_relay();

    let r1 = start_relay_on(
        r1_listener,
        r1_url.clone(),
        vec![root_event(), reply(0x10, &r2_url), reply(0x11, &r2_url)],
        Mode::Normal,
    );
    let r2 = start_relay_on(
        r2_listener,
        r2_url.clone(),
        vec![reply(0x20, &r1_url), reply(0x21, &dead)],
        Mode::Normal,
    );
    let out = TempDir::new().unwrap();

    let config = create_test_config(vec![r1_url.clone(), r1_url.clone()], out.path());
    let report = crawl(&config, &encode_note(&root_id()), CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(r1.connections(), 1);
    assert_eq!(r2.connections(), 1);
    assert_eq!(report.visit_count(&r1_url), 1);
    assert_eq!(report.visit_count(&r2_url), 1);
    assert_eq!(report.outcome_of(&dead), Some(RelayOutcome::Unreachable));
    assert_eq!(json_files(out.path()).len(), 5);
}

#[tokio::test]
async fn test_refused_subscription_is_per_relay_failure() {
    let refusing = start_relay(vec![root_event()], Mode::Refuse).await;
    let good = start_relay(vec![root_event()], Mode::Normal).await;
    let out = TempDir::new().unwrap();

    let config = create_test_config(vec![refusing.url.clone(), good.url.clone()], out.path());
    let report = crawl(&config, &encode_note(&root_id()), CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome_of(&refusing.url), Some(RelayOutcome::Failed));
    assert_eq!(report.outcome_of(&good.url), Some(RelayOutcome::Fetched));
    assert_eq!(json_files(out.path()), vec![format!("{}.json", root_id())]);
}

#[tokio::test]
async fn test_output_directory_is_created() {
    let r1 = start_relay(vec![root_event()], Mode::Normal).await;
    let out = TempDir::new().unwrap();
    let nested = out.path().join("threads").join("today");

    let config = create_test_config(vec![r1.url.clone()], &nested);
    crawl(&config, &encode_note(&root_id()), CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(json_files(&nested), vec![format!("{}.json", root_id())]);
}

#[tokio::test]
async fn test_hang_up_during_root_query_keeps_root() {
    let flaky = start_relay(vec![root_event(), reply(0x02, "")], Mode::HangUp).await;
    let out = TempDir::new().unwrap();

    let config = create_test_config(vec![flaky.url.clone()], out.path());
    let report = crawl(&config, &encode_note(&root_id()), CancellationToken::new())
        .await
        .expect("Crawl failed");

    // The reply query never runs; the event for the other subscription is ignored
    assert_eq!(report.outcome_of(&flaky.url), Some(RelayOutcome::Fetched));
    assert_eq!(json_files(out.path()), vec![format!("{}.json", root_id())]);
}

#[tokio::test]
async fn test_hang_up_with_nothing_sent_fails_relay() {
    let flaky = start_relay(vec![], Mode::HangUp).await;
    let good = start_relay(vec![root_event()], Mode::Normal).await;
    let out = TempDir::new().unwrap();

    let config = create_test_config(vec![flaky.url.clone(), good.url.clone()], out.path());
    let report = crawl(&config, &encode_note(&root_id()), CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome_of(&flaky.url), Some(RelayOutcome::Failed));
    assert_eq!(report.outcome_of(&good.url), Some(RelayOutcome::Fetched));
    assert_eq!(json_files(out.path()), vec![format!("{}.json", root_id())]);
}
