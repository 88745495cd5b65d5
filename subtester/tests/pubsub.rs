//! End-to-end rendering against a libzmq PUB socket.

mod common;

use common::*;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use subtester::app::listen;
use subtester::prelude::*;

#[test]
fn test_envelope_from_libzmq_publisher() {
    subtester::dev_tracing::init_tracing();
    let publisher = Publisher::bind();
    let config = config_for(&publisher).with_print_stats(true);
    let subscriber = Subscriber::connect(&config).unwrap();
    let mut listener = Listener::new(subscriber, EnvelopeRenderer::new(), &config);

    let out = pump(&publisher, &mut listener, &[&["topic1", "payload1"]], 1);

    let lines = lines(&out);
    assert!(!lines.is_empty());
    assert!(lines.iter().all(|l| l == "[topic1] payload1"), "{lines:?}");
    assert!(listener.stats().topic_count(b"topic1") >= 1);
}

#[test]
fn test_frames_from_libzmq_publisher() {
    let publisher = Publisher::bind();
    let config = config_for(&publisher);
    let subscriber = Subscriber::connect(&config).unwrap();
    let mut listener = Listener::new(subscriber, FrameRenderer::new(), &config);

    let out = pump(&publisher, &mut listener, &[&["hello"], &["A", "B"]], 2);

    let lines = lines(&out);
    assert!(lines.len() >= 2);
    assert!(
        lines.iter().all(|l| l == "hello" || l == "A...B"),
        "{lines:?}"
    );
    assert!(lines.iter().any(|l| l == "A...B"));
}

#[test]
fn test_topic_filter() {
    let publisher = Publisher::bind();
    let config = config_for(&publisher)
        .with_topic("STATUS")
        .with_print_stats(true);
    let subscriber = Subscriber::connect(&config).unwrap();
    let mut listener = Listener::new(subscriber, EnvelopeRenderer::new(), &config);

    let out = pump(
        &publisher,
        &mut listener,
        &[&["TRIGGER", "ignored"], &["STATUS", "{\"Running\":true}"]],
        1,
    );

    let lines = lines(&out);
    assert!(
        lines.iter().all(|l| l == "[STATUS] {\"Running\":true}"),
        "{lines:?}"
    );
    assert_eq!(listener.stats().topic_count(b"TRIGGER"), 0);
    assert!(listener.stats().topic_count(b"STATUS") >= 1);
}

#[test]
fn test_stats_table_written_on_exit() {
    let publisher = Publisher::bind();
    let config = config_for(&publisher).with_print_stats(true);
    let subscriber = Subscriber::connect(&config).unwrap();
    let mut listener = Listener::new(subscriber, EnvelopeRenderer::new(), &config);

    pump(
        &publisher,
        &mut listener,
        &[&["STATUS", "{}"], &["ALIVE", "1"]],
        4,
    );
    let status = listener.stats().topic_count(b"STATUS");
    let alive = listener.stats().topic_count(b"ALIVE");
    assert!(status >= 1 && alive >= 1);

    let mut out = Vec::new();
    listen(listener, &mut out, &AtomicBool::new(false), &config).unwrap();

    assert_eq!(lines(&out), vec![format!("{alive}\tALIVE"), format!("{status}\tSTATUS")]);
}

#[test]
fn test_no_stats_table_without_flag() {
    let publisher = Publisher::bind();
    let config = config_for(&publisher);
    let subscriber = Subscriber::connect(&config).unwrap();
    let mut listener = Listener::new(subscriber, FrameRenderer::new(), &config);

    pump(&publisher, &mut listener, &[&["STATUS", "{}"]], 1);
    assert!(listener.stats().topics().is_empty());

    let mut out = Vec::new();
    listen(listener, &mut out, &AtomicBool::new(false), &config).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_malformed_messages_are_skipped() {
    let publisher = Publisher::bind();
    let config = config_for(&publisher);
    let subscriber = Subscriber::connect(&config).unwrap();
    let mut listener = Listener::new(subscriber, EnvelopeRenderer::new(), &config);

    let mut out = Vec::new();
    let start = Instant::now();
    while listener.stats().malformed() == 0 || out.is_empty() {
        assert!(start.elapsed() < DEADLINE, "timed out");
        publisher.publish(&["a", "b", "c"]);
        publisher.publish(&["alone"]);
        publisher.publish(&["topic", "body"]);
        listener.step(&mut out).unwrap();
    }

    let lines = lines(&out);
    assert!(lines.iter().all(|l| l == "[topic] body"), "{lines:?}");
}

#[test]
fn test_malformed_message_rejected() {
    let publisher = Publisher::bind();
    let config = config_for(&publisher).with_malformed_policy(MalformedPolicy::Reject);
    let subscriber = Subscriber::connect(&config).unwrap();
    let mut listener = Listener::new(subscriber, EnvelopeRenderer::new(), &config);

    let mut out = Vec::new();
    let start = Instant::now();
    let err = loop {
        assert!(start.elapsed() < DEADLINE, "timed out");
        publisher.publish(&["a", "b", "c"]);
        if let Err(e) = listener.step(&mut out) {
            break e;
        }
    };

    assert!(matches!(
        err,
        Error::MalformedMessage {
            expected: 2,
            frames: 3
        }
    ));
    assert!(out.is_empty());
}

#[test]
fn test_large_payload_not_truncated() {
    let publisher = Publisher::bind();
    let config = config_for(&publisher);
    let subscriber = Subscriber::connect(&config).unwrap();
    let mut listener = Listener::new(subscriber, FrameRenderer::new(), &config);

    let payload = "x".repeat(64 * 1024);
    let out = pump(&publisher, &mut listener, &[&[payload.as_str()]], 1);

    let lines = lines(&out);
    assert!(lines.iter().all(|l| l.len() == payload.len()));
}
