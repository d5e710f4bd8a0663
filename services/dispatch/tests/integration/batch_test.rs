use std::time::Duration;

use mailwave_dispatch::usecase::batch::BatchDeliveryEngine;

use crate::helpers::{
    MockTrackingStore, MockTransport, test_campaign, test_contacts, test_settings,
};

fn engine(
    transport: MockTransport,
    tracking: MockTrackingStore,
) -> BatchDeliveryEngine<MockTransport, MockTrackingStore> {
    BatchDeliveryEngine {
        transport,
        tracking,
        settings: test_settings(),
    }
}

// ── Batch arithmetic ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn should_split_into_ceil_divided_batches() {
    let contacts = test_contacts(25);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let engine = engine(MockTransport::reliable(), MockTrackingStore::reliable());

    let outcome = engine.send_batches(&campaign, &contacts).await;

    assert_eq!(outcome.batch_size, 10);
    assert_eq!(outcome.total_batches, 3);
    assert_eq!(outcome.sent + outcome.failed, 25);
    assert_eq!(outcome.send_results.len(), 25);
}

#[tokio::test(start_paused = true)]
async fn should_pause_between_batches_but_not_after_last() {
    let contacts = test_contacts(25);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let transport = MockTransport::reliable();
    let sends = transport.sends_handle();
    let engine = engine(transport, MockTrackingStore::reliable());

    let started = tokio::time::Instant::now();
    engine.send_batches(&campaign, &contacts).await;
    // 3 batches, 2 inter-batch pauses of 1000 ms each, none after the last.
    assert_eq!(started.elapsed(), Duration::from_millis(2000));

    let sends = sends.lock().unwrap();
    assert_eq!(sends.len(), 25);
    let offsets: Vec<u64> = sends
        .iter()
        .map(|(_, at)| (*at - started).as_millis() as u64)
        .collect();
    assert!(offsets[..10].iter().all(|&o| o == 0));
    assert!(offsets[10..20].iter().all(|&o| o == 1000));
    assert!(offsets[20..].iter().all(|&o| o == 2000));
}

#[tokio::test(start_paused = true)]
async fn should_cap_persisted_errors_at_one_hundred() {
    let contacts = test_contacts(150);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let transport = MockTransport::failing_for(contacts.iter().map(|c| c.email.clone()));
    let engine = engine(transport, MockTrackingStore::reliable());

    let outcome = engine.send_batches(&campaign, &contacts).await;

    assert_eq!(outcome.failed, 150);
    assert_eq!(outcome.sent, 0);
    assert_eq!(outcome.errors.len(), 100);
}

// ── SENT tracking ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn should_not_fail_sends_when_sent_recording_breaks() {
    let contacts = test_contacts(5);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let engine = engine(MockTransport::reliable(), MockTrackingStore::failing());

    let outcome = engine.send_batches(&campaign, &contacts).await;

    assert_eq!(outcome.sent, 5);
    assert_eq!(outcome.failed, 0);
}

#[tokio::test(start_paused = true)]
async fn should_record_sent_event_per_delivery() {
    let contacts = test_contacts(5);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let tracking = MockTrackingStore::reliable();
    let events = tracking.events_handle();
    let engine = engine(MockTransport::reliable(), tracking);

    engine.send_batches(&campaign, &contacts).await;

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e.campaign_id == campaign.id));
}

// ── Idempotency ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn should_use_stable_idempotency_key_per_recipient() {
    let contacts = test_contacts(2);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let transport = MockTransport::reliable();
    let keys_handle = transport.idempotency_keys.clone();
    let engine = engine(transport, MockTrackingStore::reliable());

    engine.send_batches(&campaign, &contacts).await;
    engine.send_batches(&campaign, &contacts).await;

    let keys = keys_handle.lock().unwrap();
    assert_eq!(keys.len(), 4);
    // A full re-run issues the identical keys, so the transport can dedupe.
    assert_eq!(keys[0], format!("{}:{}", campaign.id, contacts[0].id));
    assert_eq!(keys[..2], keys[2..]);
}

// ── Content instrumentation ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn should_personalize_and_instrument_outbound_html() {
    let contacts = test_contacts(1);
    let campaign = test_campaign(vec![contacts[0].id]);
    let transport = MockTransport::reliable();
    let bodies_handle = transport.bodies.clone();
    let engine = engine(transport, MockTrackingStore::reliable());

    let outcome = engine.send_batches(&campaign, &contacts).await;
    assert_eq!(outcome.sent, 1);

    let bodies = bodies_handle.lock().unwrap();
    let html = &bodies[0];
    // Token resolved against the contact record.
    assert!(html.contains("Hi Contact 0"));
    assert!(!html.contains("{contact_"));
    // Anchor rewritten through the click redirect, pixel appended.
    assert!(html.contains("/click?"));
    assert!(html.contains("/open?"));
    assert!(!html.contains("href=\"https://example.com/launch\""));
}
