mod common;

use chrono::{Duration, Utc};
use common::{test_config, wait_for_backoff, TestContext};
use crewdesk_sync::application::services::{BookingChanges, BookingDraft, DrainReport};
use crewdesk_sync::domain::entities::QueueItemDraft;
use crewdesk_sync::domain::value_objects::{Actor, EntityKind, QueueAction};

fn draft(title: &str) -> BookingDraft {
    let starts_at = Utc::now() + Duration::hours(1);
    BookingDraft {
        title: title.to_string(),
        starts_at,
        ends_at: starts_at + Duration::hours(2),
        notes: None,
    }
}

#[tokio::test]
async fn drain_replays_queued_creates_oldest_first() {
    let ctx = TestContext::new().await;
    let actor = Actor::staff("alice");
    for title in ["First", "Second", "Third"] {
        ctx.engine.bookings.add(draft(title), &actor).await.unwrap();
    }

    ctx.set_online(true);
    let report = ctx.engine.drain_worker.drain_once().await.unwrap();

    assert_eq!(report.applied, 3);
    assert_eq!(report.retried, 0);
    assert!(ctx.engine.queue().peek_all().await.unwrap().is_empty());
    assert_eq!(ctx.remote.row_count("bookings").await, 3);
}

#[tokio::test]
async fn drain_while_offline_is_a_noop() {
    let ctx = TestContext::new().await;
    ctx.engine
        .bookings
        .add(draft("Waiting"), &Actor::staff("alice"))
        .await
        .unwrap();

    let report = ctx.engine.drain_worker.drain_once().await.unwrap();
    assert_eq!(report, DrainReport::default());
    assert_eq!(ctx.engine.queue().peek_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn one_failing_record_does_not_block_others() {
    let ctx = TestContext::new().await;
    let actor = Actor::staff("alice");
    let first = ctx.engine.bookings.add(draft("Fails"), &actor).await.unwrap();
    let second = ctx.engine.bookings.add(draft("Succeeds"), &actor).await.unwrap();

    ctx.set_online(true);
    ctx.remote.fail_next_writes(1);
    let report = ctx.engine.drain_worker.drain_once().await.unwrap();

    assert_eq!(report.applied, 1);
    assert_eq!(report.retried, 1);
    assert!(ctx.remote.row("bookings", first.meta.id.as_str()).await.is_none());
    assert!(ctx.remote.row("bookings", second.meta.id.as_str()).await.is_some());

    let pending = ctx.engine.queue().peek_all().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].entity_id(), Some(first.meta.id.as_str()));
    assert_eq!(pending[0].retry_count, 1);
}

#[tokio::test]
async fn same_record_mutations_stay_ordered_across_failures() {
    let ctx = TestContext::new().await;
    let actor = Actor::staff("alice");
    let booking = ctx.engine.bookings.add(draft("Draft title"), &actor).await.unwrap();
    let changes = BookingChanges {
        title: Some("Final title".to_string()),
        ..BookingChanges::default()
    };
    ctx.engine
        .bookings
        .update(&booking.meta.id, changes, &actor)
        .await
        .unwrap();
    assert_eq!(ctx.engine.queue().peek_all().await.unwrap().len(), 2);

    // The create fails; the update for the same record must wait rather
    // than jump ahead of it.
    ctx.set_online(true);
    ctx.remote.fail_next_writes(1);
    let report = ctx.engine.drain_worker.drain_once().await.unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.retried, 1);
    assert_eq!(report.deferred, 1);
    assert_eq!(ctx.remote.row_count("bookings").await, 0);

    wait_for_backoff().await;
    let report = ctx.engine.drain_worker.drain_once().await.unwrap();
    assert_eq!(report.applied, 2);

    let row = ctx.remote.row("bookings", booking.meta.id.as_str()).await.unwrap();
    assert_eq!(row.as_json()["title"], "Final title");
    assert!(ctx.engine.queue().peek_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn exhausted_item_is_quarantined_not_retried_forever() {
    let mut config = test_config();
    config.sync.max_retries = 2;
    let ctx = TestContext::with_config(config).await;

    let booking = ctx
        .engine
        .bookings
        .add(draft("Doomed"), &Actor::staff("alice"))
        .await
        .unwrap();

    ctx.set_online(true);
    ctx.remote.set_available(false);

    let report = ctx.engine.drain_worker.drain_once().await.unwrap();
    assert_eq!(report.retried, 1);

    wait_for_backoff().await;
    let report = ctx.engine.drain_worker.drain_once().await.unwrap();
    assert_eq!(report.quarantined, 1);

    // Quarantined items leave the drain working set for good.
    assert!(ctx.engine.queue().peek_all().await.unwrap().is_empty());
    assert!(ctx.remote.row("bookings", booking.meta.id.as_str()).await.is_none());

    // The engine keeps working once the remote recovers.
    ctx.remote.set_available(true);
    let healthy = ctx
        .engine
        .bookings
        .add(draft("Healthy"), &Actor::staff("alice"))
        .await
        .unwrap();
    assert!(ctx.remote.row("bookings", healthy.meta.id.as_str()).await.is_some());
}

#[tokio::test]
async fn corrupt_queue_row_is_skipped_not_fatal() {
    let ctx = TestContext::new().await;
    sqlx::query(
        r#"
        INSERT INTO sync_queue (id, action, entity, data, created_at, updated_at, retry_count, status)
        VALUES ('corrupt', 'create', 'bookings', 'not json', 0, 0, 0, 'pending')
        "#,
    )
    .execute(ctx.pool.get_pool())
    .await
    .unwrap();

    let booking = ctx
        .engine
        .bookings
        .add(draft("Readable"), &Actor::staff("alice"))
        .await
        .unwrap();

    let pending = ctx.engine.queue().peek_all().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].entity_id(), Some(booking.meta.id.as_str()));

    ctx.set_online(true);
    let report = ctx.engine.drain_worker.drain_once().await.unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(ctx.remote.row_count("bookings").await, 1);
}

#[tokio::test]
async fn replaying_an_already_applied_create_is_harmless() {
    let ctx = TestContext::new().await;
    let booking = ctx
        .engine
        .bookings
        .add(draft("Once"), &Actor::staff("alice"))
        .await
        .unwrap();

    ctx.set_online(true);
    assert_eq!(ctx.engine.drain_worker.drain_once().await.unwrap().applied, 1);

    // A crash between the remote write and the dequeue leaves the item in
    // the queue; replaying it must not duplicate the row.
    let queue = ctx.engine.queue();
    queue
        .enqueue(QueueItemDraft::new(
            QueueAction::Create,
            EntityKind::Booking,
            ctx.remote
                .row("bookings", booking.meta.id.as_str())
                .await
                .unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(ctx.engine.drain_worker.drain_once().await.unwrap().applied, 1);
    assert_eq!(ctx.remote.row_count("bookings").await, 1);
}

#[tokio::test]
async fn reconnect_wakes_the_background_worker() {
    let ctx = TestContext::new().await;
    ctx.engine
        .bookings
        .add(draft("Queued while out"), &Actor::staff("alice"))
        .await
        .unwrap();

    let handle = ctx.engine.drain_worker.clone().spawn();
    ctx.set_online(true);

    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        if ctx.engine.queue().peek_all().await.unwrap().is_empty() {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "queue never drained");
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert_eq!(ctx.remote.row_count("bookings").await, 1);
    handle.abort();
}
