mod common;

use chrono::{Duration, Utc};
use common::TestContext;
use crewdesk_sync::application::services::BookingDraft;
use crewdesk_sync::domain::value_objects::Actor;
use crewdesk_sync::shared::error::AppError;

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
async fn hard_delete_cascades_to_tasks_and_reminders() {
    let ctx = TestContext::new().await;
    ctx.set_online(true);
    let actor = Actor::staff("alice");

    let booking = ctx.engine.bookings.add(draft("Open house"), &actor).await.unwrap();
    ctx.engine
        .bookings
        .add_task(&booking.meta.id, "Print flyers".to_string(), &actor)
        .await
        .unwrap();
    ctx.engine
        .bookings
        .add_task(&booking.meta.id, "Unlock hall".to_string(), &actor)
        .await
        .unwrap();
    ctx.engine
        .bookings
        .add_reminder(&booking.meta.id, Utc::now() + Duration::minutes(30), None, &actor)
        .await
        .unwrap();

    assert_eq!(ctx.remote.row_count("booking_tasks").await, 2);
    assert_eq!(ctx.remote.row_count("booking_reminders").await, 1);

    ctx.engine.bookings.hard_delete(&booking.meta.id, &actor).await.unwrap();

    assert_eq!(ctx.remote.row_count("bookings").await, 0);
    assert_eq!(ctx.remote.row_count("booking_tasks").await, 0);
    assert_eq!(ctx.remote.row_count("booking_reminders").await, 0);
    assert!(ctx.engine.bookings.get(&booking.meta.id).await.unwrap().is_none());
    assert!(ctx.engine.bookings.tasks_for(&booking.meta.id).await.unwrap().is_empty());
    assert!(ctx
        .engine
        .bookings
        .reminders_for(&booking.meta.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn offline_cascade_queues_every_delete_for_replay() {
    let ctx = TestContext::new().await;
    let actor = Actor::staff("alice");

    let booking = ctx.engine.bookings.add(draft("Short lived"), &actor).await.unwrap();
    ctx.engine
        .bookings
        .add_task(&booking.meta.id, "Never happens".to_string(), &actor)
        .await
        .unwrap();

    ctx.engine.bookings.hard_delete(&booking.meta.id, &actor).await.unwrap();

    // Two creates and two deletes wait for connectivity.
    assert_eq!(ctx.engine.queue().peek_all().await.unwrap().len(), 4);

    ctx.set_online(true);
    let report = ctx.engine.drain_worker.drain_once().await.unwrap();
    assert_eq!(report.applied, 4);

    // Create-then-delete replayed in order leaves nothing behind.
    assert_eq!(ctx.remote.row_count("bookings").await, 0);
    assert_eq!(ctx.remote.row_count("booking_tasks").await, 0);
}

#[tokio::test]
async fn only_the_creator_or_elevated_may_hard_delete() {
    let ctx = TestContext::new().await;
    let alice = Actor::staff("alice");
    let booking = ctx.engine.bookings.add(draft("Contested"), &alice).await.unwrap();

    let err = ctx
        .engine
        .bookings
        .hard_delete(&booking.meta.id, &Actor::staff("bob"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(ctx.engine.bookings.get(&booking.meta.id).await.unwrap().is_some());

    ctx.engine
        .bookings
        .hard_delete(&booking.meta.id, &Actor::manager("mira"))
        .await
        .unwrap();
    assert!(ctx.engine.bookings.get(&booking.meta.id).await.unwrap().is_none());
}

#[tokio::test]
async fn tasks_require_an_existing_booking() {
    let ctx = TestContext::new().await;
    let actor = Actor::staff("alice");
    let booking = ctx.engine.bookings.add(draft("Real"), &actor).await.unwrap();
    ctx.engine.bookings.hard_delete(&booking.meta.id, &actor).await.unwrap();

    let err = ctx
        .engine
        .bookings
        .add_task(&booking.meta.id, "Orphan".to_string(), &actor)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
