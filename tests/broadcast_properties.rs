//! Engine-level tests for booking-scoped location fan-out.
//!
//! These tests drive [`BroadcastEngine`] and [`ChannelSession`] directly over
//! the in-memory directory, without sockets, and check the delivery rules:
//!
//! 1. Only `confirmed` and `in_progress` bookings authorize tracking
//! 2. Replays carry exactly the stored coordinate, and nothing when none exists
//! 3. The newest channel for an identity is the only one that receives pushes
//! 4. Closed channels are skipped silently
//! 5. Directory failures lose the update without pushing anything

#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use std::sync::Arc;

use location_relay::{
    broadcast::BroadcastEngine,
    directory::{BookingDirectory, MemoryDirectory, NewBooking},
    domain::{
        Booking, BookingStatus, Coordinate, Identity, ProfessionalId, ProfessionalRecord, UserId,
    },
    error::{RelayError, RelayResult},
    protocol::OutboundMessage,
    registry::{ChannelHandle, ConnectionRegistry, OutboundReceiver},
    session::{ChannelSession, FrameOutcome},
};

fn professional(id: ProfessionalId) -> ProfessionalRecord {
    ProfessionalRecord {
        id,
        user_id: id + 1000,
        title: "Plumbing Specialist".to_string(),
        is_available: true,
        latitude: None,
        longitude: None,
    }
}

async fn directory_with(bookings: &[(UserId, ProfessionalId, BookingStatus)]) -> MemoryDirectory {
    let directory = MemoryDirectory::new();
    directory.insert_professional(professional(7)).await;
    directory.insert_professional(professional(8)).await;
    for (user_id, professional_id, status) in bookings {
        directory
            .insert_booking(NewBooking::new(*user_id, *professional_id, *status))
            .await;
    }
    directory
}

async fn engine_with(bookings: &[(UserId, ProfessionalId, BookingStatus)]) -> BroadcastEngine {
    let directory = directory_with(bookings).await;
    BroadcastEngine::new(Arc::new(directory), ConnectionRegistry::new())
}

async fn connect(
    engine: &BroadcastEngine,
    identity: Identity,
) -> (ChannelSession, OutboundReceiver) {
    let (mut session, rx) = ChannelSession::new(identity, engine.clone());
    session.open().await;
    (session, rx)
}

fn location_frame(latitude: f64, longitude: f64) -> String {
    format!(r#"{{"type":"location","data":{{"latitude":{latitude},"longitude":{longitude}}}}}"#)
}

/// Professional 7 reports {1.0, 2.0}; customer 3 (confirmed) receives it,
/// customer 9 (pending) receives nothing.
#[tokio::test]
async fn test_confirmed_customer_receives_pending_customer_does_not() {
    let engine = engine_with(&[
        (3, 7, BookingStatus::Confirmed),
        (9, 7, BookingStatus::Pending),
    ])
    .await;

    let (_customer_3, mut rx_3) = connect(&engine, Identity::Customer(3)).await;
    let (_customer_9, mut rx_9) = connect(&engine, Identity::Customer(9)).await;
    let (professional, _rx_7) = connect(&engine, Identity::Professional(7)).await;

    let outcome = professional.handle_text(&location_frame(1.0, 2.0)).await;
    assert!(matches!(outcome, FrameOutcome::Broadcast(report) if report.delivered == 1));

    assert_eq!(
        rx_3.try_recv().unwrap(),
        OutboundMessage::ProfessionalLocation {
            professional_id: 7,
            data: Coordinate::new(1.0, 2.0),
        }
    );
    assert!(rx_3.try_recv().is_err());
    assert!(rx_9.try_recv().is_err());
}

#[tokio::test]
async fn test_only_trackable_statuses_receive_updates() {
    let cases = [
        (BookingStatus::Pending, false),
        (BookingStatus::Scheduled, false),
        (BookingStatus::Confirmed, true),
        (BookingStatus::InProgress, true),
        (BookingStatus::Completed, false),
        (BookingStatus::Cancelled, false),
        (BookingStatus::Unknown, false),
    ];

    for (status, should_receive) in cases {
        let engine = engine_with(&[(3, 7, status)]).await;
        let (_customer, mut rx) = connect(&engine, Identity::Customer(3)).await;

        engine
            .on_professional_location_update(7, Coordinate::new(5.5, -6.5))
            .await
            .unwrap();

        let received = rx.try_recv().ok();
        if should_receive {
            assert_eq!(
                received,
                Some(OutboundMessage::ProfessionalLocation {
                    professional_id: 7,
                    data: Coordinate::new(5.5, -6.5),
                }),
                "status {status} should authorize tracking"
            );
        } else {
            assert_eq!(received, None, "status {status} must not authorize tracking");
        }
    }
}

#[tokio::test]
async fn test_status_change_takes_effect_on_next_update() {
    let directory = Arc::new(directory_with(&[]).await);
    let booking = directory
        .insert_booking(NewBooking::new(3, 7, BookingStatus::Scheduled))
        .await;
    let engine = BroadcastEngine::new(directory.clone(), ConnectionRegistry::new());
    let (_customer, mut rx) = connect(&engine, Identity::Customer(3)).await;

    engine
        .on_professional_location_update(7, Coordinate::new(1.0, 1.0))
        .await
        .unwrap();
    assert!(rx.try_recv().is_err());

    directory
        .update_booking_status(booking.id, BookingStatus::InProgress)
        .await
        .unwrap();
    engine
        .on_professional_location_update(7, Coordinate::new(2.0, 2.0))
        .await
        .unwrap();
    assert!(rx.try_recv().is_ok());

    directory
        .update_booking_status(booking.id, BookingStatus::Completed)
        .await
        .unwrap();
    engine
        .on_professional_location_update(7, Coordinate::new(3.0, 3.0))
        .await
        .unwrap();
    assert!(rx.try_recv().is_err());
}

/// Bookings alone authorize tracking; a professional missing from the
/// catalog still reaches confirmed customers over the channel.
#[tokio::test]
async fn test_channel_report_without_catalog_record_is_broadcast() {
    let directory = MemoryDirectory::new();
    directory
        .insert_booking(NewBooking::new(3, 7, BookingStatus::Confirmed))
        .await;
    let engine = BroadcastEngine::new(Arc::new(directory), ConnectionRegistry::new());

    let (_customer, mut rx) = connect(&engine, Identity::Customer(3)).await;
    let (professional, _rx_7) = connect(&engine, Identity::Professional(7)).await;

    let outcome = professional.handle_text(&location_frame(1.0, 2.0)).await;

    assert!(matches!(
        outcome,
        FrameOutcome::Broadcast(report) if !report.professional_known && report.delivered == 1
    ));
    assert_eq!(
        rx.try_recv().unwrap(),
        OutboundMessage::ProfessionalLocation {
            professional_id: 7,
            data: Coordinate::new(1.0, 2.0),
        }
    );
    assert_eq!(engine.locations().last_known(7).await.unwrap(), None);
}

#[tokio::test]
async fn test_customer_without_prior_coordinate_gets_no_replay() {
    let engine = engine_with(&[(3, 7, BookingStatus::Confirmed)]).await;

    let (_customer, mut rx) = connect(&engine, Identity::Customer(3)).await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_customer_replay_after_prior_report() {
    let engine = engine_with(&[
        (3, 7, BookingStatus::InProgress),
        (3, 8, BookingStatus::Completed),
    ])
    .await;
    engine
        .on_professional_location_update(7, Coordinate::new(1.0, 2.0))
        .await
        .unwrap();
    engine
        .on_professional_location_update(8, Coordinate::new(9.0, 9.0))
        .await
        .unwrap();

    let (_customer, mut rx) = connect(&engine, Identity::Customer(3)).await;

    assert_eq!(
        rx.try_recv().unwrap(),
        OutboundMessage::ProfessionalLocation {
            professional_id: 7,
            data: Coordinate::new(1.0, 2.0),
        }
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_professional_replay_is_exactly_last_report() {
    let engine = engine_with(&[]).await;
    let (first, _rx) = connect(&engine, Identity::Professional(7)).await;
    first.handle_text(&location_frame(40.71, -74.0)).await;

    let (_second, mut rx) = connect(&engine, Identity::Professional(7)).await;

    assert_eq!(
        rx.try_recv().unwrap(),
        OutboundMessage::Location {
            data: Coordinate::new(40.71, -74.0),
        }
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_professional_without_report_gets_no_replay() {
    let engine = engine_with(&[]).await;
    let (_session, mut rx) = connect(&engine, Identity::Professional(7)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_newest_channel_receives_pushes() {
    let engine = engine_with(&[(3, 7, BookingStatus::Confirmed)]).await;
    let (_old, mut old_rx) = connect(&engine, Identity::Customer(3)).await;
    let (_new, mut new_rx) = connect(&engine, Identity::Customer(3)).await;

    engine
        .on_professional_location_update(7, Coordinate::new(1.0, 2.0))
        .await
        .unwrap();

    assert!(new_rx.try_recv().is_ok());
    assert!(old_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_closed_channel_is_skipped() {
    let engine = engine_with(&[
        (3, 7, BookingStatus::Confirmed),
        (4, 7, BookingStatus::Confirmed),
    ])
    .await;
    let (mut leaving, _leaving_rx) = connect(&engine, Identity::Customer(3)).await;
    let (_staying, mut staying_rx) = connect(&engine, Identity::Customer(4)).await;

    leaving.close().await;

    let report = engine
        .on_professional_location_update(7, Coordinate::new(1.0, 2.0))
        .await
        .unwrap();

    assert_eq!(report.authorized, 2);
    assert_eq!(report.delivered, 1);
    assert!(staying_rx.try_recv().is_ok());
}

#[tokio::test]
async fn test_dropped_receiver_is_skipped_without_unregister() {
    let engine = engine_with(&[(3, 7, BookingStatus::Confirmed)]).await;
    let (handle, rx) = ChannelHandle::open();
    engine.registry().register(Identity::Customer(3), handle).await;
    drop(rx);

    let report = engine
        .on_professional_location_update(7, Coordinate::new(1.0, 2.0))
        .await
        .unwrap();

    assert_eq!(report.authorized, 1);
    assert_eq!(report.delivered, 0);
}

#[tokio::test]
async fn test_identity_spaces_are_separate() {
    // Customer 7 and professional 7 are different identities.
    let engine = engine_with(&[(7, 7, BookingStatus::Confirmed)]).await;
    let (_customer, mut customer_rx) = connect(&engine, Identity::Customer(7)).await;
    let (professional, mut professional_rx) = connect(&engine, Identity::Professional(7)).await;

    professional.handle_text(&location_frame(1.0, 2.0)).await;

    assert!(matches!(
        customer_rx.try_recv(),
        Ok(OutboundMessage::ProfessionalLocation { professional_id: 7, .. })
    ));
    assert!(professional_rx.try_recv().is_err());
}

/// Directory whose booking lookups always fail.
struct FailingDirectory {
    inner: MemoryDirectory,
}

#[axum::async_trait]
impl BookingDirectory for FailingDirectory {
    async fn bookings_for_professional(&self, _: ProfessionalId) -> RelayResult<Vec<Booking>> {
        Err(RelayError::directory("booking store unavailable", None))
    }

    async fn bookings_for_user(&self, _: UserId) -> RelayResult<Vec<Booking>> {
        Err(RelayError::directory("booking store unavailable", None))
    }

    async fn professional(&self, id: ProfessionalId) -> RelayResult<Option<ProfessionalRecord>> {
        self.inner.professional(id).await
    }

    async fn update_professional_location(
        &self,
        id: ProfessionalId,
        latitude: f64,
        longitude: f64,
    ) -> RelayResult<Option<ProfessionalRecord>> {
        self.inner
            .update_professional_location(id, latitude, longitude)
            .await
    }
}

#[tokio::test]
async fn test_directory_failure_loses_update_and_keeps_channels() {
    let inner = directory_with(&[]).await;
    let engine = BroadcastEngine::new(
        Arc::new(FailingDirectory { inner }),
        ConnectionRegistry::new(),
    );

    let (customer, mut customer_rx) = connect(&engine, Identity::Customer(3)).await;
    let (professional, _rx) = connect(&engine, Identity::Professional(7)).await;

    let outcome = professional.handle_text(&location_frame(1.0, 2.0)).await;

    assert_eq!(outcome, FrameOutcome::Failed);
    assert!(customer_rx.try_recv().is_err());
    assert_eq!(
        customer.state(),
        location_relay::session::SessionState::Open
    );
    assert!(engine.registry().resolve(Identity::Customer(3)).await.is_some());
}
