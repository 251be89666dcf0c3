//! SSE stream tests
//!
//! Reads frames straight from the response body produced by
//! `create_event_sse_stream`.

use axum::body::Body;
use axum::response::IntoResponse;
use chrono::Utc;
use fms_common::events::{EventBus, SpotEvent};
use fms_common::sse::create_event_sse_stream;
use http_body_util::BodyExt;
use uuid::Uuid;

async fn next_frame(body: &mut Body) -> String {
    let frame = body
        .frame()
        .await
        .expect("stream ended")
        .expect("body error")
        .into_data()
        .expect("not a data frame");
    String::from_utf8_lossy(&frame).into_owned()
}

#[tokio::test]
async fn test_stream_starts_with_connection_status() {
    let bus = EventBus::new(10);
    let mut body = create_event_sse_stream("test", &bus).into_response().into_body();

    let first = next_frame(&mut body).await;
    assert!(first.contains("event: ConnectionStatus"));
    assert!(first.contains("data: connected"));
}

#[tokio::test]
async fn test_events_forwarded_with_type_name() {
    let bus = EventBus::new(10);
    let mut body = create_event_sse_stream("test", &bus).into_response().into_body();
    assert_eq!(bus.subscriber_count(), 1);

    let analysis_id = Uuid::new_v4();
    bus.emit(SpotEvent::AnalysisCompleted {
        analysis_id,
        match_count: 5,
        timestamp: Utc::now(),
    })
    .unwrap();

    let _connected = next_frame(&mut body).await;
    let frame = next_frame(&mut body).await;
    assert!(frame.contains("event: AnalysisCompleted"));
    assert!(frame.contains(&analysis_id.to_string()));
    assert!(frame.contains(r#""match_count":5"#));
}

#[tokio::test]
async fn test_lagging_client_gets_resync() {
    let bus = EventBus::new(2);
    let mut body = create_event_sse_stream("test", &bus).into_response().into_body();

    for _ in 0..5 {
        bus.emit_lossy(SpotEvent::StateReset {
            timestamp: Utc::now(),
        });
    }

    let _connected = next_frame(&mut body).await;
    let frame = next_frame(&mut body).await;
    assert!(frame.contains("event: Resync"));
    assert!(frame.contains("data: 3"));
}
