//! Server-Sent Events for store changes
//!
//! Streams every [`CmsEvent`] published on the bus, plus a heartbeat
//! comment every 15 seconds.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use cms_common::events::CmsEvent;
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::AppState;

const HEARTBEAT: Duration = Duration::from_secs(15);

fn to_sse(event: &CmsEvent) -> Option<Event> {
    match Event::default().event(event.event_type()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            warn!(error = %e, "Failed to encode event");
            None
        }
    }
}

/// GET /api/events
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected");
    let mut rx = state.bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default().event("ConnectionStatus").data("connected"));

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Ok(event) => {
                        if let Some(sse) = to_sse(&event) {
                            yield Ok(sse);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "SSE client lagging, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = tokio::time::sleep(HEARTBEAT) => {
                    debug!("SSE: Sending heartbeat");
                    yield Ok(Event::default().comment("heartbeat"));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(HEARTBEAT).text("heartbeat"))
}
