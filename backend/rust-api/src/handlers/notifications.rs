use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{models::Notification, services::AppState};

/// GET /api/v1/notifications
pub async fn list_notifications(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.notifications.recent())
}

/// GET /api/v1/notifications/stream
pub async fn notification_stream(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::info!("Client connected to notification stream");
    let receiver = state.notifications.subscribe();
    Sse::new(create_notification_stream(receiver)).keep_alive(KeepAlive::default())
}

/// Ends when the channel closes. Lagging subscribers skip what they missed.
fn create_notification_stream(
    receiver: broadcast::Receiver<Notification>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(receiver, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    let event = Event::default()
                        .event(notification.event_name())
                        .data(notification.to_sse_data());
                    return Some((Ok(event), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Notification stream lagged by {} messages", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
