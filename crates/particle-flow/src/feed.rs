//! Debounced field loading for the animator.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};
use wind_common::{WindField, WindRequest};

use crate::animator::AnimatorEvent;
use crate::debounce::Debouncer;

/// Source of fields for the animation. Implementations are expected never to
/// fail, returning a fallback field instead.
#[async_trait]
pub trait FieldLoader: Send + Sync {
    async fn load(&self, request: &WindRequest) -> Arc<WindField>;
}

/// Turns a stream of request changes into at most one load per burst and
/// forwards each loaded field to the animator.
pub struct FieldFeed<L: FieldLoader> {
    loader: Arc<L>,
    debouncer: Debouncer,
}

impl<L: FieldLoader> FieldFeed<L> {
    pub fn new(loader: Arc<L>, debouncer: Debouncer) -> Self {
        Self { loader, debouncer }
    }

    /// Runs until `requests` closes or the animator goes away. Returns the
    /// number of loads performed.
    pub async fn run(
        self,
        mut requests: mpsc::Receiver<WindRequest>,
        events: mpsc::Sender<AnimatorEvent>,
    ) -> usize {
        let mut loads = 0;

        while let Some(request) = self.debouncer.next(&mut requests).await {
            debug!(bbox = ?request.bbox, source = %request.source, "Loading field");
            let field = self.loader.load(&request).await;
            loads += 1;

            if events.send(AnimatorEvent::Field(field)).await.is_err() {
                debug!("Animator gone, stopping field feed");
                break;
            }
        }

        info!(loads = loads, "Field feed finished");
        loads
    }
}
