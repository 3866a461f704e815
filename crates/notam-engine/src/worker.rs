//! Background recomputation with last-write-wins semantics
//!
//! The UI submits inputs whenever something changes and watches for views.
//! A submission cancels whatever is still running, and a result is only
//! published if no newer submission arrived while it was being computed.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::review::{BriefingInputs, BriefingView, ReviewEngine};

/// A view tagged with the submission it was computed for
#[derive(Debug)]
pub struct ComputedView {
    pub generation: u64,
    pub view: BriefingView,
}

type Published = Option<Arc<ComputedView>>;

struct InFlight {
    generation: u64,
    cancel: CancellationToken,
}

struct Inner {
    engine: Arc<ReviewEngine>,
    in_flight: Mutex<InFlight>,
    tx: watch::Sender<Published>,
}

#[derive(Clone)]
pub struct ReviewWorker {
    inner: Arc<Inner>,
}

impl ReviewWorker {
    pub fn new(engine: ReviewEngine) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                engine: Arc::new(engine),
                in_flight: Mutex::new(InFlight {
                    generation: 0,
                    cancel: CancellationToken::new(),
                }),
                tx,
            }),
        }
    }

    /// Start computing a view for `inputs` and return its generation.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, inputs: BriefingInputs) -> u64 {
        let (generation, cancel) = {
            let mut in_flight = self.lock();
            in_flight.cancel.cancel();
            in_flight.generation += 1;
            in_flight.cancel = CancellationToken::new();
            (in_flight.generation, in_flight.cancel.clone())
        };
        debug!("Submitted review inputs, generation {}", generation);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let engine = Arc::clone(&inner.engine);
            let token = cancel.clone();
            let computed =
                tokio::task::spawn_blocking(move || engine.compute_cancellable(&inputs, &token)).await;

            let view = match computed {
                Ok(Ok(view)) => view,
                Ok(Err(_)) => {
                    debug!("Generation {} cancelled", generation);
                    return;
                }
                Err(e) => {
                    warn!("Review computation for generation {} failed: {}", generation, e);
                    return;
                }
            };

            // Publishing under the lock orders it against newer submissions
            let in_flight = inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if in_flight.generation != generation || cancel.is_cancelled() {
                debug!("Dropping stale view for generation {}", generation);
                return;
            }
            inner
                .tx
                .send_replace(Some(Arc::new(ComputedView { generation, view })));
        });

        generation
    }

    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.inner.tx.subscribe()
    }

    pub fn latest(&self) -> Published {
        let published = self.inner.tx.borrow();
        (*published).clone()
    }

    /// Wait until a view at least as new as `generation` is published
    pub async fn wait_for(&self, generation: u64) -> Result<Arc<ComputedView>> {
        let mut rx = self.subscribe();
        let published = rx
            .wait_for(|v| v.as_ref().is_some_and(|v| v.generation >= generation))
            .await
            .context("Review worker channel closed")?;

        let latest: Published = (*published).clone();
        latest.context("Review worker published an empty view")
    }

    /// Cancel the computation in flight, if any
    pub fn cancel(&self) {
        self.lock().cancel.cancel();
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InFlight> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
