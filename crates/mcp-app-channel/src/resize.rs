//! Debounced size-change observation.
//!
//! The embedder publishes rendered-content dimensions into a watch channel;
//! a monitor task waits for them to stabilize and emits one size-changed
//! notification per burst of layout changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::channel::AppChannel;
use crate::types::Dimensions;

/// Stops a running size monitor.
///
/// Safe to invoke any number of times; dropping the guard does not stop
/// observation.
#[derive(Clone)]
pub struct SizeGuard {
    inner: Arc<GuardInner>,
}

struct GuardInner {
    handle: JoinHandle<()>,
    stopped: AtomicBool,
}

impl SizeGuard {
    fn new(handle: JoinHandle<()>) -> Self {
        Self {
            inner: Arc::new(GuardInner {
                handle,
                stopped: AtomicBool::new(false),
            }),
        }
    }

    pub fn stop(&self) {
        if !self.inner.stopped.swap(true, Ordering::SeqCst) {
            self.inner.handle.abort();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }
}

pub(crate) fn spawn(
    channel: Arc<AppChannel>,
    mut receiver: watch::Receiver<Dimensions>,
) -> SizeGuard {
    let debounce = channel.config().size_debounce;
    let handle = tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            // Absorb further changes until the layout holds still for one
            // debounce interval.
            let mut publisher_gone = false;
            loop {
                tokio::select! {
                    changed = receiver.changed() => {
                        if changed.is_err() {
                            publisher_gone = true;
                            break;
                        }
                    }
                    _ = sleep(debounce) => break,
                }
            }

            let dimensions = *receiver.borrow_and_update();
            channel.notify_size(dimensions);

            if publisher_gone {
                break;
            }
        }
    });
    SizeGuard::new(handle)
}
