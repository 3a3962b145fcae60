//! Debounced background reconciliation of the remote checkout.
//!
//! Every cart mutation bumps a revision on a `watch` channel. The worker
//! waits for a change, then keeps waiting until the revision has been quiet
//! for the debounce period, and only then reconciles. A mutation inside the
//! window restarts the timer, so a burst of edits costs one remote call.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::{CartInner, CartStore};

pub(super) fn spawn(
    runtime: &Handle,
    store: Weak<CartInner>,
    revisions: watch::Receiver<u64>,
    debounce: Duration,
) -> JoinHandle<()> {
    runtime.spawn(run(store, revisions, debounce))
}

async fn run(store: Weak<CartInner>, mut revisions: watch::Receiver<u64>, debounce: Duration) {
    loop {
        // Sender lives in the store; an error means every handle is gone
        if revisions.changed().await.is_err() {
            break;
        }

        loop {
            match tokio::time::timeout(debounce, revisions.changed()).await {
                Ok(Ok(())) => trace!("Cart changed during debounce window"),
                Ok(Err(_)) => return,
                Err(_) => break,
            }
        }

        let revision = *revisions.borrow_and_update();
        let Some(inner) = store.upgrade() else {
            break;
        };

        debug!(revision, "Reconciling checkout after quiet period");
        CartStore { inner }.sync().await;
    }

    debug!("Cart sync worker stopped");
}
