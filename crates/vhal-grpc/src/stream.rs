//! Property value stream task
//!
//! Reads server-pushed batches, reconciles them against the timestamp table
//! and hands accepted values to the property change callback. Every await
//! is raced against the shutdown signal, so dropping the stream is how an
//! in-flight read gets cancelled.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use vhal_core::VehiclePropValue;

use crate::bridge::Shared;
use crate::config::StreamConfig;
use crate::transport::{RpcStatus, VehicleServerStub};

/// How one stream session ended
#[derive(Debug)]
pub(crate) enum SessionEnd {
    /// Shutdown was signalled
    Shutdown,
    /// The server closed the stream
    Closed { batches: usize },
    /// Opening or reading the stream failed
    Failed { batches: usize, status: RpcStatus },
}

/// Resolves once shutdown is signalled or the sender is gone
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Run stream sessions until shutdown, reopening per `config`
pub(crate) async fn run_value_stream(
    stub: Arc<dyn VehicleServerStub>,
    shared: Arc<Shared>,
    config: StreamConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut backoff = config.initial_backoff();

    loop {
        let batches = match poll_values(stub.as_ref(), &shared, &mut shutdown).await {
            SessionEnd::Shutdown => break,
            SessionEnd::Closed { batches } => {
                info!(batches, "Property value stream closed by server");
                batches
            }
            SessionEnd::Failed { batches, status } => {
                error!(batches, %status, "Property value stream failed");
                batches
            }
        };

        if !config.reconnect {
            warn!("Property value stream ended, no further events will be delivered");
            break;
        }

        if batches > 0 {
            backoff = config.initial_backoff();
        }
        debug!(backoff_ms = backoff.as_millis() as u64, "Reopening property value stream");

        tokio::select! {
            _ = shutdown_requested(&mut shutdown) => break,
            _ = tokio::time::sleep(backoff) => {}
        }
        backoff = (backoff * 2).min(config.max_backoff());
    }

    debug!("Property value stream task finished");
}

/// One stream session: open, then deliver batches until it ends
pub(crate) async fn poll_values(
    stub: &dyn VehicleServerStub,
    shared: &Shared,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd {
    let opened = tokio::select! {
        _ = shutdown_requested(shutdown) => return SessionEnd::Shutdown,
        opened = stub.start_property_values_stream() => opened,
    };
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(status) => return SessionEnd::Failed { batches: 0, status },
    };
    debug!("Property value stream opened");

    let mut batches = 0;
    loop {
        let next = tokio::select! {
            _ = shutdown_requested(shutdown) => return SessionEnd::Shutdown,
            next = stream.next() => next,
        };
        match next {
            Some(Ok(values)) => {
                batches += 1;
                deliver_batch(shared, values);
            }
            Some(Err(status)) => return SessionEnd::Failed { batches, status },
            None => return SessionEnd::Closed { batches },
        }
    }
}

/// Reconcile one pushed batch and dispatch the accepted values at once
pub(crate) fn deliver_batch(shared: &Shared, values: Vec<VehiclePropValue>) {
    let mut accepted = Vec::with_capacity(values.len());
    for mut value in values {
        if shared.timestamps.admit(&mut value) {
            accepted.push(value);
        } else {
            warn!(
                key = %value.key(),
                timestamp = value.timestamp,
                "Ignoring outdated property event"
            );
        }
    }

    if !accepted.is_empty() {
        shared.callbacks.dispatch_property_change(accepted);
    }
}
