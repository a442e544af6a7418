//! Termination signals.
//!
//! SIGINT, SIGTERM and SIGHUP are observed on the tokio runtime and only
//! raise a shared flag. The event loop polls that flag at the top of each
//! tick and leaves through its normal teardown path.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// Install handlers for the termination signals and raise `stop` when one
/// arrives.
///
/// The handlers are registered before this returns, so a signal delivered
/// afterwards is never handled by the default action.
pub fn spawn_signal_watcher(runtime: &Handle, stop: Arc<AtomicBool>) -> io::Result<()> {
    let _guard = runtime.enter();
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    runtime.spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
            _ = hangup.recv() => "SIGHUP",
        };
        info!(signal = name, "termination signal received");
        stop.store(true, Ordering::SeqCst);
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use nix::sys::signal::{raise, Signal};

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_hangup_raises_flag() {
        let stop = Arc::new(AtomicBool::new(false));
        spawn_signal_watcher(&Handle::current(), stop.clone()).unwrap();
        assert!(!stop.load(Ordering::SeqCst));

        raise(Signal::SIGHUP).unwrap();

        for _ in 0..200 {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(stop.load(Ordering::SeqCst));
    }
}
