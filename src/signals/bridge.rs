//! # Interrupt-to-task bridge.
//!
//! [`ShutdownBridge`] is the one piece of state shared between code that runs
//! outside the async scheduler (an OS signal listener, a plain thread, a test)
//! and tasks that run inside it.
//!
//! ```text
//!  any thread                           async task
//!  ──────────                           ──────────
//!  bridge.set() ──► flag = true ──────► bridge.wait().await returns
//!                   notify_waiters()    bridge.clear()  (consume)
//! ```
//!
//! ## Rules
//! - `set` is non-blocking and may be called from any thread, with or without a runtime.
//! - Repeated `set` calls before a `clear` coalesce into one observation.
//! - `wait` returns immediately when the flag is already set; every waiter registered
//!   at the time of `set` is woken.
//! - The flag stays set until a consumer calls `clear` (or `take`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    flag: AtomicBool,
    notify: Notify,
}

/// Settable-from-anywhere, awaitable-in-a-task boolean event.
///
/// Cheap to clone; all clones share the same flag.
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use missionvisor::ShutdownBridge;
///
/// let bridge = ShutdownBridge::new();
/// let remote = bridge.clone();
/// std::thread::spawn(move || remote.set()).join().unwrap();
///
/// bridge.wait().await;
/// assert!(bridge.take());
/// assert!(!bridge.is_set());
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct ShutdownBridge {
    inner: Arc<Inner>,
}

/// The process-wide bridge and whether a task is still forwarding interrupts into it.
struct OsHandler {
    bridge: ShutdownBridge,
    forwarding: Arc<AtomicBool>,
}

static OS_HANDLER: Mutex<Option<OsHandler>> = Mutex::new(None);

impl ShutdownBridge {
    /// Creates an unset bridge with no OS handler attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide bridge fed by the interrupt signal.
    ///
    /// Must run inside a tokio runtime. The forwarding task (SIGINT on unix,
    /// Ctrl-C elsewhere) only ever calls [`set`](Self::set) and lives on the
    /// runtime that started it. Later calls return the same bridge; when the
    /// runtime that ran the forwarder has shut down, a new forwarder is started
    /// on the current one.
    pub fn install_os_handler() -> std::io::Result<Self> {
        let mut slot = OS_HANDLER.lock().unwrap_or_else(PoisonError::into_inner);
        let bridge = match slot.as_ref() {
            Some(handler) if handler.forwarding.load(Ordering::SeqCst) => {
                return Ok(handler.bridge.clone());
            }
            Some(handler) => {
                tracing::debug!("interrupt forwarder ended with its runtime, restarting");
                handler.bridge.clone()
            }
            None => Self::new(),
        };

        let forwarding = forward_interrupts(bridge.clone())?;
        tracing::debug!("interrupt handler installed");
        *slot = Some(OsHandler {
            bridge: bridge.clone(),
            forwarding,
        });
        Ok(bridge)
    }

    /// Raises the flag and wakes every waiter.
    pub fn set(&self) {
        if !self.inner.flag.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Lowers the flag so the next `set` is observed again.
    pub fn clear(&self) {
        self.inner.flag.store(false, Ordering::SeqCst);
    }

    /// Lowers the flag and reports whether it was set.
    pub fn take(&self) -> bool {
        self.inner.flag.swap(false, Ordering::SeqCst)
    }

    /// Current flag value.
    pub fn is_set(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Waits until the flag is set. Cancel-safe.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent `set` cannot be missed.
            notified.as_mut().enable();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }
}

/// Lowers the shared flag when the forwarding future is dropped, which
/// includes its runtime shutting down.
struct Forwarding(Arc<AtomicBool>);

impl Forwarding {
    fn start() -> (Self, Arc<AtomicBool>) {
        let live = Arc::new(AtomicBool::new(true));
        (Self(live.clone()), live)
    }
}

impl Drop for Forwarding {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(unix)]
fn forward_interrupts(bridge: ShutdownBridge) -> std::io::Result<Arc<AtomicBool>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let (guard, live) = Forwarding::start();
    tokio::spawn(async move {
        let _guard = guard;
        while sigint.recv().await.is_some() {
            bridge.set();
        }
    });
    Ok(live)
}

#[cfg(not(unix))]
fn forward_interrupts(bridge: ShutdownBridge) -> std::io::Result<Arc<AtomicBool>> {
    let (guard, live) = Forwarding::start();
    tokio::spawn(async move {
        let _guard = guard;
        while tokio::signal::ctrl_c().await.is_ok() {
            bridge.set();
        }
    });
    Ok(live)
}
