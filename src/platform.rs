//! Target-specific glue.
//!
//! Native builds run on a current-thread tokio runtime and require adapters
//! and listeners to be `Send + Sync`, since transports may report events
//! from other threads. Browser builds run on the single JavaScript event loop,
//! where DOM handles are neither, so the bounds are dropped there.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;

#[cfg(not(target_arch = "wasm32"))]
use tokio::runtime::{Handle, RuntimeFlavor};

#[cfg(not(target_arch = "wasm32"))]
use crate::error::Error;
use crate::error::Result;

// ============================================================================
// MaybeSendSync
// ============================================================================

/// `Send + Sync` on native targets, no bound on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

/// `Send + Sync` on native targets, no bound on `wasm32`.
#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

// ============================================================================
// Deferred Tasks
// ============================================================================

/// Runs `task` on a later scheduler tick.
///
/// The task is queued on the current-thread runtime driving the caller, so
/// it never starts before the calling code yields back to that runtime.
/// A multi-thread runtime offers no such ordering: an idle worker may pick
/// the task up at once, which is why it is refused.
///
/// Calls from a `spawn_blocking` thread pass the check but race the
/// runtime thread all the same.
///
/// # Errors
///
/// Returns [`Error::Unsupported`](crate::Error::Unsupported) outside a tokio runtime or on a
/// multi-thread runtime.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn defer<F>(task: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = Handle::try_current()
        .map_err(|_| Error::unsupported("connections must be created inside a tokio runtime"))?;

    if handle.runtime_flavor() != RuntimeFlavor::CurrentThread {
        return Err(Error::unsupported(
            "connections require a current-thread tokio runtime",
        ));
    }

    handle.spawn(task);
    Ok(())
}

/// Runs `task` on a later microtask.
///
/// # Errors
///
/// Never fails; the JavaScript event loop is single-threaded.
#[cfg(target_arch = "wasm32")]
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn defer<F>(task: F) -> Result<()>
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(task);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
