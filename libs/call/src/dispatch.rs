//! Call-shape dispatch helpers
//!
//! The shape of a call (asynchronous, one-way) is communicated to the
//! transport layer purely through the reserved attachment keys: the signal
//! is raised for the duration of the supplied unit of work and always
//! cleared before the helper returns, whatever the outcome.

use tracing::debug;

use crate::context::{CallContext, CallMode};
use crate::error::{Error, Result};
use crate::response::ResponseFuture;

/// Clears a call-mode signal when dropped, so it never outlives the
/// dispatch even when `work` unwinds
struct ModeGuard<'a> {
    ctx: &'a mut CallContext,
    mode: CallMode,
}

impl<'a> ModeGuard<'a> {
    fn set(ctx: &'a mut CallContext, mode: CallMode) -> Self {
        ctx.set_call_mode(mode);
        Self { ctx, mode }
    }
}

impl Drop for ModeGuard<'_> {
    fn drop(&mut self) {
        self.ctx.clear_call_mode(self.mode);
    }
}

/// Invoke `work` with the async signal raised and hand back a response
/// future
///
/// `work` runs synchronously in the calling task:
/// - a `Some` result was resolved locally (cache hit, local-only route) and
///   comes back wrapped in an already-completed future;
/// - a `None` result means the transport attached the real in-flight
///   response to the context during `work`, and that future is returned;
/// - an error never escapes synchronously, it is captured into a future
///   that fails on await.
///
/// The helper never blocks on the network; waiting is deferred to whoever
/// awaits the returned future.
pub fn async_call<T, F>(ctx: &mut CallContext, work: F) -> ResponseFuture<T>
where
    T: Send + 'static,
    F: FnOnce(&mut CallContext) -> Result<Option<T>>,
{
    let guard = ModeGuard::set(ctx, CallMode::Async);
    match work(&mut *guard.ctx) {
        Ok(Some(value)) => {
            debug!("call resolved locally");
            ResponseFuture::ready(value)
        }
        Ok(None) => match guard.ctx.take_pending_response::<T>() {
            Some(future) => future,
            None if guard.ctx.has_pending_response() => {
                ResponseFuture::failed(Error::PendingTypeMismatch)
            }
            None => ResponseFuture::failed(Error::NoPendingResponse),
        },
        Err(e) => {
            debug!(error = %e, "call failed during dispatch");
            ResponseFuture::failed(Error::Call(e.to_string()))
        }
    }
}

/// Invoke `work` with the no-response signal raised
///
/// Errors propagate synchronously, wrapped as a oneway dispatch error,
/// since there is no future to defer them into.
pub fn oneway_call<F>(ctx: &mut CallContext, work: F) -> Result<()>
where
    F: FnOnce(&mut CallContext) -> Result<()>,
{
    let guard = ModeGuard::set(ctx, CallMode::OneWay);
    work(&mut *guard.ctx).map_err(|e| {
        debug!(error = %e, "oneway call failed");
        Error::Oneway(e.to_string())
    })
}
