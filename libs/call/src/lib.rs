//! Orbit Call - per-invocation call context and dispatch layer
//!
//! Carries the metadata of a single remote procedure invocation (method,
//! arguments, endpoints, propagated attachments) and shapes how it gets
//! dispatched: synchronous, asynchronous, or one-way. Transports read the
//! context during dispatch; this crate performs no network I/O itself.
//!
//! # Example
//!
//! ```no_run
//! use orbit_call::{dispatch, CallContext, ResponseFuture, ServiceUrl};
//!
//! # async fn example() -> orbit_call::Result<()> {
//! let mut ctx = CallContext::new();
//! ctx.set_url(ServiceUrl::new("10.0.0.7", 8972))
//!     .set_method_name("Arith.Mul")
//!     .set_attachment("trace-id", "a1b2");
//!
//! // The closure is where the transport sends the request and attaches
//! // the in-flight response to the context.
//! let future: ResponseFuture<Vec<u8>> = dispatch::async_call(&mut ctx, |ctx| {
//!     let (sender, response) = ResponseFuture::pending();
//!     ctx.set_pending_response(response);
//!     # sender.complete(b"42".to_vec());
//!     Ok(None)
//! });
//! let _reply = future.await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod net;
pub mod response;

// Re-exports for convenience
pub use context::{CallContext, CallMode, ASYNC_ATTACHMENT_KEY, RETURN_ATTACHMENT_KEY};
pub use endpoint::{EndpointAddr, ServiceUrl};
pub use error::{Error, Result};
pub use response::{ResponseFuture, ResponseSender};
