//! Interceptor task engine for Parlor.
//!
//! A task turns a multi-packet exchange into one awaitable operation. It
//! sends its opening request, watches the packet stream through a table of
//! subscriptions, may rewrite or block packets in flight, and resolves to
//! exactly one outcome.
//!
//! # Key types
//!
//! - [`Interceptor`] — hosts running tasks; the host feeds it every packet
//! - [`InterceptorTask`] — the trait each task implements
//! - [`Subscription`] — one row of a task's packet filter table
//! - [`Intercept`] — a packet in flight, lent to a handler
//! - [`TaskHandle`] — await, cancel or time out a task
//! - [`InterceptorConfig`] — session variant and default task timeout
//!
//! # Example
//!
//! ```
//! use parlor_intercept::{Intercept, Interceptor, InterceptorConfig, InterceptorTask, Subscription, TaskContext, TaskError};
//! use parlor_protocol::{Dispatcher, IdentifierTable, Identifier, Variant};
//!
//! const PONG: Identifier = Identifier::incoming("Pong");
//!
//! struct WaitForPong;
//!
//! impl InterceptorTask for WaitForPong {
//!     type Output = ();
//!     const NAME: &'static str = "WaitForPong";
//!
//!     fn on_execute(&mut self, _cx: &TaskContext<'_>) -> Result<(), TaskError> {
//!         Ok(())
//!     }
//!
//!     fn subscriptions() -> Vec<Subscription<Self>> {
//!         vec![Subscription::identifier(PONG, |_, e: &mut Intercept<'_, ()>| {
//!             e.complete(());
//!             Ok(())
//!         })]
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new(Variant::Modern, IdentifierTable::new());
//! let (mut interceptor, _outbound) =
//!     Interceptor::channel(InterceptorConfig::default(), dispatcher).unwrap();
//! let handle = interceptor.execute(WaitForPong);
//! assert_eq!(interceptor.active_tasks(), 1);
//! handle.cancel();
//! assert_eq!(interceptor.active_tasks(), 0);
//! ```

mod config;
mod engine;
mod error;
mod handle;
mod task;

pub use config::InterceptorConfig;
pub use engine::Interceptor;
pub use error::TaskError;
pub use handle::TaskHandle;
pub use task::{Filter, Intercept, InterceptorTask, Subscription, TaskContext};
