//! Session worker.
//!
//! The [`SessionManager`](crate::session::SessionManager) lives on one thread
//! and is driven through a bounded channel of [`SessionRequest`]s, so every
//! access to the remote session is serialized. The async server holds a
//! cloneable [`SessionWorker`] handle and awaits each reply.

mod handle;
mod loop_impl;
pub mod request;

pub use handle::SessionWorker;
pub use loop_impl::run_session_loop;
pub use request::SessionRequest;
