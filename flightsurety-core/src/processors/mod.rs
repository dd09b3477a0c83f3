//! Event processors.
//!
//! - `EventWatcher`: follows one contract event, emits it into a channel
//! - `OracleDispatcher`: receives `OracleRequest`, submits oracle responses

pub mod dispatcher;
pub mod event_watcher;

pub use dispatcher::{Dispatched, OracleDispatcher, plan_responses, random_status_code};
pub use event_watcher::EventWatcher;
