//! Uniform isolation for event callbacks.

use crate::TurnError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Runs one event handler, logging and swallowing any failure.
///
/// Returns `Some` with the handler's value on success and `None` when the
/// handler returned an error or panicked. The caller keeps processing the
/// next event either way.
pub fn guarded<T, F>(event: &'static str, handler: F) -> Option<T>
where
    F: FnOnce() -> Result<T, TurnError>,
{
    match panic::catch_unwind(AssertUnwindSafe(handler)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::warn!(event, "event handler failed, event dropped: {}", e);
            None
        }
        Err(payload) => {
            tracing::error!(
                event,
                "event handler panicked, event dropped: {}",
                panic_message(payload.as_ref())
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
