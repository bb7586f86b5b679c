//! Per-call context threaded through every handler invocation

use std::fmt;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Which consumer invoked a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Cli,
    Tool,
    Recorder,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Surface::Cli => "cli",
            Surface::Tool => "tool",
            Surface::Recorder => "recorder",
        };
        f.write_str(name)
    }
}

/// Context for a single handler call
///
/// Cancellation is advisory once a handler is running: the core only refuses
/// to start a handler for a cancelled call, and handlers decide how to honor
/// the token after that.
#[derive(Debug, Clone)]
pub struct CallContext {
    surface: Surface,
    cancel: CancellationToken,
}

impl CallContext {
    pub fn new(surface: Surface) -> Self {
        Self::with_cancellation(surface, CancellationToken::new())
    }

    pub fn with_cancellation(surface: Surface, cancel: CancellationToken) -> Self {
        Self { surface, cancel }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the call is cancelled
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared_with_token() {
        let token = CancellationToken::new();
        let ctx = CallContext::with_cancellation(Surface::Tool, token.clone());

        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.surface(), Surface::Tool);
    }

    #[test]
    fn test_surface_display() {
        assert_eq!(Surface::Recorder.to_string(), "recorder");
    }
}
