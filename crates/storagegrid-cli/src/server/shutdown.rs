//! Process signals that end the request loop.

use std::{fmt, io};

use crate::TRACING_TARGET_SHUTDOWN;

/// Signal that ended the request loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    Interrupt,
    Terminate,
}

impl Shutdown {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves with the first termination signal delivered to the process.
///
/// A signal whose handler cannot be installed is logged and never fires.
pub async fn wait_for_signal() -> Shutdown {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Shutdown::Interrupt,
            Err(e) => never(Shutdown::Interrupt, e).await,
        }
    };

    tokio::select! {
        signal = interrupt => signal,
        signal = terminate() => signal,
    }
}

#[cfg(unix)]
async fn terminate() -> Shutdown {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
            Shutdown::Terminate
        }
        Err(e) => never(Shutdown::Terminate, e).await,
    }
}

#[cfg(not(unix))]
async fn terminate() -> Shutdown {
    std::future::pending().await
}

async fn never(signal: Shutdown, error: io::Error) -> Shutdown {
    tracing::error!(
        target: TRACING_TARGET_SHUTDOWN,
        %signal,
        error = %error,
        "Signal handler unavailable"
    );
    std::future::pending().await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn signals_display_their_names() {
        assert_eq!(Shutdown::Interrupt.to_string(), "SIGINT");
        assert_eq!(Shutdown::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn waits_while_no_signal_arrives() {
        let waited = tokio::time::timeout(Duration::from_millis(50), wait_for_signal()).await;
        assert!(waited.is_err());
    }
}
