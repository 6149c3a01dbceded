//! Newline-delimited JSON request loop over stdio.

mod shutdown;

use std::time::Duration;

use anyhow::Context;
use storagegrid_provider::{Provider, Request, Response};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use self::shutdown::wait_for_signal;
use crate::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};

/// Serves requests from stdin until end of input or a shutdown signal.
///
/// Provider cleanup runs on every exit path, bounded by `cleanup_timeout`.
pub async fn serve(provider: &Provider, cleanup_timeout: Duration) -> anyhow::Result<()> {
    tracing::info!(target: TRACING_TARGET_STARTUP, "Serving provider requests on stdio");

    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    let result = tokio::select! {
        result = serve_lines(provider, input, &mut output) => result,
        signal = wait_for_signal() => {
            tracing::info!(target: TRACING_TARGET_SHUTDOWN, %signal, "Received shutdown signal");
            Ok(())
        }
    };

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        timeout_secs = cleanup_timeout.as_secs(),
        "Cleaning up provider"
    );
    if tokio::time::timeout(cleanup_timeout, provider.cleanup())
        .await
        .is_err()
    {
        tracing::warn!(
            target: TRACING_TARGET_SHUTDOWN,
            "Provider cleanup timed out"
        );
    }

    result
}

/// Answers each non-empty input line with exactly one output line.
async fn serve_lines<R, W>(provider: &Provider, input: R, output: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => provider.handle(request).await,
            Err(e) => {
                tracing::warn!(target: TRACING_TARGET_STARTUP, error = %e, "Malformed request");
                Response::malformed(&e)
            }
        };

        let mut encoded = serde_json::to_vec(&response).context("failed to encode response")?;
        encoded.push(b'\n');
        output
            .write_all(&encoded)
            .await
            .context("failed to write response")?;
        output.flush().await.context("failed to flush response")?;
    }

    tracing::info!(target: TRACING_TARGET_SHUTDOWN, "End of input");
    Ok(())
}
