use std::{pin::Pin, time::Duration};

use log::{debug, warn};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

mod error;
pub use error::GenerationError;

use crate::video_model::GenerationResult;

/// Delay between two consecutive status queries.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Opaque name of a server-side long-running operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle(pub String);

#[derive(Debug, Clone)]
pub struct OperationStatus {
    /// Refreshed handle. Replaces the one the query was made with.
    pub handle: OperationHandle,
    pub done: bool,
    pub result_locator: Option<String>,
    /// Raw diagnostic payload from the service, only used for logging.
    pub failure: Option<serde_json::Value>,
}

pub trait PollOperation {
    fn poll<'a>(
        &'a self,
        handle: &'a OperationHandle,
    ) -> Pin<Box<dyn Future<Output = Result<OperationStatus, GenerationError>> + Send + 'a>>;
}

/// Polls `handle` every [`POLL_INTERVAL`] until the operation finishes,
/// then returns the result locator the service reported.
///
/// Transient query failures are logged and retried with the unchanged
/// handle. There is no attempt ceiling, cancelling `cancel` is the way
/// to give up on a job.
pub async fn await_completion(
    ops: &(dyn PollOperation + Sync),
    mut handle: OperationHandle,
    on_progress: &(dyn Fn(&str) + Send + Sync),
    cancel: &CancellationToken,
) -> Result<GenerationResult, GenerationError> {
    on_progress("The model is processing your request, this can take a few minutes.");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
            _ = sleep(POLL_INTERVAL) => {}
        }

        let status = match ops.poll(&handle).await {
            Ok(status) => status,
            Err(e) if e.is_transient() => {
                warn!("Error while polling for video generation status: {e}");
                continue;
            }
            Err(e) => return Err(e),
        };

        if !status.done {
            debug!("Operation {} still running", status.handle.0);
            handle = status.handle;
            continue;
        }

        let Some(url) = status.result_locator else {
            if let Some(failure) = &status.failure {
                warn!("Generation finished, but no video was produced:\n{failure:#}");
            }
            return Err(GenerationError::EmptyResult);
        };

        on_progress("Video generated.");
        return Ok(GenerationResult { video_url: url });
    }
}
