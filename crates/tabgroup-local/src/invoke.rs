use tabgroup_core::{
    CompletionBackend, CompletionRequest, CompletionResponse, Error, Result, RetryPolicy,
};

/// Call the backend until it succeeds or the attempt budget is spent.
///
/// Every backend error is treated as retriable. The sleep between attempts
/// grows linearly: one backoff unit after the first failure, two after the
/// second, and so on. After the last failed attempt the final error is
/// surfaced wrapped in `Error::Upstream`.
pub async fn complete_with_retry(
    backend: &dyn CompletionBackend,
    req: &CompletionRequest,
    policy: &RetryPolicy,
) -> Result<CompletionResponse> {
    let max = policy.max_attempts.max(1);
    let mut attempt: u32 = 1;
    loop {
        match backend.complete(req).await {
            Ok(resp) => return Ok(resp),
            Err(err) => {
                if attempt >= max {
                    return Err(Error::Upstream(format!(
                        "completion failed after {max} attempts: {err}"
                    )));
                }
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "completion attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
