use std::future::Future;

/// Run `primary`; on a transient failure, run `fallback` exactly once.
///
/// A successful fallback recovers the cycle. A failed fallback surfaces the
/// *primary's* error, not its own: the fallback hop exists for recovery, not
/// diagnosis replacement. Non-transient primary failures (definitive server
/// responses, cancellation) never reach the fallback.
pub async fn attempt_with_fallback<T, E, P, F, Fut, Transient>(
    primary: P,
    fallback: F,
    is_transient: Transient,
) -> Result<T, E>
where
    P: Future<Output = Result<T, E>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    Transient: Fn(&E) -> bool,
{
    let primary_err = match primary.await {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    if !is_transient(&primary_err) {
        return Err(primary_err);
    }

    match fallback().await {
        Ok(value) => Ok(value),
        Err(_fallback_err) => Err(primary_err),
    }
}
