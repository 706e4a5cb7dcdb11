//! Bounded retry around one generate+fit attempt.

use crate::candidate::Candidate;
use sciforge_error::Result;
use std::future::Future;

/// Run `generate` up to `1 + max_attempts` times, returning the first
/// successful candidate or `None` once the budget is exhausted.
///
/// Every failure is logged with the iteration index before the next try.
/// This is the only place in the loop that swallows errors; exhaustion
/// downgrades to "iteration skipped" rather than propagating.
pub async fn attempt_with_retry<F, Fut>(
    iteration: usize,
    max_attempts: usize,
    mut generate: F,
) -> Option<Candidate>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Candidate>>,
{
    let total = max_attempts + 1;
    for attempt in 1..=total {
        match generate().await {
            Ok(candidate) => return Some(candidate),
            Err(e) => {
                log::warn!(
                    "iteration {}: attempt {}/{} failed: {}",
                    iteration,
                    attempt,
                    total,
                    e
                );
            }
        }
    }
    log::error!(
        "iteration {}: max attempts reached, iteration skipped",
        iteration
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use sciforge_error::Error;
    use sciforge_vm::Scope;

    fn make_candidate() -> Candidate {
        let model = Scope::execute("model Physics { predict(x) = x0; }")
            .unwrap()
            .instantiate("Physics")
            .unwrap();
        Candidate::new(model, "model Physics { predict(x) = x0; }")
    }

    #[tokio::test]
    async fn test_always_failing_invokes_exactly_budget_plus_one() {
        let mut calls = 0usize;
        let result = attempt_with_retry(0, 3, || {
            calls += 1;
            async { Err(Error::extraction_failed("no fence")) }
        })
        .await;

        assert!(result.is_none());
        assert_eq!(calls, 4); // 1 initial + 3 retries
    }

    #[tokio::test]
    async fn test_success_returns_immediately() {
        let mut calls = 0usize;
        let result = attempt_with_retry(1, 3, || {
            calls += 1;
            async { Ok(make_candidate()) }
        })
        .await;

        assert!(result.is_some());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_fail_twice_then_succeed() {
        let mut calls = 0usize;
        let result = attempt_with_retry(2, 3, || {
            calls += 1;
            let ok = calls > 2;
            async move {
                if ok {
                    Ok(make_candidate())
                } else {
                    Err(Error::fit_failed("diverged"))
                }
            }
        })
        .await;

        assert!(result.is_some());
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_zero_retry_budget_tries_once() {
        let mut calls = 0usize;
        let result = attempt_with_retry(0, 0, || {
            calls += 1;
            async { Err(Error::extraction_failed("no fence")) }
        })
        .await;

        assert!(result.is_none());
        assert_eq!(calls, 1);
    }
}
