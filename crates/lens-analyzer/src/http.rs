//! Shared HTTP response checks for analysis calls.
//!
//! 429 maps to [`AnalyzerError::RateLimited`] with the `Retry-After` value
//! (60 s when absent or unparseable); any other non-success status maps to
//! [`AnalyzerError::Api`] carrying the response body. Nothing here retries.

use crate::error::AnalyzerError;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Return the response unchanged if its status is a success.
pub async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, AnalyzerError> {
    if resp.status() == 429 {
        return Err(AnalyzerError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !resp.status().is_success() {
        return Err(AnalyzerError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, retry_after: Option<&str>, body: &'static str) -> reqwest::Response {
        let mut builder = ::http::Response::builder().status(status);
        if let Some(value) = retry_after {
            builder = builder.header("Retry-After", value);
        }
        reqwest::Response::from(builder.body(body).unwrap())
    }

    #[test]
    fn retry_after_defaults_when_missing_or_garbage() {
        assert_eq!(parse_retry_after(&response(429, Some(" 15 "), "")), 15);
        assert_eq!(parse_retry_after(&response(429, None, "")), 60);
        assert_eq!(
            parse_retry_after(&response(429, Some("Wed, 21 Oct 2026 07:28:00 GMT"), "")),
            60
        );
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let err = check_response(response(429, Some("30"), ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::RateLimited {
                retry_after_secs: 30
            }
        ));
    }

    #[tokio::test]
    async fn server_error_keeps_body() {
        let err = check_response(response(503, None, "model overloaded"))
            .await
            .unwrap_err();
        match err {
            AnalyzerError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "model overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn success_passes_through() {
        assert!(check_response(response(200, None, "{}")).await.is_ok());
    }
}
