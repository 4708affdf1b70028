use crate::api::transport::RawResponse;
use crate::errors::{Result, TrackerError};
use serde_json::Value;

/// Map a tracker response to its JSON body or a typed failure. Failures are logged here.
pub fn classify(response: RawResponse) -> Result<Value> {
    match response.status {
        200 => serde_json::from_str(&response.body).map_err(|e| {
            tracing::error!("Unparsable Jira response body: {}", e);
            TrackerError::InvalidResponse(e.to_string())
        }),
        400 => {
            tracing::error!("{}", response.body);
            Err(TrackerError::Request(response.body))
        }
        401 => {
            tracing::error!("Invalid Jira credentials");
            Err(TrackerError::Authentication)
        }
        403 => {
            tracing::error!("CAPTCHA challenge triggered");
            Err(TrackerError::Challenge)
        }
        404 => {
            tracing::error!("Jira ticket not found");
            Err(TrackerError::NotFound("Jira ticket not found".to_string()))
        }
        status => {
            tracing::error!("Unhandled error trying to fetch details ({})", status);
            Err(TrackerError::Unclassified {
                status,
                body: response.body,
            })
        }
    }
}

/// Mutation endpoints answer 204 on success; anything else fails the whole request.
pub fn expect_no_content(response: RawResponse, action: &str) -> Result<()> {
    if response.status == 204 {
        return Ok(());
    }

    tracing::error!("Failed to {} ({})", action, response.status);
    Err(TrackerError::MutationFailed {
        action: action.to_string(),
        status: response.status,
        body: response.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_returns_parsed_body() {
        let body = classify(RawResponse::new(200, r#"{"total": 3}"#)).unwrap();
        assert_eq!(body, json!({"total": 3}));
    }

    #[test]
    fn test_ok_with_garbage_body() {
        let err = classify(RawResponse::new(200, "<html>")).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidResponse(_)));
    }

    #[test]
    fn test_status_mapping() {
        let err = classify(RawResponse::new(400, "Field 'fixversion' does not exist")).unwrap_err();
        assert!(matches!(err, TrackerError::Request(msg) if msg.contains("fixversion")));

        assert!(matches!(
            classify(RawResponse::new(401, "")).unwrap_err(),
            TrackerError::Authentication
        ));
        assert!(matches!(
            classify(RawResponse::new(403, "")).unwrap_err(),
            TrackerError::Challenge
        ));

        let err = classify(RawResponse::new(404, "")).unwrap_err();
        assert!(err.is_not_found());

        let err = classify(RawResponse::new(503, "maintenance")).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Unclassified { status: 503, ref body } if body == "maintenance"
        ));
    }

    #[test]
    fn test_other_success_codes_are_not_silently_accepted() {
        let err = classify(RawResponse::new(204, "")).unwrap_err();
        assert!(matches!(err, TrackerError::Unclassified { status: 204, .. }));
    }

    #[test]
    fn test_expect_no_content() {
        assert!(expect_no_content(RawResponse::new(204, ""), "set summary").is_ok());

        let err = expect_no_content(RawResponse::new(200, "{}"), "set summary").unwrap_err();
        assert!(matches!(err, TrackerError::MutationFailed { status: 200, .. }));

        let err = expect_no_content(RawResponse::new(400, "no such field"), "set summary")
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to set summary (400): no such field");
    }
}
