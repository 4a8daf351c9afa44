//! Direct collection-update action.
//!
//! **Unsafe for unprotected use.** This route performs no authentication and
//! no origin verification: anyone who can reach it can invoke it. It is meant
//! to be called from inside the already-authenticated embedded app, and it
//! only acknowledges the request (bypass mode); no collection is modified.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ActionError;

/// Form field carrying the requested action
pub const ACTION_TYPE_FIELD: &str = "actionType";

/// The only action this route acknowledges
pub const ACTION_UPDATE: &str = "update";

pub const MSG_UPDATED: &str = "Collection updated successfully (bypass mode)";
pub const ERR_INVALID_ACTION: &str = "Invalid action";
pub const ERR_UPDATE_FAILED: &str = "Update failed";

/// JSON acknowledgement. `success` is always present, plus exactly one of
/// `message` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.to_string()),
        }
    }

    /// Decide the response for an action type read from the form.
    pub fn for_action(action_type: Option<&str>) -> Self {
        match action_type {
            Some(ACTION_UPDATE) => Self::ok(MSG_UPDATED),
            _ => Self::failure(ERR_INVALID_ACTION),
        }
    }
}

/// Handler for `POST /app/direct-update`.
///
/// Always answers `200 OK`; failures are reported in the JSON body.
#[instrument(name = "direct_update", skip(request))]
pub async fn direct_update(request: Request) -> Json<ActionResponse> {
    match read_action_type(request).await {
        Ok(action_type) => {
            let response = ActionResponse::for_action(action_type.as_deref());
            tracing::debug!(
                action_type = action_type.as_deref().unwrap_or("<none>"),
                success = response.success,
                "Direct update handled"
            );
            Json(response)
        }
        Err(e) => {
            tracing::error!(error = %e, "Direct update error");
            Json(ActionResponse::failure(ERR_UPDATE_FAILED))
        }
    }
}

/// Read the `actionType` field from a URL-encoded or multipart form body.
///
/// When the field repeats, the first occurrence wins. A multipart file part
/// is never an action, and neither is a text part that cannot be decoded.
async fn read_action_type(request: Request) -> Result<Option<String>, ActionError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
        .ok_or(ActionError::MissingContentType)?;

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &()).await?;
        let mut action_type = None;
        let mut seen = false;
        while let Some(field) = multipart.next_field().await? {
            if seen || field.name() != Some(ACTION_TYPE_FIELD) {
                continue;
            }
            seen = true;

            if let Some(file_name) = field.file_name() {
                tracing::debug!(file_name = %file_name, "actionType sent as a file part");
                continue;
            }
            match field.text().await {
                Ok(text) => action_type = Some(text),
                Err(e) => tracing::debug!(error = %e, "Unreadable actionType part"),
            }
        }
        Ok(action_type)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &()).await?;
        Ok(pairs
            .into_iter()
            .find(|(name, _)| name == ACTION_TYPE_FIELD)
            .map(|(_, value)| value))
    } else {
        Err(ActionError::UnsupportedContentType(content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn form_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/app/direct-update")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(fields: &[(&str, &str)]) -> Request {
        let boundary = "XBOUNDARYX";
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            ));
        }
        body.push_str(&format!("--{}--\r\n", boundary));

        Request::builder()
            .method("POST")
            .uri("/app/direct-update")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn multipart_file_request(name: &str, file_name: &str, bytes: &[u8]) -> Request {
        let boundary = "XBOUNDARYX";
        let mut body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            boundary, name, file_name
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/app/direct-update")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_for_action_update() {
        assert_eq!(
            ActionResponse::for_action(Some("update")),
            ActionResponse::ok(MSG_UPDATED)
        );
    }

    #[test]
    fn test_for_action_other_values() {
        for action in [None, Some(""), Some("delete"), Some("UPDATE"), Some(" update")] {
            assert_eq!(
                ActionResponse::for_action(action),
                ActionResponse::failure(ERR_INVALID_ACTION),
                "action {:?}",
                action
            );
        }
    }

    #[test]
    fn test_response_serialization_omits_absent_fields() {
        let ok = serde_json::to_value(ActionResponse::ok(MSG_UPDATED)).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({ "success": true, "message": MSG_UPDATED })
        );

        let failed = serde_json::to_value(ActionResponse::failure(ERR_UPDATE_FAILED)).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({ "success": false, "error": ERR_UPDATE_FAILED })
        );
    }

    #[tokio::test]
    async fn test_urlencoded_update_ignores_other_fields() {
        let Json(response) =
            direct_update(form_request("collectionId=42&actionType=update&title=x")).await;
        assert_eq!(response, ActionResponse::ok(MSG_UPDATED));
    }

    #[tokio::test]
    async fn test_urlencoded_missing_action_type() {
        let Json(response) = direct_update(form_request("title=x")).await;
        assert_eq!(response, ActionResponse::failure(ERR_INVALID_ACTION));

        let Json(response) = direct_update(form_request("")).await;
        assert_eq!(response, ActionResponse::failure(ERR_INVALID_ACTION));
    }

    #[tokio::test]
    async fn test_urlencoded_repeated_action_type_first_wins() {
        let Json(response) =
            direct_update(form_request("actionType=update&actionType=other")).await;
        assert_eq!(response, ActionResponse::ok(MSG_UPDATED));

        let Json(response) =
            direct_update(form_request("actionType=update&actionType=update")).await;
        assert_eq!(response, ActionResponse::ok(MSG_UPDATED));

        let Json(response) =
            direct_update(form_request("actionType=other&actionType=update")).await;
        assert_eq!(response, ActionResponse::failure(ERR_INVALID_ACTION));
    }

    #[tokio::test]
    async fn test_multipart_repeated_action_type_first_wins() {
        let request = multipart_request(&[("actionType", "update"), ("actionType", "other")]);
        let Json(response) = direct_update(request).await;
        assert_eq!(response, ActionResponse::ok(MSG_UPDATED));

        let request = multipart_request(&[("actionType", "other"), ("actionType", "update")]);
        let Json(response) = direct_update(request).await;
        assert_eq!(response, ActionResponse::failure(ERR_INVALID_ACTION));
    }

    #[tokio::test]
    async fn test_multipart_file_action_type_is_invalid() {
        let request = multipart_file_request("actionType", "action.txt", b"update");
        let Json(response) = direct_update(request).await;
        assert_eq!(response, ActionResponse::failure(ERR_INVALID_ACTION));

        let request = multipart_file_request("actionType", "blob.bin", &[0xff, 0xfe, 0x00, 0x9f]);
        let Json(response) = direct_update(request).await;
        assert_eq!(response, ActionResponse::failure(ERR_INVALID_ACTION));
    }

    #[tokio::test]
    async fn test_multipart_update() {
        let request = multipart_request(&[("title", "Summer"), ("actionType", "update")]);
        let Json(response) = direct_update(request).await;
        assert_eq!(response, ActionResponse::ok(MSG_UPDATED));
    }

    #[tokio::test]
    async fn test_multipart_other_action() {
        let request = multipart_request(&[("actionType", "publish")]);
        let Json(response) = direct_update(request).await;
        assert_eq!(response, ActionResponse::failure(ERR_INVALID_ACTION));
    }

    #[tokio::test]
    async fn test_unsupported_content_type_fails() {
        let request = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"actionType":"update"}"#))
            .unwrap();
        let Json(response) = direct_update(request).await;
        assert_eq!(response, ActionResponse::failure(ERR_UPDATE_FAILED));
    }

    #[tokio::test]
    async fn test_missing_content_type_fails() {
        let request = Request::builder()
            .method("POST")
            .body(Body::from("actionType=update"))
            .unwrap();
        let Json(response) = direct_update(request).await;
        assert_eq!(response, ActionResponse::failure(ERR_UPDATE_FAILED));
    }

    #[tokio::test]
    async fn test_multipart_without_boundary_fails() {
        let request = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "multipart/form-data")
            .body(Body::from("actionType=update"))
            .unwrap();
        let Json(response) = direct_update(request).await;
        assert_eq!(response, ActionResponse::failure(ERR_UPDATE_FAILED));
    }
}
