// handlers/protected/policies/submission.rs - policy body as JSON or multipart form

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::services::Upload;
use crate::storage::content_type_for;
use crate::validation::PolicyPayload;

/// Multipart part carrying the attachment
pub const DOCUMENT_FIELD: &str = "document";

/// Policy fields plus an optional attachment.
///
/// `multipart/form-data` bodies take every text part as a field and the
/// `document` file part as the upload; anything else is read as JSON.
#[derive(Debug)]
pub struct PolicySubmission {
    pub payload: PolicyPayload,
    pub upload: Option<Upload>,
}

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for PolicySubmission {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(payload) = Json::<PolicyPayload>::from_request(req, state).await?;
            return Ok(Self { payload, upload: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        let mut fields = Map::new();
        let mut upload = None;

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == DOCUMENT_FIELD {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| content_type_for(&file_name).to_string());
                let bytes = field.bytes().await?;
                // browsers send an empty part when no file was chosen
                if !bytes.is_empty() {
                    upload = Some(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                fields.insert(name, Value::String(field.text().await?));
            }
        }

        let payload = serde_json::from_value(Value::Object(fields))
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {e}")))?;

        Ok(Self { payload, upload })
    }
}
