//! Success envelope shared by every bookshelf endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SuccessBody<T> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// `{status: "success", message?, data?}` response with an explicit status code.
#[derive(Debug)]
pub struct Success<T = ()> {
    code: StatusCode,
    message: Option<String>,
    data: Option<T>,
}

impl<T> Success<T> {
    /// 200 OK with no message or data
    pub fn ok() -> Self {
        Self {
            code: StatusCode::OK,
            message: None,
            data: None,
        }
    }

    /// 201 Created with no message or data
    pub fn created() -> Self {
        Self {
            code: StatusCode::CREATED,
            ..Self::ok()
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        let body = SuccessBody {
            status: "success",
            message: self.message,
            data: self.data,
        };
        (self.code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn render<T: Serialize>(success: Success<T>) -> (StatusCode, serde_json::Value) {
        let response = success.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn message_only_omits_data() {
        let (status, body) = render(Success::<()>::ok().message("Buku berhasil dihapus")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "success", "message": "Buku berhasil dihapus"})
        );
    }

    #[tokio::test]
    async fn created_carries_data() {
        let (status, body) = render(
            Success::created()
                .message("Buku berhasil ditambahkan")
                .data(json!({"bookId": "abc"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["bookId"], "abc");
        assert_eq!(body["status"], "success");
    }
}
