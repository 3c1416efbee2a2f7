use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::pagination::{PageLinks, Paginated};

/// 成功レスポンスの共通エンベロープ
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageLinks>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: None,
            total: None,
            pagination: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// 件数付きの一覧
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::success(items)
        }
    }

    /// 件数・総数・前後リンク付きの一覧
    pub fn paginated(page: Paginated<T>) -> Self {
        let links = page.links();
        let total = page.total;
        Self {
            total: Some(total),
            pagination: Some(links),
            ..Self::list(page.items)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            count: None,
            total: None,
            pagination: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = ApiResponse::success(vec!["item1", "item2"]);
        assert!(response.success);
        assert_eq!(response.data, Some(vec!["item1", "item2"]));
        assert!(response.count.is_none());
    }

    #[test]
    fn test_paginated_response_serialization() {
        let page = Paginated::new(vec![1, 2], 5, 1, 2);
        let value = serde_json::to_value(ApiResponse::paginated(page)).unwrap();

        assert_eq!(value["count"], 2);
        assert_eq!(value["total"], 5);
        assert_eq!(value["pagination"]["next"]["page"], 2);
        assert!(value["pagination"].get("prev").is_none());
        assert!(value.get("message").is_none());
    }
}
