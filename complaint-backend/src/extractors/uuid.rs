use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// パスの直前セグメントから表示用のパラメータ名を推測する
fn param_name_for(path: &str) -> &'static str {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    for window in segments.windows(2) {
        if Uuid::parse_str(window[1]).is_ok() || window[1].len() >= 32 {
            return match window[0] {
                "complaints" => "complaint_id",
                "departments" => "department_id",
                "users" | "staff" => "user_id",
                _ => "id",
            };
        }
    }
    "id"
}

/// 統一UUID Extractor
/// 単一のパスパラメータからUUIDを抽出し、検証を行う
#[derive(Debug, Clone, Copy)]
pub struct ValidatedUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidatedUuid
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid path parameter: {}", e)))?;

        Uuid::parse_str(&raw).map(ValidatedUuid).map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid UUID format for '{}': '{}'",
                param_name_for(parts.uri.path()),
                raw
            ))
        })
    }
}

/// 複数パスパラメータ用のExtractor
/// Path<T>の代わりに使用し、拒否理由をAppErrorに揃える
#[derive(Debug)]
pub struct ValidatedMultiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedMultiPath<T>
where
    S: Send + Sync,
    T: serde::de::DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ValidatedMultiPath(value))
            .map_err(|e| AppError::BadRequest(format!("Invalid path parameters: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_name_for() {
        let id = Uuid::new_v4();
        assert_eq!(
            param_name_for(&format!("/api/v1/complaints/{}/rate", id)),
            "complaint_id"
        );
        assert_eq!(
            param_name_for(&format!("/api/v1/departments/{}", id)),
            "department_id"
        );
        assert_eq!(param_name_for("/api/v1/complaints/not-a-uuid"), "id");
    }
}
