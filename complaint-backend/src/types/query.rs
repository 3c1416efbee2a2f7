use crate::error::{AppError, AppResult};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// デフォルトページサイズ
pub const DEFAULT_PAGE_SIZE: u32 = 25;
/// 最大ページサイズ
pub const MAX_PAGE_SIZE: u32 = 100;

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// 文字列または数値からu32をデシリアライズ
pub(crate) fn deserialize_u32_from_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u32),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.trim().parse::<u32>().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => Ok(n),
    }
}

/// 統一ページネーションクエリパラメータ
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PaginationQuery {
    #[serde(
        default = "default_page",
        deserialize_with = "deserialize_u32_from_string"
    )]
    pub page: u32,
    #[serde(
        default = "default_limit",
        deserialize_with = "deserialize_u32_from_string"
    )]
    pub limit: u32,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// 範囲を補正したページと件数
    pub fn get_pagination(&self) -> (u64, u64) {
        let page = self.page.max(1) as u64;
        let limit = self.limit.clamp(1, MAX_PAGE_SIZE) as u64;
        (page, limit)
    }

    pub fn get_offset(&self) -> u64 {
        let (page, limit) = self.get_pagination();
        (page - 1) * limit
    }
}

/// ソート順序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// `-createdAt,title` 形式の一要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F> SortKey<F> {
    /// カンマ区切りのソート指定を解釈する。先頭の `-` は降順。
    pub fn parse_list(raw: &str, resolve: impl Fn(&str) -> Option<F>) -> AppResult<Vec<Self>> {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (name, order) = match part.strip_prefix('-') {
                    Some(name) => (name, SortOrder::Desc),
                    None => (part.trim_start_matches('+'), SortOrder::Asc),
                };
                let field = resolve(name).ok_or_else(|| {
                    AppError::ValidationError(format!("Unsupported sort field: '{}'", name))
                })?;
                Ok(SortKey { field, order })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(name: &str) -> Option<&'static str> {
        match name {
            "createdAt" => Some("created_at"),
            "title" => Some("title"),
            _ => None,
        }
    }

    #[test]
    fn test_pagination_clamps_limit() {
        let query = PaginationQuery::new(0, 500);
        assert_eq!(query.get_pagination(), (1, 100));
        assert_eq!(query.get_offset(), 0);

        let query = PaginationQuery::new(3, 25);
        assert_eq!(query.get_offset(), 50);
    }

    #[test]
    fn test_pagination_defaults() {
        let query = PaginationQuery::default();
        assert_eq!(query.get_pagination(), (1, 25));
    }

    #[test]
    fn test_parse_sort_list() {
        let keys = SortKey::parse_list("-createdAt, title", resolve).unwrap();
        assert_eq!(
            keys,
            vec![
                SortKey {
                    field: "created_at",
                    order: SortOrder::Desc
                },
                SortKey {
                    field: "title",
                    order: SortOrder::Asc
                },
            ]
        );
    }

    #[test]
    fn test_parse_sort_rejects_unknown_field() {
        assert!(SortKey::parse_list("-password", resolve).is_err());
    }
}
