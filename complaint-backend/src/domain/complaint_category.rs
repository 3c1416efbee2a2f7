// complaint-backend/src/domain/complaint_category.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// 苦情カテゴリ（部署の担当範囲とSLAのキーを兼ねる）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintCategory {
    Electricity,
    Water,
    Roads,
    Sanitation,
    StreetLights,
    Drainage,
    PublicTransport,
    Other,
}

impl ComplaintCategory {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "electricity" => Some(Self::Electricity),
            "water" => Some(Self::Water),
            "roads" => Some(Self::Roads),
            "sanitation" => Some(Self::Sanitation),
            "street_lights" => Some(Self::StreetLights),
            "drainage" => Some(Self::Drainage),
            "public_transport" => Some(Self::PublicTransport),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Water => "water",
            Self::Roads => "roads",
            Self::Sanitation => "sanitation",
            Self::StreetLights => "street_lights",
            Self::Drainage => "drainage",
            Self::PublicTransport => "public_transport",
            Self::Other => "other",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::Electricity,
            Self::Water,
            Self::Roads,
            Self::Sanitation,
            Self::StreetLights,
            Self::Drainage,
            Self::PublicTransport,
            Self::Other,
        ]
    }
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComplaintCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Invalid complaint category: '{}'. Valid categories are: {}",
                s,
                Self::all()
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}

impl From<ComplaintCategory> for String {
    fn from(category: ComplaintCategory) -> Self {
        category.as_str().to_string()
    }
}
