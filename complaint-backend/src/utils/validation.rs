use crate::domain::geo::GeoPoint;
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// 部署連絡先メール用正規表現
pub static CONTACT_EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email pattern")
});

/// 電話番号用正規表現（数字、空白、ハイフン、括弧、先頭の+）
pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("valid phone pattern"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn validate_contact_email(email: &str) -> Result<(), ValidationError> {
    if CONTACT_EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(error("invalid_email", "Please provide a valid email"))
    }
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        Err(error("invalid_phone", "Please provide a valid phone number"))
    }
}

/// 空白のみの文字列を拒否
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Value must not be blank"))
    } else {
        Ok(())
    }
}

/// `[lat, lng]` の範囲チェック
pub fn validate_coordinates(point: &GeoPoint) -> Result<(), ValidationError> {
    if point.lat.is_finite() && point.lng.is_finite() && point.is_valid() {
        Ok(())
    } else {
        Err(error(
            "invalid_coordinates",
            "Latitude must be within [-90, 90] and longitude within [-180, 180]",
        ))
    }
}

/// GeoJSON順 `[lng, lat]` の座標チェック
pub fn validate_lng_lat(coordinates: &[f64; 2]) -> Result<(), ValidationError> {
    validate_coordinates(&GeoPoint::new(coordinates[1], coordinates[0]))
}

/// 部署タグは小文字に正規化して重複を除く
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_email() {
        assert!(validate_contact_email("water@city.gov").is_ok());
        assert!(validate_contact_email("public.works@city-hall.org").is_ok());
        assert!(validate_contact_email("not-an-email").is_err());
        assert!(validate_contact_email("a@b").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("+1-555-2000").is_ok());
        assert!(validate_phone("(555) 123 4567").is_ok());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_coordinates() {
        assert!(validate_coordinates(&GeoPoint::new(40.7, -74.0)).is_ok());
        assert!(validate_coordinates(&GeoPoint::new(95.0, -74.0)).is_err());
        assert!(validate_coordinates(&GeoPoint::new(f64::NAN, 0.0)).is_err());
        assert!(validate_lng_lat(&[-74.0, 40.7]).is_ok());
        assert!(validate_lng_lat(&[40.7, -174.0]).is_err());
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            "Utilities".to_string(),
            " water ".to_string(),
            "utilities".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["utilities", "water"]);
    }
}
