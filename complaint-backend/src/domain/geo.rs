// complaint-backend/src/domain/geo.rs

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// 球面距離計算に使う地球半径（km）。半径検索の既存データと互換にするため赤道半径を使う。
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// 緯度経度の点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// 大円距離（haversine）
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// 半径検索のSQL事前絞り込み用バウンディングボックス
    ///
    /// 経度方向の幅は円に接する大円の経度差 `asin(sin r / cos lat)` で求める。
    /// 円が極を含む場合は経度で絞り込まない。
    pub fn bounding_box(&self, radius_km: f64) -> BoundingBox {
        let angular = radius_km / EARTH_RADIUS_KM;
        let lat_delta = angular.to_degrees();
        let min_lat = self.lat - lat_delta;
        let max_lat = self.lat + lat_delta;

        let sin_r = angular.sin();
        let cos_lat = self.lat.to_radians().cos();
        if min_lat <= -90.0 || max_lat >= 90.0 || angular >= FRAC_PI_2 || sin_r >= cos_lat {
            return BoundingBox {
                min_lat: min_lat.max(-90.0),
                max_lat: max_lat.min(90.0),
                min_lng: -180.0,
                max_lng: 180.0,
            };
        }

        let lng_delta = (sin_r / cos_lat).asin().to_degrees();
        BoundingBox {
            min_lat,
            max_lat,
            min_lng: self.lng - lng_delta,
            max_lng: self.lng + lng_delta,
        }
    }
}

/// `min_lng`/`max_lng` は日付変更線をまたぐと [-180, 180] の外に出る
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// 経度の検索範囲。日付変更線をまたぐ場合は2つに分ける。全経度なら空。
    pub fn longitude_ranges(&self) -> Vec<(f64, f64)> {
        if self.max_lng - self.min_lng >= 360.0 {
            Vec::new()
        } else if self.min_lng < -180.0 {
            vec![(self.min_lng + 360.0, 180.0), (-180.0, self.max_lng)]
        } else if self.max_lng > 180.0 {
            vec![(self.min_lng, 180.0), (-180.0, self.max_lng - 360.0)]
        } else {
            vec![(self.min_lng, self.max_lng)]
        }
    }
}

/// `[lng, lat]` 座標列で表した閉じたリングに点が含まれるか（レイキャスティング）
pub fn polygon_contains(ring: &[[f64; 2]], point: &GeoPoint) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i][0], ring[i][1]);
        let (xj, yj) = (ring[j][0], ring[j][1]);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
