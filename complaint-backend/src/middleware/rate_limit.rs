// src/middleware/rate_limit.rs

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::{config::RateLimitSettings, error::AppError};

/// レート制限の設定
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub window_duration: Duration,
    pub max_requests: usize,
    pub trusted_proxies: Vec<IpAddr>,
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            window_duration: Duration::from_millis(settings.window_ms),
            max_requests: settings.max_requests,
            trusted_proxies: settings.trusted_proxies.clone(),
        }
    }
}

/// クライアントごとの固定ウィンドウ
#[derive(Clone, Debug)]
struct ClientWindow {
    count: usize,
    window_start: Instant,
}

/// レート制限のストレージ
#[derive(Clone)]
pub struct RateLimitStorage {
    windows: Arc<Mutex<HashMap<String, ClientWindow>>>,
    config: RateLimitConfig,
}

impl RateLimitStorage {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// リクエストを1件記録し、上限内ならtrue
    pub async fn try_acquire(&self, client: &str) -> bool {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        // 期限切れのウィンドウを掃除
        if windows.len() > 10_000 {
            let window = self.config.window_duration;
            windows.retain(|_, w| now.duration_since(w.window_start) <= window);
        }

        let entry = windows
            .entry(client.to_string())
            .or_insert_with(|| ClientWindow {
                count: 0,
                window_start: now,
            });

        if now.duration_since(entry.window_start) > self.config.window_duration {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.config.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

/// クライアントの識別子
///
/// 接続元が信頼済みプロキシのときだけ X-Forwarded-For を右から辿り、
/// 最初の信頼済みでないアドレスを使う。それ以外は接続元アドレス。
fn client_key(request: &Request<Body>, trusted_proxies: &[IpAddr]) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let Some(peer) = peer else {
        return "unknown".to_string();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let forwarded = request
        .headers()
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter_map(|v| v.parse::<IpAddr>().ok())
        .collect::<Vec<_>>();

    forwarded
        .iter()
        .rev()
        .find(|ip| !trusted_proxies.contains(ip))
        .copied()
        .unwrap_or(peer)
        .to_string()
}

/// レート制限ミドルウェア
pub async fn rate_limit_middleware(
    State(storage): State<RateLimitStorage>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_key(&request, &storage.config.trusted_proxies);

    if !storage.try_acquire(&client).await {
        tracing::warn!(client = %client, "Rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(request).await)
}
