//! # Open Graph 페이지 수집
//!
//! 웹 페이지 HTML을 받아 `og:title`, `og:image`를 추출합니다.
//! 제목이 비어 있으면 URL을 제목으로 씁니다.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;

use crate::error::AppError;

static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attribute regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub html: String,
}

/// URL의 HTML을 가져오는 추상화. 테스트에서는 네트워크 없는 구현으로 바꿉니다.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AppError>;
}

/// reqwest 기반 기본 구현
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("inkclip/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client build failed: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AppError> {
        let html = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| AppError::Internal(format!("failed to fetch {}: {}", url, e)))?
            .text()
            .await
            .map_err(|e| AppError::Internal(format!("failed to read {}: {}", url, e)))?;

        tracing::debug!(%url, bytes = html.len(), "page fetched");
        Ok(parse_open_graph(url.as_str(), html))
    }
}

/// 저장할 웹 URL은 http / https만 허용합니다.
pub fn parse_web_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid url: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::BadRequest(format!(
            "Unsupported url scheme: {}",
            other
        ))),
    }
}

/// 처음 나오는 `og:title`, `og:image` 값을 꺼냅니다.
pub fn parse_open_graph(url: &str, html: String) -> FetchedPage {
    let mut title: Option<String> = None;
    let mut image: Option<String> = None;

    for tag in META_TAG.find_iter(&html) {
        let mut key = None;
        let mut content = None;
        for caps in ATTRIBUTE.captures_iter(tag.as_str()) {
            let name = caps[1].to_ascii_lowercase();
            let value = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
            match name.as_str() {
                "property" | "name" => key = value.map(|v| v.trim().to_ascii_lowercase()),
                "content" => content = value.map(unescape),
                _ => {}
            }
        }

        match (key.as_deref(), content) {
            (Some("og:title"), Some(c)) if title.is_none() => title = Some(c),
            (Some("og:image"), Some(c)) if image.is_none() => image = Some(c),
            _ => {}
        }
        if title.is_some() && image.is_some() {
            break;
        }
    }

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.to_string());

    FetchedPage {
        title,
        thumbnail_url: image.filter(|i| !i.trim().is_empty()),
        html,
    }
}

fn unescape(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
