//! HTTP 传输层
//!
//! `HttpTransport` 只负责把请求发出去并把状态码和响应体原样带回来，
//! 状态码的归一化在 `MarketClient::request` 中完成。

use crate::client::ClientConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use tracing::debug;

/// 一次 API 调用
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

/// 预签名 URL 上传
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub url: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 原始响应
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 发送 JSON 请求
    async fn send(&self, request: ApiRequest) -> Result<RawResponse>;

    /// 直接向存储 PUT 原始字节
    async fn upload(&self, request: UploadRequest) -> Result<RawResponse>;
}

/// 基于 reqwest 的传输实现
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(!config.verify_tls);
        // 默认不设超时
        if let Some(secs) = config.timeout {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), &request.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to connect to {}: {}", request.url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response from {}: {}", request.url, e)))?;
        debug!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());

        Ok(RawResponse { status, body })
    }

    async fn upload(&self, request: UploadRequest) -> Result<RawResponse> {
        let size = request.bytes.len();
        let response = self
            .http_client
            .put(&request.url)
            .header(CONTENT_TYPE, request.content_type)
            .body(request.bytes)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to upload to presigned url: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read upload response: {}", e)))?;
        debug!("PUT presigned url -> {} ({} bytes sent)", status, size);

        Ok(RawResponse { status, body })
    }
}
