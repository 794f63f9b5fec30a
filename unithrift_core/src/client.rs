//! UniThrift API 客户端
//!
//! 所有页面共用的请求助手：拼接 `/api/v1/{domain}/{action}`、附加 JSON 头和
//! Bearer token、把非 2xx 响应归一化为带状态码的错误。没有重试，没有退避。

use crate::error::{Error, Result};
use crate::http::{ApiRequest, HttpTransport, ReqwestTransport, UploadRequest};
use crate::session::SessionStore;
use crate::types::{ApiEnvelope, Session};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 客户端配置
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// 服务器 URL
    pub server_url: String,
    /// 请求超时（秒），默认不设
    pub timeout: Option<u64>,
    /// 是否验证 TLS 证书
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:4001".to_string(),
            timeout: None,
            verify_tls: true,
        }
    }
}

impl ClientConfig {
    /// 从环境变量读取，未设置的项使用默认值
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        match std::env::var("UNITHRIFT_SERVER_URL") {
            Ok(url) => config.server_url = url,
            Err(_) => info!("UNITHRIFT_SERVER_URL not set, using default: {}", config.server_url),
        }
        if let Ok(raw) = std::env::var("UNITHRIFT_TIMEOUT_SECS") {
            let secs = raw.parse().map_err(|e| {
                Error::InvalidParam(format!("Invalid UNITHRIFT_TIMEOUT_SECS value {:?}: {}", raw, e))
            })?;
            config.timeout = Some(secs);
        }
        if let Ok(raw) = std::env::var("UNITHRIFT_VERIFY_TLS") {
            config.verify_tls = parse_bool(&raw).ok_or_else(|| {
                Error::InvalidParam(format!("Invalid UNITHRIFT_VERIFY_TLS value {:?}", raw))
            })?;
        }

        Ok(config)
    }

    /// 拼接 API 路径
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/v1/{}",
            self.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// 是否需要附带 token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Public,
    Bearer,
}

/// 市场客户端
#[derive(Clone)]
pub struct MarketClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    session: Arc<dyn SessionStore>,
}

impl MarketClient {
    /// 创建使用 reqwest 传输的客户端
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport, session))
    }

    /// 使用自定义传输创建客户端
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            transport,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// 当前会话，没有则 `NotAuthenticated`
    pub fn current_session(&self) -> Result<Session> {
        self.session.get()?.ok_or(Error::NotAuthenticated)
    }

    /// 当前用户 ID，存储中为空时从 token 推导
    pub fn current_user_id(&self) -> Result<String> {
        self.current_session()?.effective_user_id()
    }

    /// 保存登录结果
    pub(crate) fn store_session(&self, access_token: &str, user_id: &str) -> Result<Session> {
        if access_token.is_empty() {
            return Err(Error::InvalidState("Empty access token in login response".to_string()));
        }
        self.session.set(access_token, user_id)?;
        Ok(Session {
            access_token: access_token.to_string(),
            user_id: user_id.to_string(),
        })
    }

    /// 登出：只清除本地会话
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("Session cleared");
        Ok(())
    }

    /// 发送请求并解析响应信封
    ///
    /// 非 2xx 返回 `Error::Http`，错误信息优先取 FAIL 信封中的 message。
    /// 2xx 中的 FAIL 不在这里处理，调用方按需检查信封。
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
        auth: Auth,
    ) -> Result<ApiEnvelope<T>> {
        let bearer = match auth {
            Auth::Bearer => Some(self.current_session()?.access_token),
            Auth::Public => None,
        };
        let url = self.config.endpoint(path);
        debug!("{} {}", method, url);

        let response = self
            .transport
            .send(ApiRequest {
                method,
                url: url.clone(),
                query: query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
                body,
                bearer,
            })
            .await?;

        if !response.is_success() {
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&response.body)
                .ok()
                .and_then(|envelope| envelope.fail_message())
                .unwrap_or_else(|| {
                    if response.body.is_empty() {
                        "Unable to read response".to_string()
                    } else {
                        response.body.clone()
                    }
                });
            warn!("HTTP {} from {}: {}", response.status, url, message);
            return Err(Error::Http {
                status: response.status,
                message,
            });
        }

        serde_json::from_str(&response.body)
            .map_err(|e| Error::Encoding(format!("Failed to parse response from {}: {}", url, e)))
    }

    /// `request` 之后直接取出 data
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
        auth: Auth,
    ) -> Result<T> {
        self.request(method, path, query, body, auth)
            .await?
            .into_data()
    }

    /// 向预签名 URL 上传原始字节
    pub async fn upload_to_presigned(&self, url: &str, bytes: Vec<u8>) -> Result<()> {
        let response = self
            .transport
            .upload(UploadRequest {
                url: url.to_string(),
                content_type: "application/octet-stream".to_string(),
                bytes,
            })
            .await?;

        if !response.is_success() {
            return Err(Error::Http {
                status: response.status,
                message: "Upload to presigned url failed".to_string(),
            });
        }
        Ok(())
    }
}

/// 分页查询参数
pub(crate) fn page_query(page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("page_size", page_size.to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpTransport;
    use crate::testing::{client_with, ok, respond};
    use crate::types::MessageData;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:4001");
        assert_eq!(config.timeout, None);
        assert!(config.verify_tls);
    }

    #[test]
    fn test_endpoint_joins_base_path() {
        let config = ClientConfig {
            server_url: "http://host:4001/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.endpoint("/listing/get_listings"),
            "http://host:4001/api/v1/listing/get_listings"
        );
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[tokio::test]
    async fn test_bearer_call_without_session_sends_nothing() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().never();
        let (client, _) = client_with(transport);

        let result: Result<ApiEnvelope<MessageData>> = client
            .request(Method::GET, "student/get_student", &[], None, Auth::Bearer)
            .await;
        assert!(matches!(result, Err(Error::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_request_attaches_token_and_query() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::GET
                    && req.url == "http://api.test/api/v1/listing/get_listings"
                    && req.bearer.as_deref() == Some("tok")
                    && req.query == vec![("page".to_string(), "2".to_string()), ("page_size".to_string(), "16".to_string())]
                    && req.body.is_none()
            })
            .times(1)
            .returning(|_| ok(r#"{"status":"SUCCESS","data":{"message":"ok"}}"#));
        let (client, store) = client_with(transport);
        store.set("tok", "u1").unwrap();

        let data: MessageData = client
            .fetch(Method::GET, "listing/get_listings", &page_query(2, 16), None, Auth::Bearer)
            .await
            .unwrap();
        assert_eq!(data.message, "ok");
    }

    #[tokio::test]
    async fn test_non_2xx_becomes_http_error_with_server_message() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().returning(|_| {
            respond(
                401,
                r#"{"status":"FAIL","errorData":{"errorCode":401,"message":"Invalid email or password"}}"#,
            )
        });
        let (client, _) = client_with(transport);

        let err = client
            .fetch::<MessageData>(Method::POST, "student/login", &[], None, Auth::Public)
            .await
            .unwrap_err();
        match err {
            Error::Http { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid email or password");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_kept_verbatim() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().returning(|_| respond(502, "Bad Gateway"));
        let (client, _) = client_with(transport);

        let err = client
            .fetch::<MessageData>(Method::GET, "common/get_universities", &[], None, Auth::Public)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http { status: 502, ref message } if message == "Bad Gateway"));
    }

    #[tokio::test]
    async fn test_network_error_passes_through() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(Error::Network("connection refused".to_string())));
        let (client, _) = client_with(transport);

        let err = client
            .fetch::<MessageData>(Method::GET, "common/get_universities", &[], None, Auth::Public)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_upload_uses_octet_stream() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_upload()
            .withf(|req| {
                req.url == "https://bucket.test/key?sig=1"
                    && req.content_type == "application/octet-stream"
                    && req.bytes == vec![1, 2, 3]
            })
            .times(1)
            .returning(|_| ok(""));
        let (client, _) = client_with(transport);

        client
            .upload_to_presigned("https://bucket.test/key?sig=1", vec![1, 2, 3])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_failure_is_http_error() {
        let mut transport = MockHttpTransport::new();
        transport.expect_upload().returning(|_| respond(403, "SignatureDoesNotMatch"));
        let (client, _) = client_with(transport);

        let err = client
            .upload_to_presigned("https://bucket.test/key", vec![0])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http { status: 403, .. }));
    }

    #[test]
    fn test_logout_clears_session() {
        let (client, store) = client_with(MockHttpTransport::new());
        store.set("tok", "u1").unwrap();
        client.logout().unwrap();
        assert!(matches!(client.current_session(), Err(Error::NotAuthenticated)));
    }
}
