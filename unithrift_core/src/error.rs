//! 错误类型定义

use thiserror::Error;

/// 错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 网络错误（连接失败、读取响应失败）
    #[error("Network error: {0}")]
    Network(String),

    /// 非 2xx 的 HTTP 响应
    #[error("API request failed with status code {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx 响应体中的 FAIL 状态
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// 参数错误
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// 状态错误
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 编解码错误
    #[error("Encoding/Decoding error: {0}")]
    Encoding(String),

    /// 未认证错误
    #[error("Not authenticated")]
    NotAuthenticated,

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP 状态码，或 FAIL 响应中的 errorCode
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Error::Http { status, .. } => Some(i32::from(*status)),
            Error::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// 是否为 403（两种形式都算）
    pub fn is_forbidden(&self) -> bool {
        self.status_code() == Some(403)
    }

    /// 是否为 404
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Encoding(e.to_string())
    }
}

/// 结果类型
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_covers_http_and_envelope() {
        let http = Error::Http {
            status: 403,
            message: "Forbidden".to_string(),
        };
        let api = Error::Api {
            code: 403,
            message: "User already added".to_string(),
        };
        assert!(http.is_forbidden());
        assert!(api.is_forbidden());
        assert!(!Error::NotAuthenticated.is_forbidden());
    }

    #[test]
    fn test_http_error_message_carries_status() {
        let err = Error::Http {
            status: 401,
            message: "Invalid email or password".to_string(),
        };
        assert!(err.to_string().contains("401"));
    }
}
