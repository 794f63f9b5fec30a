//! 会话存储
//!
//! 登录时写入 token 与用户 ID，每个需认证的调用读取，登出时清除。
//! 不记录过期时间：token 过期只会在下一次调用失败时暴露。

use crate::error::{Error, Result};
use crate::types::Session;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// 会话存储接口
pub trait SessionStore: Send + Sync {
    fn set(&self, access_token: &str, user_id: &str) -> Result<()>;
    fn get(&self) -> Result<Option<Session>>;
    fn clear(&self) -> Result<()>;
}

/// 基于 JSON 文件的持久化存储
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `UNITHRIFT_SESSION_FILE`，否则 `~/.unithrift/session.json`，
    /// 没有 HOME 时退回当前目录
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("UNITHRIFT_SESSION_FILE") {
            return PathBuf::from(path);
        }
        match std::env::var_os("HOME") {
            Some(home) => Path::new(&home).join(".unithrift").join("session.json"),
            None => PathBuf::from(".unithrift_session.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn set(&self, access_token: &str, user_id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let session = Session {
            access_token: access_token.to_string(),
            user_id: user_id.to_string(),
        };
        std::fs::write(&self.path, serde_json::to_vec_pretty(&session)?)?;
        debug!("Session written to {}", self.path.display());
        Ok(())
    }

    fn get(&self) -> Result<Option<Session>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::InvalidState("Session lock poisoned".to_string())
}

impl SessionStore for MemorySessionStore {
    fn set(&self, access_token: &str, user_id: &str) -> Result<()> {
        *self.session.write().map_err(poisoned)? = Some(Session {
            access_token: access_token.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    fn get(&self) -> Result<Option<Session>> {
        Ok(self.session.read().map_err(poisoned)?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.session.write().map_err(poisoned)? = None;
        Ok(())
    }
}

impl Session {
    /// 从 JWT 载荷中读取 `user_id`（不校验签名）
    pub fn token_user_id(&self) -> Result<String> {
        user_id_from_token(&self.access_token)
    }

    /// 存储的 user_id，为空时从 token 推导
    pub fn effective_user_id(&self) -> Result<String> {
        if self.user_id.is_empty() {
            self.token_user_id()
        } else {
            Ok(self.user_id.clone())
        }
    }
}

/// 解码 JWT 的第二段，取出 `user_id`
pub fn user_id_from_token(token: &str) -> Result<String> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or(Error::Encoding("Access token is not a JWT".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::Encoding(format!("Failed to decode access token: {}", e)))?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes)?;
    claims
        .get("user_id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or(Error::Encoding("Access token has no user_id claim".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with(claims: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(claims))
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.get().unwrap().is_none());
        store.set("tok", "u1").unwrap();
        let session = store.get().unwrap().unwrap();
        assert_eq!(session.access_token, "tok");
        assert_eq!(session.user_id, "u1");

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
        // 重复清除不报错
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();
        let store = FileSessionStore::new(path);
        assert!(matches!(store.get(), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        store.set("a", "b").unwrap();
        assert_eq!(store.get().unwrap().unwrap().user_id, "b");
        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn test_user_id_from_token() {
        let token = jwt_with(r#"{"user_id":"6740c1e4","user_type":"STUDENT"}"#);
        assert_eq!(user_id_from_token(&token).unwrap(), "6740c1e4");

        let session = Session {
            access_token: token,
            user_id: String::new(),
        };
        assert_eq!(session.effective_user_id().unwrap(), "6740c1e4");

        assert!(user_id_from_token("opaque-token").is_err());
        assert!(user_id_from_token(&jwt_with(r#"{"sub":"x"}"#)).is_err());
    }
}
