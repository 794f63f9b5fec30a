//! 密码传输编码
//!
//! 服务端各流程对密码的期望并不一致：学生登录、注册、OTP 校验与重置，
//! 以及管理员的 OTP 校验与重置，发送的是 SHA-1 十六进制摘要；管理员登录和
//! 管理员注册发送明文。这里按流程如实保留，每次发送明文都记一条警告。

use sha1::{Digest, Sha1};
use tracing::warn;

/// 密码编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordEncoding {
    /// 小写十六进制 SHA-1
    Sha1Hex,
    /// 原样发送
    Plaintext,
}

/// 需要发送密码的流程
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordFlow {
    StudentLogin,
    StudentSignup,
    StudentVerifyOtp,
    AdminLogin,
    AdminSignup,
    AdminVerifyOtp,
}

impl PasswordFlow {
    pub fn encoding(self) -> PasswordEncoding {
        match self {
            PasswordFlow::AdminLogin | PasswordFlow::AdminSignup => PasswordEncoding::Plaintext,
            _ => PasswordEncoding::Sha1Hex,
        }
    }

    /// 按流程编码密码
    pub fn encode(self, password: &str) -> String {
        match self.encoding() {
            PasswordEncoding::Sha1Hex => sha1_hex(password),
            PasswordEncoding::Plaintext => {
                warn!("{:?} transmits the password in plaintext", self);
                password.to_string()
            }
        }
    }
}

/// 计算 SHA-1 并输出小写十六进制
pub fn sha1_hex(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
