//! UniThrift 校园二手市场客户端核心库
//!
//! 通过 REST API 与后端交互，包括：
//! - 请求助手与会话存储
//! - 学生/管理员注册、OTP 校验、登录
//! - 商品浏览（两种分页策略）、发布（预签名 URL 上传图片）、编辑、删除
//! - 买卖交互与按钮状态推导
//! - 管理员分类维护与分析图表

pub mod auth;
pub mod categories;
pub mod charts;
pub mod client;
pub mod editor;
pub mod error;
pub mod history;
pub mod http;
pub mod interaction;
pub mod listing;
pub mod pagination;
pub mod password;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{Auth, ClientConfig, MarketClient};
pub use editor::{EditorState, ListingDraft};
pub use error::{Error, Result};
pub use history::HistoryDetail;
pub use http::{HttpTransport, ReqwestTransport};
pub use interaction::{ListingAffordances, MarkInterestButton, MarkInterestOutcome, SellerActions};
pub use listing::{ImageUpload, ListingDetail};
pub use pagination::{ClientPager, ServerPage};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use types::*;
