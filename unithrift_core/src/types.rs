//! 数据类型定义
//!
//! 实体归服务端所有，这里只镜像展示所需的字段。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 会话信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
}

/// 响应状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeStatus {
    Success,
    Fail,
}

/// FAIL 响应中的错误详情
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorData {
    #[serde(rename = "errorCode")]
    pub error_code: Option<i32>,
    pub message: Option<String>,
}

/// 统一 API 响应
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: EnvelopeStatus,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<i32>,
    #[serde(rename = "errorData", default)]
    pub error_data: Option<ErrorData>,
    #[serde(rename = "totalItems", default)]
    pub total_items: Option<u64>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    /// FAIL 时的错误码，优先取顶层 errorCode
    pub fn fail_code(&self) -> Option<i32> {
        self.error_code
            .or_else(|| self.error_data.as_ref().and_then(|d| d.error_code))
    }

    pub fn fail_message(&self) -> Option<String> {
        self.error_data
            .as_ref()
            .and_then(|d| d.message.clone())
            .or_else(|| self.message.clone())
    }

    /// 取出 data，FAIL 转为 `Error::Api`
    pub fn into_data(self) -> Result<T> {
        if !self.is_success() {
            return Err(Error::Api {
                code: self.fail_code().unwrap_or(0),
                message: self.fail_message().unwrap_or_else(|| "Unknown error".to_string()),
            });
        }
        self.data
            .ok_or(Error::InvalidState("No data in response".to_string()))
    }
}

/// `data.data` 形式的分页集合
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// 只带一条提示信息的 data
#[derive(Debug, Clone, Deserialize)]
pub struct MessageData {
    #[serde(default)]
    pub message: String,
}

/// 角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    /// URL 中的 domain 段
    pub fn domain(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

/// OTP 用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationType {
    Authentication,
    ForgotPassword,
}

/// 商品状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    New,
    OnHold,
    Sold,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ListingStatus::New => "NEW",
            ListingStatus::OnHold => "ON_HOLD",
            ListingStatus::Sold => "SOLD",
            ListingStatus::Unknown => "UNKNOWN",
        };
        f.pad(s)
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NEW" => Ok(ListingStatus::New),
            "ON_HOLD" => Ok(ListingStatus::OnHold),
            "SOLD" => Ok(ListingStatus::Sold),
            other => Err(Error::InvalidParam(format!("Unknown listing status: {}", other))),
        }
    }
}

/// 买卖交互状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Interested,
    ShareDetails,
    Sold,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SaleStatus::Interested => "INTERESTED",
            SaleStatus::ShareDetails => "SHARE_DETAILS",
            SaleStatus::Sold => "SOLD",
            SaleStatus::Rejected => "REJECTED",
            SaleStatus::Unknown => "UNKNOWN",
        };
        f.pad(s)
    }
}

/// 图片扩展名（服务端只接受这三种）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Jpeg,
    Png,
    Jpg,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpeg" => Ok(FileType::Jpeg),
            "png" => Ok(FileType::Png),
            "jpg" => Ok(FileType::Jpg),
            other => Err(Error::InvalidParam(format!("Unsupported image type: {}", other))),
        }
    }
}

/// 学生信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub university_id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// 管理员信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub university_id: String,
    #[serde(default)]
    pub university_name: String,
}

/// 学校
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct University {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

impl fmt::Display for University {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.city, self.country)
    }
}

/// 商品
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub status: ListingStatus,
    #[serde(default)]
    pub seller_id: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// 分类
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub item_name: String,
    #[serde(default)]
    pub item_description: String,
}

/// 卖家视角：对某商品感兴趣的买家
#[derive(Debug, Clone, Deserialize)]
pub struct BuyerInterest {
    pub buyer_id: String,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub comments: String,
    pub status: SaleStatus,
}

/// 买家视角：自己的意向记录，及被分享的卖家联系方式
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnInterest {
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub seller_email: Option<String>,
    #[serde(default)]
    pub seller_phone: Option<String>,
}

/// `get_listing_interactions` 的返回：卖家拿到列表，买家拿到单条
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListingInteractions {
    Seller(Vec<BuyerInterest>),
    Buyer(OwnInterest),
}

impl ListingInteractions {
    pub fn is_empty(&self) -> bool {
        match self {
            ListingInteractions::Seller(list) => list.is_empty(),
            ListingInteractions::Buyer(own) => own.status.is_none(),
        }
    }
}

/// 我感兴趣的商品
#[derive(Debug, Clone, Deserialize)]
pub struct InterestedListing {
    pub listing_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub status: Option<SaleStatus>,
}

/// 分析数据：发布最多的分类
#[derive(Debug, Clone, Deserialize)]
pub struct ListedCount {
    pub item_name: String,
    pub count: u64,
}

/// 分析数据：被询问最多的商品
#[derive(Debug, Clone, Deserialize)]
pub struct InquiredCount {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
}

/// 分析数据：总营收
#[derive(Debug, Clone, Deserialize)]
pub struct Revenue {
    pub total_price: f64,
}

/// 创建商品响应数据
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingResponse {
    pub listing_id: String,
}

/// 预签名 URL 响应数据
#[derive(Debug, Clone, Deserialize)]
pub struct PresignedUrl {
    pub url: String,
    #[serde(default)]
    pub key: Option<String>,
}

/// 登录响应数据
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// 学生注册请求
#[derive(Debug, Clone, Serialize)]
pub struct StudentSignup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub university: String,
    pub university_id: String,
    pub phone: String,
    pub address: String,
    pub password: String,
}

/// 管理员注册请求
#[derive(Debug, Clone, Serialize)]
pub struct AdminSignup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub university_id: String,
    pub university_name: String,
    pub password: String,
}

/// 个人资料更新，只发送非空字段
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileUpdate {
    /// 去掉首尾空白，空串视为未填写
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            first_name: keep(self.first_name),
            last_name: keep(self.last_name),
            phone: keep(self.phone),
            address: keep(self.address),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

/// 新建商品表单
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub category_id: String,
    pub description: String,
    /// 表单原文，提交前校验为非负数字
    pub price: String,
}

impl NewListing {
    /// 必填字段与价格校验，返回可提交的请求体
    pub fn validate(&self) -> Result<serde_json::Value> {
        for (name, value) in [
            ("title", &self.title),
            ("category", &self.category_id),
            ("description", &self.description),
            ("price", &self.price),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidParam(format!("{} is required", name)));
            }
        }
        let price = parse_price(&self.price)?;
        Ok(serde_json::json!({
            "title": self.title.trim(),
            "item_id": self.category_id.trim(),
            "description": self.description.trim(),
            "price": price,
        }))
    }
}

/// 商品更新请求
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
}

/// 价格必须是非负数字
pub fn parse_price(raw: &str) -> Result<f64> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidParam(format!("Price must be a number: {}", raw)))?;
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidParam(format!("Price must be non-negative: {}", raw)));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_envelope_reads_nested_error_data() {
        let body = r#"{"status":"FAIL","errorData":{"errorCode":404,"message":"Listing not found"}}"#;
        let envelope: ApiEnvelope<Listing> = serde_json::from_str(body).unwrap();
        match envelope.into_data() {
            Err(Error::Api { code, message }) => {
                assert_eq!(code, 404);
                assert_eq!(message, "Listing not found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_fail_envelope_prefers_top_level_code() {
        let body = r#"{"status":"FAIL","errorCode":403,"message":"User already added to the interested list"}"#;
        let envelope: ApiEnvelope<MessageData> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.fail_code(), Some(403));
        assert!(envelope.into_data().unwrap_err().is_forbidden());
    }

    #[test]
    fn test_success_without_data_is_invalid_state() {
        let envelope: ApiEnvelope<Listing> = serde_json::from_str(r#"{"status":"SUCCESS"}"#).unwrap();
        assert!(matches!(envelope.into_data(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_listing_tolerates_unknown_status() {
        let body = r#"{"_id":"l1","title":"Desk","price":25,"status":"ARCHIVED"}"#;
        let listing: Listing = serde_json::from_str(body).unwrap();
        assert_eq!(listing.status, ListingStatus::Unknown);
        assert!(listing.images.is_empty());
        assert!(!listing.is_deleted);
    }

    #[test]
    fn test_interactions_seller_and_buyer_shapes() {
        let seller: ListingInteractions = serde_json::from_str(
            r#"[{"buyer_id":"b1","buyer_name":"Ann","comments":"hi","status":"INTERESTED"}]"#,
        )
        .unwrap();
        assert!(matches!(seller, ListingInteractions::Seller(ref v) if v.len() == 1));

        let buyer: ListingInteractions = serde_json::from_str(
            r#"{"comments":"hi","status":"SHARE_DETAILS","seller_name":"Bob","seller_email":"b@u.edu"}"#,
        )
        .unwrap();
        match buyer {
            ListingInteractions::Buyer(own) => {
                assert_eq!(own.status, Some(SaleStatus::ShareDetails));
                assert_eq!(own.seller_phone, None);
            }
            other => panic!("unexpected: {:?}", other),
        }

        let empty: ListingInteractions = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_new_listing_requires_fields_and_numeric_price() {
        let mut form = NewListing {
            title: "Lamp".to_string(),
            category_id: "c1".to_string(),
            description: "Works".to_string(),
            price: "12.5".to_string(),
        };
        let body = form.validate().unwrap();
        assert_eq!(body["item_id"], "c1");
        assert_eq!(body["price"], 12.5);

        form.price = "twelve".to_string();
        assert!(matches!(form.validate(), Err(Error::InvalidParam(_))));

        form.price = "-1".to_string();
        assert!(form.validate().is_err());

        form.price = "3".to_string();
        form.title = "  ".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_profile_update_drops_blank_fields() {
        let update = ProfileUpdate {
            first_name: Some(" Ada ".to_string()),
            last_name: Some("".to_string()),
            phone: None,
            address: Some("   ".to_string()),
        }
        .normalized();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "first_name": "Ada" }));
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("PNG").unwrap(), FileType::Png);
        assert!(FileType::from_extension("gif").is_err());
    }
}
