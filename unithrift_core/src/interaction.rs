//! 买卖交互
//!
//! 买家标记感兴趣，卖家对每个买家分享联系方式、拒绝或标记成交。状态机在服务端，
//! 这里的按钮状态全部由最近一次拉取到的交互记录推导，不单独维护。

use crate::client::{page_query, Auth, MarketClient};
use crate::error::{Error, Result};
use crate::pagination::fetch_all;
use crate::types::*;
use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};

/// 我感兴趣的商品页的页大小
pub const INTERESTED_PAGE_SIZE: u32 = 8;

/// 未填写留言时的默认留言
pub const DEFAULT_INTEREST_COMMENT: &str = "I am Interested";

/// 标记感兴趣的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkInterestOutcome {
    /// 成功，附服务端消息
    Marked(String),
    /// 已经标记过或服务端以 403 拒绝，附服务端给出的原因
    AlreadyInterested(String),
}

/// 「标记感兴趣」按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkInterestButton {
    /// 自己的商品不显示
    Hidden,
    Enabled,
    /// 已有交互记录
    Disabled,
}

impl MarkInterestButton {
    /// 由商品、当前用户和交互记录推导
    pub fn derive(listing: &Listing, user_id: &str, interactions: Option<&ListingInteractions>) -> Self {
        if !user_id.is_empty() && listing.seller_id == user_id {
            return MarkInterestButton::Hidden;
        }
        let already = match interactions {
            Some(ListingInteractions::Buyer(own)) => own.status.is_some(),
            Some(ListingInteractions::Seller(list)) => list.iter().any(|i| i.buyer_id == user_id),
            None => false,
        };
        if already {
            MarkInterestButton::Disabled
        } else {
            MarkInterestButton::Enabled
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarkInterestButton::Enabled => "Mark as Interested",
            MarkInterestButton::Disabled | MarkInterestButton::Hidden => "Marked as Interested",
        }
    }
}

/// 卖家对某个买家还能执行的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellerActions {
    pub share_contact: bool,
    pub reject: bool,
    pub sale_complete: bool,
}

impl SellerActions {
    pub fn for_status(status: SaleStatus) -> Self {
        match status {
            SaleStatus::Interested => Self {
                share_contact: true,
                reject: true,
                sale_complete: false,
            },
            // 分享联系方式之后只能成交
            SaleStatus::ShareDetails => Self {
                share_contact: false,
                reject: false,
                sale_complete: true,
            },
            SaleStatus::Sold | SaleStatus::Rejected | SaleStatus::Unknown => Self {
                share_contact: false,
                reject: false,
                sale_complete: false,
            },
        }
    }

    pub fn any(&self) -> bool {
        self.share_contact || self.reject || self.sale_complete
    }
}

/// 卖家联系方式，仅在 SHARE_DETAILS 时可见
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl OwnInterest {
    pub fn seller_contact(&self) -> Option<SellerContact> {
        if self.status != Some(SaleStatus::ShareDetails) {
            return None;
        }
        let or_na = |v: &Option<String>| v.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "N/A".to_string());
        Some(SellerContact {
            name: or_na(&self.seller_name),
            email: or_na(&self.seller_email),
            phone: or_na(&self.seller_phone),
        })
    }
}

/// 商品上对当前用户可见的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingAffordances {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_mark_interested: bool,
}

impl ListingAffordances {
    /// 只有卖家本人、且商品未售出时可编辑/删除；卖家看不到「标记感兴趣」
    pub fn for_viewer(listing: &Listing, user_id: &str) -> Self {
        let owner = !user_id.is_empty() && listing.seller_id == user_id;
        let manageable = owner && listing.status != ListingStatus::Sold;
        Self {
            can_edit: manageable,
            can_delete: manageable,
            can_mark_interested: !owner,
        }
    }
}

impl MarketClient {
    /// 标记感兴趣；服务端以 403 拒绝时返回 `AlreadyInterested`，附原因
    pub async fn mark_interested(&self, listing_id: &str, comments: &str) -> Result<MarkInterestOutcome> {
        let comments = if comments.trim().is_empty() {
            DEFAULT_INTEREST_COMMENT
        } else {
            comments
        };
        let result = self
            .fetch::<MessageData>(
                Method::POST,
                "queueing/mark_interested",
                &[],
                Some(json!({ "listing_id": listing_id, "comments": comments })),
                Auth::Bearer,
            )
            .await;

        match result {
            Ok(data) => {
                info!("Marked listing {} as interested", listing_id);
                Ok(MarkInterestOutcome::Marked(data.message))
            }
            Err(Error::Http { status: 403, message }) | Err(Error::Api { code: 403, message }) => {
                warn!("Mark interested on {} refused: {}", listing_id, message);
                Ok(MarkInterestOutcome::AlreadyInterested(message))
            }
            Err(e) => Err(e),
        }
    }

    /// 当前用户感兴趣的所有商品（客户端分页）
    pub async fn fetch_all_interested(&self, page_size: u32) -> Result<Vec<InterestedListing>> {
        fetch_all(page_size, |page| async move {
            let envelope = self
                .request::<Vec<InterestedListing>>(
                    Method::GET,
                    "queueing/get_interested_listings",
                    &page_query(page, page_size),
                    None,
                    Auth::Bearer,
                )
                .await?;
            Ok(if envelope.is_success() { envelope.data } else { None })
        })
        .await
    }

    /// 商品的交互记录：卖家拿到所有买家，买家拿到自己的一条
    pub async fn get_listing_interactions(&self, listing_id: &str) -> Result<ListingInteractions> {
        self.fetch(
            Method::GET,
            &format!("queueing/get_listing_interactions/{}", listing_id),
            &[],
            None,
            Auth::Bearer,
        )
        .await
    }

    /// 向买家分享联系方式
    pub async fn share_contact(&self, listing_id: &str, buyer_id: &str) -> Result<String> {
        self.seller_action(Method::POST, "queueing/share_contact", listing_id, buyer_id)
            .await
    }

    /// 拒绝买家
    pub async fn reject_interest(&self, listing_id: &str, buyer_id: &str) -> Result<String> {
        self.seller_action(Method::POST, "queueing/reject_interest", listing_id, buyer_id)
            .await
    }

    /// 与买家成交
    pub async fn mark_sale_complete(&self, listing_id: &str, buyer_id: &str) -> Result<String> {
        self.seller_action(Method::PUT, "queueing/mark_sale_complete", listing_id, buyer_id)
            .await
    }

    async fn seller_action(&self, method: Method, path: &str, listing_id: &str, buyer_id: &str) -> Result<String> {
        info!("{} for buyer {} on listing {}", path, buyer_id, listing_id);
        let data: MessageData = self
            .fetch(
                method,
                path,
                &[],
                Some(json!({ "listing_id": listing_id, "buyer_id": buyer_id })),
                Auth::Bearer,
            )
            .await?;
        Ok(data.message)
    }
}
