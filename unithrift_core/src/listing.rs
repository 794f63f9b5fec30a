//! 商品：浏览、详情、发布（含图片上传）、更新、删除

use crate::client::{page_query, Auth, MarketClient};
use crate::error::{Error, Result};
use crate::pagination::{fetch_all, ServerPage};
use crate::types::*;
use futures::future::try_join_all;
use reqwest::Method;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

/// 全部商品页（服务端分页）的页大小
pub const ALL_LISTINGS_PAGE_SIZE: u32 = 16;
/// 浏览页与我的商品页（客户端分页）的页大小
pub const BROWSE_PAGE_SIZE: u32 = 8;

/// 待上传的图片
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_type: FileType,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// 读取本地文件，按扩展名确定类型
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::InvalidParam(format!("Image has no extension: {}", path.display())))?;
        let file_type = FileType::from_extension(ext)?;
        let bytes = std::fs::read(path)?;
        Ok(Self { file_type, bytes })
    }
}

/// 商品详情，图片 key 已换成可访问的 URL
#[derive(Debug, Clone)]
pub struct ListingDetail {
    pub listing: Listing,
    pub image_urls: Vec<String>,
}

impl MarketClient {
    /// 服务端分页：取一页商品
    ///
    /// FAIL 响应按空页处理。
    pub async fn get_listings_page(
        &self,
        page: u32,
        page_size: u32,
        category_id: Option<&str>,
    ) -> Result<ServerPage<Listing>> {
        let mut query = page_query(page, page_size);
        if let Some(id) = category_id {
            query.push(("item_id", id.to_string()));
        }
        let envelope = self
            .request::<Vec<Listing>>(Method::GET, "listing/get_listings", &query, None, Auth::Bearer)
            .await?;

        if !envelope.is_success() {
            debug!("get_listings page {} returned FAIL", page);
            return Ok(ServerPage::empty(page, page_size));
        }
        Ok(ServerPage {
            page,
            page_size,
            total_items: envelope.total_items,
            items: envelope.data.unwrap_or_default(),
        })
    }

    /// 客户端分页：拉取所有未删除的商品
    pub async fn fetch_all_listings(&self, page_size: u32) -> Result<Vec<Listing>> {
        fetch_all(page_size, |page| self.listings_batch("listing/get_listings", page, page_size))
            .await
    }

    /// 客户端分页：拉取当前用户发布的所有商品
    pub async fn fetch_all_user_listings(&self, page_size: u32) -> Result<Vec<Listing>> {
        fetch_all(page_size, |page| {
            self.listings_batch("listing/get_user_listings", page, page_size)
        })
        .await
    }

    async fn listings_batch(&self, path: &str, page: u32, page_size: u32) -> Result<Option<Vec<Listing>>> {
        let envelope = self
            .request::<Vec<Listing>>(Method::GET, path, &page_query(page, page_size), None, Auth::Bearer)
            .await?;
        if !envelope.is_success() {
            return Ok(None);
        }
        Ok(envelope
            .data
            .map(|items| items.into_iter().filter(|l| !l.is_deleted).collect()))
    }

    /// 按 ID 取商品
    pub async fn get_listing(&self, listing_id: &str) -> Result<Listing> {
        self.fetch(
            Method::GET,
            &format!("listing/get_listing/{}", listing_id),
            &[],
            None,
            Auth::Bearer,
        )
        .await
    }

    /// 商品详情：并发换取所有图片 URL，任一失败则整体失败
    pub async fn get_listing_detail(&self, listing_id: &str) -> Result<ListingDetail> {
        let listing = self.get_listing(listing_id).await?;
        let image_urls = try_join_all(listing.images.iter().map(|key| self.image_url(key))).await?;
        debug!("Resolved {} image urls for {}", image_urls.len(), listing_id);
        Ok(ListingDetail { listing, image_urls })
    }

    /// 换取图片的临时访问 URL
    pub async fn image_url(&self, key: &str) -> Result<String> {
        let data: PresignedUrl = self
            .fetch(
                Method::GET,
                "listing/image/generate_get_url",
                &[("key", key.to_string())],
                None,
                Auth::Bearer,
            )
            .await?;
        Ok(data.url)
    }

    /// 申请上传用的预签名 URL
    pub async fn generate_upload_url(&self, listing_id: &str, file_type: FileType) -> Result<PresignedUrl> {
        self.fetch(
            Method::POST,
            "listing/image/generate_upload_url",
            &[],
            Some(json!({ "listing_id": listing_id, "file_extension": file_type })),
            Auth::Bearer,
        )
        .await
    }

    /// 发布商品并依次上传图片，返回商品 ID
    ///
    /// 字段校验在任何请求之前完成。某张图片失败时立即返回错误，
    /// 此时商品已经创建。
    pub async fn create_listing(&self, form: &NewListing, images: Vec<ImageUpload>) -> Result<String> {
        let body = form.validate()?;
        info!("Creating listing: {}", form.title);

        let created: CreateListingResponse = self
            .fetch(Method::POST, "listing/create", &[], Some(body), Auth::Bearer)
            .await?;

        let total = images.len();
        for (index, image) in images.into_iter().enumerate() {
            let presigned = self
                .generate_upload_url(&created.listing_id, image.file_type)
                .await?;
            self.upload_to_presigned(&presigned.url, image.bytes).await?;
            debug!("Uploaded image {}/{}", index + 1, total);
        }

        info!("Listing {} created with {} images", created.listing_id, total);
        Ok(created.listing_id)
    }

    /// 更新商品
    pub async fn update_listing(&self, listing_id: &str, update: &ListingUpdate) -> Result<()> {
        if *update == ListingUpdate::default() {
            return Err(Error::InvalidParam("Nothing to update".to_string()));
        }
        self.fetch::<serde_json::Value>(
            Method::PUT,
            &format!("listing/update/{}", listing_id),
            &[],
            Some(serde_json::to_value(update)?),
            Auth::Bearer,
        )
        .await?;
        info!("Listing {} updated", listing_id);
        Ok(())
    }

    /// 删除商品，返回确认信息
    pub async fn delete_listing(&self, listing_id: &str) -> Result<String> {
        let data: serde_json::Value = self
            .fetch(
                Method::DELETE,
                &format!("listing/delete/{}", listing_id),
                &[],
                None,
                Auth::Bearer,
            )
            .await?;
        info!("Listing {} deleted", listing_id);
        Ok(data
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Listing deleted successfully!")
            .to_string())
    }
}
