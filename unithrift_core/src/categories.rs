//! 商品分类（管理员维护）

use crate::client::{page_query, Auth, MarketClient};
use crate::error::{Error, Result};
use crate::types::{Category, Paged};
use reqwest::Method;
use serde_json::json;
use tracing::info;

/// 发布商品页下拉框一次取的分类数
pub const CATEGORY_DROPDOWN_SIZE: u32 = 30;

fn category_body(name: &str, description: &str) -> Result<serde_json::Value> {
    let (name, description) = (name.trim(), description.trim());
    if name.is_empty() || description.is_empty() {
        return Err(Error::InvalidParam("Category name and description are required".to_string()));
    }
    Ok(json!({ "item_name": name, "item_description": description }))
}

impl MarketClient {
    /// 分类列表
    pub async fn get_categories(&self, page: u32, page_size: u32, search: Option<&str>) -> Result<Vec<Category>> {
        let mut query = page_query(page, page_size);
        if let Some(q) = search {
            query.push(("search_query", q.to_string()));
        }
        let paged: Paged<Category> = self
            .fetch(Method::GET, "item_categories/get_items", &query, None, Auth::Public)
            .await?;
        Ok(paged.data)
    }

    /// 单个分类
    pub async fn get_category(&self, category_id: &str) -> Result<Category> {
        self.fetch(
            Method::POST,
            &format!("item_categories/get_item_details/{}", category_id),
            &[],
            None,
            Auth::Public,
        )
        .await
    }

    pub async fn add_category(&self, name: &str, description: &str) -> Result<()> {
        let body = category_body(name, description)?;
        self.fetch::<serde_json::Value>(Method::POST, "item_categories/add_new_item", &[], Some(body), Auth::Bearer)
            .await?;
        info!("Category {} added", name.trim());
        Ok(())
    }

    pub async fn update_category(&self, category_id: &str, name: &str, description: &str) -> Result<()> {
        let body = category_body(name, description)?;
        self.fetch::<serde_json::Value>(
            Method::PUT,
            &format!("item_categories/update_item_details/{}", category_id),
            &[],
            Some(body),
            Auth::Bearer,
        )
        .await?;
        info!("Category {} updated", category_id);
        Ok(())
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<()> {
        self.fetch::<serde_json::Value>(
            Method::DELETE,
            &format!("item_categories/delete_item/{}", category_id),
            &[],
            None,
            Auth::Bearer,
        )
        .await?;
        info!("Category {} deleted", category_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpTransport;
    use crate::session::SessionStore;
    use crate::testing::{client_with, ok};

    #[tokio::test]
    async fn test_list_passes_search_query() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.bearer.is_none()
                    && req.query.contains(&("search_query".to_string(), "book".to_string()))
                    && req.query.contains(&("page_size".to_string(), "30".to_string()))
            })
            .returning(|_| {
                ok(r#"{"status":"SUCCESS","data":{"data":[{"_id":"c1","item_name":"Books","item_description":"Text books"}]}}"#)
            });
        let (client, _) = client_with(transport);

        let categories = client
            .get_categories(1, CATEGORY_DROPDOWN_SIZE, Some("book"))
            .await
            .unwrap();
        assert_eq!(categories[0].item_name, "Books");
    }

    #[tokio::test]
    async fn test_crud_methods_and_validation() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.method == Method::POST && req.url.ends_with("/item_categories/add_new_item"))
            .times(1)
            .returning(|_| ok(r#"{"status":"SUCCESS","data":{}}"#));
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::PUT
                    && req.url.ends_with("/item_categories/update_item_details/c1")
                    && req.body == Some(json!({ "item_name": "Bikes", "item_description": "Two wheels" }))
            })
            .times(1)
            .returning(|_| ok(r#"{"status":"SUCCESS","data":{}}"#));
        transport
            .expect_send()
            .withf(|req| req.method == Method::DELETE && req.url.ends_with("/item_categories/delete_item/c1"))
            .times(1)
            .returning(|_| ok(r#"{"status":"SUCCESS","data":{}}"#));
        let (client, store) = client_with(transport);
        store.set("admin-token", "").unwrap();

        assert!(client.add_category("", "x").await.is_err());
        client.add_category("Books", "Text books").await.unwrap();
        client.update_category("c1", " Bikes ", "Two wheels").await.unwrap();
        client.delete_category("c1").await.unwrap();
    }
}
