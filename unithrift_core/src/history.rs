//! 交易历史：我卖出的、我买到的

use crate::client::{page_query, Auth, MarketClient};
use crate::error::Result;
use crate::types::{Listing, Paged};
use reqwest::Method;
use serde::Deserialize;

/// 已售商品详情，附买卖双方信息
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryDetail {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(default)]
    pub seller_name: String,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_comments: String,
}

/// 历史接口的集合既可能是裸数组，也可能包在 `data.data` 里
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Collection<T> {
    Bare(Vec<T>),
    Paged(Paged<T>),
}

impl<T> Collection<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Collection::Bare(items) => items,
            Collection::Paged(paged) => paged.data,
        }
    }
}

impl MarketClient {
    pub async fn get_sold_listings(&self, page: u32, page_size: u32) -> Result<Vec<Listing>> {
        self.history_page("history/get_sold_listings", page, page_size).await
    }

    pub async fn get_purchased_listings(&self, page: u32, page_size: u32) -> Result<Vec<Listing>> {
        self.history_page("history/get_purchased_listings", page, page_size)
            .await
    }

    /// 已售商品详情，只有买卖双方可见
    pub async fn get_history_listing(&self, listing_id: &str) -> Result<HistoryDetail> {
        self.fetch(
            Method::GET,
            &format!("history/get_listing_details/{}", listing_id),
            &[],
            None,
            Auth::Bearer,
        )
        .await
    }

    async fn history_page(&self, path: &str, page: u32, page_size: u32) -> Result<Vec<Listing>> {
        let collection: Collection<Listing> = self
            .fetch(Method::GET, path, &page_query(page, page_size), None, Auth::Bearer)
            .await?;
        Ok(collection.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use crate::http::MockHttpTransport;
    use crate::types::ListingStatus;
    use crate::session::SessionStore;
    use crate::testing::{client_with, ok};

    #[tokio::test]
    async fn test_accepts_bare_and_nested_collections() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url.ends_with("/history/get_sold_listings"))
            .returning(|_| ok(r#"{"status":"SUCCESS","data":[{"_id":"a","title":"A","price":3,"status":"SOLD"}]}"#));
        transport
            .expect_send()
            .withf(|req| req.url.ends_with("/history/get_purchased_listings"))
            .returning(|_| {
                ok(r#"{"status":"SUCCESS","data":{"data":[{"_id":"b","title":"B","price":4,"status":"SOLD"}]}}"#)
            });
        let (client, store) = client_with(transport);
        store.set("tok", "u1").unwrap();

        assert_eq!(client.get_sold_listings(1, 10).await.unwrap()[0].id, "a");
        assert_eq!(client.get_purchased_listings(1, 10).await.unwrap()[0].id, "b");
    }

    #[tokio::test]
    async fn test_history_detail_keeps_party_names() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url.ends_with("/history/get_listing_details/s1") && req.bearer.as_deref() == Some("tok"))
            .times(1)
            .returning(|_| {
                ok(r#"{"status":"SUCCESS","data":{"_id":"s1","title":"Desk","price":20,"status":"SOLD",
                    "seller_id":"u1","seller_name":"Ann Lee","buyer_name":"Ben Wu","buyer_comments":"No comments provided"}}"#)
            });
        let (client, store) = client_with(transport);
        store.set("tok", "u1").unwrap();

        let detail = client.get_history_listing("s1").await.unwrap();
        assert_eq!(detail.listing.title, "Desk");
        assert_eq!(detail.listing.status, ListingStatus::Sold);
        assert_eq!(detail.seller_name, "Ann Lee");
        assert_eq!(detail.buyer_name, "Ben Wu");
        assert_eq!(detail.buyer_comments, "No comments provided");
    }
}
