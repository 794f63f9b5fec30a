//! 分页
//!
//! 两种策略并存，各页面按原样使用，不做统一：
//! - 服务端分页：一次请求一页，页数不足 `page_size` 即视为最后一页；
//! - 客户端分页：循环拉取直到出现短页，再在本地按页切片。

use crate::error::{Error, Result};
use crate::types::{InterestedListing, Listing};
use std::future::Future;
use tracing::debug;

/// 服务端分页的一页
#[derive(Debug, Clone)]
pub struct ServerPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    /// 服务端给出的总数（不一定有）
    pub total_items: Option<u64>,
}

impl<T> ServerPage<T> {
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page,
            page_size,
            total_items: None,
        }
    }

    /// 返回条数少于页大小时 Next 不可用
    pub fn has_next(&self) -> bool {
        self.items.len() >= self.page_size as usize
    }

    /// 第一页时 Back 不可用
    pub fn has_back(&self) -> bool {
        self.page > 1
    }
}

/// 逐页拉取直到短页
///
/// `fetch_page` 返回 `None` 表示服务端给了 FAIL 或没有 data，循环就此结束。
/// 是否为短页按 `fetch_page` 返回的条数判断，调用方若在其中做了过滤，
/// 则按过滤后的条数判断。
pub async fn fetch_all<T, F, Fut>(page_size: u32, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<Vec<T>>>>,
{
    if page_size == 0 {
        return Err(Error::InvalidParam("page_size must be positive".to_string()));
    }

    let mut all = Vec::new();
    let mut page = 1;
    while let Some(items) = fetch_page(page).await? {
        let short = items.len() < page_size as usize;
        all.extend(items);
        if short {
            break;
        }
        page += 1;
    }

    debug!("Fetched {} items over {} pages", all.len(), page);
    Ok(all)
}

/// 可按 ID 从已渲染列表中移除的条目
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Listing {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for InterestedListing {
    fn id(&self) -> &str {
        &self.listing_id
    }
}

/// 客户端分页状态
#[derive(Debug, Clone)]
pub struct ClientPager<T> {
    items: Vec<T>,
    page: u32,
    page_size: u32,
}

impl<T> ClientPager<T> {
    pub fn new(items: Vec<T>, page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidParam("page_size must be positive".to_string()));
        }
        Ok(Self {
            items,
            page: 1,
            page_size,
        })
    }

    /// 跳到指定页，超出范围时夹到首页/末页
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.clamp(1, self.total_pages().max(1));
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        let size = self.page_size as usize;
        ((self.items.len() + size - 1) / size) as u32
    }

    /// 当前页的条目
    pub fn page_items(&self) -> &[T] {
        let size = self.page_size as usize;
        let start = ((self.page - 1) as usize * size).min(self.items.len());
        let end = (start + size).min(self.items.len());
        &self.items[start..end]
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_back(&self) -> bool {
        self.page > 1
    }

    /// 翻到下一页，已是末页时返回 false
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn back(&mut self) -> bool {
        if self.has_back() {
            self.page -= 1;
            true
        } else {
            false
        }
    }
}

impl<T: Identified> ClientPager<T> {
    /// 从已渲染列表中移除，不重新拉取
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        let removed = self.items.remove(index);
        self.page = self.page.min(self.total_pages().max(1));
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(String);

    impl Identified for Item {
        fn id(&self) -> &str {
            &self.0
        }
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item(format!("i{}", i))).collect()
    }

    #[test]
    fn test_server_page_buttons() {
        let full = ServerPage {
            items: vec![1, 2, 3, 4],
            page: 1,
            page_size: 4,
            total_items: Some(9),
        };
        assert!(full.has_next());
        assert!(!full.has_back());

        let short = ServerPage {
            items: vec![1],
            page: 3,
            page_size: 4,
            total_items: None,
        };
        assert!(!short.has_next());
        assert!(short.has_back());

        assert!(!ServerPage::<u8>::empty(1, 16).has_next());
    }

    #[test]
    fn test_fetch_all_stops_on_short_page() {
        let mut calls = Vec::new();
        let all = tokio_test::block_on(fetch_all(3, |page| {
            calls.push(page);
            let batch: Vec<u32> = match page {
                1 | 2 => vec![page; 3],
                _ => vec![page],
            };
            async move { Ok(Some(batch)) }
        }))
        .unwrap();
        assert_eq!(calls, vec![1, 2, 3]);
        assert_eq!(all.len(), 7);
    }

    #[test]
    fn test_fetch_all_stops_on_fail_and_propagates_errors() {
        let all: Vec<u8> = tokio_test::block_on(fetch_all(2, |page| async move {
            Ok(if page == 1 { Some(vec![1, 2]) } else { None })
        }))
        .unwrap();
        assert_eq!(all, vec![1, 2]);

        let err = tokio_test::block_on(fetch_all::<u8, _, _>(2, |_| async {
            Err(Error::Network("down".to_string()))
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Network(_)));

        assert!(tokio_test::block_on(fetch_all::<u8, _, _>(0, |_| async { Ok(None) })).is_err());
    }

    #[test]
    fn test_client_pager_slices_and_buttons() {
        let mut pager = ClientPager::new(items(17), 8).unwrap();
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.page_items().len(), 8);
        assert!(!pager.has_back());
        assert!(pager.has_next());

        assert!(pager.next());
        assert!(pager.next());
        assert_eq!(pager.page_items(), &[Item("i16".to_string())]);
        assert!(!pager.has_next());
        assert!(!pager.next());

        assert!(pager.back());
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn test_client_pager_clamps_saved_page() {
        let pager = ClientPager::new(items(5), 8).unwrap().with_page(4);
        assert_eq!(pager.page(), 1);

        let empty = ClientPager::new(Vec::<Item>::new(), 8).unwrap().with_page(2);
        assert_eq!(empty.page(), 1);
        assert!(empty.page_items().is_empty());
        assert!(!empty.has_next());
    }

    #[test]
    fn test_remove_from_rendered_pages() {
        let mut pager = ClientPager::new(items(9), 8).unwrap().with_page(2);
        assert_eq!(pager.page_items().len(), 1);

        assert_eq!(pager.remove("i3"), Some(Item("i3".to_string())));
        // 第二页被清空后退回第一页
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.total_items(), 8);
        assert!(pager.remove("missing").is_none());
    }
}
