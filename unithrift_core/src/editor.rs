//! 商品编辑弹窗的状态
//!
//! Closed → Editing → Submitting → Closed | Failed。
//! Failed 可以 retry 回到 Editing，Editing / Failed 可以 cancel。

use crate::error::{Error, Result};
use crate::types::{Listing, ListingStatus, ListingUpdate};

/// 编辑中的表单
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub listing_id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub status: ListingStatus,
    original: ListingUpdate,
}

impl ListingDraft {
    pub fn from_listing(listing: &Listing) -> Self {
        Self {
            listing_id: listing.id.clone(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price,
            status: listing.status,
            original: ListingUpdate {
                title: Some(listing.title.clone()),
                description: Some(listing.description.clone()),
                price: Some(listing.price),
                status: Some(listing.status),
            },
        }
    }

    /// 只包含改动过的字段
    pub fn changes(&self) -> ListingUpdate {
        let diff = |new: &str, old: &Option<String>| {
            (old.as_deref() != Some(new)).then(|| new.to_string())
        };
        ListingUpdate {
            title: diff(&self.title, &self.original.title),
            description: diff(&self.description, &self.original.description),
            price: (self.original.price != Some(self.price)).then_some(self.price),
            status: (self.original.status != Some(self.status)).then_some(self.status),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err(Error::InvalidParam("Title and description are required".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidParam("Price must be non-negative".to_string()));
        }
        Ok(())
    }
}

/// 弹窗状态
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    Editing(ListingDraft),
    Submitting(ListingDraft),
    Failed { draft: ListingDraft, message: String },
}

impl EditorState {
    /// 打开弹窗；售出的商品不可编辑
    pub fn open(self, listing: &Listing) -> Result<Self> {
        match self {
            EditorState::Closed if listing.status == ListingStatus::Sold => {
                Err(Error::InvalidState("Sold listings cannot be edited".to_string()))
            }
            EditorState::Closed => Ok(EditorState::Editing(ListingDraft::from_listing(listing))),
            other => Err(transition_error("open", &other)),
        }
    }

    /// 修改表单
    pub fn edit(self, apply: impl FnOnce(&mut ListingDraft)) -> Result<Self> {
        match self {
            EditorState::Editing(mut draft) => {
                apply(&mut draft);
                Ok(EditorState::Editing(draft))
            }
            other => Err(transition_error("edit", &other)),
        }
    }

    /// 提交：校验后进入 Submitting，返回要发送的改动
    pub fn submit(self) -> Result<(Self, ListingUpdate)> {
        match self {
            EditorState::Editing(draft) => {
                draft.validate()?;
                let changes = draft.changes();
                if changes == ListingUpdate::default() {
                    return Err(Error::InvalidParam("Nothing to update".to_string()));
                }
                Ok((EditorState::Submitting(draft), changes))
            }
            other => Err(transition_error("submit", &other)),
        }
    }

    /// 请求结束
    pub fn finish(self, outcome: &Result<()>) -> Result<Self> {
        match self {
            EditorState::Submitting(draft) => Ok(match outcome {
                Ok(()) => EditorState::Closed,
                Err(e) => EditorState::Failed {
                    draft,
                    message: e.to_string(),
                },
            }),
            other => Err(transition_error("finish", &other)),
        }
    }

    pub fn retry(self) -> Result<Self> {
        match self {
            EditorState::Failed { draft, .. } => Ok(EditorState::Editing(draft)),
            other => Err(transition_error("retry", &other)),
        }
    }

    pub fn cancel(self) -> Result<Self> {
        match self {
            EditorState::Editing(_) | EditorState::Failed { .. } => Ok(EditorState::Closed),
            other => Err(transition_error("cancel", &other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorState::Closed => "closed",
            EditorState::Editing(_) => "editing",
            EditorState::Submitting(_) => "submitting",
            EditorState::Failed { .. } => "failed",
        }
    }
}

fn transition_error(action: &str, state: &EditorState) -> Error {
    Error::InvalidState(format!("Cannot {} while {}", action, state.name()))
}
