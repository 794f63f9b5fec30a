//! 管理员分析页的图表
//!
//! 把聚合数据转成 Chart.js 形状的配置，由展示端直接渲染。

use crate::client::{Auth, MarketClient};
use crate::error::Result;
use crate::types::{InquiredCount, ListedCount, Revenue};
use reqwest::Method;
use serde::Serialize;

const BAR_FILL: &str = "rgba(54, 162, 235, 0.2)";
const BAR_BORDER: &str = "rgba(54, 162, 235, 1)";
const DOUGHNUT_FILL: [&str; 2] = ["rgba(75, 192, 192, 0.6)", "rgba(211, 211, 211, 0.6)"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub border_color: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: ChartData,
    pub options: serde_json::Value,
}

impl ChartConfig {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 柱状图，y 轴从 0 开始
pub fn bar_chart(label: &str, points: &[(String, f64)]) -> ChartConfig {
    ChartConfig {
        chart_type: ChartType::Bar,
        data: ChartData {
            labels: points.iter().map(|(l, _)| l.clone()).collect(),
            datasets: vec![Dataset {
                label: Some(label.to_string()),
                data: points.iter().map(|(_, v)| *v).collect(),
                background_color: vec![BAR_FILL.to_string()],
                border_color: vec![BAR_BORDER.to_string()],
                border_width: Some(1),
            }],
        },
        options: serde_json::json!({
            "responsive": true,
            "scales": { "y": { "beginAtZero": true } },
        }),
    }
}

/// 两段式环形图：`label` 与 `Remaining`
pub fn doughnut_chart(label: &str, value: f64, total: f64) -> ChartConfig {
    let remaining = (total - value).max(0.0);
    ChartConfig {
        chart_type: ChartType::Doughnut,
        data: ChartData {
            labels: vec![label.to_string(), "Remaining".to_string()],
            datasets: vec![Dataset {
                label: None,
                data: vec![value, remaining],
                background_color: DOUGHNUT_FILL.iter().map(|c| c.to_string()).collect(),
                border_color: Vec::new(),
                border_width: None,
            }],
        },
        options: serde_json::json!({ "responsive": true }),
    }
}

/// 分析页的全部数据
#[derive(Debug, Clone)]
pub struct Analytics {
    pub most_listed: Vec<ListedCount>,
    pub most_inquired: Vec<InquiredCount>,
    /// 没有成交时为 None
    pub total_revenue: Option<f64>,
}

impl Analytics {
    pub fn most_listed_chart(&self) -> ChartConfig {
        let points: Vec<_> = self
            .most_listed
            .iter()
            .map(|c| (c.item_name.clone(), c.count as f64))
            .collect();
        bar_chart("Most Listed Items", &points)
    }

    pub fn most_inquired_chart(&self) -> ChartConfig {
        let points: Vec<_> = self
            .most_inquired
            .iter()
            .map(|c| (c.id.clone(), c.count as f64))
            .collect();
        bar_chart("Most Inquired Items", &points)
    }

    /// 营收与目标的环形图
    pub fn revenue_chart(&self, target: f64) -> Option<ChartConfig> {
        self.total_revenue
            .map(|revenue| doughnut_chart("Total Revenue", revenue, target))
    }
}

impl MarketClient {
    pub async fn most_listed_items(&self) -> Result<Vec<ListedCount>> {
        self.fetch(Method::GET, "admin/most_listed_items", &[], None, Auth::Bearer)
            .await
    }

    pub async fn most_inquired_items(&self) -> Result<Vec<InquiredCount>> {
        self.fetch(Method::GET, "admin/most_inquired_items", &[], None, Auth::Bearer)
            .await
    }

    /// 总营收，服务端返回 `[{ total_price }]`，空数组表示没有成交
    pub async fn total_revenue(&self) -> Result<Option<f64>> {
        let rows: Vec<Revenue> = self
            .fetch(Method::GET, "admin/total_revenue", &[], None, Auth::Bearer)
            .await?;
        Ok(rows.first().map(|r| r.total_price))
    }

    /// 三个聚合接口一起拉取
    pub async fn analytics(&self) -> Result<Analytics> {
        let (most_listed, most_inquired, total_revenue) = futures::try_join!(
            self.most_listed_items(),
            self.most_inquired_items(),
            self.total_revenue()
        )?;
        Ok(Analytics {
            most_listed,
            most_inquired,
            total_revenue,
        })
    }
}
