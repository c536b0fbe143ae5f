use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::report::PageReport;
use crate::domain::selection::DateRange;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// 資料集的一列 (訂單 / 品項 / 付款 / 評論 join 後的結果)
///
/// 欄位名稱對應 CSV 標頭，空白欄位一律視為 `None`。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrderRecord {
    pub order_id: Option<String>,
    pub customer_unique_id: Option<String>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,
    pub seller_id: Option<String>,
    pub seller_state: Option<String>,
    pub product_id: Option<String>,
    pub order_item_id: Option<String>,
    pub product_category_name_english: Option<String>,
    pub order_status: Option<String>,

    #[serde(deserialize_with = "deserialize_datetime")]
    pub order_purchase_timestamp: Option<NaiveDateTime>,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub order_approved_at: Option<NaiveDateTime>,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub order_delivered_carrier_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "deserialize_year_month")]
    pub year_month: Option<NaiveDate>,

    /// 下單到送達的天數
    pub delivery_time: Option<f64>,
    pub payment_type: Option<String>,
    pub payment_installments: Option<f64>,
    pub payment_value: Option<f64>,

    pub review_id: Option<String>,
    pub review_score: Option<f64>,
    pub review_comment_message: Option<String>,

    #[serde(rename = "RFM_Score")]
    pub rfm_score: Option<f64>,
    #[serde(rename = "Monetary")]
    pub monetary: Option<f64>,
    #[serde(rename = "Customer_segment")]
    pub customer_segment: Option<String>,
}

impl OrderRecord {
    /// 核准時間減下單時間 (秒)
    pub fn processing_seconds(&self) -> Option<f64> {
        seconds_between(self.order_purchase_timestamp, self.order_approved_at)
    }

    /// 實際送達晚於預估送達的秒數，沒有延遲時為 `None`
    pub fn late_seconds(&self) -> Option<f64> {
        seconds_between(
            self.order_estimated_delivery_date,
            self.order_delivered_customer_date,
        )
        .filter(|secs| *secs > 0.0)
    }

    pub fn is_late(&self) -> bool {
        self.late_seconds().is_some()
    }

    /// 核准到交給物流的天數
    pub fn seller_delivery_days(&self) -> Option<f64> {
        seconds_between(self.order_approved_at, self.order_delivered_carrier_date)
            .map(|secs| secs / 86_400.0)
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.order_status.as_deref() == Some(status)
    }
}

fn seconds_between(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Option<f64> {
    let delta = to? - from?;
    Some(delta.num_milliseconds() as f64 / 1000.0)
}

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// 月份欄位接受 `YYYY-MM`、`YYYY-MM-DD` 或完整時間，統一成當月第一天
pub fn parse_year_month(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(ts) = parse_datetime(value) {
        return ts.date().with_day(1);
    }
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok()
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_datetime(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime '{}'", raw))),
        _ => Ok(None),
    }
}

fn deserialize_year_month<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_year_month(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid year_month '{}'", raw))),
        _ => Ok(None),
    }
}

/// 本次篩選條件的摘要，和頁面一起輸出
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionSummary {
    pub date_range: DateRange,
    pub city: String,
    pub state: String,
    pub rows_in_date_range: usize,
    pub rows_selected: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOutput {
    pub selection: SelectionSummary,
    pub pages: Vec<PageReport>,
}
