use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::dataset::Dataset;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::validate_date;

pub const ALL_OPTION: &str = "All";

/// 包含頭尾兩天的日期區間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::ValidationError {
                message: format!("start date {} is after end date {}", start, end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = validate_date("start_date", start)?;
        let end = validate_date("end_date", end)?;
        Self::new(start, end)
    }

    /// 結束日當天的所有時間都算在區間內
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationFilter {
    #[default]
    All,
    Only(String),
}

impl LocationFilter {
    /// `"All"` (不分大小寫) 或空字串代表不篩選
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_OPTION) {
            LocationFilter::All
        } else {
            LocationFilter::Only(value.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, LocationFilter::All)
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            LocationFilter::All => true,
            LocationFilter::Only(expected) => value == Some(expected.as_str()),
        }
    }
}

impl fmt::Display for LocationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationFilter::All => f.write_str(ALL_OPTION),
            LocationFilter::Only(value) => f.write_str(value),
        }
    }
}

/// 側邊欄的全域篩選，加上付款頁與評論頁各自的多選條件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub date_range: Option<DateRange>,
    pub city: LocationFilter,
    pub state: LocationFilter,
    pub payment_types: Option<Vec<String>>,
    pub customer_segments: Option<Vec<String>>,
}

impl FilterSelection {
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = LocationFilter::parse(city);
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = LocationFilter::parse(state);
        self
    }

    pub fn with_payment_types(mut self, types: Vec<String>) -> Self {
        self.payment_types = non_empty(types);
        self
    }

    pub fn with_customer_segments(mut self, segments: Vec<String>) -> Self {
        self.customer_segments = non_empty(segments);
        self
    }

    pub fn has_city_and_state(&self) -> bool {
        !self.city.is_all() && !self.state.is_all()
    }

    /// 沒指定日期區間時使用整份資料的範圍
    pub fn resolve(&self, dataset: &Dataset) -> Result<DateRange> {
        if self.has_city_and_state() {
            tracing::warn!(
                "⚠️ Both city '{}' and state '{}' are selected; only rows matching both are kept",
                self.city,
                self.state
            );
        }

        match self.date_range {
            Some(range) => Ok(range),
            None => dataset.full_range(),
        }
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    let values: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
