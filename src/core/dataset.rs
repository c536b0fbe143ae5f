use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Read;

use crate::domain::model::OrderRecord;
use crate::domain::selection::{DateRange, ALL_OPTION};
use crate::utils::error::{DashboardError, Result};

/// 整份資料集，每次執行只載入一次
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<OrderRecord>,
}

/// 側邊欄可選的篩選值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub min_date: NaiveDateTime,
    pub max_date: NaiveDateTime,
    pub cities: Vec<String>,
    pub states: Vec<String>,
}

impl Dataset {
    pub fn new(records: Vec<OrderRecord>) -> Self {
        Self { records }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Fields)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<OrderRecord>() {
            records.push(row?);
        }

        tracing::debug!("Parsed {} dataset rows", records.len());
        Ok(Self { records })
    }

    pub fn from_csv_bytes(data: &[u8]) -> Result<Self> {
        Self::from_csv_reader(data)
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 下單時間的最小值與最大值
    pub fn date_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut timestamps = self
            .records
            .iter()
            .filter_map(|r| r.order_purchase_timestamp);
        let first = timestamps.next()?;
        Some(timestamps.fold((first, first), |(min, max), ts| (min.min(ts), max.max(ts))))
    }

    /// 預設的日期區間 (整份資料的範圍)
    pub fn full_range(&self) -> Result<DateRange> {
        let (min, max) = self.date_bounds().ok_or(DashboardError::DataNotLoaded)?;
        DateRange::new(min.date(), max.date())
    }

    pub fn filter_options(&self) -> Result<FilterOptions> {
        let (min_date, max_date) = self.date_bounds().ok_or(DashboardError::DataNotLoaded)?;
        Ok(FilterOptions {
            min_date,
            max_date,
            cities: self.unique_sorted(|r| r.customer_city.as_deref()),
            states: self.unique_sorted(|r| r.customer_state.as_deref()),
        })
    }

    fn unique_sorted<F>(&self, key: F) -> Vec<String>
    where
        F: Fn(&OrderRecord) -> Option<&str>,
    {
        self.records
            .iter()
            .filter_map(key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

impl FilterOptions {
    /// 下拉選單內容：`All` 加上排序後的城市
    pub fn city_choices(&self) -> Vec<String> {
        with_all_option(&self.cities)
    }

    pub fn state_choices(&self) -> Vec<String> {
        with_all_option(&self.states)
    }
}

fn with_all_option(values: &[String]) -> Vec<String> {
    std::iter::once(ALL_OPTION.to_string())
        .chain(values.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CSV: &str = "\
order_id,customer_unique_id,customer_city,customer_state,order_purchase_timestamp,payment_value,review_score,extra_column
o1,c1,sao paulo,SP,2017-05-10 08:00:00,100.5,5,x
o2,c2,rio de janeiro,RJ,2017-01-02 09:30:00,,4,y
o3,c3,campinas,SP,2018-02-20 23:15:00,35,,z
";

    #[test]
    fn test_load_csv_ignores_unknown_columns_and_empty_cells() {
        let dataset = Dataset::from_csv_bytes(CSV.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);

        let second = &dataset.records()[1];
        assert_eq!(second.order_id.as_deref(), Some("o2"));
        assert_eq!(second.payment_value, None);
        assert_eq!(second.review_score, Some(4.0));
        assert_eq!(dataset.records()[2].review_score, None);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let csv = "order_id,payment_value\no1,abc\n";
        let err = Dataset::from_csv_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::CsvError(_)));
    }

    #[test]
    fn test_invalid_timestamp_is_reported() {
        let csv = "order_id,order_purchase_timestamp\no1,yesterday\n";
        assert!(Dataset::from_csv_bytes(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_filter_options() {
        let dataset = Dataset::from_csv_bytes(CSV.as_bytes()).unwrap();
        let options = dataset.filter_options().unwrap();

        assert_eq!(
            options.min_date,
            NaiveDate::from_ymd_opt(2017, 1, 2)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
        assert_eq!(options.max_date.date(), NaiveDate::from_ymd_opt(2018, 2, 20).unwrap());
        assert_eq!(options.city_choices(), vec!["All", "campinas", "rio de janeiro", "sao paulo"]);
        assert_eq!(options.state_choices(), vec!["All", "RJ", "SP"]);
    }

    #[test]
    fn test_empty_dataset_has_no_bounds() {
        let dataset = Dataset::default();
        assert!(dataset.date_bounds().is_none());
        assert!(matches!(
            dataset.filter_options(),
            Err(DashboardError::DataNotLoaded)
        ));
    }
}
