use crate::core::dataset::Dataset;
use crate::domain::model::{OrderRecord, SelectionSummary};
use crate::domain::selection::{DateRange, FilterSelection};
use crate::utils::error::{DashboardError, Result};

/// 套用篩選後的兩個視圖
///
/// `by_date` 只套用日期區間，用於跨地區比較 (前五名城市、各州地圖)。
/// `selected` 再加上城市與州的條件，用於頁面的主要指標。
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub range: DateRange,
    pub selection: &'a FilterSelection,
    pub by_date: Vec<&'a OrderRecord>,
    pub selected: Vec<&'a OrderRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, selection: &'a FilterSelection) -> Result<Self> {
        if dataset.is_empty() {
            return Err(DashboardError::DataNotLoaded);
        }

        let range = selection.resolve(dataset)?;

        let by_date: Vec<&OrderRecord> = dataset
            .records()
            .iter()
            .filter(|r| r.order_purchase_timestamp.is_some_and(|ts| range.contains(ts)))
            .collect();

        let selected: Vec<&OrderRecord> = by_date
            .iter()
            .copied()
            .filter(|r| selection.city.matches(r.customer_city.as_deref()))
            .filter(|r| selection.state.matches(r.customer_state.as_deref()))
            .collect();

        tracing::debug!(
            "Filter {} city={} state={}: {} rows in range, {} selected",
            range,
            selection.city,
            selection.state,
            by_date.len(),
            selected.len()
        );

        Ok(Self {
            range,
            selection,
            by_date,
            selected,
        })
    }

    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            date_range: self.range,
            city: self.selection.city.to_string(),
            state: self.selection.state.to_string(),
            rows_in_date_range: self.by_date.len(),
            rows_selected: self.selected.len(),
        }
    }
}

/// 只保留欄位值在允許清單內的列，`None` 代表全部保留
pub fn restrict_to<'a, F>(
    rows: &[&'a OrderRecord],
    allowed: Option<&[String]>,
    key: F,
) -> Vec<&'a OrderRecord>
where
    F: Fn(&'a OrderRecord) -> Option<&'a str>,
{
    match allowed {
        None => rows.to_vec(),
        Some(allowed) => rows
            .iter()
            .copied()
            .filter(|r| key(*r).is_some_and(|v| allowed.iter().any(|a| a == v)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::parse_datetime;

    fn record(id: &str, ts: &str, city: &str, state: &str) -> OrderRecord {
        OrderRecord {
            order_id: Some(id.to_string()),
            order_purchase_timestamp: parse_datetime(ts),
            customer_city: Some(city.to_string()),
            customer_state: Some(state.to_string()),
            ..Default::default()
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            record("o1", "2017-01-05 10:00:00", "sao paulo", "SP"),
            record("o2", "2017-02-10 12:00:00", "campinas", "SP"),
            record("o3", "2017-02-28 23:59:00", "rio de janeiro", "RJ"),
            record("o4", "2017-03-01 00:00:01", "sao paulo", "SP"),
            OrderRecord {
                order_id: Some("o5".to_string()),
                ..Default::default()
            },
        ])
    }

    fn ids(rows: &[&OrderRecord]) -> Vec<String> {
        rows.iter().filter_map(|r| r.order_id.clone()).collect()
    }

    #[test]
    fn test_default_range_covers_whole_dataset() {
        let dataset = dataset();
        let selection = FilterSelection::default();
        let view = FilteredView::new(&dataset, &selection).unwrap();

        // 沒有下單時間的列永遠不會通過日期篩選
        assert_eq!(ids(&view.by_date), vec!["o1", "o2", "o3", "o4"]);
        assert_eq!(view.selected.len(), 4);
    }

    #[test]
    fn test_date_range_is_inclusive_of_end_day() {
        let dataset = dataset();
        let selection = FilterSelection::default()
            .with_date_range(DateRange::parse("2017-02-01", "2017-02-28").unwrap());
        let view = FilteredView::new(&dataset, &selection).unwrap();
        assert_eq!(ids(&view.by_date), vec!["o2", "o3"]);
    }

    #[test]
    fn test_state_filter_only_restricts_selected_rows() {
        let dataset = dataset();
        let selection = FilterSelection::default().with_state("SP");
        let view = FilteredView::new(&dataset, &selection).unwrap();

        assert_eq!(view.by_date.len(), 4);
        assert_eq!(ids(&view.selected), vec!["o1", "o2", "o4"]);
    }

    #[test]
    fn test_city_and_state_both_apply() {
        let dataset = dataset();
        let selection = FilterSelection::default()
            .with_city("sao paulo")
            .with_state("RJ");
        let view = FilteredView::new(&dataset, &selection).unwrap();
        assert!(view.selected.is_empty());

        let summary = view.summary();
        assert_eq!(summary.city, "sao paulo");
        assert_eq!(summary.state, "RJ");
        assert_eq!(summary.rows_selected, 0);
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let dataset = Dataset::default();
        let selection = FilterSelection::default();
        assert!(matches!(
            FilteredView::new(&dataset, &selection),
            Err(DashboardError::DataNotLoaded)
        ));
    }

    #[test]
    fn test_restrict_to() {
        let dataset = dataset();
        let rows: Vec<&OrderRecord> = dataset.records().iter().collect();
        let allowed = vec!["RJ".to_string()];

        let kept = restrict_to(&rows, Some(allowed.as_slice()), |r| r.customer_state.as_deref());
        assert_eq!(ids(&kept), vec!["o3"]);

        let all = restrict_to(&rows, None, |r| r.customer_state.as_deref());
        assert_eq!(all.len(), 5);
    }
}
