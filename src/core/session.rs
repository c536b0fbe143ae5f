use std::sync::Arc;

use crate::core::dataset::{Dataset, FilterOptions};
use crate::core::filter::FilteredView;
use crate::core::pages::{build_page, PageContext};
use crate::domain::model::DashboardOutput;
use crate::domain::ports::{MapConfig, DEFAULT_MAX_WORDS};
use crate::domain::report::{PageKind, PageReport};
use crate::domain::selection::FilterSelection;
use crate::utils::error::Result;

/// 一次使用期間的狀態：只載入一次的資料集加上目前的篩選條件
#[derive(Debug, Clone)]
pub struct DashboardSession {
    dataset: Arc<Dataset>,
    selection: FilterSelection,
    map: MapConfig,
    max_words: usize,
}

impl DashboardSession {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            selection: FilterSelection::default(),
            map: MapConfig::default(),
            max_words: DEFAULT_MAX_WORDS,
        }
    }

    pub fn with_map(mut self, map: MapConfig) -> Self {
        self.map = map;
        self
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn filter_options(&self) -> Result<FilterOptions> {
        self.dataset.filter_options()
    }

    /// 更新篩選條件；有變動時回傳 `true`，呼叫端應重新產生頁面
    pub fn update_selection(&mut self, selection: FilterSelection) -> bool {
        if self.selection == selection {
            return false;
        }
        tracing::debug!("Selection changed: {:?}", selection);
        self.selection = selection;
        true
    }

    pub fn render(&self, page: PageKind) -> Result<PageReport> {
        let view = FilteredView::new(&self.dataset, &self.selection)?;
        let ctx = PageContext::new(&view, &self.map).with_max_words(self.max_words);
        Ok(build_page(page, &ctx))
    }

    pub fn render_all(&self, pages: &[PageKind]) -> Result<DashboardOutput> {
        let view = FilteredView::new(&self.dataset, &self.selection)?;
        let ctx = PageContext::new(&view, &self.map).with_max_words(self.max_words);
        let pages = pages.iter().map(|page| build_page(*page, &ctx)).collect();

        Ok(DashboardOutput {
            selection: view.summary(),
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{parse_datetime, OrderRecord};

    fn session() -> DashboardSession {
        let records = vec![
            OrderRecord {
                order_id: Some("o1".to_string()),
                customer_state: Some("SP".to_string()),
                order_purchase_timestamp: parse_datetime("2018-01-10 10:00:00"),
                ..Default::default()
            },
            OrderRecord {
                order_id: Some("o2".to_string()),
                customer_state: Some("RJ".to_string()),
                order_purchase_timestamp: parse_datetime("2018-02-10 10:00:00"),
                ..Default::default()
            },
        ];
        DashboardSession::new(Arc::new(Dataset::new(records)))
    }

    #[test]
    fn test_update_selection_signals_rerun_only_on_change() {
        let mut session = session();
        assert!(!session.update_selection(FilterSelection::default()));
        assert!(session.update_selection(FilterSelection::default().with_state("SP")));
        assert!(!session.update_selection(FilterSelection::default().with_state("SP")));
    }

    #[test]
    fn test_render_uses_current_selection() {
        let mut session = session();
        let all = session.render(PageKind::Home).unwrap();
        assert_eq!(all.metric("Total Orders").unwrap().raw, Some(2.0));

        session.update_selection(FilterSelection::default().with_state("RJ"));
        let rj = session.render(PageKind::Home).unwrap();
        assert_eq!(rj.metric("Total Orders").unwrap().raw, Some(1.0));
    }

    #[test]
    fn test_render_all_reports_selection_summary() {
        let session = session();
        let output = session.render_all(&[PageKind::Home, PageKind::Orders]).unwrap();
        assert_eq!(output.pages.len(), 2);
        assert_eq!(output.selection.rows_in_date_range, 2);
        assert_eq!(output.selection.city, "All");
    }

    #[test]
    fn test_dataset_is_shared_not_copied() {
        let session = session();
        let other = session.clone();
        assert!(Arc::ptr_eq(session.dataset(), other.dataset()));
    }
}
