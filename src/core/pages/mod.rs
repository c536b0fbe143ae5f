pub mod customers;
pub mod home;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod sellers;

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::core::filter::FilteredView;
use crate::domain::ports::{MapConfig, DEFAULT_MAX_WORDS};
use crate::domain::report::{Chart, ChartKind, PageKind, PageReport, Point};

/// 建立頁面時需要的所有輸入
pub struct PageContext<'a> {
    pub view: &'a FilteredView<'a>,
    pub map: &'a MapConfig,
    pub max_words: usize,
}

impl<'a> PageContext<'a> {
    pub fn new(view: &'a FilteredView<'a>, map: &'a MapConfig) -> Self {
        Self {
            view,
            map,
            max_words: DEFAULT_MAX_WORDS,
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    pub(crate) fn choropleth(&self) -> ChartKind {
        ChartKind::Choropleth {
            geojson_url: self.map.geojson_url.clone(),
            feature_id_key: self.map.feature_id_key.clone(),
        }
    }
}

/// 空資料不會失敗，缺值顯示為 `N/A`
pub fn build_page(page: PageKind, ctx: &PageContext<'_>) -> PageReport {
    let _span = tracing::debug_span!("build_page", page = page.slug()).entered();
    let report = match page {
        PageKind::Home => home::build(ctx),
        PageKind::Orders => orders::build(ctx),
        PageKind::Customers => customers::build(ctx),
        PageKind::Sellers => sellers::build(ctx),
        PageKind::Products => products::build(ctx),
        PageKind::Payments => payments::build(ctx),
        PageKind::Reviews => reviews::build(ctx),
    };
    tracing::debug!(
        "Built page {} ({} metrics, {} charts, {} tables)",
        page,
        report.metrics.len(),
        report.charts.len(),
        report.tables.len()
    );
    report
}

pub(crate) fn month_label(month: &NaiveDate) -> String {
    month.format("%Y-%m").to_string()
}

pub(crate) fn count_points<K: AsRef<str>>(counts: Vec<(K, usize)>) -> Vec<Point> {
    counts
        .into_iter()
        .map(|(k, c)| Point::category(k.as_ref(), c as f64))
        .collect()
}

pub(crate) fn value_points<K: AsRef<str>>(values: Vec<(K, f64)>) -> Vec<Point> {
    values
        .into_iter()
        .map(|(k, v)| Point::category(k.as_ref(), v))
        .collect()
}

pub(crate) fn monthly_points(groups: &BTreeMap<NaiveDate, f64>) -> Vec<Point> {
    groups
        .iter()
        .map(|(month, v)| Point::category(month_label(month), *v))
        .collect()
}

pub(crate) fn counts_as_f64<K: Ord>(groups: BTreeMap<K, usize>) -> BTreeMap<K, f64> {
    groups.into_iter().map(|(k, c)| (k, c as f64)).collect()
}

/// 各州地圖的資料
pub(crate) fn state_chart<K: AsRef<str>>(
    ctx: &PageContext<'_>,
    title: &str,
    value_label: &str,
    groups: &BTreeMap<K, f64>,
) -> Chart {
    let points = groups
        .iter()
        .map(|(state, v)| Point::category(state.as_ref(), *v))
        .collect();
    Chart::new(title, ctx.choropleth(), "state", value_label).with_series(value_label, points)
}
