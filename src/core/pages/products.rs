use std::collections::BTreeMap;

use crate::core::aggregate::{group_count, group_mean, group_sum, idx_max, top_n};
use crate::core::format::NOT_AVAILABLE;
use crate::core::pages::{count_points, month_label, value_points, PageContext};
use crate::domain::model::OrderRecord;
use crate::domain::report::{Chart, ChartKind, Metric, PageKind, PageReport, Point};

fn category(r: &OrderRecord) -> Option<&str> {
    r.product_category_name_english.as_deref()
}

pub fn build(ctx: &PageContext<'_>) -> PageReport {
    let selected = &ctx.view.selected;
    let mut report = PageReport::new(PageKind::Products);

    let top_selling = idx_max(group_count(selected, category, |r| r.order_id.is_some()))
        .filter(|(_, n)| *n > 0);
    let top_rated = idx_max(group_mean(selected, category, |r| r.review_score));
    let most_reviewed = idx_max(group_count(selected, category, |r| r.review_id.is_some()))
        .filter(|(_, n)| *n > 0);

    report.metrics = vec![
        Metric::new(
            "Top Selling Category",
            top_selling
                .map(|(name, n)| format!("{} ({} sales)", name, n))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            top_selling.map(|(_, n)| n as f64),
            "Product category with the most orders.",
        ),
        Metric::new(
            "Top Rated Category",
            top_rated
                .map(|(name, score)| format!("{} ({:.1}/5)", name, score))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            top_rated.map(|(_, score)| score),
            "Product category with the highest average rating.",
        ),
        Metric::new(
            "Most Reviewed Category",
            most_reviewed
                .map(|(name, n)| format!("{} ({} reviews)", name, n))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            most_reviewed.map(|(_, n)| n as f64),
            "Product category with the most reviews.",
        ),
    ];

    let items_per_category = group_count(selected, category, |r| r.order_item_id.is_some());
    let top_categories: Vec<&str> = top_n(items_per_category, 5)
        .into_iter()
        .map(|(name, _)| name)
        .collect();

    let mut sales_trend = Chart::new(
        "Top 5 Product Categories Sales Trend per Month",
        ChartKind::Line,
        "Month",
        "Total Products Sold",
    );
    for (name, points) in monthly_category_sales(selected, &top_categories) {
        sales_trend = sales_trend.with_series(name, points);
    }

    let revenue_per_category = group_sum(selected, category, |r| r.payment_value);
    let sales_per_product = group_count(
        selected,
        |r| r.product_id.as_deref(),
        |r| r.order_item_id.is_some(),
    );

    report.charts = vec![
        sales_trend,
        Chart::new(
            "Top 5 Product Categories by Revenue",
            ChartKind::HorizontalBar,
            "Product Category",
            "Total Revenue (R$)",
        )
        .with_series("revenue", value_points(top_n(revenue_per_category, 5))),
        Chart::new(
            "Top 5 Most Purchased Products Based on Sales Count",
            ChartKind::HorizontalBar,
            "Product ID",
            "Total Sales",
        )
        .with_series("sales", count_points(top_n(sales_per_product, 5))),
    ];

    report
}

/// 前五大類別每月售出的品項數，序列順序依總銷量
fn monthly_category_sales<'a>(
    rows: &[&'a OrderRecord],
    top_categories: &[&'a str],
) -> Vec<(&'a str, Vec<Point>)> {
    let mut per_month: BTreeMap<(&str, chrono::NaiveDate), usize> = BTreeMap::new();
    for row in rows.iter().copied() {
        let (Some(name), Some(month)) = (category(row), row.year_month) else {
            continue;
        };
        if !top_categories.contains(&name) || row.order_item_id.is_none() {
            continue;
        }
        *per_month.entry((name, month)).or_insert(0) += 1;
    }

    top_categories
        .iter()
        .map(|name| {
            let points = per_month
                .iter()
                .filter(|((cat, _), _)| cat == name)
                .map(|((_, month), n)| Point::category(month_label(month), *n as f64))
                .collect();
            (*name, points)
        })
        .collect()
}
