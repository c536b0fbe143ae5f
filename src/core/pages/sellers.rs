use crate::core::aggregate::{count_unique, group_count, group_mean, group_unique, mean_of, top_n};
use crate::core::format::{format_count, format_dhm_from_days, format_percent};
use crate::core::pages::{count_points, counts_as_f64, state_chart, PageContext};
use crate::domain::model::OrderRecord;
use crate::domain::report::{Chart, ChartKind, Metric, PageKind, PageReport};

pub fn build(ctx: &PageContext<'_>) -> PageReport {
    let selected = &ctx.view.selected;
    let by_date = &ctx.view.by_date;
    let mut report = PageReport::new(PageKind::Sellers);

    let total_sellers = count_unique(selected, |r| r.seller_id.as_deref());

    // 先算每位賣家的平均，再對賣家取平均
    let per_seller = group_mean(selected, |r| r.seller_id.as_deref(), |r| r.seller_delivery_days());
    let avg_seller_delivery_days = mean_of(per_seller.values().copied());

    let retention_rate = seller_retention_rate(selected);

    report.metrics = vec![
        Metric::new(
            "Total Sellers",
            format_count(total_sellers),
            Some(total_sellers as f64),
            "Unique sellers on the platform.",
        ),
        Metric::new(
            "Average Seller Delivery Time",
            format_dhm_from_days(avg_seller_delivery_days),
            avg_seller_delivery_days,
            "Average time per seller from approval to handing the order to the carrier.",
        ),
        Metric::new(
            "Seller Retention Rate",
            format_percent(retention_rate),
            Some(retention_rate),
            "Share of earlier sellers that are still active in the latest month.",
        ),
    ];

    let orders_per_seller = group_count(selected, |r| r.seller_id.as_deref(), |r| r.order_id.is_some());
    let products_per_seller = group_unique(
        selected,
        |r| r.seller_id.as_deref(),
        |r| r.product_id.as_deref(),
    );
    let sellers_by_state = counts_as_f64(group_unique(
        by_date,
        |r| r.seller_state.as_deref(),
        |r| r.seller_id.as_deref(),
    ));

    report.charts = vec![
        Chart::new(
            "Top 5 Sellers by Order Count",
            ChartKind::HorizontalBar,
            "Seller ID",
            "Total Orders",
        )
        .with_series("orders", count_points(top_n(orders_per_seller, 5))),
        Chart::new(
            "Top 5 Sellers by Product",
            ChartKind::HorizontalBar,
            "Seller ID",
            "Total Products",
        )
        .with_series("products", count_points(top_n(products_per_seller, 5))),
        state_chart(ctx, "Seller Distribution by State", "unique sellers", &sellers_by_state),
    ];

    report
}

/// 最新月份仍活躍的賣家數 ÷ 之前月份的賣家數 × 100
fn seller_retention_rate(rows: &[&OrderRecord]) -> f64 {
    let Some(latest_month) = rows.iter().filter_map(|r| r.year_month).max() else {
        return 0.0;
    };

    let active: Vec<&OrderRecord> = rows
        .iter()
        .copied()
        .filter(|r| r.year_month.is_some_and(|m| m >= latest_month))
        .collect();
    let earlier: Vec<&OrderRecord> = rows
        .iter()
        .copied()
        .filter(|r| r.year_month.is_some_and(|m| m < latest_month))
        .collect();

    let active_sellers = count_unique(&active, |r| r.seller_id.as_deref());
    let initial_sellers = count_unique(&earlier, |r| r.seller_id.as_deref());

    if initial_sellers > 0 {
        active_sellers as f64 / initial_sellers as f64 * 100.0
    } else {
        0.0
    }
}
