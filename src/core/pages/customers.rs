use std::collections::BTreeMap;

use crate::core::aggregate::{count_unique, group_mean, group_sum, group_unique, mean_of, occurrences, value_counts};
use crate::core::format::{format_count, format_currency, format_optional, format_percent};
use crate::core::pages::{count_points, counts_as_f64, state_chart, PageContext};
use crate::domain::report::{Chart, ChartKind, Metric, PageKind, PageReport, Point};

pub fn build(ctx: &PageContext<'_>) -> PageReport {
    let selected = &ctx.view.selected;
    let by_date = &ctx.view.by_date;
    let mut report = PageReport::new(PageKind::Customers);

    // 出現超過一列的客戶視為回購客戶
    let purchases = occurrences(selected, |r| r.customer_unique_id.as_deref());
    let active_customers = purchases.values().filter(|&&n| n > 1).count();
    let total_customers = count_unique(selected, |r| r.customer_unique_id.as_deref());

    let spend_per_customer = group_sum(selected, |r| r.customer_unique_id.as_deref(), |r| r.payment_value);
    let avg_monetary_value = mean_of(spend_per_customer.values().copied());

    let retention_rate = if total_customers > 0 {
        active_customers as f64 / total_customers as f64 * 100.0
    } else {
        0.0
    };

    report.metrics = vec![
        Metric::new(
            "Total Active Customers",
            format_count(active_customers),
            Some(active_customers as f64),
            "Customers who made more than one purchase.",
        ),
        Metric::new(
            "Average Monetary Value",
            format_optional(avg_monetary_value, |v| format_currency(v, 2)),
            avg_monetary_value,
            "Average total spend per customer in the selected period.",
        ),
        Metric::new(
            "Customer Retention Rate",
            format_percent(retention_rate),
            Some(retention_rate),
            "Share of customers who came back for another purchase.",
        ),
    ];

    let segment_counts = value_counts(selected, |r| r.customer_segment.as_deref());
    let customers_by_state = counts_as_f64(group_unique(
        by_date,
        |r| r.customer_state.as_deref(),
        |r| r.customer_unique_id.as_deref(),
    ));
    let revenue_by_state = group_mean(by_date, |r| r.customer_state.as_deref(), |r| r.payment_value);

    let mut scatter = Chart::new("RFM Score vs Revenue", ChartKind::Scatter, "RFM Score", "Revenue (R$)");
    for (segment, points) in rfm_points(ctx) {
        scatter = scatter.with_series(&segment, points);
    }

    report.charts = vec![
        Chart::new("Customer Segment Proportion", ChartKind::Pie, "Customer_segment", "count")
            .with_series("customers", count_points(segment_counts)),
        scatter,
        state_chart(ctx, "Customer Distribution by State", "unique customers", &customers_by_state),
        state_chart(ctx, "Average Revenue by State", "average revenue (R$)", &revenue_by_state),
    ];

    report
}

/// 每個客群一個序列，點的標籤是客戶 ID
fn rfm_points(ctx: &PageContext<'_>) -> BTreeMap<String, Vec<Point>> {
    let mut series: BTreeMap<String, Vec<Point>> = BTreeMap::new();
    for row in ctx.view.selected.iter() {
        if let (Some(score), Some(monetary)) = (row.rfm_score, row.monetary) {
            let segment = row
                .customer_segment
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());
            series
                .entry(segment)
                .or_default()
                .push(Point::numeric(score, monetary, row.customer_unique_id.clone()));
        }
    }
    series
}
