use std::collections::BTreeMap;

use crate::core::aggregate::{group_sum, mean, unique_values, value_counts};
use crate::core::filter::restrict_to;
use crate::core::format::{format_currency, format_optional, NOT_AVAILABLE};
use crate::core::pages::{count_points, month_label, state_chart, PageContext};
use crate::domain::report::{Chart, ChartKind, Metric, PageKind, PageReport, Point};

pub const PAYMENT_MAP_CHART: &str = "Total Payment Value by State";

pub fn build(ctx: &PageContext<'_>) -> PageReport {
    let selected = &ctx.view.selected;
    let by_date = &ctx.view.by_date;
    let mut report = PageReport::new(PageKind::Payments);

    let avg_payment = mean(selected, |r| r.payment_value);
    let payment_counts = value_counts(selected, |r| r.payment_type.as_deref());
    let most_used_method = payment_counts.first().map(|(method, _)| method.to_string());
    let avg_installments = mean(selected, |r| r.payment_installments);

    report.metrics = vec![
        Metric::new(
            "Average Payment Transactions",
            format_optional(avg_payment, |v| format_currency(v, 2)),
            avg_payment,
            "Average payment value per transaction.",
        ),
        Metric::new(
            "Most Used Payment Method",
            most_used_method.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            payment_counts.first().map(|(_, n)| *n as f64),
            "Payment method customers use most often.",
        ),
        Metric::new(
            "Average Installment per Transaction",
            format_optional(avg_installments, |v| format!("{:.0}", v)),
            avg_installments,
            "Average number of installments chosen per transaction.",
        ),
    ];

    let mut revenue_trend = Chart::new(
        "Monthly Revenue Trend by Payment Method",
        ChartKind::Line,
        "Month",
        "Total Revenue (R$)",
    );
    let monthly_revenue = group_sum(
        selected,
        |r| Some((r.payment_type.as_deref()?, r.year_month?)),
        |r| r.payment_value,
    );
    for (method, points) in series_by_method(monthly_revenue) {
        revenue_trend = revenue_trend.with_series(method, points);
    }

    // 地圖用日期篩選後的資料，再套用付款方式的多選
    let available_methods = unique_values(by_date, |r| r.payment_type.as_deref());
    let chosen_methods = ctx
        .view
        .selection
        .payment_types
        .as_deref()
        .unwrap_or(available_methods.as_slice());
    let map_rows = restrict_to(by_date, Some(chosen_methods), |r| r.payment_type.as_deref());
    let payment_by_state = group_sum(&map_rows, |r| r.customer_state.as_deref(), |r| r.payment_value);

    report.charts = vec![
        Chart::new("Payment Method Distribution", ChartKind::Pie, "payment_type", "count")
            .with_series("payments", count_points(payment_counts)),
        revenue_trend,
        state_chart(ctx, PAYMENT_MAP_CHART, "total payment value (R$)", &payment_by_state),
    ];

    report
}

fn series_by_method<'a>(
    monthly_revenue: BTreeMap<(&'a str, chrono::NaiveDate), f64>,
) -> BTreeMap<&'a str, Vec<Point>> {
    let mut series: BTreeMap<&str, Vec<Point>> = BTreeMap::new();
    for ((method, month), total) in monthly_revenue {
        series
            .entry(method)
            .or_default()
            .push(Point::category(month_label(&month), total));
    }
    series
}
