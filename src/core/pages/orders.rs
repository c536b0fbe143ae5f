use crate::core::aggregate::{count_where, group_mean, group_unique, mean, mean_of, value_counts};
use crate::core::format::{format_dhm_from_seconds, NOT_AVAILABLE};
use crate::core::pages::{count_points, counts_as_f64, monthly_points, state_chart, PageContext};
use crate::domain::model::OrderRecord;
use crate::domain::report::{Chart, ChartKind, Metric, PageKind, PageReport, Table};

pub const LATE_ORDERS_TABLE: &str = "Late Delivery Orders";

const LATE_ORDER_COLUMNS: [&str; 6] = [
    "order_id",
    "customer_unique_id",
    "order_delivered_customer_date",
    "order_estimated_delivery_date",
    "late_days",
    "delivery_time",
];

pub fn build(ctx: &PageContext<'_>) -> PageReport {
    let selected = &ctx.view.selected;
    let by_date = &ctx.view.by_date;
    let mut report = PageReport::new(PageKind::Orders);

    let total_delivered = count_where(selected, |r| r.has_status("delivered"));
    let total_canceled = count_where(selected, |r| r.has_status("canceled"));
    let late_orders: Vec<&OrderRecord> = selected.iter().copied().filter(|r| r.is_late()).collect();
    let avg_processing_seconds = mean(selected, |r| r.processing_seconds());
    let avg_late_seconds = mean_of(late_orders.iter().filter_map(|r| r.late_seconds()));

    report.metrics = vec![
        Metric::new(
            "Total Delivered Orders",
            total_delivered.to_string(),
            Some(total_delivered as f64),
            "Orders successfully delivered to the customer.",
        ),
        Metric::new(
            "Total Canceled Orders",
            total_canceled.to_string(),
            Some(total_canceled as f64),
            "Orders canceled before shipment.",
        ),
        Metric::new(
            "Total Late Orders",
            late_orders.len().to_string(),
            Some(late_orders.len() as f64),
            "Orders delivered after the estimated delivery date.",
        ),
        Metric::new(
            "Average Processing Time",
            format_dhm_from_seconds(avg_processing_seconds),
            avg_processing_seconds,
            "Average time from purchase until the order is approved.",
        ),
        Metric::new(
            "Average Late Time",
            format_dhm_from_seconds(avg_late_seconds),
            avg_late_seconds,
            "Average delay of late orders compared to the estimated delivery date.",
        ),
    ];

    let status_counts = value_counts(selected, |r| r.order_status.as_deref());
    let delivery_trend = group_mean(selected, |r| r.year_month, |r| r.delivery_time);
    let orders_by_state = counts_as_f64(group_unique(
        by_date,
        |r| r.customer_state.as_deref(),
        |r| r.order_id.as_deref(),
    ));
    let delivery_by_state = group_mean(by_date, |r| r.customer_state.as_deref(), |r| r.delivery_time);

    report.charts = vec![
        Chart::new("Order Status Distribution", ChartKind::Bar, "order_status", "count")
            .with_series("orders", count_points(status_counts)),
        Chart::new(
            "Average Delivery Time Trend per Month",
            ChartKind::Area,
            "month",
            "avg delivery time",
        )
        .with_series("avg delivery time", monthly_points(&delivery_trend)),
        state_chart(ctx, "Total Number of Orders by State", "order count", &orders_by_state),
        state_chart(ctx, "Average Delivery Time by State", "avg delivery time", &delivery_by_state),
    ];

    report.tables = vec![late_orders_table(&late_orders)];

    report
}

fn late_orders_table(late_orders: &[&OrderRecord]) -> Table {
    let rows = late_orders
        .iter()
        .map(|r| {
            let late_days = r
                .late_seconds()
                .map(|secs| (secs / 86_400.0).floor().to_string())
                .unwrap_or_default();
            vec![
                r.order_id.clone().unwrap_or_default(),
                r.customer_unique_id.clone().unwrap_or_default(),
                format_timestamp(r.order_delivered_customer_date),
                format_timestamp(r.order_estimated_delivery_date),
                late_days,
                r.delivery_time
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ]
        })
        .collect();

    Table {
        title: LATE_ORDERS_TABLE.to_string(),
        columns: LATE_ORDER_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

fn format_timestamp(ts: Option<chrono::NaiveDateTime>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}
