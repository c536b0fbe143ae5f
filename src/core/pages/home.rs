use crate::core::aggregate::{count_unique, group_count, mean, nlargest_counts, sum, value_counts};
use crate::core::format::{format_currency, format_optional, format_thousands};
use crate::core::pages::{count_points, counts_as_f64, monthly_points, PageContext};
use crate::domain::report::{Chart, ChartKind, Metric, PageKind, PageReport};

pub fn build(ctx: &PageContext<'_>) -> PageReport {
    let selected = &ctx.view.selected;
    let by_date = &ctx.view.by_date;
    let mut report = PageReport::new(PageKind::Home);

    let total_orders = count_unique(selected, |r| r.order_id.as_deref());
    let total_customers = count_unique(selected, |r| r.customer_unique_id.as_deref());
    let total_sellers = count_unique(selected, |r| r.seller_id.as_deref());
    let total_revenue = sum(selected, |r| r.payment_value);
    let avg_delivery_time = mean(selected, |r| r.delivery_time);

    report.metrics = vec![
        Metric::new(
            "Total Orders",
            total_orders.to_string(),
            Some(total_orders as f64),
            "Number of unique orders placed by customers.",
        ),
        Metric::new(
            "Total Customers",
            total_customers.to_string(),
            Some(total_customers as f64),
            "Unique customers with at least one transaction.",
        ),
        Metric::new(
            "Total Sellers",
            total_sellers.to_string(),
            Some(total_sellers as f64),
            "Unique sellers operating on the platform.",
        ),
        Metric::new(
            "Total Revenue",
            format_currency(total_revenue, 0),
            Some(total_revenue),
            "Total revenue generated by all transactions.",
        ),
        Metric::new(
            "Average Delivery Time",
            format_optional(avg_delivery_time, |d| format!("{} Days", format_thousands(d, 0))),
            avg_delivery_time,
            "Average time from order placement until the customer receives it.",
        ),
    ];

    let status_counts = value_counts(selected, |r| r.order_status.as_deref());
    let monthly_orders = counts_as_f64(group_count(selected, |r| r.year_month, |_| true));
    let top_cities = nlargest_counts(by_date, |r| r.customer_city.as_deref(), 5);
    let top_states = nlargest_counts(by_date, |r| r.customer_state.as_deref(), 5);

    report.charts = vec![
        Chart::new("Order Status Distribution", ChartKind::Pie, "order_status", "count")
            .with_series("orders", count_points(status_counts)),
        Chart::new("Order Volume Trend per Month", ChartKind::Area, "month", "order count")
            .with_series("orders", monthly_points(&monthly_orders)),
        Chart::new(
            "Top 5 Cities by Order Volume",
            ChartKind::HorizontalBar,
            "customer_city",
            "order count",
        )
        .with_series("orders", count_points(top_cities)),
        Chart::new(
            "Top 5 States by Order Volume",
            ChartKind::HorizontalBar,
            "customer_state",
            "order count",
        )
        .with_series("orders", count_points(top_states)),
    ];

    report
}
