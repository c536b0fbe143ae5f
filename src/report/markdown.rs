use crate::domain::model::SelectionSummary;
use crate::domain::report::{Chart, ChartKind, Metric, PageReport, Table};

/// 產生單一頁面的 Markdown 文件
pub fn render_page(page: &PageReport, selection: &SelectionSummary, row_limit: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", page.title));
    output.push_str(&format!("## {}\n\n", page.heading));
    output.push_str(&render_selection(selection));
    output.push_str(&render_metrics(&page.metrics));

    for chart in &page.charts {
        output.push_str(&render_chart(chart));
    }

    for table in &page.tables {
        output.push_str(&render_table(table, row_limit));
    }

    output
}

/// 連到所有頁面的索引文件
pub fn render_index(pages: &[PageReport], selection: &SelectionSummary) -> String {
    let mut output = String::new();

    output.push_str("# Dashboard Pages\n\n");
    output.push_str(&render_selection(selection));
    for page in pages {
        output.push_str(&format!("- [{}]({}.md)\n", page.heading, page.page.slug()));
    }
    output.push('\n');

    output
}

fn render_selection(selection: &SelectionSummary) -> String {
    let mut section = String::new();

    section.push_str(&format!("- **Date Range:** {}\n", selection.date_range));
    section.push_str(&format!("- **City:** {}\n", selection.city));
    section.push_str(&format!("- **State:** {}\n", selection.state));
    section.push_str(&format!(
        "- **Rows:** {} selected / {} in date range\n\n",
        selection.rows_selected, selection.rows_in_date_range
    ));

    section
}

fn render_metrics(metrics: &[Metric]) -> String {
    if metrics.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("| Metric | Value | Description |\n");
    section.push_str("|:---|---:|:---|\n");
    for metric in metrics {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&metric.label),
            escape_cell(&metric.value),
            escape_cell(&metric.help)
        ));
    }
    section.push('\n');

    section
}

fn chart_kind_name(kind: &ChartKind) -> &'static str {
    match kind {
        ChartKind::Area => "area chart",
        ChartKind::Line => "line chart",
        ChartKind::Bar => "bar chart",
        ChartKind::HorizontalBar => "horizontal bar chart",
        ChartKind::Pie => "pie chart",
        ChartKind::Donut => "donut chart",
        ChartKind::Scatter => "scatter plot",
        ChartKind::Choropleth { .. } => "choropleth map",
        ChartKind::WordFrequency => "word frequencies",
    }
}

fn render_chart(chart: &Chart) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "### {} _({})_\n\n",
        chart.title,
        chart_kind_name(&chart.kind)
    ));

    if chart.series.iter().all(|s| s.points.is_empty()) {
        section.push_str("_No data for the current selection._\n\n");
        return section;
    }

    let multi_series = chart.series.len() > 1;
    for series in &chart.series {
        if multi_series {
            section.push_str(&format!("**{}**\n\n", series.name));
        }
        let has_labels = series.points.iter().any(|p| p.label.is_some());

        if has_labels {
            section.push_str(&format!("| {} | {} | label |\n", chart.x_label, chart.y_label));
            section.push_str("|:---|---:|:---|\n");
        } else {
            section.push_str(&format!("| {} | {} |\n", chart.x_label, chart.y_label));
            section.push_str("|:---|---:|\n");
        }

        for point in &series.points {
            let y = format_value(point.y);
            match (&point.label, has_labels) {
                (Some(label), true) => section.push_str(&format!(
                    "| {} | {} | {} |\n",
                    escape_cell(&point.x.to_string()),
                    y,
                    escape_cell(label)
                )),
                (None, true) => section.push_str(&format!(
                    "| {} | {} | |\n",
                    escape_cell(&point.x.to_string()),
                    y
                )),
                _ => section.push_str(&format!(
                    "| {} | {} |\n",
                    escape_cell(&point.x.to_string()),
                    y
                )),
            }
        }
        section.push('\n');
    }

    section
}

fn render_table(table: &Table, row_limit: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", table.title));

    if table.rows.is_empty() {
        section.push_str("_No rows for the current selection._\n\n");
        return section;
    }

    section.push_str(&format!("| {} |\n", table.columns.join(" | ")));
    section.push_str(&format!(
        "|{}\n",
        table.columns.iter().map(|_| ":---|").collect::<String>()
    ));

    for row in table.rows.iter().take(row_limit) {
        let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        section.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    if table.rows.len() > row_limit {
        section.push_str(&format!(
            "\n… {} more rows\n",
            table.rows.len() - row_limit
        ));
    }
    section.push('\n');

    section
}

/// 整數不顯示小數，其餘保留兩位
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{PageKind, Point};
    use crate::domain::selection::DateRange;

    fn selection() -> SelectionSummary {
        SelectionSummary {
            date_range: DateRange::parse("2018-01-01", "2018-01-31").unwrap(),
            city: "All".to_string(),
            state: "SP".to_string(),
            rows_in_date_range: 10,
            rows_selected: 4,
        }
    }

    #[test]
    fn test_render_page_includes_metrics_and_charts() {
        let mut page = PageReport::new(PageKind::Home);
        page.metrics.push(Metric::new("Total Orders", "4".to_string(), Some(4.0), "Orders"));
        page.charts.push(
            Chart::new("Order Status Distribution", ChartKind::Pie, "order_status", "count")
                .with_series(
                    "orders",
                    vec![Point::category("delivered", 3.0), Point::category("canceled", 1.0)],
                ),
        );

        let markdown = render_page(&page, &selection(), 10);
        assert!(markdown.starts_with("# Brazilian E-commerce Dashboard\n\n## 🏠 Home"));
        assert!(markdown.contains("- **State:** SP"));
        assert!(markdown.contains("| Total Orders | 4 | Orders |"));
        assert!(markdown.contains("### Order Status Distribution _(pie chart)_"));
        assert!(markdown.contains("| delivered | 3 |"));
    }

    #[test]
    fn test_render_table_truncates_rows() {
        let table = Table {
            title: "Late Delivery Orders".to_string(),
            columns: vec!["order_id".to_string(), "late_days".to_string()],
            rows: (0..5).map(|i| vec![format!("o{}", i), "1".to_string()]).collect(),
        };
        let markdown = render_table(&table, 2);
        assert!(markdown.contains("| o0 | 1 |"));
        assert!(markdown.contains("| o1 | 1 |"));
        assert!(!markdown.contains("| o2 | 1 |"));
        assert!(markdown.contains("… 3 more rows"));
    }

    #[test]
    fn test_empty_chart_is_marked() {
        let chart = Chart::new("Top 5 Cities by Order Volume", ChartKind::HorizontalBar, "city", "count")
            .with_series("orders", vec![]);
        assert!(render_chart(&chart).contains("_No data for the current selection._"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(12.0), "12");
        assert_eq!(format_value(12.3456), "12.35");
    }
}
