use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::DashboardError;

pub const DASHBOARD_TITLE: &str = "Brazilian E-commerce Dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Home,
    Orders,
    Customers,
    Sellers,
    Products,
    Payments,
    Reviews,
}

impl PageKind {
    pub const ALL: [PageKind; 7] = [
        PageKind::Home,
        PageKind::Orders,
        PageKind::Customers,
        PageKind::Sellers,
        PageKind::Products,
        PageKind::Payments,
        PageKind::Reviews,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            PageKind::Home => "home",
            PageKind::Orders => "orders",
            PageKind::Customers => "customers",
            PageKind::Sellers => "sellers",
            PageKind::Products => "products",
            PageKind::Payments => "payments",
            PageKind::Reviews => "reviews",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            PageKind::Home => "🏠 Home",
            PageKind::Orders => "📦 Orders Overview",
            PageKind::Customers => "🛒 Customers Analysis",
            PageKind::Sellers => "🏬 Sellers Performance",
            PageKind::Products => "🛍️ Product Analysis",
            PageKind::Payments => "💳 Payments & Revenue",
            PageKind::Reviews => "⭐ Reviews & Ratings",
        }
    }

    /// 解析 `home,orders` 之類的清單，`all` 或空清單代表全部頁面
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<PageKind>, DashboardError> {
        let mut pages = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name.eq_ignore_ascii_case("all") {
                return Ok(PageKind::ALL.to_vec());
            }
            let page: PageKind = name.parse()?;
            if !pages.contains(&page) {
                pages.push(page);
            }
        }
        if pages.is_empty() {
            return Ok(PageKind::ALL.to_vec());
        }
        Ok(pages)
    }
}

impl FromStr for PageKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        PageKind::ALL
            .into_iter()
            .find(|page| page.slug() == lowered)
            .ok_or_else(|| DashboardError::UnknownPage {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    /// 未格式化的數值，沒有資料時為 `None`
    pub raw: Option<f64>,
    pub help: String,
}

impl Metric {
    pub fn new(label: &str, value: String, raw: Option<f64>, help: &str) -> Self {
        Self {
            label: label.to_string(),
            value,
            raw,
            help: help.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    Area,
    Line,
    Bar,
    HorizontalBar,
    Pie,
    Donut,
    Scatter,
    Choropleth {
        geojson_url: String,
        feature_id_key: String,
    },
    WordFrequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisValue::Number(n) => write!(f, "{}", n),
            AxisValue::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: AxisValue,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Point {
    pub fn category(x: impl Into<String>, y: f64) -> Self {
        Self {
            x: AxisValue::Text(x.into()),
            y,
            label: None,
        }
    }

    pub fn numeric(x: f64, y: f64, label: Option<String>) -> Self {
        Self {
            x: AxisValue::Number(x),
            y,
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn new(title: &str, kind: ChartKind, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_string(),
            kind,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
        }
    }

    pub fn with_series(mut self, name: &str, points: Vec<Point>) -> Self {
        self.series.push(Series {
            name: name.to_string(),
            points,
        });
        self
    }

    /// 單一序列圖表的資料點
    pub fn points(&self) -> &[Point] {
        self.series.first().map(|s| s.points.as_slice()).unwrap_or(&[])
    }

    pub fn series_named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub page: PageKind,
    pub title: String,
    pub heading: String,
    pub metrics: Vec<Metric>,
    pub charts: Vec<Chart>,
    pub tables: Vec<Table>,
}

impl PageReport {
    pub fn new(page: PageKind) -> Self {
        Self {
            page,
            title: DASHBOARD_TITLE.to_string(),
            heading: page.heading().to_string(),
            metrics: Vec::new(),
            charts: Vec::new(),
            tables: Vec::new(),
        }
    }

    pub fn metric(&self, label: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.label == label)
    }

    pub fn chart(&self, title: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.title == title)
    }

    pub fn table(&self, title: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_list() {
        assert_eq!(PageKind::parse_list(&["all"]).unwrap().len(), 7);
        assert_eq!(PageKind::parse_list::<&str>(&[]).unwrap().len(), 7);
        assert_eq!(
            PageKind::parse_list(&["Orders", "home", "orders"]).unwrap(),
            vec![PageKind::Orders, PageKind::Home]
        );
        assert!(PageKind::parse_list(&["inventory"]).is_err());
    }

    #[test]
    fn test_chart_kind_serializes_with_type_tag() {
        let kind = ChartKind::Choropleth {
            geojson_url: "https://example.com/br.geojson".to_string(),
            feature_id_key: "properties.sigla".to_string(),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "choropleth");
        assert_eq!(json["feature_id_key"], "properties.sigla");

        let json = serde_json::to_value(ChartKind::HorizontalBar).unwrap();
        assert_eq!(json["type"], "horizontal_bar");
    }
}
