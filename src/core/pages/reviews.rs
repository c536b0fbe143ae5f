use crate::core::aggregate::{count_where, group_mean, mean, unique_values, value_counts};
use crate::core::filter::restrict_to;
use crate::core::format::{format_count, format_optional};
use crate::core::pages::{state_chart, PageContext};
use crate::core::wordfreq::word_frequencies;
use crate::domain::report::{AxisValue, Chart, ChartKind, Metric, PageKind, PageReport, Point};

pub const WORD_CHART: &str = "Most Frequent Words in Customer Reviews";

pub fn build(ctx: &PageContext<'_>) -> PageReport {
    let selected = &ctx.view.selected;
    let by_date = &ctx.view.by_date;
    let mut report = PageReport::new(PageKind::Reviews);

    let avg_review_score = mean(selected, |r| r.review_score);
    let total_reviews = count_where(selected, |r| r.review_score.is_some_and(|s| !s.is_nan()));

    report.metrics = vec![
        Metric::new(
            "Average Review Score",
            format_optional(avg_review_score, |v| format!("{:.2}", v)),
            avg_review_score,
            "Average review score given by customers.",
        ),
        Metric::new(
            "Total Reviews Count",
            format_count(total_reviews),
            Some(total_reviews as f64),
            "Total number of reviews given by customers.",
        ),
    ];

    // 客群多選：預設為目前篩選結果中出現的所有客群
    let available_segments = unique_values(selected, |r| r.customer_segment.as_deref());
    let segments = ctx
        .view
        .selection
        .customer_segments
        .as_deref()
        .unwrap_or(available_segments.as_slice());
    let segment_rows = restrict_to(selected, Some(segments), |r| r.customer_segment.as_deref());
    let segment_rows_by_date = restrict_to(by_date, Some(segments), |r| r.customer_segment.as_deref());

    let score_counts = value_counts(&segment_rows, |r| {
        r.review_score.filter(|s| !s.is_nan()).map(score_key)
    });
    let score_distribution: Vec<Point> = score_counts
        .into_iter()
        .map(|(score, n)| Point::category(score_label(score), n as f64))
        .collect();

    let words = word_frequencies(
        segment_rows
            .iter()
            .filter_map(|r| r.review_comment_message.as_deref()),
        ctx.max_words,
    );
    let word_points = words
        .into_iter()
        .map(|w| Point {
            x: AxisValue::Text(w.word),
            y: w.count as f64,
            label: Some(format!("{:.4}", w.weight)),
        })
        .collect();

    let review_by_state = group_mean(
        &segment_rows_by_date,
        |r| r.customer_state.as_deref(),
        |r| r.review_score,
    );

    report.charts = vec![
        Chart::new("Distribution of Review Score", ChartKind::Donut, "Review Score", "Count")
            .with_series("reviews", score_distribution),
        Chart::new(WORD_CHART, ChartKind::WordFrequency, "word", "count")
            .with_series("words", word_points),
        state_chart(
            ctx,
            "Average Review Score by State",
            "average review score",
            &review_by_state,
        ),
    ];

    report
}

/// 評分可能是 4.0 這種浮點數；換成整數十分位作為分組鍵
fn score_key(score: f64) -> i64 {
    (score * 10.0).round() as i64
}

fn score_label(key: i64) -> String {
    if key % 10 == 0 {
        (key / 10).to_string()
    } else {
        format!("{:.1}", key as f64 / 10.0)
    }
}
