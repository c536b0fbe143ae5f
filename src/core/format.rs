pub const NOT_AVAILABLE: &str = "N/A";

/// 千分位格式，例如 `1234567.891` 取兩位小數為 `1,234,567.89`
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // 四捨五入後為零時不顯示負號
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn format_count(value: usize) -> String {
    format_thousands(value as f64, 0)
}

pub fn format_currency(value: f64, decimals: usize) -> String {
    format!("R$ {}", format_thousands(value, decimals))
}

pub fn format_optional<F>(value: Option<f64>, format: F) -> String
where
    F: Fn(f64) -> String,
{
    match value {
        Some(v) if v.is_finite() => format(v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// 秒數轉成 `XD XH XM`，採用向下取整的除法與歐幾里得餘數
pub fn format_dhm_from_seconds(seconds: Option<f64>) -> String {
    match seconds {
        Some(secs) if secs.is_finite() => {
            let days = (secs / 86_400.0).floor() as i64;
            let hours = (secs.rem_euclid(86_400.0) / 3_600.0).floor() as i64;
            let minutes = (secs.rem_euclid(3_600.0) / 60.0).floor() as i64;
            format!("{}D {}H {}M", days, hours, minutes)
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// 天數 (含小數) 轉成 `XD XH XM`，整數部分直接截斷
pub fn format_dhm_from_days(days: Option<f64>) -> String {
    match days {
        Some(d) if d.is_finite() => {
            let whole_days = d.trunc() as i64;
            let day_fraction = d.rem_euclid(1.0) * 24.0;
            let hours = day_fraction.trunc() as i64;
            let minutes = (day_fraction.rem_euclid(1.0) * 60.0).trunc() as i64;
            format!("{}D {}H {}M", whole_days, hours, minutes)
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}
