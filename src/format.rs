const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTHS[(month - 1) as usize],
        _ => "",
    }
}

pub fn reading_time_label(minutes: u32) -> String {
    format!("{} min read", minutes.max(1))
}

const METRIC_UNITS: [(f64, &str); 3] = [
    (1_000.0, "K"),
    (1_000_000.0, "M"),
    (1_000_000_000.0, "B"),
];

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn one_decimal(rounded: f64, suffix: &str) -> String {
    if rounded.fract() == 0.0 {
        format!("{}{}", rounded as i64, suffix)
    } else {
        format!("{:.1}{}", rounded, suffix)
    }
}

/// Compact display of a metric value: `1250000` becomes `1.3M`. Values that are not plain
/// numbers (`99.9%`, `12ms`) are shown as they are.
pub fn format_metric(value: &str) -> String {
    let trimmed = value.trim();
    let Ok(number) = trimmed.replace('_', "").replace(',', "").parse::<f64>() else {
        return trimmed.to_string();
    };
    if !number.is_finite() {
        return trimmed.to_string();
    }

    let sign = if number < 0.0 { "-" } else { "" };
    let abs = number.abs();
    let Some(mut unit) = METRIC_UNITS.iter().rposition(|(scale, _)| abs >= *scale) else {
        return trimmed.to_string();
    };

    // 999_999 rounds to 1000K, shown as 1M instead
    let mut rounded = round_one_decimal(abs / METRIC_UNITS[unit].0);
    while rounded >= 1_000.0 && unit + 1 < METRIC_UNITS.len() {
        unit += 1;
        rounded = round_one_decimal(abs / METRIC_UNITS[unit].0);
    }
    format!("{}{}", sign, one_decimal(rounded, METRIC_UNITS[unit].1))
}
