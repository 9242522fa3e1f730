use backlog_indexer::Item;
use backlog_protocol::{Trend, VelocityReport};
use chrono::{Duration, NaiveDateTime};

/// Done items closed in the half-open window `(from, to]`
pub fn completed_between<'a>(
    items: impl IntoIterator<Item = &'a Item>,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Vec<&'a Item> {
    items
        .into_iter()
        .filter(|item| item.status.is_done())
        .filter(|item| item.closed_time.is_some_and(|closed| closed > from && closed <= to))
        .collect()
}

/// Classify two per-day rates of adjacent windows.
///
/// | earlier | recent            | trend      |
/// |---------|-------------------|------------|
/// | 0       | 0                 | unknown    |
/// | any     | > 1.1 × earlier   | increasing |
/// | any     | < 0.9 × earlier   | decreasing |
/// | any     | otherwise         | stable     |
///
/// An empty earlier window followed by any completions classifies as
/// `increasing`.
pub fn classify_trend(earlier: f64, recent: f64) -> Trend {
    if earlier == 0.0 && recent == 0.0 {
        Trend::Unknown
    } else if recent > earlier * 1.1 {
        Trend::Increasing
    } else if recent < earlier * 0.9 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Completions per day over the trailing `days`, with trend against the
/// `days` before that
pub fn velocity(items: &[Item], now: NaiveDateTime, days: u32) -> VelocityReport {
    let days = days.max(1);
    let span = Duration::days(i64::from(days));
    let recent_start = now.checked_sub_signed(span).unwrap_or(NaiveDateTime::MIN);
    let earlier_start = recent_start
        .checked_sub_signed(span)
        .unwrap_or(NaiveDateTime::MIN);

    let completed = completed_between(items, recent_start, now).len();
    let earlier = completed_between(items, earlier_start, recent_start).len();

    let recent_velocity = completed as f64 / f64::from(days);
    let earlier_velocity = earlier as f64 / f64::from(days);
    let trend = classify_trend(earlier_velocity, recent_velocity);
    log::debug!(
        "Velocity over {days}d: {completed} recent, {earlier} earlier -> {trend:?}"
    );

    VelocityReport {
        window_days: days,
        completed,
        velocity: recent_velocity,
        earlier_velocity,
        recent_velocity,
        trend,
    }
}
