use crate::velocity::completed_between;
use backlog_indexer::{parse_effort, Item};
use backlog_protocol::BurndownReport;
use chrono::{Duration, NaiveDateTime};

fn effort_minutes(item: &Item) -> Option<u64> {
    item.effort.as_deref().and_then(parse_effort)
}

/// Remaining effort and a projected completion date at the recent burn rate
pub fn burndown(items: &[Item], now: NaiveDateTime, days: u32) -> BurndownReport {
    let days = days.max(1);
    let mut remaining_minutes: u64 = 0;
    let mut remaining_items = 0;
    let mut unestimated_items = 0;
    for item in items.iter().filter(|item| !item.status.is_done()) {
        remaining_items += 1;
        match effort_minutes(item) {
            Some(minutes) => remaining_minutes = remaining_minutes.saturating_add(minutes),
            None => unestimated_items += 1,
        }
    }

    let window_start = now
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDateTime::MIN);
    let completed_minutes_in_window: u64 = completed_between(items, window_start, now)
        .into_iter()
        .filter_map(effort_minutes)
        .fold(0, u64::saturating_add);
    let daily_rate = completed_minutes_in_window as f64 / f64::from(days);

    let projected_days = (daily_rate > 0.0).then(|| remaining_minutes as f64 / daily_rate);
    let projected_completion = projected_days.and_then(|projected| {
        let span = Duration::try_days(projected.ceil() as i64)?;
        now.date()
            .checked_add_signed(span)
            .map(|date| date.format("%Y-%m-%d").to_string())
    });

    BurndownReport {
        window_days: days,
        remaining_minutes,
        remaining_items,
        unestimated_items,
        completed_minutes_in_window,
        daily_rate,
        projected_days,
        projected_completion,
    }
}
