use crate::models::{
    BestDay, DailyStats, LeaderboardEntry, StatsRange, StatsResponse, TipCategories, TipRecord,
    WeeklyStats,
};
use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use std::collections::{BTreeMap, HashMap};

const TOP_WAITERS: usize = 3;

pub fn build_stats(tips: &[TipRecord], range: StatsRange) -> StatsResponse {
    build_stats_at(Local::now().date_naive(), tips, range)
}

pub fn build_stats_at(today: NaiveDate, tips: &[TipRecord], range: StatsRange) -> StatsResponse {
    let total_amount = tips.iter().map(|tip| tip.amount).sum::<u64>();
    let tip_count = tips.len() as u64;

    let per_day = daily_totals(tips);
    let best_day = per_day
        .iter()
        .fold(None::<BestDay>, |best, (date, day)| match best {
            Some(best) if day.total_amount <= best.total_amount => Some(best),
            _ => Some(BestDay {
                date: date.to_string(),
                total_amount: day.total_amount,
            }),
        });
    let average_per_day = rounded_average(
        per_day.values().map(|day| day.total_amount).sum(),
        per_day.len() as u64,
    );

    let week_ago = today - Duration::days(7);
    let month_ago = today.checked_sub_months(Months::new(1)).unwrap_or(today);

    let mut series = Vec::with_capacity(range.days() as usize);
    for offset in (0..range.days()).rev() {
        let date = today - Duration::days(offset);
        let point = per_day.get(&date).cloned().unwrap_or_default();
        series.push(DailyStats {
            date: date.to_string(),
            total_amount: point.total_amount,
            tip_count: point.tip_count,
        });
    }

    StatsResponse {
        total_amount,
        tip_count,
        average_tip: rounded_average(total_amount, tip_count),
        best_day,
        week_amount: amount_since(tips, week_ago),
        month_amount: amount_since(tips, month_ago),
        categories: categorize(tips),
        series,
        average_per_day,
        current_week: current_week_at(today, tips),
    }
}

/// Monday-to-Sunday totals for the week containing `today`.
pub fn current_week_at(today: NaiveDate, tips: &[TipRecord]) -> WeeklyStats {
    let start = week_start(today);
    let end = start + Duration::days(6);

    let mut slots: HashMap<i64, usize> = HashMap::new();
    let mut waiters: Vec<LeaderboardEntry> = Vec::new();
    let mut total_amount = 0u64;
    let mut tip_count = 0u64;

    for tip in tips {
        let Some(date) = parse_date(&tip.date) else {
            continue;
        };
        if date < start || date > end {
            continue;
        }
        total_amount = total_amount.saturating_add(tip.amount);
        tip_count += 1;

        match slots.get(&tip.contributor_id).copied() {
            Some(slot) => {
                let entry = &mut waiters[slot];
                entry.contributor_name = tip.contributor_name.clone();
                entry.total_amount = entry.total_amount.saturating_add(tip.amount);
                entry.tip_count += 1;
            }
            None => {
                slots.insert(tip.contributor_id, waiters.len());
                waiters.push(LeaderboardEntry {
                    contributor_id: tip.contributor_id,
                    contributor_name: tip.contributor_name.clone(),
                    contributor_handle: tip.contributor_handle.clone(),
                    total_amount: tip.amount,
                    tip_count: 1,
                });
            }
        }
    }

    waiters.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    waiters.truncate(TOP_WAITERS);

    WeeklyStats {
        week_start: start.to_string(),
        week_end: end.to_string(),
        total_amount,
        tip_count,
        top_waiters: waiters,
    }
}

#[derive(Debug, Clone, Default)]
struct DayTotal {
    total_amount: u64,
    tip_count: u64,
}

fn daily_totals(tips: &[TipRecord]) -> BTreeMap<NaiveDate, DayTotal> {
    let mut days: BTreeMap<NaiveDate, DayTotal> = BTreeMap::new();
    for tip in tips {
        if let Some(date) = parse_date(&tip.date) {
            let day = days.entry(date).or_default();
            day.total_amount = day.total_amount.saturating_add(tip.amount);
            day.tip_count += 1;
        }
    }
    days
}

fn amount_since(tips: &[TipRecord], cutoff: NaiveDate) -> u64 {
    tips.iter()
        .filter(|tip| parse_date(&tip.date).is_some_and(|date| date >= cutoff))
        .map(|tip| tip.amount)
        .sum()
}

fn categorize(tips: &[TipRecord]) -> TipCategories {
    let mut categories = TipCategories::default();
    for tip in tips {
        match tip.amount {
            0..100 => categories.small += 1,
            100..200 => categories.medium += 1,
            _ => categories.large += 1,
        }
    }
    categories
}

/// Half rounds up; zero when there is nothing to divide by.
fn rounded_average(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (total + count / 2) / count
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
