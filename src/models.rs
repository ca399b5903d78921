use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One logged tip. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipRecord {
    pub id: String,
    pub amount: u64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Display only, `HH:MM` local time.
    pub time: String,
    pub contributor_id: i64,
    /// Snapshot of the display name when the tip was logged.
    pub contributor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_handle: Option<String>,
}

/// Per-contributor aggregate, always derived from the current records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub contributor_id: i64,
    pub contributor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_handle: Option<String>,
    pub total_amount: u64,
    pub tip_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: String,
    pub total_amount: u64,
    pub tip_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub week_start: String,
    pub week_end: String,
    pub total_amount: u64,
    pub tip_count: u64,
    pub top_waiters: Vec<LeaderboardEntry>,
}

impl WeeklyStats {
    /// Zero-valued week anchored on `today` for both bounds.
    pub fn empty(today: NaiveDate) -> Self {
        let today = today.to_string();
        Self {
            week_start: today.clone(),
            week_end: today,
            total_amount: 0,
            tip_count: 0,
            top_waiters: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddTipRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TipsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub date: String,
    pub tips: Vec<TipRecord>,
    pub total_amount: u64,
    pub tip_count: u64,
    pub contributors: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: i64,
    pub display_name: String,
    pub saved_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsRange {
    #[default]
    Week,
    Month,
}

impl StatsRange {
    pub fn days(self) -> i64 {
        match self {
            StatsRange::Week => 7,
            StatsRange::Month => 30,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub range: StatsRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipCategories {
    /// Below 100.
    pub small: u64,
    /// 100 up to 199.
    pub medium: u64,
    /// 200 and above.
    pub large: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestDay {
    pub date: String,
    pub total_amount: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_amount: u64,
    pub tip_count: u64,
    pub average_tip: u64,
    pub best_day: Option<BestDay>,
    pub week_amount: u64,
    pub month_amount: u64,
    pub categories: TipCategories,
    pub series: Vec<DailyStats>,
    pub average_per_day: u64,
    pub current_week: WeeklyStats,
}
