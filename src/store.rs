use crate::models::{DailyStats, LeaderboardEntry, TipRecord, WeeklyStats};
use crate::storage::{
    DAILY_STATS_KEY, LEADERBOARD_KEY, Persistence, TIPS_KEY, USER_NAME_KEY, WEEKLY_STATS_KEY,
};
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Owns the tip records and the leaderboard derived from them.
///
/// Every mutator writes the new snapshot through [`Persistence`] before it
/// returns. Persistence failures never reach the caller; the in-memory copy
/// stays authoritative until a later write succeeds.
pub struct TipStore {
    persistence: Persistence,
    tips: Vec<TipRecord>,
    leaderboard: Vec<LeaderboardEntry>,
    daily_stats: Vec<DailyStats>,
    weekly_stats: WeeklyStats,
    user_name: String,
}

impl TipStore {
    pub fn open(persistence: Persistence) -> Self {
        Self::open_at(persistence, Local::now().date_naive())
    }

    /// Rehydrates every key, falling back to defaults for absent or corrupt
    /// entries. A leaderboard cache that disagrees with the records is rebuilt.
    pub fn open_at(persistence: Persistence, today: NaiveDate) -> Self {
        let tips: Vec<TipRecord> = persistence.load(TIPS_KEY, Vec::new());
        let cached: Vec<LeaderboardEntry> = persistence.load(LEADERBOARD_KEY, Vec::new());
        let daily_stats = persistence.load(DAILY_STATS_KEY, Vec::new());
        let weekly_stats = persistence.load(WEEKLY_STATS_KEY, WeeklyStats::empty(today));
        let user_name = persistence.load(USER_NAME_KEY, String::new());

        let mut store = Self {
            persistence,
            tips,
            leaderboard: Vec::new(),
            daily_stats,
            weekly_stats,
            user_name,
        };
        store.recompute_leaderboard();
        if store.leaderboard != cached {
            warn!(
                cached = cached.len(),
                rebuilt = store.leaderboard.len(),
                "leaderboard cache out of date, rewriting"
            );
            store.persistence.save(LEADERBOARD_KEY, &store.leaderboard);
        }

        info!(tips = store.tips.len(), "tip store loaded");
        store
    }

    pub fn tips(&self) -> &[TipRecord] {
        &self.tips
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub fn daily_stats(&self) -> &[DailyStats] {
        &self.daily_stats
    }

    pub fn weekly_stats(&self) -> &WeeklyStats {
        &self.weekly_stats
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Callers must only submit records with `amount > 0` and a fresh id.
    pub fn add_record(&mut self, record: TipRecord) {
        debug!(id = %record.id, amount = record.amount, "adding tip");
        self.tips.push(record);
        self.recompute_leaderboard();
        self.persist_records();
    }

    /// Returns `false`, leaving everything untouched, when no record has `id`.
    pub fn remove_record(&mut self, id: &str) -> bool {
        let Some(index) = self.tips.iter().position(|tip| tip.id == id) else {
            return false;
        };

        self.tips.remove(index);
        debug!(id, "removed tip");
        self.recompute_leaderboard();
        self.persist_records();
        true
    }

    /// Records logged on `date`, in storage order.
    pub fn query_by_date(&self, date: &str) -> Vec<&TipRecord> {
        self.tips.iter().filter(|tip| tip.date == date).collect()
    }

    pub fn clear_all(&mut self) {
        self.clear_all_at(Local::now().date_naive());
    }

    pub fn clear_all_at(&mut self, today: NaiveDate) {
        self.tips.clear();
        self.leaderboard.clear();
        self.daily_stats.clear();
        self.weekly_stats = WeeklyStats::empty(today);

        self.persist_records();
        self.persistence.save(DAILY_STATS_KEY, &self.daily_stats);
        self.persistence.save(WEEKLY_STATS_KEY, &self.weekly_stats);
        info!("cleared all tips");
    }

    pub fn set_user_name(&mut self, name: String) {
        self.persistence.save(USER_NAME_KEY, &name);
        self.user_name = name;
    }

    pub fn reset_user_name(&mut self) {
        self.persistence.remove(USER_NAME_KEY);
        self.user_name.clear();
    }

    /// Rebuilds the leaderboard from scratch. Contributors keep first-seen
    /// order before the stable sort, so equal totals stay in that order. The
    /// name and handle come from the last record seen for each contributor.
    fn recompute_leaderboard(&mut self) {
        let mut slots: HashMap<i64, usize> = HashMap::new();
        let mut entries: Vec<LeaderboardEntry> = Vec::new();

        for tip in &self.tips {
            match slots.get(&tip.contributor_id).copied() {
                Some(slot) => {
                    let entry = &mut entries[slot];
                    entry.contributor_name = tip.contributor_name.clone();
                    entry.contributor_handle = tip.contributor_handle.clone();
                    entry.total_amount = entry.total_amount.saturating_add(tip.amount);
                    entry.tip_count += 1;
                }
                None => {
                    slots.insert(tip.contributor_id, entries.len());
                    entries.push(LeaderboardEntry {
                        contributor_id: tip.contributor_id,
                        contributor_name: tip.contributor_name.clone(),
                        contributor_handle: tip.contributor_handle.clone(),
                        total_amount: tip.amount,
                        tip_count: 1,
                    });
                }
            }
        }

        entries.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
        self.leaderboard = entries;
    }

    fn persist_records(&mut self) {
        self.persistence.save(TIPS_KEY, &self.tips);
        self.persistence.save(LEADERBOARD_KEY, &self.leaderboard);
    }
}
