use crate::models::TipRecord;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Identity handed over by the embedding host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl HostUser {
    /// Used when the host supplies no identity.
    pub fn placeholder() -> Self {
        Self {
            id: 123_456_789,
            first_name: "Guest".to_string(),
            last_name: None,
            username: None,
        }
    }

    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().filter(|last| !last.is_empty()) {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }

    /// The saved name wins over the host-supplied one when set.
    pub fn display_name(&self, saved_name: &str) -> String {
        if saved_name.is_empty() {
            self.full_name()
        } else {
            saved_name.to_string()
        }
    }
}

/// `<unix millis>-<6 hex digits>`, so two tips logged in the same millisecond
/// still get distinct ids.
pub fn new_tip_id(now: DateTime<Local>) -> String {
    let suffix = rand::random::<u32>() & 0x00ff_ffff;
    format!("{}-{suffix:06x}", now.timestamp_millis())
}

pub fn new_tip(user: &HostUser, saved_name: &str, amount: u64, now: DateTime<Local>) -> TipRecord {
    TipRecord {
        id: new_tip_id(now),
        amount,
        date: now.date_naive().to_string(),
        time: now.format("%H:%M").to_string(),
        contributor_id: user.id,
        contributor_name: user.display_name(saved_name),
        contributor_handle: user.username.clone(),
    }
}
