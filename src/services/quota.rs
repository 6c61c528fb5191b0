//! Posting quota per API tier
//!
//! Counts posts in calendar month and day windows (UTC) with in-memory storage.
//! The counters are seeded from the post history at start-up.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Outcome of a quota check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub reason: String,
}

/// The tier/quota collaborator
pub trait QuotaGate: Send + Sync {
    fn can_post(&self) -> QuotaDecision;

    fn tier(&self) -> String;

    fn get_usage_percent(&self) -> f64;

    /// Called once a tweet is live
    fn record_post(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Free,
    Basic,
    Pro,
}

impl Tier {
    pub fn monthly_limit(&self) -> u32 {
        match self {
            Tier::Free => 500,
            Tier::Basic => 3_000,
            Tier::Pro => 300_000,
        }
    }

    pub fn daily_limit(&self) -> u32 {
        match self {
            Tier::Free => 17,
            Tier::Basic => 100,
            Tier::Pro => 10_000,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Free => "free",
            Tier::Basic => "basic",
            Tier::Pro => "pro",
        };
        f.write_str(name)
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "basic" => Ok(Tier::Basic),
            "pro" => Ok(Tier::Pro),
            other => Err(format!("unknown tier '{}'", other)),
        }
    }
}

struct UsageWindow {
    month: (i32, u32),
    day: NaiveDate,
    month_count: u32,
    day_count: u32,
}

impl UsageWindow {
    fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            month: (now.year(), now.month()),
            day: now.date_naive(),
            month_count: 0,
            day_count: 0,
        }
    }

    /// Reset counters whose window has passed
    fn roll(&mut self, now: DateTime<Utc>) {
        let month = (now.year(), now.month());
        if month != self.month {
            self.month = month;
            self.month_count = 0;
        }
        let day = now.date_naive();
        if day != self.day {
            self.day = day;
            self.day_count = 0;
        }
    }
}

/// Tier-based quota manager
pub struct TierManager {
    tier: Tier,
    usage: Mutex<UsageWindow>,
}

impl TierManager {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            usage: Mutex::new(UsageWindow::starting_at(Utc::now())),
        }
    }

    /// Start with posts already made this month and today
    pub fn with_usage(tier: Tier, month_count: u32, day_count: u32) -> Self {
        let manager = Self::new(tier);
        if let Ok(mut usage) = manager.usage.lock() {
            usage.month_count = month_count;
            usage.day_count = day_count;
        }
        manager
    }

    pub fn can_post_at(&self, now: DateTime<Utc>) -> QuotaDecision {
        let Ok(mut usage) = self.usage.lock() else {
            return QuotaDecision {
                allowed: false,
                reason: "quota state unavailable".to_string(),
            };
        };
        usage.roll(now);

        let monthly = self.tier.monthly_limit();
        if usage.month_count >= monthly {
            return QuotaDecision {
                allowed: false,
                reason: format!(
                    "monthly limit reached ({}/{} on {} tier)",
                    usage.month_count, monthly, self.tier
                ),
            };
        }

        let daily = self.tier.daily_limit();
        if usage.day_count >= daily {
            return QuotaDecision {
                allowed: false,
                reason: format!(
                    "daily limit reached ({}/{} on {} tier)",
                    usage.day_count, daily, self.tier
                ),
            };
        }

        QuotaDecision {
            allowed: true,
            reason: "ok".to_string(),
        }
    }

    pub fn record_post_at(&self, now: DateTime<Utc>) {
        if let Ok(mut usage) = self.usage.lock() {
            usage.roll(now);
            usage.month_count += 1;
            usage.day_count += 1;
        }
    }

    fn usage_percent_at(&self, now: DateTime<Utc>) -> f64 {
        let Ok(mut usage) = self.usage.lock() else {
            return 0.0;
        };
        usage.roll(now);
        let percent = usage.month_count as f64 / self.tier.monthly_limit() as f64 * 100.0;
        (percent * 10.0).round() / 10.0
    }
}

impl QuotaGate for TierManager {
    fn can_post(&self) -> QuotaDecision {
        self.can_post_at(Utc::now())
    }

    fn tier(&self) -> String {
        self.tier.to_string()
    }

    fn get_usage_percent(&self) -> f64 {
        self.usage_percent_at(Utc::now())
    }

    fn record_post(&self) {
        self.record_post_at(Utc::now())
    }
}
