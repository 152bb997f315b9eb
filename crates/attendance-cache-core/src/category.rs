//! Cache categories and their TTL policy.
//!
//! Every cached value belongs to one category; the category decides the
//! key segment it is stored under and the expiration applied when the
//! caller does not pass an explicit TTL.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Enumerated classes of cached attendance data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    AttendanceRecord,
    EmployeeSchedule,
    AttendanceStatistics,
    DepartmentStats,
    AttendanceRules,
    TodayAttendance,
    CalendarData,
}

impl CacheCategory {
    /// All categories, in declaration order.
    pub const ALL: [CacheCategory; 7] = [
        CacheCategory::AttendanceRecord,
        CacheCategory::EmployeeSchedule,
        CacheCategory::AttendanceStatistics,
        CacheCategory::DepartmentStats,
        CacheCategory::AttendanceRules,
        CacheCategory::TodayAttendance,
        CacheCategory::CalendarData,
    ];

    /// Stable configuration/logging name of the category.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AttendanceRecord => "attendance_record",
            Self::EmployeeSchedule => "employee_schedule",
            Self::AttendanceStatistics => "attendance_statistics",
            Self::DepartmentStats => "department_stats",
            Self::AttendanceRules => "attendance_rules",
            Self::TodayAttendance => "today_attendance",
            Self::CalendarData => "calendar_data",
        }
    }

    /// Segment the category occupies in cache keys, e.g. `record` in
    /// `attendance:record:42:2025-11-17`.
    pub fn key_segment(&self) -> &'static str {
        match self {
            Self::AttendanceRecord => "record",
            Self::EmployeeSchedule => "schedule",
            Self::AttendanceStatistics => "stats",
            Self::DepartmentStats => "dept",
            Self::AttendanceRules => "rules",
            Self::TodayAttendance => "today",
            Self::CalendarData => "calendar",
        }
    }

    /// Built-in TTL applied when configuration carries no override.
    pub fn default_ttl_secs(&self) -> u64 {
        match self {
            Self::AttendanceRecord => 1800,
            Self::EmployeeSchedule => 3600,
            Self::AttendanceStatistics => 600,
            Self::DepartmentStats => 900,
            Self::AttendanceRules => 7200,
            Self::TodayAttendance => 300,
            Self::CalendarData => 86400,
        }
    }

    /// Parse a category from its configuration name.
    pub fn parse(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| CacheError::configuration(format!("unknown cache category: {name}")))
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved TTL table: per-category defaults plus configured overrides.
///
/// Every write through the cache manager resolves its expiration here;
/// no entry is ever written without one.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    default_ttl_secs: u64,
    overrides: HashMap<CacheCategory, u64>,
}

impl TtlPolicy {
    /// Create a policy with the given fallback TTL for uncategorized reads.
    pub fn new(default_ttl_secs: u64) -> Self {
        Self {
            default_ttl_secs,
            overrides: HashMap::new(),
        }
    }

    /// Override the TTL for one category.
    pub fn with_override(mut self, category: CacheCategory, ttl_secs: u64) -> Self {
        self.overrides.insert(category, ttl_secs);
        self
    }

    /// TTL for a category: configured override, else the category default.
    pub fn ttl_for(&self, category: CacheCategory) -> u64 {
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_ttl_secs())
    }

    /// Fallback TTL used when no category is known (e.g. remote backfill
    /// of a key the caller did not categorize).
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl_secs
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_round_trip() {
        for category in CacheCategory::ALL {
            assert_eq!(CacheCategory::parse(category.name()).unwrap(), category);
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = CacheCategory::parse("payroll").unwrap_err();
        assert!(err.to_string().contains("unknown cache category"));
    }

    #[test]
    fn test_every_category_has_a_ttl() {
        for category in CacheCategory::ALL {
            assert!(category.default_ttl_secs() > 0, "{category} has no TTL");
        }
    }

    #[test]
    fn test_key_segments_are_unique() {
        let mut segments: Vec<_> = CacheCategory::ALL.iter().map(|c| c.key_segment()).collect();
        segments.sort_unstable();
        segments.dedup();
        assert_eq!(segments.len(), CacheCategory::ALL.len());
    }

    #[test]
    fn test_ttl_policy_override() {
        let policy = TtlPolicy::new(600).with_override(CacheCategory::AttendanceRecord, 60);
        assert_eq!(policy.ttl_for(CacheCategory::AttendanceRecord), 60);
        assert_eq!(policy.ttl_for(CacheCategory::EmployeeSchedule), 3600);
        assert_eq!(policy.default_ttl(), 600);
    }
}
