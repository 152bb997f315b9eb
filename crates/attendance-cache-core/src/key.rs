//! Deterministic cache key construction.
//!
//! ## Key Format
//!
//! `{namespace}:{category-segment}:{identifier}` — e.g.
//! `attendance:record:42:2025-11-17`. Keys within a category are always
//! built from their domain identifiers through the same template, so
//! glob deletion over `{namespace}:{segment}:*` is safe and complete.
//!
//! Statistics queries carry compound filter parameters; their identifier
//! segment is a hex digest of the canonicalized (name-sorted) parameter
//! set, so semantically identical queries map to the same key regardless
//! of parameter order.

use sha2::{Digest, Sha256};
use time::Date;

use crate::category::CacheCategory;

/// Length of the hex digest used for hashed statistics keys.
const PARAMS_DIGEST_LEN: usize = 16;

/// Scope of a cached attendance rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// The organization-wide default rule set.
    Default,
    /// Rules specific to one employee.
    Employee(i64),
}

/// Builds namespaced cache keys from domain identifiers.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    namespace: String,
}

impl KeyBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn compose(&self, category: CacheCategory, identifier: &str) -> String {
        format!("{}:{}:{}", self.namespace, category.key_segment(), identifier)
    }

    /// `attendance:record:{employee_id}:{date}`
    pub fn attendance_record(&self, employee_id: i64, date: Date) -> String {
        self.compose(
            CacheCategory::AttendanceRecord,
            &format!("{employee_id}:{date}"),
        )
    }

    /// `attendance:schedule:{employee_id}`
    pub fn employee_schedule(&self, employee_id: i64) -> String {
        self.compose(CacheCategory::EmployeeSchedule, &employee_id.to_string())
    }

    /// `attendance:stats:{digest}` — digest of the sorted parameter set.
    pub fn attendance_statistics(&self, params: &[(&str, &str)]) -> String {
        self.compose(CacheCategory::AttendanceStatistics, &params_digest(params))
    }

    /// `attendance:dept:{dept_id}:{start}:{end}`
    pub fn department_stats(&self, dept_id: i64, start: Date, end: Date) -> String {
        self.compose(
            CacheCategory::DepartmentStats,
            &format!("{dept_id}:{start}:{end}"),
        )
    }

    /// `attendance:rules:{employee_id}` or `attendance:rules:default`
    pub fn attendance_rules(&self, scope: RuleScope) -> String {
        let identifier = match scope {
            RuleScope::Default => "default".to_string(),
            RuleScope::Employee(employee_id) => employee_id.to_string(),
        };
        self.compose(CacheCategory::AttendanceRules, &identifier)
    }

    /// `attendance:today:{date}`
    pub fn today_attendance(&self, date: Date) -> String {
        self.compose(CacheCategory::TodayAttendance, &date.to_string())
    }

    /// `attendance:calendar:{year}`
    pub fn calendar(&self, year: i32) -> String {
        self.compose(CacheCategory::CalendarData, &year.to_string())
    }

    /// Glob pattern matching every key of one category.
    pub fn category_pattern(&self, category: CacheCategory) -> String {
        format!("{}:{}:*", self.namespace, category.key_segment())
    }

    /// Glob pattern matching every attendance record of one employee.
    pub fn employee_record_pattern(&self, employee_id: i64) -> String {
        format!(
            "{}:{}:{employee_id}:*",
            self.namespace,
            CacheCategory::AttendanceRecord.key_segment()
        )
    }
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new("attendance")
    }
}

/// Stable hex digest of a filter parameter set.
///
/// Pairs are sorted by name (then value) before hashing, so the digest is
/// independent of the order the caller supplies them in.
pub fn params_digest(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    for (name, value) in &sorted {
        hasher.update(name.as_bytes());
        hasher.update([0x1f]);
        hasher.update(value.as_bytes());
        hasher.update([0x1e]);
    }
    let digest = hex::encode(hasher.finalize());
    digest[..PARAMS_DIGEST_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn keys() -> KeyBuilder {
        KeyBuilder::default()
    }

    #[test]
    fn test_record_key_format() {
        assert_eq!(
            keys().attendance_record(42, date!(2025 - 11 - 17)),
            "attendance:record:42:2025-11-17"
        );
    }

    #[test]
    fn test_schedule_and_rules_keys() {
        assert_eq!(keys().employee_schedule(7), "attendance:schedule:7");
        assert_eq!(
            keys().attendance_rules(RuleScope::Employee(7)),
            "attendance:rules:7"
        );
        assert_eq!(
            keys().attendance_rules(RuleScope::Default),
            "attendance:rules:default"
        );
    }

    #[test]
    fn test_department_today_and_calendar_keys() {
        assert_eq!(
            keys().department_stats(3, date!(2025 - 11 - 01), date!(2025 - 11 - 30)),
            "attendance:dept:3:2025-11-01:2025-11-30"
        );
        assert_eq!(
            keys().today_attendance(date!(2025 - 11 - 17)),
            "attendance:today:2025-11-17"
        );
        assert_eq!(keys().calendar(2025), "attendance:calendar:2025");
    }

    #[test]
    fn test_statistics_key_is_order_independent() {
        let a = keys().attendance_statistics(&[("dept", "3"), ("month", "2025-11")]);
        let b = keys().attendance_statistics(&[("month", "2025-11"), ("dept", "3")]);
        assert_eq!(a, b);
        assert!(a.starts_with("attendance:stats:"));
    }

    #[test]
    fn test_statistics_key_distinguishes_values() {
        let a = keys().attendance_statistics(&[("dept", "3")]);
        let b = keys().attendance_statistics(&[("dept", "4")]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_does_not_collide_on_concatenation() {
        // ("ab","c") and ("a","bc") must hash differently.
        let a = params_digest(&[("ab", "c")]);
        let b = params_digest(&[("a", "bc")]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_patterns() {
        assert_eq!(
            keys().category_pattern(CacheCategory::AttendanceStatistics),
            "attendance:stats:*"
        );
        assert_eq!(keys().employee_record_pattern(42), "attendance:record:42:*");
    }

    #[test]
    fn test_custom_namespace() {
        let keys = KeyBuilder::new("hr");
        assert_eq!(keys.employee_schedule(1), "hr:schedule:1");
    }
}
