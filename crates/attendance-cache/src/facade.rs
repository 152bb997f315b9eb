//! Domain cache facade.
//!
//! Typed, intention-revealing operations per attendance concept. Each one
//! builds its key from the domain identifiers through [`KeyBuilder`] and
//! passes its category to the manager, so TTL resolution is automatic.
//! The facade chooses the serializable type per call site; nothing below
//! it ever guesses a value's shape.
//!
//! ## Invalidation
//!
//! Per-employee invalidation is precise: those keys are built from known
//! identifiers, so pattern deletes match exactly the employee's entries.
//! Statistics keys are opaque hashes, so date-range invalidation falls
//! back to flushing the whole statistics categories. The asymmetry is
//! deliberate: precision where keys are constructible, a blunt flush where
//! they are not.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use time::Date;
use tracing::debug;

use attendance_cache_core::{
    CacheCategory, Clock, KeyBuilder, Result, RuleScope, current_date,
};

use crate::manager::CacheManager;

/// Attendance-domain view over the cache manager.
pub struct AttendanceCache {
    manager: Arc<CacheManager>,
    keys: KeyBuilder,
    clock: Arc<dyn Clock>,
}

impl AttendanceCache {
    pub fn new(manager: Arc<CacheManager>, keys: KeyBuilder, clock: Arc<dyn Clock>) -> Self {
        Self {
            manager,
            keys,
            clock,
        }
    }

    pub fn keys(&self) -> &KeyBuilder {
        &self.keys
    }

    // ---- attendance records ----

    pub async fn cache_attendance_record<T>(
        &self,
        employee_id: i64,
        date: Date,
        record: &T,
    ) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let key = self.keys.attendance_record(employee_id, date);
        self.manager
            .set(&key, record, None, Some(CacheCategory::AttendanceRecord))
            .await
    }

    pub async fn get_attendance_record<T>(&self, employee_id: i64, date: Date) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.keys.attendance_record(employee_id, date);
        self.manager
            .get(&key, Some(CacheCategory::AttendanceRecord))
            .await
    }

    // ---- employee schedules ----

    pub async fn cache_employee_schedule<T>(&self, employee_id: i64, schedule: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let key = self.keys.employee_schedule(employee_id);
        self.manager
            .set(&key, schedule, None, Some(CacheCategory::EmployeeSchedule))
            .await
    }

    pub async fn get_employee_schedule<T>(&self, employee_id: i64) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.keys.employee_schedule(employee_id);
        self.manager
            .get(&key, Some(CacheCategory::EmployeeSchedule))
            .await
    }

    // ---- statistics (hashed filter parameters) ----

    pub async fn cache_attendance_statistics<T>(
        &self,
        params: &[(&str, &str)],
        stats: &T,
    ) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let key = self.keys.attendance_statistics(params);
        self.manager
            .set(&key, stats, None, Some(CacheCategory::AttendanceStatistics))
            .await
    }

    pub async fn get_attendance_statistics<T>(&self, params: &[(&str, &str)]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.keys.attendance_statistics(params);
        self.manager
            .get(&key, Some(CacheCategory::AttendanceStatistics))
            .await
    }

    // ---- department statistics ----

    pub async fn cache_department_stats<T>(
        &self,
        dept_id: i64,
        start: Date,
        end: Date,
        stats: &T,
    ) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let key = self.keys.department_stats(dept_id, start, end);
        self.manager
            .set(&key, stats, None, Some(CacheCategory::DepartmentStats))
            .await
    }

    pub async fn get_department_stats<T>(
        &self,
        dept_id: i64,
        start: Date,
        end: Date,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.keys.department_stats(dept_id, start, end);
        self.manager
            .get(&key, Some(CacheCategory::DepartmentStats))
            .await
    }

    // ---- rule sets ----

    pub async fn cache_attendance_rules<T>(&self, scope: RuleScope, rules: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let key = self.keys.attendance_rules(scope);
        self.manager
            .set(&key, rules, None, Some(CacheCategory::AttendanceRules))
            .await
    }

    pub async fn get_attendance_rules<T>(&self, scope: RuleScope) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.keys.attendance_rules(scope);
        self.manager
            .get(&key, Some(CacheCategory::AttendanceRules))
            .await
    }

    // ---- today snapshot ----

    pub async fn cache_today_attendance<T>(&self, date: Date, snapshot: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let key = self.keys.today_attendance(date);
        self.manager
            .set(&key, snapshot, None, Some(CacheCategory::TodayAttendance))
            .await
    }

    pub async fn get_today_attendance<T>(&self, date: Date) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.keys.today_attendance(date);
        self.manager
            .get(&key, Some(CacheCategory::TodayAttendance))
            .await
    }

    // ---- calendar ----

    pub async fn cache_calendar<T>(&self, year: i32, calendar: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let key = self.keys.calendar(year);
        self.manager
            .set(&key, calendar, None, Some(CacheCategory::CalendarData))
            .await
    }

    pub async fn get_calendar<T>(&self, year: i32) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.keys.calendar(year);
        self.manager.get(&key, Some(CacheCategory::CalendarData)).await
    }

    // ---- invalidation helpers ----

    /// Drop every cached entry keyed by one employee: records, schedule,
    /// and rules. Entries of other employees are untouched. Returns the
    /// total remote-confirmed removed count.
    pub async fn invalidate_employee_cache(&self, employee_id: i64) -> Result<u64> {
        let patterns = [
            self.keys.employee_record_pattern(employee_id),
            self.keys.employee_schedule(employee_id),
            self.keys.attendance_rules(RuleScope::Employee(employee_id)),
        ];

        let mut total = 0u64;
        for pattern in &patterns {
            total += self.manager.delete_by_pattern(pattern).await?;
        }

        debug!(employee_id, removed = total, "employee cache invalidated");
        Ok(total)
    }

    /// Invalidate entries affected by a change inside a date range.
    ///
    /// The today snapshot is cleared only when the current date falls in
    /// the range. Statistics and department-stats entries are flushed
    /// unconditionally: their keys are hashed and cannot be matched by
    /// date, so the full-category flush is the correctness-preserving
    /// fallback.
    pub async fn invalidate_date_range_cache(&self, start: Date, end: Date) -> Result<u64> {
        let mut total = 0u64;

        let today = current_date(self.clock.as_ref());
        if start <= today && today <= end {
            total += self
                .manager
                .delete_by_pattern(&self.keys.category_pattern(CacheCategory::TodayAttendance))
                .await?;
        }

        total += self
            .manager
            .delete_by_pattern(&self.keys.category_pattern(CacheCategory::AttendanceStatistics))
            .await?;
        total += self
            .manager
            .delete_by_pattern(&self.keys.category_pattern(CacheCategory::DepartmentStats))
            .await?;

        debug!(%start, %end, removed = total, "date range cache invalidated");
        Ok(total)
    }
}
