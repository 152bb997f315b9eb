//! Warm-up runner.
//!
//! Pre-populates a small fixed set of high-traffic entries through the
//! same manager `set` path normal traffic uses, so cold starts do not pay
//! latency spikes on the first requests. Individual failures are logged
//! and counted, never fatal to the remaining steps.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use attendance_cache_core::{CacheCategory, KeyBuilder, RuleScope};

use crate::manager::CacheManager;

/// One entry to pre-populate.
pub struct WarmupTask {
    /// Short label for logs.
    pub name: String,
    pub key: String,
    pub category: CacheCategory,
    pub value: serde_json::Value,
}

/// Outcome of one warm-up run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupReport {
    pub success_count: usize,
    pub error_count: usize,
    pub total_count: usize,
}

pub struct WarmupRunner {
    manager: Arc<CacheManager>,
    tasks: Vec<WarmupTask>,
}

impl WarmupRunner {
    /// Runner with no tasks; populate with [`push_task`](Self::push_task).
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self {
            manager,
            tasks: Vec::new(),
        }
    }

    /// Runner seeded with the standing high-traffic entries — currently
    /// the default attendance rule set.
    pub fn with_default_tasks(manager: Arc<CacheManager>, keys: &KeyBuilder) -> Self {
        let mut runner = Self::new(manager);
        runner.push_task(WarmupTask {
            name: "default-rules".to_string(),
            key: keys.attendance_rules(RuleScope::Default),
            category: CacheCategory::AttendanceRules,
            value: json!({
                "work_start": "09:00",
                "work_end": "18:00",
                "late_grace_minutes": 5,
                "early_leave_grace_minutes": 5,
                "overtime_threshold_minutes": 30,
            }),
        });
        runner
    }

    pub fn push_task(&mut self, task: WarmupTask) {
        self.tasks.push(task);
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Run every task, fail-soft.
    pub async fn run(&self) -> WarmupReport {
        let mut report = WarmupReport {
            total_count: self.tasks.len(),
            ..Default::default()
        };

        for task in &self.tasks {
            match self
                .manager
                .set(&task.key, &task.value, None, Some(task.category))
                .await
            {
                Ok(()) => report.success_count += 1,
                Err(e) => {
                    warn!(task = %task.name, key = %task.key, error = %e, "warm-up write failed");
                    report.error_count += 1;
                }
            }
        }

        info!(
            success = report.success_count,
            errors = report.error_count,
            total = report.total_count,
            "cache warm-up finished"
        );
        report
    }
}
