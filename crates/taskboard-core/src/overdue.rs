//! SLA rules and the memoized overdue-task computation.
//!
//! [`compute_overdue`] is the pure evaluation against an explicit `now`.
//! [`OverdueCache`] wraps it in a bounded LRU keyed by a BLAKE3 digest of the
//! snapshot contents and the rule list, so a repeated call with the same
//! tasks and rules returns the stored result without re-evaluating.

use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::str::FromStr;

use chrono::NaiveDateTime;
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::model::{ParseEnumError, Priority, Status, Task};
use crate::timestamp::{now_utc, parse_timestamp};

/// Capacity used when none is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Rules applied when a report does not name its own.
pub const DEFAULT_RULES: [SlaRule; 2] = [SlaRule::Overdue7Days, SlaRule::CriticalOverdue];

/// A named overdue threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlaRule {
    /// Older than 7 days and not done.
    #[serde(rename = "overdue_7_days")]
    Overdue7Days,
    /// Older than 14 days and not done.
    #[serde(rename = "overdue_14_days")]
    Overdue14Days,
    /// Critical and older than 3 days, whatever the status.
    #[serde(rename = "critical_overdue")]
    CriticalOverdue,
}

impl SlaRule {
    pub const ALL: [Self; 3] = [
        Self::Overdue7Days,
        Self::Overdue14Days,
        Self::CriticalOverdue,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overdue7Days => "overdue_7_days",
            Self::Overdue14Days => "overdue_14_days",
            Self::CriticalOverdue => "critical_overdue",
        }
    }

    /// Whether a task of age `age_days` breaches this rule.
    #[must_use]
    pub fn matches(self, task: &Task, age_days: i64) -> bool {
        match self {
            Self::Overdue7Days => age_days > 7 && task.status != Status::Done,
            Self::Overdue14Days => age_days > 14 && task.status != Status::Done,
            Self::CriticalOverdue => task.priority == Priority::Critical && age_days > 3,
        }
    }
}

impl fmt::Display for SlaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlaRule {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ParseEnumError {
                expected: "SLA rule",
                got: s.to_string(),
            })
    }
}

/// Tasks breaching at least one of `rules` as of `now`, in snapshot order.
///
/// Age is whole days between `created` and `now`. A task whose `created`
/// stamp does not parse is left out rather than reported as an error.
#[must_use]
pub fn compute_overdue(tasks: &[Task], rules: &[SlaRule], now: NaiveDateTime) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| {
            let Ok(created) = parse_timestamp(&task.created) else {
                tracing::debug!(task_id = %task.id, "skipping task with unparsable created stamp");
                return false;
            };
            let age_days = (now - created).num_days();
            rules.iter().any(|rule| rule.matches(task, age_days))
        })
        .cloned()
        .collect()
}

/// Structural cache key over the snapshot contents and rule list.
#[must_use]
pub fn snapshot_digest(tasks: &[Task], rules: &[SlaRule]) -> blake3::Hash {
    fn field(hasher: &mut blake3::Hasher, value: &str) {
        hasher.update(&(value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(&(tasks.len() as u64).to_le_bytes());
    for task in tasks {
        field(&mut hasher, &task.id);
        field(&mut hasher, &task.project_id);
        field(&mut hasher, &task.title);
        field(&mut hasher, &task.desc);
        field(&mut hasher, task.status.as_str());
        field(&mut hasher, task.priority.as_str());
        match task.assignee.as_deref() {
            Some(assignee) => {
                hasher.update(&[1]);
                field(&mut hasher, assignee);
            }
            None => {
                hasher.update(&[0]);
            }
        }
        field(&mut hasher, &task.created);
        field(&mut hasher, &task.updated);
    }
    hasher.update(&(rules.len() as u64).to_le_bytes());
    for rule in rules {
        field(&mut hasher, rule.as_str());
    }
    hasher.finalize()
}

/// Hit/miss counters for an [`OverdueCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// Bounded memo for overdue evaluation.
///
/// The key covers the snapshot and the rules but not the clock: a cached
/// result keeps the ages it was computed with until it is evicted or the
/// owning session ends.
pub struct OverdueCache {
    entries: LruCache<blake3::Hash, Rc<[Task]>>,
    hits: u64,
    misses: u64,
}

impl OverdueCache {
    /// Create a cache holding at most `capacity` results (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Overdue tasks as of the current wall clock, memoized.
    pub fn overdue_tasks(&mut self, tasks: &[Task], rules: &[SlaRule]) -> Rc<[Task]> {
        self.overdue_tasks_at(tasks, rules, now_utc)
    }

    /// Memoized evaluation with an injectable clock.
    ///
    /// `now` is only called on a miss.
    pub fn overdue_tasks_at(
        &mut self,
        tasks: &[Task],
        rules: &[SlaRule],
        now: impl FnOnce() -> NaiveDateTime,
    ) -> Rc<[Task]> {
        let key = snapshot_digest(tasks, rules);
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            tracing::debug!(key = %key, "overdue cache hit");
            return Rc::clone(hit);
        }

        self.misses += 1;
        let result: Rc<[Task]> = compute_overdue(tasks, rules, now()).into();
        tracing::debug!(
            key = %key,
            tasks = tasks.len(),
            overdue = result.len(),
            "overdue cache miss"
        );
        self.entries.put(key, Rc::clone(&result));
        result
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            capacity: self.entries.cap().get(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for OverdueCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl fmt::Debug for OverdueCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverdueCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::format_iso;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn aged(id: &str, days: i64, status: Status, priority: Priority) -> Task {
        let created = format_iso(now() - Duration::days(days));
        Task {
            id: id.into(),
            project_id: "p1".into(),
            title: format!("Task {id}"),
            desc: "Desc".into(),
            status,
            priority,
            assignee: None,
            created: created.clone(),
            updated: created,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn rules_parse_from_their_names() {
        for rule in SlaRule::ALL {
            assert_eq!(rule.as_str().parse::<SlaRule>().unwrap(), rule);
        }
        assert!("overdue_30_days".parse::<SlaRule>().is_err());
        assert_eq!(
            serde_json::to_string(&SlaRule::Overdue7Days).unwrap(),
            "\"overdue_7_days\""
        );
    }

    #[test]
    fn applies_each_rule_independently() {
        let tasks = vec![
            aged("t1", 8, Status::Todo, Priority::Medium),
            aged("t2", 20, Status::Done, Priority::Medium),
            aged("t3", 4, Status::Todo, Priority::Critical),
            aged("t4", 2, Status::Todo, Priority::Medium),
        ];
        let result = compute_overdue(
            &tasks,
            &[SlaRule::Overdue7Days, SlaRule::CriticalOverdue],
            now(),
        );
        assert_eq!(ids(&result), ["t1", "t3"]);
    }

    #[test]
    fn fourteen_day_rule_needs_more_age() {
        let tasks = vec![
            aged("t1", 10, Status::Review, Priority::Low),
            aged("t2", 15, Status::Review, Priority::Low),
        ];
        let result = compute_overdue(&tasks, &[SlaRule::Overdue14Days], now());
        assert_eq!(ids(&result), ["t2"]);
    }

    #[test]
    fn critical_rule_ignores_young_tasks_and_status() {
        let tasks = vec![
            aged("young", 2, Status::Todo, Priority::Critical),
            aged("done", 5, Status::Done, Priority::Critical),
        ];
        let result = compute_overdue(&tasks, &[SlaRule::CriticalOverdue], now());
        assert_eq!(ids(&result), ["done"]);
    }

    #[test]
    fn boundary_age_is_not_overdue() {
        let tasks = vec![aged("t1", 7, Status::Todo, Priority::Low)];
        assert!(compute_overdue(&tasks, &[SlaRule::Overdue7Days], now()).is_empty());
    }

    #[test]
    fn unparsable_created_is_skipped() {
        let mut broken = aged("t1", 30, Status::Todo, Priority::Low);
        broken.created = "soon".into();
        let fine = aged("t2", 30, Status::Todo, Priority::Low);
        let result = compute_overdue(&[broken, fine], &[SlaRule::Overdue7Days], now());
        assert_eq!(ids(&result), ["t2"]);
    }

    #[test]
    fn no_rules_means_nothing_overdue() {
        let tasks = vec![aged("t1", 30, Status::Todo, Priority::Critical)];
        assert!(compute_overdue(&tasks, &[], now()).is_empty());
    }

    #[test]
    fn repeated_call_is_served_from_cache() {
        let tasks = vec![
            aged("t1", 9, Status::Todo, Priority::Low),
            aged("t2", 1, Status::Todo, Priority::Low),
        ];
        let rules = [SlaRule::Overdue7Days];
        let mut cache = OverdueCache::new(4);

        let first = cache.overdue_tasks_at(&tasks, &rules, now);
        let second = cache.overdue_tasks_at(&tasks, &rules, || {
            panic!("clock must not be read on a hit")
        });

        assert_eq!(first, second);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn equal_contents_share_a_key() {
        let tasks = vec![aged("t1", 9, Status::Todo, Priority::Low)];
        let copy = tasks.clone();
        assert_eq!(
            snapshot_digest(&tasks, &DEFAULT_RULES),
            snapshot_digest(&copy, &DEFAULT_RULES)
        );
    }

    #[test]
    fn any_change_changes_the_key() {
        let tasks = vec![aged("t1", 9, Status::Todo, Priority::Low)];
        let base = snapshot_digest(&tasks, &DEFAULT_RULES);

        let moved = vec![tasks[0].with_status(Status::Done, tasks[0].updated.clone())];
        assert_ne!(base, snapshot_digest(&moved, &DEFAULT_RULES));
        assert_ne!(base, snapshot_digest(&tasks, &[SlaRule::Overdue7Days]));

        let mut assigned = tasks.clone();
        assigned[0].assignee = Some(String::new());
        assert_ne!(base, snapshot_digest(&assigned, &DEFAULT_RULES));
    }

    #[test]
    fn cache_is_bounded() {
        let mut cache = OverdueCache::new(2);
        for days in 0..5 {
            let tasks = vec![aged("t1", days, Status::Todo, Priority::Low)];
            cache.overdue_tasks_at(&tasks, &DEFAULT_RULES, now);
        }
        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.capacity, 2);
        assert_eq!(stats.misses, 5);
    }

    #[test]
    fn zero_capacity_is_coerced_to_one() {
        let cache = OverdueCache::new(0);
        assert_eq!(cache.stats().capacity, 1);
    }
}
