// One-shot job scheduler for reminders and announcements.
//
// Each job is a tokio task sleeping until its run time. Jobs are keyed by a
// string id so callers can replace, inspect or cancel them. A generation
// counter stops a replaced job from unregistering its successor when it
// finishes.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

struct ScheduledJob {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Clone, Default)]
pub struct Scheduler {
    jobs: Arc<DashMap<String, ScheduledJob>>,
    generation: Arc<AtomicU64>,
}

pub fn reminder_job_id(reminder_id: i64) -> String {
    format!("reminder-{}", reminder_id)
}

pub fn announcement_job_id(announcement_id: i64) -> String {
    format!("announcement-{}", announcement_id)
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` once at `run_at`, replacing any job already registered under
    /// `job_id`. A run time in the past fires right away.
    pub fn schedule_once<F>(&self, job_id: impl Into<String>, run_at: DateTime<Utc>, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let job_id = job_id.into();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let delay = (run_at - Utc::now()).to_std().unwrap_or_default();

        let jobs = Arc::clone(&self.jobs);
        let task_id = job_id.clone();

        // Hold the map entry while spawning so a zero-delay job cannot finish
        // before it has been registered.
        let entry = self.jobs.entry(job_id.clone());
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
            jobs.remove_if(&task_id, |_, current| current.generation == generation);
        });

        let previous = match entry {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                Some(occupied.insert(ScheduledJob { generation, handle }))
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(ScheduledJob { generation, handle });
                None
            }
        };

        if let Some(previous) = previous {
            previous.handle.abort();
            tracing::debug!(job_id = %job_id, "Replaced scheduled job");
        } else {
            tracing::debug!(job_id = %job_id, run_at = %run_at, "Scheduled job");
        }
    }

    pub fn has_job(&self, job_id: &str) -> bool {
        self.jobs.contains_key(job_id)
    }

    /// Cancel a pending job. Returns false when no such job exists.
    pub fn cancel(&self, job_id: &str) -> bool {
        match self.jobs.remove(job_id) {
            Some((_, job)) => {
                job.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn shutdown(&self) {
        let ids: Vec<String> = self.jobs.iter().map(|entry| entry.key().clone()).collect();
        for id in ids {
            self.cancel(&id);
        }
    }
}
