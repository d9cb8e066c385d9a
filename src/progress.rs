use std::sync::atomic::{AtomicU64, Ordering};

/// Completed/total task counter for one run. The total is fixed at
/// construction; `complete` is safe under concurrent delivery and each
/// call accounts for exactly one task.
#[derive(Debug)]
pub struct ProgressCounter {
    completed: AtomicU64,
    total: u64,
}

impl ProgressCounter {
    pub fn new(total: u64) -> Self {
        Self {
            completed: AtomicU64::new(0),
            total,
        }
    }

    /// Records one completed task and returns the new completed count.
    pub fn complete(&self) -> u64 {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Renders a fixed-width progress bar for the given counts.
pub fn render_bar(completed: u64, total: u64) -> String {
    let percent = if total == 0 {
        100.0
    } else {
        (completed as f64 / total as f64) * 100.0
    };
    let filled = (percent / 2.0) as usize;
    format!("[{:<50}] {:.2}%", "=".repeat(filled.min(50)), percent)
}
