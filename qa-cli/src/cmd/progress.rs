use async_trait::async_trait;
use qa_exec::{Event, EventSink};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Live scenario counter on stderr.
pub struct ProgressEventSink {
    total_scenarios: Option<usize>,
    passed: AtomicUsize,
    failed: AtomicUsize,
    steps: AtomicUsize,
}

impl ProgressEventSink {
    pub fn new(total_scenarios: Option<usize>) -> Self {
        Self {
            total_scenarios,
            passed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            steps: AtomicUsize::new(0),
        }
    }

    fn update_progress(&self) {
        let passed = self.passed.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let steps = self.steps.load(Ordering::Relaxed);
        let done = passed + failed;
        match self.total_scenarios {
            Some(total) => {
                let percent = if total > 0 { (done * 100) / total } else { 100 };
                eprint!("\rProgress: [{done}/{total}] {percent}% (✓{passed} ✗{failed}, {steps} steps)");
            }
            None => eprint!("\rProgress: [{done}] (✓{passed} ✗{failed}, {steps} steps)"),
        }
    }
}

#[async_trait]
impl EventSink for ProgressEventSink {
    async fn emit(&self, event: Event) {
        match event {
            Event::StepStarted { .. } => {
                self.steps.fetch_add(1, Ordering::Relaxed);
                self.update_progress();
            }
            Event::ScenarioPassed { .. } => {
                self.passed.fetch_add(1, Ordering::Relaxed);
                self.update_progress();
            }
            Event::ScenarioFailed { .. } => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                self.update_progress();
            }
            Event::Finished { .. } => eprintln!(),
            _ => {}
        }
    }
}
