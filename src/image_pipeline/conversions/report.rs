use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub duration: Duration,
}

#[derive(Debug, Default)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
    step_map: HashMap<String, Duration>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        let name = name.into();
        self.steps.push(StepTiming {
            name: name.clone(),
            duration,
        });
        *self.step_map.entry(name).or_insert(Duration::ZERO) += duration;
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Accumulated time spent in every step with this name.
    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.step_map.get(name).copied()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self, timings: &mut PipelineTimings) {
        timings.add_step(self.name, self.start.elapsed());
    }

    /// Records the time since the last start and keeps the timer running.
    pub fn lap(&mut self, timings: &mut PipelineTimings) {
        timings.add_step(self.name, self.start.elapsed());
        self.restart();
    }

    pub fn restart(&mut self) {
        self.start = Instant::now();
    }
}

/// What happened to a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub index: usize,
    pub source_dimensions: (u32, u32),
    pub output_dimensions: (u32, u32),
    /// The page's tags could not be read and the default record was used
    pub metadata_fallback: bool,
    pub rescaled: bool,
}

/// Outcome of a successful conversion run
#[derive(Debug, Default)]
pub struct ConversionReport {
    pub pages: Vec<PageReport>,
    pub timings: PipelineTimings,
}

impl ConversionReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
