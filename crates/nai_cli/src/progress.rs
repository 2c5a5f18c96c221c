use kdam::{tqdm, Bar, BarExt};
use nai_core::logging::Logger;
use nai_core::pipeline::PipelineObserver;
use nai_core::Phase;

/// Terminal progress bar driven by pipeline phases.
pub struct PipelineProgress {
    bar: Bar,
    last: Option<Phase>,
    logger: Logger,
}

impl PipelineProgress {
    pub fn new() -> Self {
        Self::with_bar(tqdm!(total = 100, desc = "Initializing...", unit = "%"))
    }

    fn with_bar(bar: Bar) -> Self {
        Self {
            bar,
            last: None,
            logger: Logger::new().with_prefix("[progress]"),
        }
    }

    pub fn finish(&mut self) {
        if let Err(e) = self.bar.refresh() {
            self.logger.debug(&format!("Failed to draw progress bar: {}", e));
        }
        eprintln!();
        if self.last == Some(Phase::Error) {
            self.logger.debug("Pipeline stopped before completion");
        }
    }
}

impl Default for PipelineProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineObserver for PipelineProgress {
    fn on_phase(&mut self, phase: Phase) {
        self.last = Some(phase);
        self.bar.set_description(phase.label());
        if let Err(e) = self.bar.update_to(phase.progress() as usize) {
            self.logger.debug(&format!("Failed to draw progress bar: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_last_phase() {
        let mut progress = PipelineProgress::with_bar(tqdm!(total = 100, disable = true));
        assert_eq!(progress.last, None);
        progress.on_phase(Phase::ExtractingKeyInfo);
        progress.on_phase(Phase::Complete);
        assert_eq!(progress.last, Some(Phase::Complete));
    }

    #[test]
    fn test_finish_after_error_keeps_state() {
        let mut progress = PipelineProgress::with_bar(tqdm!(total = 100, disable = true));
        progress.on_phase(Phase::Initializing);
        progress.on_phase(Phase::Error);
        progress.finish();
        assert_eq!(progress.last, Some(Phase::Error));
    }
}
