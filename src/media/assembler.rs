//! Video plans and the assembler seam, with a recording mock.

use crate::artifacts::StoryboardEntry;
use crate::defaults;
use crate::error::AssemblyError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One label-only slide of the final video.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSpec {
    pub label: String,
    pub duration: Duration,
}

/// Everything the assembler needs to produce one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoPlan {
    pub slides: Vec<SlideSpec>,
    pub audio: PathBuf,
    pub fps: u32,
}

impl VideoPlan {
    /// One fixed-length slide per storyboard entry, labelled with its prompt.
    pub fn from_storyboard(entries: &[StoryboardEntry], audio: &Path) -> Self {
        let slides = entries
            .iter()
            .map(|entry| SlideSpec {
                label: entry.prompt.clone(),
                duration: defaults::segment_duration(),
            })
            .collect();
        Self {
            slides,
            audio: audio.to_path_buf(),
            fps: defaults::VIDEO_FPS,
        }
    }

    /// Sum of slide durations. The audio track does not affect it.
    pub fn nominal_duration(&self) -> Duration {
        self.slides.iter().map(|slide| slide.duration).sum()
    }
}

/// Media assembly collaborator: slides + one audio track → encoded video.
pub trait VideoAssembler: Send + Sync {
    /// Encode `plan` into `output`, replacing whatever is there.
    fn assemble(&self, plan: &VideoPlan, output: &Path) -> Result<(), AssemblyError>;

    /// Short description for status output
    fn describe(&self) -> String;
}

impl<T: VideoAssembler + ?Sized> VideoAssembler for Arc<T> {
    fn assemble(&self, plan: &VideoPlan, output: &Path) -> Result<(), AssemblyError> {
        (**self).assemble(plan, output)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Assembler that records plans and writes a small placeholder file.
#[derive(Debug, Default)]
pub struct MockAssembler {
    should_fail: bool,
    plans: Mutex<Vec<VideoPlan>>,
}

impl MockAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on assemble
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Plans received so far, in call order.
    pub fn plans(&self) -> Vec<VideoPlan> {
        self.plans.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl VideoAssembler for MockAssembler {
    fn assemble(&self, plan: &VideoPlan, output: &Path) -> Result<(), AssemblyError> {
        self.plans
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(plan.clone());
        if self.should_fail {
            return Err(AssemblyError::EncoderFailed {
                status: "mock".to_string(),
                stderr: "mock assembly failure".to_string(),
            });
        }
        if plan.slides.is_empty() {
            return Err(AssemblyError::EmptyPlan);
        }
        let summary = format!(
            "mock video: {} slides, {}s, {} fps\n",
            plan.slides.len(),
            plan.nominal_duration().as_secs(),
            plan.fps
        );
        fs::write(output, summary)?;
        Ok(())
    }

    fn describe(&self) -> String {
        "mock assembler".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(prompt: &str, index: u32) -> StoryboardEntry {
        StoryboardEntry {
            start: f64::from(index * 5),
            end: f64::from((index + 1) * 5),
            text: format!("line {index}"),
            prompt: prompt.to_string(),
        }
    }

    #[test]
    fn plan_has_one_slide_per_entry_in_order() {
        let entries = vec![entry("sunrise", 0), entry("ocean", 1), entry("city", 2)];
        let plan = VideoPlan::from_storyboard(&entries, Path::new("/tmp/a.wav"));

        let labels: Vec<&str> = plan.slides.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["sunrise", "ocean", "city"]);
        assert!(plan.slides.iter().all(|s| s.duration == Duration::from_secs(5)));
        assert_eq!(plan.audio, PathBuf::from("/tmp/a.wav"));
        assert_eq!(plan.fps, 24);
    }

    #[test]
    fn nominal_duration_is_five_seconds_per_entry() {
        for m in [1usize, 2, 7] {
            let entries: Vec<_> = (0..m as u32).map(|i| entry("p", i)).collect();
            let plan = VideoPlan::from_storyboard(&entries, Path::new("a.wav"));
            assert_eq!(plan.nominal_duration(), Duration::from_secs(5 * m as u64));
        }
    }

    #[test]
    fn empty_plan_has_zero_duration() {
        let plan = VideoPlan::from_storyboard(&[], Path::new("a.wav"));
        assert_eq!(plan.nominal_duration(), Duration::ZERO);
    }

    #[test]
    fn mock_assembler_writes_output_and_records_plan() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let plan = VideoPlan::from_storyboard(&[entry("p", 0)], Path::new("a.wav"));

        let assembler = MockAssembler::new();
        assembler.assemble(&plan, &output).unwrap();

        assert!(fs::read_to_string(&output).unwrap().contains("1 slides, 5s"));
        assert_eq!(assembler.plans(), vec![plan]);
    }

    #[test]
    fn mock_assembler_failure_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let plan = VideoPlan::from_storyboard(&[entry("p", 0)], Path::new("a.wav"));

        let result = MockAssembler::new().with_failure().assemble(&plan, &output);

        assert!(result.is_err());
        assert!(!output.exists());
    }
}
