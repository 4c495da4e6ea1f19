//! Pipeline controller: owns the session and dispatches stage requests.

use crate::artifacts::Session;
use crate::error::{Result, ValidationError};
use crate::gateway::ServiceGateway;
use crate::media::{ResourceStore, VideoAssembler};
use crate::pipeline::stage::{Stage, StageRequest};
use crate::pipeline::{audio, metadata, script, storyboard, transcription, video};
use std::time::Instant;
use tracing::{debug, info, warn};

/// One working session with its collaborators.
///
/// Stages may be run in any order; each checks its own prerequisites. The
/// session is only mutated by a stage that completed successfully.
pub struct Pipeline {
    session: Session,
    gateway: Box<dyn ServiceGateway>,
    assembler: Box<dyn VideoAssembler>,
    resources: ResourceStore,
}

impl Pipeline {
    pub fn new(
        gateway: Box<dyn ServiceGateway>,
        assembler: Box<dyn VideoAssembler>,
        resources: ResourceStore,
    ) -> Self {
        Self {
            session: Session::new(),
            gateway,
            assembler,
            resources,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    /// Start over with an empty session. Files already written stay on disk.
    pub fn reset(&mut self) {
        self.session = Session::new();
    }

    /// Whether `stage`'s generate action may run now.
    pub fn can_run(&self, stage: Stage) -> std::result::Result<(), ValidationError> {
        stage.check(&self.session)
    }

    /// Stages whose prerequisites are all present.
    pub fn runnable(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.can_run(*stage).is_ok())
            .collect()
    }

    /// Run one stage action and return the stage that completed.
    pub fn run(&mut self, request: StageRequest) -> Result<Stage> {
        let stage = request.stage();
        if let Err(e) = request.check(&self.session) {
            debug!(%stage, reason = %e, "stage gated");
            return Err(e.into());
        }

        info!(%stage, "stage started");
        let started = Instant::now();
        let result = self.dispatch(request);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => info!(%stage, elapsed_ms, "stage finished"),
            Err(e) => warn!(%stage, elapsed_ms, error = %e, "stage failed"),
        }
        result.map(|()| stage)
    }

    fn dispatch(&mut self, request: StageRequest) -> Result<()> {
        let gateway = self.gateway.as_ref();
        let session = &mut self.session;
        match request {
            StageRequest::Script { prompt } => script::generate(session, gateway, prompt.as_deref()),
            StageRequest::SynthesizeAudio { voice } => {
                audio::synthesize(session, gateway, &self.resources, voice).map(drop)
            }
            StageRequest::UploadAudio { path } => {
                audio::upload(session, &self.resources, &path).map(drop)
            }
            StageRequest::Transcribe => transcription::transcribe(session, gateway).map(drop),
            StageRequest::Storyboard => storyboard::create(session, gateway).map(drop),
            StageRequest::Metadata => metadata::generate(session, gateway),
            StageRequest::Video => {
                video::assemble(session, self.assembler.as_ref(), &self.resources).map(drop)
            }
        }
    }

    /// One line naming the wired collaborators, for `status`.
    pub fn describe(&self) -> String {
        format!(
            "{} | {} | scratch: {}",
            self.gateway.describe(),
            self.assembler.describe(),
            self.resources.dir().display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactKind;
    use crate::error::StudioError;
    use crate::gateway::{MockGateway, Voice};
    use crate::media::MockAssembler;
    use std::sync::Arc;

    fn pipeline(gateway: Arc<MockGateway>) -> (tempfile::TempDir, Pipeline) {
        let dir = tempfile::tempdir().unwrap();
        let resources = ResourceStore::new(dir.path()).unwrap();
        let pipeline = Pipeline::new(
            Box::new(gateway),
            Box::new(MockAssembler::new()),
            resources,
        );
        (dir, pipeline)
    }

    #[test]
    fn only_script_is_runnable_at_start() {
        let (_dir, pipeline) = pipeline(Arc::new(MockGateway::new()));
        assert_eq!(pipeline.runnable(), vec![Stage::Script]);
    }

    #[test]
    fn gated_request_reports_first_missing_artifact() {
        let gateway = Arc::new(MockGateway::new());
        let (_dir, mut pipeline) = pipeline(Arc::clone(&gateway));

        let err = pipeline.run(StageRequest::Video).unwrap_err();

        assert!(matches!(
            err,
            StudioError::Validation(ValidationError::MissingArtifact {
                artifact: ArtifactKind::Storyboard
            })
        ));
        assert_eq!(gateway.total_calls(), 0);
        assert_eq!(pipeline.session(), &Session::new());
    }

    #[test]
    fn upload_is_runnable_without_a_script() {
        let (dir, mut pipeline) = pipeline(Arc::new(MockGateway::new()));
        let source = dir.path().join("take.wav");
        std::fs::write(&source, b"RIFF narration").unwrap();

        let stage = pipeline
            .run(StageRequest::UploadAudio { path: source })
            .unwrap();

        assert_eq!(stage, Stage::Audio);
        assert!(pipeline.session().has(ArtifactKind::AudioPath));
        assert!(pipeline.can_run(Stage::Transcription).is_ok());
        assert!(pipeline.can_run(Stage::Audio).is_err());
    }

    #[test]
    fn script_unlocks_audio_and_metadata() {
        let (_dir, mut pipeline) = pipeline(Arc::new(MockGateway::new()));
        pipeline
            .run(StageRequest::Script {
                prompt: Some("Why is the sky blue?".to_string()),
            })
            .unwrap();

        assert_eq!(
            pipeline.runnable(),
            vec![Stage::Script, Stage::Audio, Stage::Metadata]
        );
    }

    #[test]
    fn failed_stage_keeps_session() {
        let gateway = Arc::new(MockGateway::new().with_synthesis_failure());
        let (_dir, mut pipeline) = pipeline(Arc::clone(&gateway));
        pipeline
            .run(StageRequest::Script {
                prompt: Some("topic".to_string()),
            })
            .unwrap();
        let before = pipeline.session().clone();

        let err = pipeline
            .run(StageRequest::SynthesizeAudio { voice: Voice::Male })
            .unwrap_err();

        assert!(matches!(err, StudioError::Service(_)));
        assert_eq!(pipeline.session(), &before);
    }

    #[test]
    fn reset_clears_every_artifact() {
        let (_dir, mut pipeline) = pipeline(Arc::new(MockGateway::new()));
        pipeline
            .run(StageRequest::Script {
                prompt: Some("topic".to_string()),
            })
            .unwrap();
        pipeline.reset();
        assert!(pipeline.session().present().is_empty());
    }

    #[test]
    fn describe_names_collaborators() {
        let (_dir, pipeline) = pipeline(Arc::new(MockGateway::new()));
        let line = pipeline.describe();
        assert!(line.contains("mock gateway"));
        assert!(line.contains("mock assembler"));
    }
}
