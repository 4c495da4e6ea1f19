//! End-to-end stage flow against the mock gateway and assembler.

use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tldr_studio::{
    ArtifactKind, MockAssembler, MockGateway, Pipeline, ResourceStore, Segment, Session, Stage,
    StageRequest, StudioError, ValidationError, Voice,
};

struct Harness {
    _dir: tempfile::TempDir,
    gateway: Arc<MockGateway>,
    assembler: Arc<MockAssembler>,
    pipeline: Pipeline,
}

fn harness(gateway: MockGateway, assembler: MockAssembler) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(gateway);
    let assembler = Arc::new(assembler);
    let resources = ResourceStore::new(dir.path().join("scratch")).unwrap();
    let pipeline = Pipeline::new(
        Box::new(Arc::clone(&gateway)),
        Box::new(Arc::clone(&assembler)),
        resources,
    );
    Harness {
        _dir: dir,
        gateway,
        assembler,
        pipeline,
    }
}

fn script(prompt: &str) -> StageRequest {
    StageRequest::Script {
        prompt: Some(prompt.to_string()),
    }
}

#[test]
fn full_production_with_mocks() {
    let mut h = harness(
        MockGateway::new().with_transcript("Hello there\n\nWelcome back\n"),
        MockAssembler::new(),
    );

    for request in [
        script("Why is the sky blue?"),
        StageRequest::SynthesizeAudio {
            voice: Voice::Female,
        },
        StageRequest::Transcribe,
        StageRequest::Storyboard,
        StageRequest::Metadata,
        StageRequest::Video,
    ] {
        h.pipeline.run(request).unwrap();
    }

    let session = h.pipeline.session();
    assert_eq!(session.present(), ArtifactKind::ALL.to_vec());
    assert_eq!(session.script_text(), Some("mock: Why is the sky blue?"));
    assert_eq!(
        session.timestamps().unwrap(),
        &[
            Segment::new(0.0, 5.0, "Hello there"),
            Segment::new(5.0, 10.0, "Welcome back"),
        ]
    );

    let storyboard = session.storyboard().unwrap();
    assert_eq!(storyboard.len(), 2);
    assert_eq!(storyboard[1].text, "Welcome back");
    assert!(storyboard[1].prompt.ends_with("Welcome back"));

    let plans = h.assembler.plans();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].nominal_duration(), Duration::from_secs(10));
    assert!(fs::metadata(session.video_path().unwrap()).unwrap().len() > 0);

    // script + 2 scenes + metadata
    assert_eq!(h.gateway.completions().len(), 4);
    assert_eq!(h.gateway.syntheses().len(), 1);
    assert_eq!(h.gateway.transcription_calls(), 1);
}

#[test]
fn every_gated_stage_leaves_an_empty_session_alone() {
    let mut h = harness(MockGateway::new(), MockAssembler::new());

    for request in [
        StageRequest::SynthesizeAudio {
            voice: Voice::Alloy,
        },
        StageRequest::Transcribe,
        StageRequest::Storyboard,
        StageRequest::Metadata,
        StageRequest::Video,
        StageRequest::Script { prompt: None },
    ] {
        let stage = request.stage();
        let err = h.pipeline.run(request).unwrap_err();
        assert!(err.is_validation(), "{stage} should be gated, got {err}");
    }

    assert_eq!(h.pipeline.session(), &Session::new());
    assert_eq!(h.gateway.total_calls(), 0);
    assert!(h.assembler.plans().is_empty());
}

#[test]
fn empty_prompt_is_rejected_before_calling() {
    let mut h = harness(MockGateway::new(), MockAssembler::new());

    let err = h.pipeline.run(script("   ")).unwrap_err();

    assert!(matches!(
        err,
        StudioError::Validation(ValidationError::EmptyInput { .. })
    ));
    assert_eq!(h.gateway.total_calls(), 0);
}

#[test]
fn uploaded_audio_feeds_transcription_and_video() {
    let mut h = harness(
        MockGateway::new().with_transcript("one\ntwo\nthree"),
        MockAssembler::new(),
    );
    let source = h.pipeline.resources().dir().join("../take.mp3");
    fs::write(&source, b"ID3 narration bytes").unwrap();

    h.pipeline
        .run(StageRequest::UploadAudio { path: source })
        .unwrap();
    h.pipeline.run(StageRequest::Transcribe).unwrap();
    h.pipeline.run(StageRequest::Storyboard).unwrap();
    h.pipeline.run(StageRequest::Video).unwrap();

    let session = h.pipeline.session();
    assert!(!session.has(ArtifactKind::ScriptText));
    assert_eq!(
        session.audio_path().unwrap().extension().unwrap(),
        "mp3"
    );
    assert_eq!(
        h.assembler.plans()[0].nominal_duration(),
        Duration::from_secs(15)
    );
    assert_eq!(h.gateway.syntheses().len(), 0);
}

#[test]
fn storyboard_failure_mid_way_keeps_previous_storyboard() {
    // Calls: 1 script, 2-3 first storyboard, 4-5 second storyboard (5 fails).
    let mut h = harness(
        MockGateway::new()
            .with_transcript("first\nsecond")
            .fail_completion_at(5),
        MockAssembler::new(),
    );
    h.pipeline.run(script("tides")).unwrap();
    h.pipeline
        .run(StageRequest::SynthesizeAudio {
            voice: Voice::Male,
        })
        .unwrap();
    h.pipeline.run(StageRequest::Transcribe).unwrap();
    h.pipeline.run(StageRequest::Storyboard).unwrap();
    let before = h.pipeline.session().clone();

    let err = h.pipeline.run(StageRequest::Storyboard).unwrap_err();

    assert!(matches!(err, StudioError::Service(_)));
    assert_eq!(h.pipeline.session(), &before);
}

#[test]
fn text_stages_are_idempotent_with_a_deterministic_gateway() {
    let mut h = harness(
        MockGateway::new().with_transcript("alpha\nbeta"),
        MockAssembler::new(),
    );
    h.pipeline.run(script("Why is the sky blue?")).unwrap();
    h.pipeline
        .run(StageRequest::SynthesizeAudio {
            voice: Voice::Alloy,
        })
        .unwrap();

    for request in [
        StageRequest::Transcribe,
        StageRequest::Storyboard,
        StageRequest::Metadata,
    ] {
        h.pipeline.run(request.clone()).unwrap();
        let once = h.pipeline.session().clone();
        h.pipeline.run(request).unwrap();
        assert_eq!(h.pipeline.session(), &once);
    }
}

#[test]
fn regenerated_audio_gets_a_fresh_file() {
    let mut h = harness(MockGateway::new(), MockAssembler::new());
    h.pipeline.run(script("tides")).unwrap();

    h.pipeline
        .run(StageRequest::SynthesizeAudio {
            voice: Voice::Alloy,
        })
        .unwrap();
    let first = h.pipeline.session().audio_path().unwrap().to_path_buf();
    h.pipeline
        .run(StageRequest::SynthesizeAudio {
            voice: Voice::Male,
        })
        .unwrap();
    let second = h.pipeline.session().audio_path().unwrap().to_path_buf();

    assert_ne!(first, second);
    assert!(first.exists());
    assert!(second.exists());
}

#[test]
fn assembler_failure_keeps_session() {
    let mut h = harness(
        MockGateway::new().with_transcript("only line"),
        MockAssembler::new().with_failure(),
    );
    h.pipeline.run(script("tides")).unwrap();
    h.pipeline
        .run(StageRequest::SynthesizeAudio {
            voice: Voice::Alloy,
        })
        .unwrap();
    h.pipeline.run(StageRequest::Transcribe).unwrap();
    h.pipeline.run(StageRequest::Storyboard).unwrap();
    let before = h.pipeline.session().clone();

    let err = h.pipeline.run(StageRequest::Video).unwrap_err();

    assert!(matches!(err, StudioError::Assembly(_)));
    assert_eq!(h.pipeline.session(), &before);
    assert!(h.pipeline.can_run(Stage::Video).is_ok());
}
