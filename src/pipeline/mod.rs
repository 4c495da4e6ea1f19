//! The six production stages and the controller that gates them.
//!
//! Each stage is a free function over `&mut Session` plus one external
//! collaborator. A stage reads its inputs, calls out, and writes its single
//! output artifact last, so a failure anywhere leaves the session as it was.

pub mod audio;
pub mod controller;
pub mod metadata;
pub mod script;
pub mod stage;
pub mod storyboard;
pub mod transcription;
pub mod video;

pub use controller::Pipeline;
pub use stage::{Stage, StageRequest};
pub use transcription::segment_transcript;
