//! Binary artifacts: scratch storage, WAV inspection and video assembly.

pub mod assembler;
pub mod ffmpeg;
pub mod resources;
pub mod wav;

pub use assembler::{MockAssembler, SlideSpec, VideoAssembler, VideoPlan};
pub use ffmpeg::FfmpegAssembler;
pub use resources::ResourceStore;
