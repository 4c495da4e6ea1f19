//! WAV inspection for session audio.
//!
//! Only used to report durations; audio is never decoded or resampled.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

/// Header facts about a WAV resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration: Duration,
}

/// Read the WAV header from any reader.
///
/// Returns `None` when the data is not a parseable WAV stream (e.g. an
/// uploaded MP3).
pub fn inspect_reader<R: Read>(reader: R) -> Option<WavInfo> {
    let wav_reader = hound::WavReader::new(reader).ok()?;
    let spec = wav_reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    // duration() is in frames (samples per channel)
    let frames = wav_reader.duration();
    Some(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration: Duration::from_secs_f64(f64::from(frames) / f64::from(spec.sample_rate)),
    })
}

pub fn inspect_bytes(data: &[u8]) -> Option<WavInfo> {
    inspect_reader(data)
}

pub fn inspect_file(path: &Path) -> Option<WavInfo> {
    let file = File::open(path).ok()?;
    inspect_reader(BufReader::new(file))
}

#[cfg(test)]
pub(crate) fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inspect_mono_one_second() {
        let data = make_wav_data(16000, 1, &vec![0i16; 16000]);
        let info = inspect_bytes(&data).unwrap();
        assert_eq!(info.sample_rate, 16000);
        assert_eq!(info.channels, 1);
        assert_eq!(info.duration, Duration::from_secs(1));
    }

    #[test]
    fn inspect_stereo_counts_frames_not_samples() {
        // 2 channels × 24000 frames at 24kHz = 1 second
        let data = make_wav_data(24000, 2, &vec![0i16; 48000]);
        let info = inspect_bytes(&data).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.duration, Duration::from_secs(1));
    }

    #[test]
    fn inspect_non_wav_returns_none() {
        assert!(inspect_bytes(b"ID3\x04\0\0\0\0mp3 data").is_none());
        assert!(inspect_bytes(&[]).is_none());
    }

    #[test]
    fn inspect_file_reads_from_disk() {
        let data = make_wav_data(8000, 1, &vec![0i16; 4000]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        let info = inspect_file(file.path()).unwrap();
        assert_eq!(info.duration, Duration::from_millis(500));
    }

    #[test]
    fn inspect_missing_file_returns_none() {
        assert!(inspect_file(Path::new("/nonexistent/tldr/audio.wav")).is_none());
    }
}
