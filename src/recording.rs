//! Video recording side channel.
//!
//! Screen capture of the display is an external collaborator; the core only
//! drives a start/stop toggle and reports where the footage landed.

use std::path::PathBuf;

use crate::error::RecordingError;

/// Token identifying one in-progress recording. `Copy` so the dispatcher can
/// keep it across a failed stop without losing the toggle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingHandle(pub u64);

/// Contract for the recording collaborator.
pub trait RecordingBackend {
    /// Start capturing. Synchronous; failure leaves nothing recording.
    fn start(&mut self) -> Result<RecordingHandle, RecordingError>;

    /// Stop the given recording and report the output path.
    fn stop(&mut self, handle: RecordingHandle) -> Result<PathBuf, RecordingError>;
}

/// Backend that records nothing but keeps the toggle protocol honest.
/// Used as the default wiring and in tests.
#[derive(Debug)]
pub struct NullRecorder {
    output_dir: PathBuf,
    next_id: u64,
}

impl NullRecorder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            next_id: 1,
        }
    }
}

impl Default for NullRecorder {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl RecordingBackend for NullRecorder {
    fn start(&mut self) -> Result<RecordingHandle, RecordingError> {
        let handle = RecordingHandle(self.next_id);
        self.next_id += 1;
        log::info!("recording {} started (null backend)", handle.0);
        Ok(handle)
    }

    fn stop(&mut self, handle: RecordingHandle) -> Result<PathBuf, RecordingError> {
        Ok(self.output_dir.join(format!("recording_{}.mp4", handle.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_recorder_handles_are_distinct() {
        let mut recorder = NullRecorder::default();
        let a = recorder.start().unwrap();
        let b = recorder.start().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_stop_reports_path_for_handle() {
        let mut recorder = NullRecorder::new("/tmp/footage");
        let handle = recorder.start().unwrap();
        let path = recorder.stop(handle).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/footage/recording_1.mp4"));
    }
}
