//! Optional platform capabilities (OCR, speech-to-text) behind one
//! interface with a runtime availability check.

use crate::error::{EngineError, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(&'static str),
}

/// Text capture from images and audio.
///
/// Platform backends implement this; callers probe `availability` first and
/// get a typed `CapabilityUnavailable` error rather than a stubbed success
/// when the platform has no backend.
pub trait TextCapture: Send + Sync {
    fn availability(&self) -> Availability;
    fn extract_text_from_image(&self, image_path: &Path) -> Result<String>;
    fn recognize_from_audio(&self, audio_path: &Path) -> Result<String>;
}

/// Default backend for platforms without OCR or speech recognition.
pub struct UnavailableCapture;

impl TextCapture for UnavailableCapture {
    fn availability(&self) -> Availability {
        Availability::Unavailable("no text-capture backend on this platform")
    }

    fn extract_text_from_image(&self, _image_path: &Path) -> Result<String> {
        Err(EngineError::CapabilityUnavailable("image text extraction"))
    }

    fn recognize_from_audio(&self, _audio_path: &Path) -> Result<String> {
        Err(EngineError::CapabilityUnavailable("speech recognition"))
    }
}
