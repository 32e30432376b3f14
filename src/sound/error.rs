//! Sound system error types.
//!
//! Audio problems never stop the timer; these errors are logged and the
//! alert degrades to a visual flash.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Failed to create the audio output sink.
    #[error("failed to create audio stream: {0}")]
    StreamError(String),

    /// The audio thread has exited.
    #[error("audio thread is not running")]
    ThreadStopped,

    /// Generic sound playback error.
    #[error("sound playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "Connect an audio output device",
            Self::StreamError(_) => "Check the system audio settings",
            Self::ThreadStopped => "Restart the daemon",
            Self::PlaybackError(_) => "Set `sound = false` in the config to silence alerts",
        }
    }
}

/// Audio failure log shared by the alert trigger and the audio thread.
///
/// The first failure is a warning with a suggestion; later ones are
/// debug-level only.
#[derive(Debug, Clone, Default)]
pub struct FailureLog {
    warned: Arc<AtomicBool>,
}

impl FailureLog {
    /// Logs `err`. Returns true if it was logged as a warning.
    pub fn report(&self, context: &str, err: &SoundError) -> bool {
        if self.warned.swap(true, Ordering::Relaxed) {
            debug!("{}: {}", context, err);
            false
        } else {
            warn!("{}, alerts will flash only: {} ({})", context, err, err.suggestion());
            true
        }
    }

    /// Returns true once a warning has been logged.
    pub fn has_warned(&self) -> bool {
        self.warned.load(Ordering::Relaxed)
    }
}
