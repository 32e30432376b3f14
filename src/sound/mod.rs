//! Sound and flash alerts for the Pomodoro board.
//!
//! This module provides the alert fired on every phase completion:
//!
//! - A synthesized three-tone chime
//! - Non-blocking playback on a dedicated audio thread
//! - A visual flash flag for the render target
//! - Graceful degradation to flash-only when audio is unavailable
//!
//! Alerts are silenced by not attaching a player (`sound = false`).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   AlertTrigger   │ ← fire()
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   SoundPlayer    │────▶│   AudioThread    │──▶ rodio
//! │                  │     ├──────────────────┤
//! │                  │────▶│ MockSoundPlayer  │
//! └──────────────────┘     └──────────────────┘
//! ```

mod alert;
mod chime;
mod error;
mod player;

pub use alert::AlertTrigger;
pub use chime::Chime;
pub use error::{FailureLog, SoundError};
pub use player::try_create_player;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Trait for sound playback implementations.
///
/// Implementations must be shareable across tasks.
pub trait SoundPlayer: Send + Sync {
    /// Plays a chime. Non-blocking; the sound plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback cannot be started.
    fn play(&self, chime: &Chime) -> Result<(), SoundError>;
}

/// Mock sound player for testing.
#[derive(Debug)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<Chime>>,
    should_fail: AtomicBool,
}

impl Default for MockSoundPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            play_calls: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.calls().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<Chime> {
        self.calls().clone()
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Vec<Chime>> {
        self.play_calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, chime: &Chime) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.calls().push(chime.clone());
        Ok(())
    }
}
