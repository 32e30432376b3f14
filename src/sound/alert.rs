//! Alert trigger for phase completions.
//!
//! Plays the chime (when audio is available) and raises a visual flash
//! flag for a fixed time. `fire` never blocks and never fails.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{sleep, Duration};

use super::chime::Chime;
use super::error::FailureLog;
use super::SoundPlayer;

/// How long the flash flag stays raised.
pub const FLASH_DURATION: Duration = Duration::from_millis(1500);

/// Sound plus flash alert.
#[derive(Clone)]
pub struct AlertTrigger {
    player: Option<Arc<dyn SoundPlayer>>,
    chime: Arc<Chime>,
    flash: Arc<watch::Sender<bool>>,
    /// Bumped on every flash so an older expiry cannot lower a newer flash
    generation: Arc<AtomicU64>,
    failures: FailureLog,
}

impl AlertTrigger {
    /// Creates a trigger. Without a player, alerts are flash-only.
    pub fn new(player: Option<Arc<dyn SoundPlayer>>) -> Self {
        let (flash, _) = watch::channel(false);
        Self {
            player,
            chime: Arc::new(Chime::default()),
            flash: Arc::new(flash),
            generation: Arc::new(AtomicU64::new(0)),
            failures: FailureLog::default(),
        }
    }

    /// Shares `log` with the audio thread so a failing device warns once.
    #[must_use]
    pub fn with_failure_log(mut self, log: FailureLog) -> Self {
        self.failures = log;
        self
    }

    /// Creates a flash-only trigger.
    pub fn silent() -> Self {
        Self::new(None)
    }

    /// Plays the chime and raises the flash flag.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fire(&self) {
        self.play_chime();
        self.raise_flash();
    }

    fn play_chime(&self) {
        let Some(player) = &self.player else {
            return;
        };
        if let Err(e) = player.play(&self.chime) {
            self.failures.report("Chime failed", &e);
        }
    }

    fn raise_flash(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.flash.send_replace(true);

        let flash = Arc::clone(&self.flash);
        let current = Arc::clone(&self.generation);
        tokio::spawn(async move {
            sleep(FLASH_DURATION).await;
            if current.load(Ordering::SeqCst) == generation {
                flash.send_replace(false);
            }
        });
    }

    /// Returns true while the flash flag is raised.
    pub fn is_flashing(&self) -> bool {
        *self.flash.borrow()
    }

    /// Subscribes to flash flag changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flash.subscribe()
    }

    /// Returns true if a sound player is attached.
    pub fn has_sound(&self) -> bool {
        self.player.is_some()
    }
}

impl std::fmt::Debug for AlertTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertTrigger")
            .field("has_sound", &self.has_sound())
            .field("flashing", &self.is_flashing())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::{MockSoundPlayer, SoundError};

    fn with_mock() -> (AlertTrigger, Arc<MockSoundPlayer>) {
        let player = Arc::new(MockSoundPlayer::new());
        (AlertTrigger::new(Some(player.clone())), player)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_plays_and_flashes() {
        let (alert, player) = with_mock();

        alert.fire();

        assert_eq!(player.get_play_calls(), vec![Chime::default()]);
        assert!(alert.is_flashing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flash_lasts_duration() {
        let (alert, _player) = with_mock();

        alert.fire();
        sleep(Duration::from_millis(1400)).await;
        assert!(alert.is_flashing());

        sleep(Duration::from_millis(200)).await;
        assert!(!alert.is_flashing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_flashes_extend() {
        let (alert, _player) = with_mock();

        alert.fire();
        sleep(Duration::from_millis(1000)).await;
        alert.fire();

        sleep(Duration::from_millis(600)).await;
        assert!(alert.is_flashing());

        sleep(Duration::from_millis(1000)).await;
        assert!(!alert.is_flashing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_trigger_still_flashes() {
        let alert = AlertTrigger::silent();
        assert!(!alert.has_sound());

        alert.fire();
        assert!(alert.is_flashing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_player_failure_is_swallowed() {
        let (alert, player) = with_mock();
        player.set_should_fail(true);

        alert.fire();
        alert.fire();

        assert!(alert.is_flashing());
        assert_eq!(player.play_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_share_log_with_audio_thread() {
        let player = Arc::new(MockSoundPlayer::new());
        player.set_should_fail(true);
        let log = FailureLog::default();
        // The audio thread already warned about a lost device.
        log.report("Failed to play chime", &SoundError::ThreadStopped);

        let alert = AlertTrigger::new(Some(player.clone())).with_failure_log(log.clone());
        alert.fire();

        assert!(log.has_warned());
        assert!(!log.report("Chime failed", &SoundError::ThreadStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_flash() {
        let (alert, _player) = with_mock();
        let mut rx = alert.subscribe();

        alert.fire();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }
}
