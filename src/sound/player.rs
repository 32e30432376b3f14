//! Sound player implementation using rodio.
//!
//! rodio's `OutputStream` must stay on the thread that created it, so
//! playback runs on a dedicated audio thread. [`AudioThread`] is the
//! `Send + Sync` front that forwards chimes to it over a channel.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use super::chime::{Chime, SAMPLE_RATE};
use super::error::{FailureLog, SoundError};
use super::SoundPlayer;

/// A sound player that uses rodio for audio playback.
///
/// Not `Send`: create and use it on one thread.
pub struct RodioSoundPlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
}

impl RodioSoundPlayer {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }

    /// Renders and plays a chime. Non-blocking.
    pub fn play(&self, chime: &Chime) -> Result<(), SoundError> {
        let samples = chime.render(SAMPLE_RATE);
        let buffer = SamplesBuffer::new(1, SAMPLE_RATE, samples);

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        sink.append(buffer);
        sink.detach();

        debug!("Chime playback started (detached)");
        Ok(())
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer").finish_non_exhaustive()
    }
}

// ============================================================================
// AudioThread
// ============================================================================

/// Handle to the thread that owns the rodio player.
#[derive(Debug)]
pub struct AudioThread {
    tx: Sender<Chime>,
}

impl AudioThread {
    /// Starts the audio thread and waits until the device is opened.
    ///
    /// Playback failures on the thread go to `log`.
    ///
    /// # Errors
    ///
    /// Returns the device error if the output stream cannot be opened.
    pub fn spawn(log: FailureLog) -> Result<Self, SoundError> {
        let (tx, rx) = unbounded::<Chime>();
        let (ready_tx, ready_rx) = bounded::<Result<(), SoundError>>(1);

        thread::Builder::new()
            .name("audio".to_string())
            .spawn(move || {
                let player = match RodioSoundPlayer::new() {
                    Ok(player) => {
                        let _ = ready_tx.send(Ok(()));
                        player
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                play_queued(&rx, |chime| player.play(chime), &log);
                debug!("Audio thread stopped");
            })
            .map_err(|e| SoundError::PlaybackError(e.to_string()))?;

        ready_rx.recv().map_err(|_| SoundError::ThreadStopped)??;

        Ok(Self { tx })
    }
}

/// Plays chimes until every sender is gone.
fn play_queued<F>(rx: &Receiver<Chime>, mut play: F, log: &FailureLog)
where
    F: FnMut(&Chime) -> Result<(), SoundError>,
{
    for chime in rx {
        if let Err(e) = play(&chime) {
            log.report("Failed to play chime", &e);
        }
    }
}

impl SoundPlayer for AudioThread {
    fn play(&self, chime: &Chime) -> Result<(), SoundError> {
        self.tx
            .send(chime.clone())
            .map_err(|_| SoundError::ThreadStopped)
    }
}

/// Starts the audio thread, returning None if audio is unavailable.
///
/// If audio initialization fails, it is reported to `log` and None is
/// returned.
#[must_use]
pub fn try_create_player(log: &FailureLog) -> Option<Arc<AudioThread>> {
    match AudioThread::spawn(log.clone()) {
        Ok(player) => Some(Arc::new(player)),
        Err(e) => {
            log.report("Audio not available", &e);
            None
        }
    }
}
