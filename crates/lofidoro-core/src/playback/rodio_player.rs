//! `rodio` backed [`AudioPlayer`].
//!
//! The output stream is not `Send`, so a dedicated thread opens it and keeps
//! it alive until the player is dropped. Everything else (the stream handle,
//! sinks, decoders) is shared behind mutexes.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

use super::player::{AudioPlayer, Repeat, Volume};
use crate::error::AudioError;

type TrackSource = Decoder<BufReader<File>>;

pub struct RodioPlayer {
    handle: OutputStreamHandle,
    sink: Mutex<Option<Sink>>,
    loaded: Mutex<Option<TrackSource>>,
    volume: Mutex<Volume>,
    // Dropping the sender releases the stream thread.
    _keepalive: Sender<()>,
}

impl RodioPlayer {
    /// Open the default output device.
    ///
    /// # Errors
    /// Returns [`AudioError::OutputUnavailable`] if no device can be opened.
    pub fn new(volume: Volume) -> Result<Self, AudioError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (keepalive, shutdown) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    // Blocks until the player is dropped.
                    let _ = shutdown.recv();
                    drop(stream);
                    debug!("audio output closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(AudioError::OutputUnavailable(e.to_string())));
                }
            })
            .map_err(|e| AudioError::OutputUnavailable(e.to_string()))?;

        let handle = ready_rx
            .recv()
            .map_err(|_| AudioError::OutputUnavailable("audio thread exited".into()))??;

        Ok(Self {
            handle,
            sink: Mutex::new(None),
            loaded: Mutex::new(None),
            volume: Mutex::new(volume),
            _keepalive: keepalive,
        })
    }
}

impl AudioPlayer for RodioPlayer {
    fn load(&self, track: &Path) -> Result<(), AudioError> {
        let load_failed = |message: String| AudioError::LoadFailed {
            track: track.to_path_buf(),
            message,
        };
        let file = File::open(track).map_err(|e| load_failed(e.to_string()))?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| load_failed(e.to_string()))?;
        *lock(&self.loaded) = Some(source);
        Ok(())
    }

    fn play(&self, repeat: Repeat) -> Result<(), AudioError> {
        let source = lock(&self.loaded).take().ok_or(AudioError::NothingLoaded)?;
        let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::PlayFailed(e.to_string()))?;
        sink.set_volume(lock(&self.volume).get());
        match repeat {
            Repeat::Once => sink.append(source),
            Repeat::Forever => sink.append(source.repeat_infinite()),
        }
        if let Some(previous) = lock(&self.sink).replace(sink) {
            previous.stop();
        }
        Ok(())
    }

    fn stop(&self) {
        if let Some(sink) = lock(&self.sink).take() {
            sink.stop();
        }
    }

    fn pause(&self) {
        if let Some(sink) = lock(&self.sink).as_ref() {
            sink.pause();
        }
    }

    fn unpause(&self) {
        if let Some(sink) = lock(&self.sink).as_ref() {
            sink.play();
        }
    }

    fn is_playing(&self) -> bool {
        lock(&self.sink)
            .as_ref()
            .is_some_and(|sink| !sink.empty() && !sink.is_paused())
    }

    fn set_volume(&self, volume: Volume) {
        *lock(&self.volume) = volume;
        if let Some(sink) = lock(&self.sink).as_ref() {
            sink.set_volume(volume.get());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
