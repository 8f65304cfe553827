use super::{InputError, InputState};
use crate::midi::{Event, StreamDecoder, StreamError};
use crate::track::{Division, Track};

use crossbeam::channel::{Receiver, SendTimeoutError, Sender, TryRecvError};
use log::{debug, error, info};
use std::fs::File;
use std::io::{self, Read};
use std::num::NonZeroU16;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DeviceConfig {
    /// Events kept in the live track; older ones are dropped.
    pub max_events: usize,
    /// Capacity of the queue between the reader thread and `update()`.
    pub queue_capacity: usize,
    pub ticks_per_quarter: NonZeroU16,
}

const DEFAULT_TICKS_PER_QUARTER: NonZeroU16 = match NonZeroU16::new(30) {
    Some(tpq) => tpq,
    None => panic!("zero ticks per quarter note"),
};

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            max_events: 4096,
            queue_capacity: 1024,
            ticks_per_quarter: DEFAULT_TICKS_PER_QUARTER,
        }
    }
}

#[derive(Debug)]
enum DeviceMessage {
    Connected,
    Event(Event),
    Failed(String),
}

/// Live MIDI input read on a background thread.
///
/// The consumer owns the playback clock: the thread only reads it to stamp
/// events, and `update()` is the only writer.
pub struct DeviceInput {
    name: String,
    track: Track,
    division: Division,
    state: InputState,
    clock: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    receiver: Option<Receiver<DeviceMessage>>,
    handle: Option<JoinHandle<()>>,
}

impl DeviceInput {
    /// Opens the device node at `path` on the reader thread.
    pub fn open(path: impl Into<PathBuf>, config: DeviceConfig) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self::spawn(name, config, move || File::open(&path))
    }

    /// Reads live MIDI from any byte stream.
    pub fn from_reader<R>(name: impl Into<String>, reader: R, config: DeviceConfig) -> Self
    where
        R: Read + Send + 'static,
    {
        Self::spawn(name.into(), config, move || Ok(reader))
    }

    fn spawn<R, F>(name: String, config: DeviceConfig, connect: F) -> Self
    where
        R: Read,
        F: FnOnce() -> io::Result<R> + Send + 'static,
    {
        let (tx, rx) = crossbeam::channel::bounded(config.queue_capacity.max(1));
        let clock = Arc::new(AtomicU64::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let thread_clock = Arc::clone(&clock);
        let thread_stop = Arc::clone(&stop);
        let thread_name = name.clone();
        let spawned = thread::Builder::new()
            .name(format!("midi-device:{}", name))
            .spawn(move || match connect() {
                Ok(reader) => {
                    info!("Connected to MIDI device {}", thread_name);
                    if send(&tx, DeviceMessage::Connected, &thread_stop) {
                        device_thread(reader, &tx, &thread_clock, &thread_stop);
                    }
                }
                Err(e) => {
                    error!("Could not open MIDI device {}: {}", thread_name, e);
                    send(&tx, DeviceMessage::Failed(e.to_string()), &thread_stop);
                }
            });

        let (state, handle) = match spawned {
            Ok(handle) => (InputState::Connecting, Some(handle)),
            Err(e) => {
                error!("Could not start MIDI device thread: {}", e);
                (InputState::Failed(e.to_string()), None)
            }
        };
        DeviceInput {
            name,
            track: Track::bounded(config.max_events),
            division: Division::Metrical {
                ticks_per_quarter: config.ticks_per_quarter,
            },
            state,
            clock,
            stop,
            receiver: Some(rx),
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn division(&self) -> Division {
        self.division
    }

    pub fn current_tick(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn find_events_in_range(&self, start: u64, end: u64) -> impl Iterator<Item = &Event> + '_ {
        self.track.find_events_in_range(start, end)
    }

    fn fail(&mut self, reason: String) -> InputError {
        error!("MIDI device {} failed: {}", self.name, reason);
        self.state = InputState::Failed(reason.clone());
        InputError::DeviceFailed(reason)
    }

    /// Moves received events into the live track, then advances the clock by
    /// one tick.
    pub fn update(&mut self) -> Result<(), InputError> {
        if let InputState::Failed(reason) = &self.state {
            return Err(InputError::DeviceFailed(reason.clone()));
        }
        let now = self.clock.load(Ordering::Acquire);
        loop {
            let received = match &self.receiver {
                Some(rx) => rx.try_recv(),
                None => Err(TryRecvError::Disconnected),
            };
            match received {
                Ok(DeviceMessage::Connected) => {
                    debug!("MIDI device {} is streaming", self.name);
                    self.state = InputState::Streaming;
                }
                Ok(DeviceMessage::Event(mut event)) => {
                    // Stamped before the previous drain but read after it.
                    event.tick = event.tick.max(now);
                    self.track.add_event(event);
                }
                Ok(DeviceMessage::Failed(reason)) => return Err(self.fail(reason)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(self.fail("device thread exited".to_owned()))
                }
            }
        }
        self.clock.store(now + 1, Ordering::Release);
        Ok(())
    }

    /// Stops the reader thread. A thread blocked in a read exits once its
    /// read returns.
    pub fn close(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.receiver = None;
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for DeviceInput {
    fn drop(&mut self) {
        self.close();
    }
}

fn send(tx: &Sender<DeviceMessage>, msg: DeviceMessage, stop: &AtomicBool) -> bool {
    let mut msg = msg;
    loop {
        match tx.send_timeout(msg, SEND_TIMEOUT) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(returned)) => {
                if stop.load(Ordering::Acquire) {
                    return false;
                }
                msg = returned;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

fn device_thread<R: Read>(reader: R, tx: &Sender<DeviceMessage>, clock: &AtomicU64, stop: &AtomicBool) {
    let mut decoder = StreamDecoder::new(reader);
    loop {
        if stop.load(Ordering::Acquire) {
            debug!("MIDI device thread stopping");
            return;
        }
        match decoder.next_event() {
            Ok(Some(kind)) => {
                let event = Event::new(clock.load(Ordering::Acquire), kind);
                if !send(tx, DeviceMessage::Event(event), stop) {
                    return;
                }
            }
            Ok(None) => {}
            Err(StreamError::Closed) => {
                send(tx, DeviceMessage::Failed(StreamError::Closed.to_string()), stop);
                return;
            }
            Err(e) => {
                error!(
                    "MIDI device stream error after {} bytes: {}",
                    decoder.consumed(),
                    e
                );
                send(tx, DeviceMessage::Failed(e.to_string()), stop);
                return;
            }
        }
    }
}
