//! Live playback to a MIDI output port.
//!
//! The pattern is flattened once into a schedule of wall-clock offsets and
//! raw messages, then a worker thread sends them through `midir`. Pause,
//! resume and stop travel to the worker over a channel.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use midir::{MidiOutput, MidiOutputConnection};
use midly::{live::LiveEvent, num::u4};

use super::export::{Timeline, TICKS_PER_QUARTER};
use crate::error::SonifyError;
use crate::pattern::Pattern;

const DEFAULT_BPM: u32 = 120;
const ALL_NOTES_OFF: u8 = 123;

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerCommand {
    Pause,
    Resume,
    Stop,
}

/// Converts ticks to wall-clock time through a tempo map.
#[derive(Debug, Clone)]
pub struct TempoMap {
    /// `(tick, seconds at tick, seconds per tick)`
    segments: Vec<(u32, f64, f64)>,
}

fn seconds_per_tick(bpm: u32) -> f64 {
    60.0 / f64::from(bpm.max(1)) / f64::from(TICKS_PER_QUARTER)
}

impl TempoMap {
    /// `tempos` must be sorted by tick; ticks before the first entry run at
    /// 120 bpm.
    pub fn new(tempos: &[(u32, u32)]) -> Self {
        let mut segments = vec![(0, 0.0, seconds_per_tick(DEFAULT_BPM))];
        for &(tick, bpm) in tempos {
            let rate = seconds_per_tick(bpm);
            let Some(last) = segments.last_mut() else {
                continue;
            };
            if tick <= last.0 {
                last.2 = rate;
            } else {
                let at = last.1 + f64::from(tick - last.0) * last.2;
                segments.push((tick, at, rate));
            }
        }
        Self { segments }
    }

    pub fn at(&self, tick: u32) -> Duration {
        let (start, offset, rate) = self
            .segments
            .iter()
            .rev()
            .find(|(start, _, _)| *start <= tick)
            .copied()
            .unwrap_or((0, 0.0, seconds_per_tick(DEFAULT_BPM)));
        let seconds = offset + f64::from(tick - start) * rate;
        Duration::from_nanos((seconds * 1e9).round() as u64)
    }
}

/// Wall-clock offsets and encoded messages for a pattern.
pub fn schedule(pattern: &Pattern) -> Result<Vec<(Duration, Vec<u8>)>, SonifyError> {
    let timeline = Timeline::from_pattern(pattern);
    let tempo = TempoMap::new(&timeline.tempos);
    timeline
        .messages
        .iter()
        .map(|m| {
            let mut bytes = Vec::with_capacity(3);
            LiveEvent::Midi {
                channel: u4::new(m.channel),
                message: m.message,
            }
            .write_std(&mut bytes)?;
            Ok((tempo.at(m.tick), bytes))
        })
        .collect()
}

fn silence(connection: &mut MidiOutputConnection) {
    send_all_notes_off(|bytes| connection.send(bytes));
}

/// All-notes-off on every channel. Returns how many sends failed.
fn send_all_notes_off<E: std::fmt::Display>(
    mut send: impl FnMut(&[u8]) -> Result<(), E>,
) -> usize {
    let mut failed = 0;
    for channel in 0..16u8 {
        if let Err(e) = send(&[0xB0 | channel, ALL_NOTES_OFF, 0]) {
            warn!("all-notes-off on channel {channel} failed: {e}");
            failed += 1;
        }
    }
    failed
}

fn set_state(state: &Mutex<PlayState>, value: PlayState) {
    *state.lock().unwrap_or_else(|e| e.into_inner()) = value;
}

/// Cloneable control for a running [`Player`], usable from signal handlers.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    tx: Sender<PlayerCommand>,
}

impl PlayerHandle {
    pub fn stop(&self) {
        let _ = self.tx.send(PlayerCommand::Stop);
    }
}

/// An active playback on a MIDI output port.
pub struct Player {
    tx: Sender<PlayerCommand>,
    state: Arc<Mutex<PlayState>>,
    worker: Option<JoinHandle<()>>,
    port_name: String,
}

impl Player {
    /// Start playing `pattern` on the first output port whose name contains
    /// `port_filter`, or the first port when no filter is given.
    pub fn start(pattern: &Pattern, port_filter: Option<&str>) -> Result<Self, SonifyError> {
        let events = schedule(pattern)?;
        let midi_out =
            MidiOutput::new("textsound").map_err(|e| SonifyError::Midi(format!("init: {e}")))?;

        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(SonifyError::Midi("no MIDI output ports available".into()));
        }
        let (port, port_name) = match port_filter {
            Some(filter) => ports
                .iter()
                .find_map(|p| {
                    let name = midi_out.port_name(p).unwrap_or_default();
                    name.contains(filter).then(|| (p.clone(), name))
                })
                .ok_or_else(|| {
                    SonifyError::Midi(format!("MIDI output matching '{filter}' not found"))
                })?,
            None => {
                let p = ports[0].clone();
                let name = midi_out
                    .port_name(&p)
                    .unwrap_or_else(|_| "unknown".to_string());
                (p, name)
            }
        };

        let mut connection = midi_out
            .connect(&port, "textsound-output")
            .map_err(|e| SonifyError::Midi(format!("connect: {e}")))?;
        info!("playing {} messages on '{port_name}'", events.len());

        let (tx, rx) = mpsc::channel();
        let state = Arc::new(Mutex::new(PlayState::Playing));
        let worker_state = Arc::clone(&state);
        let worker = std::thread::spawn(move || {
            let start = Instant::now();
            let mut paused_for = Duration::ZERO;
            'events: for (at, bytes) in events {
                loop {
                    let elapsed = start.elapsed().saturating_sub(paused_for);
                    if elapsed >= at {
                        break;
                    }
                    match rx.recv_timeout(at - elapsed) {
                        Err(RecvTimeoutError::Timeout) | Ok(PlayerCommand::Resume) => {}
                        Ok(PlayerCommand::Pause) => {
                            silence(&mut connection);
                            set_state(&worker_state, PlayState::Paused);
                            let paused_at = Instant::now();
                            loop {
                                match rx.recv() {
                                    Ok(PlayerCommand::Resume) => break,
                                    Ok(PlayerCommand::Pause) => {}
                                    Ok(PlayerCommand::Stop) | Err(_) => break 'events,
                                }
                            }
                            paused_for += paused_at.elapsed();
                            set_state(&worker_state, PlayState::Playing);
                        }
                        Ok(PlayerCommand::Stop) | Err(RecvTimeoutError::Disconnected) => {
                            break 'events;
                        }
                    }
                }
                if let Err(e) = connection.send(&bytes) {
                    warn!("MIDI send failed: {e}");
                }
            }
            silence(&mut connection);
            set_state(&worker_state, PlayState::Stopped);
            connection.close();
            debug!("playback finished");
        });

        Ok(Self {
            tx,
            state,
            worker: Some(worker),
            port_name,
        })
    }

    pub fn pause(&self) {
        let _ = self.tx.send(PlayerCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.tx.send(PlayerCommand::Resume);
    }

    pub fn stop(&self) {
        let _ = self.tx.send(PlayerCommand::Stop);
    }

    pub fn state(&self) -> PlayState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn handle(&self) -> PlayerHandle {
        PlayerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Block until playback ends or is stopped.
    pub fn wait(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    /// Names of all MIDI output ports.
    pub fn list_ports() -> Vec<String> {
        let Ok(midi_out) = MidiOutput::new("textsound-list") else {
            return Vec::new();
        };
        midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect()
    }
}
