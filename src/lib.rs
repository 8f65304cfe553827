//! Headless core of a falling-note MIDI visualizer: a Standard MIDI File and
//! live-stream decoder, a tick-ordered event store, and a small config
//! language that recolors and animates notes as playback proceeds.

use thiserror::*;

pub mod color;
pub mod configlang;
pub mod input;
pub mod midi;
pub mod model;
pub mod player;
pub mod runtime;
pub mod selector;
pub mod track;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] input::InputError),
    #[error(transparent)]
    Config(#[from] configlang::ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
