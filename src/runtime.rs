mod action;
pub use action::*;

mod animatable;
pub use animatable::*;

mod condition;
pub use condition::*;

mod reader;
pub use reader::*;

mod scene;
pub use scene::*;

mod transition;
pub use transition::*;

/// Playback state handed to the interpreter once per tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub ticks_per_quarter_note: f64,
    pub ticks_per_second: f64,
    /// Last tick of the input, if it has one.
    pub end_tick: Option<u64>,
    pub mode: PlaybackMode,
}

impl TickContext {
    /// A context at `tick` with 480 ticks per quarter note at 120 bpm.
    pub fn at(tick: u64) -> Self {
        TickContext {
            tick,
            ticks_per_quarter_note: 480.0,
            ticks_per_second: 960.0,
            end_tick: None,
            mode: PlaybackMode::Play,
        }
    }
}
