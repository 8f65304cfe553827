use super::{TickContext, Time};
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PlaybackMode {
    /// Playing back a file.
    Play,
    /// Following live input.
    Realtime,
}

impl PlaybackMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "play" => Some(PlaybackMode::Play),
            "realtime" => Some(PlaybackMode::Realtime),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            PlaybackMode::Play => "play",
            PlaybackMode::Realtime => "realtime",
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Condition {
    /// Met the first time it is checked.
    Startup,
    /// Met once playback reaches the given time.
    Time(Time),
    /// Met once playback reaches the end of the input.
    End,
    /// Met whenever playback enters the mode.
    Mode(PlaybackMode),
}

impl Condition {
    /// `previous_mode` is the mode seen at the last check, `None` if never checked.
    pub fn is_met(&self, ctx: &TickContext, previous_mode: Option<PlaybackMode>) -> bool {
        match self {
            Condition::Startup => true,
            Condition::Time(time) => ctx.tick as f64 >= time.to_ticks(ctx),
            Condition::End => ctx.end_tick.map_or(false, |end| ctx.tick >= end),
            Condition::Mode(mode) => ctx.mode == *mode && previous_mode != Some(*mode),
        }
    }

    pub fn has_expired(&self, ctx: &TickContext) -> bool {
        match self {
            Condition::Mode(_) => false,
            other => other.is_met(ctx, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditions() {
        let ctx = TickContext::at(100);
        assert!(Condition::Startup.is_met(&ctx, None));
        assert!(Condition::Startup.has_expired(&ctx));

        let at = Condition::Time(Time::ticks(120.0));
        assert!(!at.is_met(&ctx, None));
        assert!(!at.has_expired(&ctx));
        assert!(at.is_met(&TickContext::at(120), None));

        assert!(!Condition::End.is_met(&ctx, None));
        let ending = TickContext {
            end_tick: Some(100),
            ..ctx
        };
        assert!(Condition::End.is_met(&ending, None));

        let realtime = Condition::Mode(PlaybackMode::Realtime);
        let live = TickContext {
            mode: PlaybackMode::Realtime,
            ..ctx
        };
        assert!(realtime.is_met(&live, None));
        assert!(realtime.is_met(&live, Some(PlaybackMode::Play)));
        assert!(!realtime.is_met(&live, Some(PlaybackMode::Realtime)));
        assert!(!realtime.is_met(&ctx, None));
        assert!(!realtime.has_expired(&live));
    }
}
