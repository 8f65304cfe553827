use super::TickContext;
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TimeUnit {
    Ticks,
    Beats,
    Seconds,
    Millis,
}

impl TimeUnit {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "t" | "ticks" => Some(TimeUnit::Ticks),
            "b" | "beats" => Some(TimeUnit::Beats),
            "s" => Some(TimeUnit::Seconds),
            "ms" => Some(TimeUnit::Millis),
            _ => None,
        }
    }

    pub const fn suffix(&self) -> &'static str {
        match self {
            TimeUnit::Ticks => "t",
            TimeUnit::Beats => "b",
            TimeUnit::Seconds => "s",
            TimeUnit::Millis => "ms",
        }
    }
}

/// A span of time as written in a config script.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Time {
    pub value: f64,
    pub unit: TimeUnit,
}

impl Time {
    pub const fn ticks(value: f64) -> Self {
        Time {
            value,
            unit: TimeUnit::Ticks,
        }
    }

    pub fn to_ticks(&self, ctx: &TickContext) -> f64 {
        match self.unit {
            TimeUnit::Ticks => self.value,
            TimeUnit::Beats => self.value * ctx.ticks_per_quarter_note,
            TimeUnit::Seconds => self.value * ctx.ticks_per_second,
            TimeUnit::Millis => self.value / 1000.0 * ctx.ticks_per_second,
        }
    }

    /// Whole ticks, rounded to nearest and never negative.
    pub fn whole_ticks(&self, ctx: &TickContext) -> u64 {
        self.to_ticks(ctx).round().max(0.0) as u64
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Maps linear progress in [0, 1] to eased progress.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TimingFunction {
    Constant0,
    Constant1,
    Linear,
    EaseInOutQuad,
}

impl TimingFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "constant0" => Some(TimingFunction::Constant0),
            "constant1" => Some(TimingFunction::Constant1),
            "linear" => Some(TimingFunction::Linear),
            "ease_in_out_quad" | "ease_in_out" => Some(TimingFunction::EaseInOutQuad),
            _ => None,
        }
    }

    pub fn apply(&self, progress: f64) -> f64 {
        let x = progress.clamp(0.0, 1.0);
        match self {
            TimingFunction::Constant0 => 0.0,
            TimingFunction::Constant1 => 1.0,
            TimingFunction::Linear => x,
            TimingFunction::EaseInOutQuad => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    1.0 - (-2.0 * x + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

impl Default for TimingFunction {
    fn default() -> Self {
        TimingFunction::Linear
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transition {
    pub length: Time,
    pub timing: TimingFunction,
}

/// The animatable scene properties a transition can drive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AnimTarget {
    BackgroundColor,
    FallSpeed,
    PlaybackSpeed,
}

/// A transition that has started, measured in ticks.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OngoingTransition {
    pub target: AnimTarget,
    pub start_tick: u64,
    pub length_in_ticks: u64,
    pub timing: TimingFunction,
}

impl OngoingTransition {
    pub fn start(target: AnimTarget, transition: &Transition, ctx: &TickContext) -> Self {
        OngoingTransition {
            target,
            start_tick: ctx.tick,
            length_in_ticks: transition.length.whole_ticks(ctx),
            timing: transition.timing,
        }
    }

    pub fn end_tick(&self) -> u64 {
        self.start_tick.saturating_add(self.length_in_ticks)
    }

    pub fn factor(&self, tick: u64) -> f64 {
        if self.length_in_ticks == 0 {
            return 1.0;
        }
        let raw = tick.saturating_sub(self.start_tick) as f64 / self.length_in_ticks as f64;
        if raw >= 1.0 {
            1.0
        } else {
            self.timing.apply(raw)
        }
    }

    pub fn is_finished(&self, tick: u64) -> bool {
        tick >= self.end_tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_functions() {
        assert_eq!(0.0, TimingFunction::Constant0.apply(0.7));
        assert_eq!(1.0, TimingFunction::Constant1.apply(0.0));
        assert_eq!(0.3, TimingFunction::Linear.apply(0.3));
        let ease = TimingFunction::EaseInOutQuad;
        assert_eq!(0.0, ease.apply(0.0));
        assert_eq!(0.125, ease.apply(0.25));
        assert_eq!(0.5, ease.apply(0.5));
        assert_eq!(0.875, ease.apply(0.75));
        assert_eq!(1.0, ease.apply(1.0));
        assert_eq!(Some(ease), TimingFunction::from_name("ease_in_out"));
    }

    #[test]
    fn test_time_units() {
        let ctx = TickContext::at(0);
        assert_eq!(96.0, Time::ticks(96.0).to_ticks(&ctx));
        let beats = Time {
            value: 2.0,
            unit: TimeUnit::Beats,
        };
        assert_eq!(960.0, beats.to_ticks(&ctx));
        let millis = Time {
            value: 500.0,
            unit: TimeUnit::Millis,
        };
        assert_eq!(480, millis.whole_ticks(&ctx));
        assert_eq!("500ms", millis.to_string());
    }

    #[test]
    fn test_transition_progress() {
        let transition = Transition {
            length: Time::ticks(100.0),
            timing: TimingFunction::Linear,
        };
        let ongoing = OngoingTransition::start(
            AnimTarget::FallSpeed,
            &transition,
            &TickContext::at(50),
        );
        assert_eq!(0.0, ongoing.factor(50));
        assert_eq!(0.5, ongoing.factor(100));
        assert!(!ongoing.is_finished(149));
        assert_eq!(1.0, ongoing.factor(150));
        assert!(ongoing.is_finished(150));

        let instant = Transition {
            length: Time::ticks(0.0),
            timing: TimingFunction::Constant0,
        };
        let ongoing = OngoingTransition::start(
            AnimTarget::FallSpeed,
            &instant,
            &TickContext::at(7),
        );
        assert_eq!(1.0, ongoing.factor(7));
        assert!(ongoing.is_finished(7));
    }
}
