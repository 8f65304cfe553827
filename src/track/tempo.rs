use std::num::{NonZeroU16, NonZeroU32};
use std::time::Duration;

const MICROS_PER_SECOND: f64 = 1_000_000.0;
const MICROS_PER_MINUTE: f64 = 60.0 * MICROS_PER_SECOND;

const DEFAULT_MICROS: NonZeroU32 = match NonZeroU32::new(Tempo::DEFAULT_MICROS_PER_QUARTER) {
    Some(micros) => micros,
    None => panic!("zero default tempo"),
};

/// Playback tempo, expressed the way MIDI does: microseconds per quarter note.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Tempo {
    micros_per_quarter: NonZeroU32,
}

impl Tempo {
    /// 120 beats per minute.
    pub const DEFAULT_MICROS_PER_QUARTER: u32 = 500_000;

    pub fn from_micros(micros_per_quarter: u32) -> Option<Self> {
        NonZeroU32::new(micros_per_quarter).map(|micros_per_quarter| Tempo { micros_per_quarter })
    }

    pub const fn micros_per_quarter(&self) -> u32 {
        self.micros_per_quarter.get()
    }

    pub fn beats_per_minute(&self) -> f64 {
        MICROS_PER_MINUTE / f64::from(self.micros_per_quarter())
    }

    pub fn quarter_duration(&self) -> Duration {
        Duration::from_micros(u64::from(self.micros_per_quarter()))
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Tempo {
            micros_per_quarter: DEFAULT_MICROS,
        }
    }
}

/// How ticks relate to musical or wall-clock time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Division {
    /// Ticks are a fraction of a quarter note; their duration follows the tempo.
    Metrical { ticks_per_quarter: NonZeroU16 },
    /// Ticks are a fraction of an SMPTE frame; their duration is fixed.
    Timecode {
        frames_per_second: u8,
        ticks_per_frame: u8,
    },
}

impl Division {
    fn frame_rate(frames_per_second: u8) -> f64 {
        // The "29" format is 30 drop-frame.
        if frames_per_second == 29 {
            29.97
        } else {
            f64::from(frames_per_second)
        }
    }

    pub fn ticks_per_second(&self, tempo: Tempo) -> f64 {
        match *self {
            Division::Metrical { ticks_per_quarter } => {
                f64::from(ticks_per_quarter.get()) * MICROS_PER_SECOND
                    / f64::from(tempo.micros_per_quarter())
            }
            Division::Timecode {
                frames_per_second,
                ticks_per_frame,
            } => Self::frame_rate(frames_per_second) * f64::from(ticks_per_frame),
        }
    }

    /// Ticks in a quarter note. Timecode divisions have no notion of a
    /// quarter note, so the default tempo is assumed.
    pub fn ticks_per_quarter_note(&self) -> f64 {
        match *self {
            Division::Metrical { ticks_per_quarter } => f64::from(ticks_per_quarter.get()),
            Division::Timecode { .. } => {
                self.ticks_per_second(Tempo::default()) * f64::from(Tempo::DEFAULT_MICROS_PER_QUARTER)
                    / MICROS_PER_SECOND
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_per_second() {
        let division = Division::Metrical {
            ticks_per_quarter: NonZeroU16::new(480).unwrap(),
        };
        assert_eq!(500_000, Tempo::default().micros_per_quarter());
        assert_eq!(960.0, division.ticks_per_second(Tempo::default()));
        let slow = Tempo::from_micros(1_000_000).unwrap();
        assert_eq!(480.0, division.ticks_per_second(slow));
        assert_eq!(60.0, slow.beats_per_minute());
        assert_eq!(480.0, division.ticks_per_quarter_note());

        let smpte = Division::Timecode {
            frames_per_second: 25,
            ticks_per_frame: 40,
        };
        assert_eq!(1000.0, smpte.ticks_per_second(slow));
        assert_eq!(500.0, smpte.ticks_per_quarter_note());
        assert!(Tempo::from_micros(0).is_none());
    }
}
