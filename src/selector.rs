use crate::color::Color;
use crate::midi::{MidiChannel, MidiNote};
use std::fmt;
use std::ops::Range;

/// The note property a selector inspects.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Attribute {
    Channel,
    Key,
    /// Index among white keys; never matches a black key.
    White,
    /// Index among black keys; never matches a white key.
    Black,
    Tick,
}

impl Attribute {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "channel" => Some(Attribute::Channel),
            "key" => Some(Attribute::Key),
            "white" => Some(Attribute::White),
            "black" => Some(Attribute::Black),
            "tick" => Some(Attribute::Tick),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Attribute::Channel => "channel",
            Attribute::Key => "key",
            Attribute::White => "white",
            Attribute::Black => "black",
            Attribute::Tick => "tick",
        }
    }
}

/// A numeric predicate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MatchExpr {
    Scalar(f64),
    /// Inclusive on both ends.
    Range { low: f64, high: f64 },
    /// Values `a*n + b` for some natural `n`.
    Congruence { a: i64, b: i64 },
}

impl MatchExpr {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            MatchExpr::Scalar(expected) => value == expected,
            MatchExpr::Range { low, high } => low <= value && value <= high,
            MatchExpr::Congruence { a, b } => {
                if value.fract() != 0.0 {
                    return false;
                }
                let x = value as i128;
                let (a, b) = (i128::from(a), i128::from(b));
                if a == 0 {
                    x == b
                } else if a > 0 {
                    x >= b && (x - b) % a == 0
                } else {
                    x <= b && (b - x) % (-a) == 0
                }
            }
        }
    }
}

impl fmt::Display for MatchExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MatchExpr::Scalar(v) => write!(f, "{}", v),
            MatchExpr::Range { low, high } => write!(f, "{}-{}", low, high),
            MatchExpr::Congruence { a, b } => {
                write!(f, "{}n", a)?;
                match b {
                    0 => Ok(()),
                    b if b > 0 => write!(f, "+{}", b),
                    b => write!(f, "{}", b),
                }
            }
        }
    }
}

/// The attributes of a sounding note that selectors can look at.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NoteInfo {
    pub channel: MidiChannel,
    pub key: MidiNote,
    pub tick: u64,
}

impl NoteInfo {
    fn attribute(&self, attribute: Attribute) -> Option<f64> {
        match attribute {
            Attribute::Channel => Some(f64::from(self.channel.as_u8())),
            Attribute::Key => Some(f64::from(self.key.as_u8())),
            Attribute::White => self.key.white_index().map(f64::from),
            Attribute::Black => self.key.black_index().map(f64::from),
            Attribute::Tick => Some(self.tick as f64),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Selector {
    pub attribute: Attribute,
    pub matcher: MatchExpr,
}

impl Selector {
    pub fn matches(&self, note: &NoteInfo) -> bool {
        note.attribute(self.attribute)
            .map_or(false, |value| self.matcher.matches(value))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute.name(), self.matcher)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ColorRule {
    selectors: Range<usize>,
    color: Color,
}

/// Ordered color rules. All selectors live in one vector and each rule
/// refers to its slice of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorRules {
    selectors: Vec<Selector>,
    rules: Vec<ColorRule>,
}

impl ColorRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, selectors: impl IntoIterator<Item = Selector>, color: Color) {
        let start = self.selectors.len();
        self.selectors.extend(selectors);
        self.rules.push(ColorRule {
            selectors: start..self.selectors.len(),
            color,
        });
    }

    pub fn clear(&mut self) {
        self.selectors.clear();
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Color of the first rule whose selectors all match, else `default`.
    pub fn resolve(&self, note: &NoteInfo, default: Color) -> Color {
        self.rules
            .iter()
            .find(|rule| {
                self.selectors[rule.selectors.clone()]
                    .iter()
                    .all(|sel| sel.matches(note))
            })
            .map_or(default, |rule| rule.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(channel: u8, key: u8, tick: u64) -> NoteInfo {
        NoteInfo {
            channel: MidiChannel::from_raw(channel).unwrap(),
            key: MidiNote::from_raw(key).unwrap(),
            tick,
        }
    }

    fn sel(attribute: Attribute, matcher: MatchExpr) -> Selector {
        Selector { attribute, matcher }
    }

    #[test]
    fn test_match_exprs() {
        assert!(MatchExpr::Scalar(3.0).matches(3.0));
        assert!(!MatchExpr::Scalar(3.0).matches(4.0));
        let range = MatchExpr::Range {
            low: 60.0,
            high: 72.0,
        };
        assert!(range.matches(60.0) && range.matches(72.0));
        assert!(!range.matches(73.0));

        let odd = MatchExpr::Congruence { a: 2, b: 1 };
        assert!(odd.matches(1.0) && odd.matches(7.0));
        assert!(!odd.matches(4.0) && !odd.matches(-1.0));

        let down = MatchExpr::Congruence { a: -3, b: 10 };
        assert!(down.matches(10.0) && down.matches(4.0));
        assert!(!down.matches(13.0) && !down.matches(5.0));

        let exact = MatchExpr::Congruence { a: 0, b: 5 };
        assert!(exact.matches(5.0) && !exact.matches(10.0));

        assert_eq!("2n+1", odd.to_string());
        assert_eq!("-3n+10", down.to_string());
        assert_eq!("60-72", range.to_string());
    }

    #[test]
    fn test_key_attributes() {
        let white = sel(Attribute::White, MatchExpr::Scalar(35.0));
        assert!(white.matches(&note(0, 60, 0)));
        assert!(!white.matches(&note(0, 61, 0)));
        let black = sel(Attribute::Black, MatchExpr::Range { low: 0.0, high: 100.0 });
        assert!(black.matches(&note(0, 61, 0)));
        assert!(!black.matches(&note(0, 60, 0)));
    }

    #[test]
    fn test_first_match_wins() {
        let red = Color::rgb(255, 0, 0);
        let green = Color::rgb(0, 255, 0);
        let blue = Color::rgb(0, 0, 255);

        let mut rules = ColorRules::new();
        rules.push(
            vec![
                sel(Attribute::Channel, MatchExpr::Scalar(1.0)),
                sel(Attribute::Key, MatchExpr::Range { low: 60.0, high: 72.0 }),
            ],
            red,
        );
        rules.push(vec![sel(Attribute::Channel, MatchExpr::Scalar(1.0))], green);
        rules.push(vec![sel(Attribute::Key, MatchExpr::Scalar(64.0))], blue);

        assert_eq!(red, rules.resolve(&note(1, 64, 0), Color::WHITE));
        assert_eq!(green, rules.resolve(&note(1, 80, 0), Color::WHITE));
        assert_eq!(blue, rules.resolve(&note(0, 64, 0), Color::WHITE));
        assert_eq!(Color::WHITE, rules.resolve(&note(0, 65, 0), Color::WHITE));

        rules.push(Vec::new(), Color::BLACK);
        assert_eq!(Color::BLACK, rules.resolve(&note(0, 65, 0), Color::WHITE));
        assert_eq!(4, rules.len());

        rules.clear();
        assert!(rules.is_empty());
        assert_eq!(Color::WHITE, rules.resolve(&note(1, 64, 0), Color::WHITE));
    }
}
