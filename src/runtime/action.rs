use super::{Condition, Time, Transition};
use crate::color::Color;
use crate::selector::Selector;
use std::rc::Rc;

/// A validated property assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    BackgroundColor(Color),
    FallSpeed(f64),
    PlaybackSpeed(f64),
    DefaultColor(Color),
    NoteColor { selectors: Vec<Selector>, color: Color },
    ClearNoteColors,
    KeyRange { low: u8, high: u8 },
    Title(String),
}

/// A compiled config statement. Nested blocks are shared so that a firing
/// condition does not copy its body.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Assign {
        assignment: Assignment,
        transition: Option<Transition>,
    },
    On {
        condition: Condition,
        actions: Rc<[Action]>,
    },
    Every {
        interval: Time,
        actions: Rc<[Action]>,
    },
}
