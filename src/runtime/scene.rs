use super::{AnimTarget, AnimatableProperty, Assignment};
use crate::color::Color;
use crate::selector::{ColorRules, NoteInfo};

use log::debug;

/// Everything a config script can change about the visualization.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    background_color: AnimatableProperty<Color>,
    fall_speed: AnimatableProperty<f64>,
    playback_speed: AnimatableProperty<f64>,
    default_color: Color,
    note_colors: ColorRules,
    key_range: (u8, u8),
    title: String,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            background_color: AnimatableProperty::new(Color::BLACK),
            fall_speed: AnimatableProperty::new(1.0),
            playback_speed: AnimatableProperty::new(1.0),
            default_color: Color::WHITE,
            note_colors: ColorRules::new(),
            // A full 88-key piano.
            key_range: (21, 108),
            title: String::from("midivis"),
        }
    }
}

impl Scene {
    pub fn background_color(&self) -> Color {
        self.background_color.value()
    }

    pub fn fall_speed(&self) -> f64 {
        self.fall_speed.value()
    }

    pub fn playback_speed(&self) -> f64 {
        self.playback_speed.value()
    }

    pub fn default_color(&self) -> Color {
        self.default_color
    }

    pub fn note_colors(&self) -> &ColorRules {
        &self.note_colors
    }

    pub fn key_range(&self) -> (u8, u8) {
        self.key_range
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn resolve_color(&self, note: &NoteInfo) -> Color {
        self.note_colors.resolve(note, self.default_color)
    }

    /// Applies an assignment and returns the target when the property is
    /// animatable. Animated assignments start a blend at factor 0.
    pub fn apply(&mut self, assignment: &Assignment, animated: bool) -> Option<AnimTarget> {
        let factor = if animated { 0.0 } else { 1.0 };
        let target = match assignment {
            Assignment::BackgroundColor(color) => {
                self.background_color.set_value_with_factor(*color, factor);
                Some(AnimTarget::BackgroundColor)
            }
            Assignment::FallSpeed(speed) => {
                self.fall_speed.set_value_with_factor(*speed, factor);
                Some(AnimTarget::FallSpeed)
            }
            Assignment::PlaybackSpeed(speed) => {
                self.playback_speed.set_value_with_factor(*speed, factor);
                Some(AnimTarget::PlaybackSpeed)
            }
            Assignment::DefaultColor(color) => {
                self.default_color = *color;
                None
            }
            Assignment::NoteColor { selectors, color } => {
                self.note_colors.push(selectors.iter().copied(), *color);
                None
            }
            Assignment::ClearNoteColors => {
                self.note_colors.clear();
                None
            }
            Assignment::KeyRange { low, high } => {
                self.key_range = (*low, *high);
                None
            }
            Assignment::Title(title) => {
                self.title = title.clone();
                None
            }
        };
        debug!("Applied {:?}", assignment);
        target
    }

    /// Moves a running blend to `factor`.
    pub fn drive(&mut self, target: AnimTarget, factor: f64) {
        match target {
            AnimTarget::BackgroundColor => self.background_color.set_factor(factor),
            AnimTarget::FallSpeed => self.fall_speed.set_factor(factor),
            AnimTarget::PlaybackSpeed => self.playback_speed.set_factor(factor),
        }
    }
}
