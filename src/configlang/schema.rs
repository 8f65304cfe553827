use crate::selector::MatchExpr;
use std::fmt::Write;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ParamKind {
    Int,
    Float,
    String,
    /// Three integer components, alpha fixed at 255.
    ColorRgb,
    ColorRgba,
    SelectorList,
    Time,
}

impl ParamKind {
    pub const fn name(&self) -> &'static str {
        match self {
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::String => "string",
            ParamKind::ColorRgb => "r g b",
            ParamKind::ColorRgba => "r g b a",
            ParamKind::SelectorList => "[selectors]",
            ParamKind::Time => "time",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ParamDef {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Only checked for numeric kinds.
    pub matcher: Option<MatchExpr>,
}

impl ParamDef {
    pub const fn new(name: &'static str, kind: ParamKind) -> Self {
        ParamDef {
            name,
            kind,
            matcher: None,
        }
    }

    pub const fn matching(mut self, matcher: MatchExpr) -> Self {
        self.matcher = Some(matcher);
        self
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PropertyId {
    BackgroundColor,
    FallSpeed,
    PlaybackSpeed,
    DefaultColor,
    NoteColor,
    ClearNoteColors,
    KeyRange,
    Title,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub id: PropertyId,
    pub name: &'static str,
    pub params: Vec<ParamDef>,
    pub animatable: bool,
    pub description: &'static str,
}

impl PropertyDef {
    pub fn new(id: PropertyId, name: &'static str) -> Self {
        PropertyDef {
            id,
            name,
            params: Vec::new(),
            animatable: false,
            description: "",
        }
    }

    pub fn param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    pub fn animatable(mut self) -> Self {
        self.animatable = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// The properties a script may set, looked up by name while parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    properties: Vec<PropertyDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let byte = MatchExpr::Range {
            low: 0.0,
            high: 127.0,
        };
        let mut schema = Schema::new();
        schema.register(
            PropertyDef::new(PropertyId::BackgroundColor, "background_color")
                .param(ParamDef::new("color", ParamKind::ColorRgb))
                .animatable()
                .describe("background color"),
        );
        schema.register(
            PropertyDef::new(PropertyId::FallSpeed, "fall_speed")
                .param(ParamDef::new("speed", ParamKind::Float).matching(MatchExpr::Range {
                    low: 0.01,
                    high: 100.0,
                }))
                .animatable()
                .describe("scale of the speed notes fall at"),
        );
        schema.register(
            PropertyDef::new(PropertyId::PlaybackSpeed, "playback_speed")
                .param(ParamDef::new("speed", ParamKind::Float).matching(MatchExpr::Range {
                    low: 0.01,
                    high: 16.0,
                }))
                .animatable()
                .describe("file playback speed"),
        );
        schema.register(
            PropertyDef::new(PropertyId::DefaultColor, "default_color")
                .param(ParamDef::new("color", ParamKind::ColorRgba))
                .describe("color of notes no rule matches"),
        );
        schema.register(
            PropertyDef::new(PropertyId::NoteColor, "note_color")
                .param(ParamDef::new("selectors", ParamKind::SelectorList))
                .param(ParamDef::new("color", ParamKind::ColorRgba))
                .describe("append a color rule; the first matching rule wins"),
        );
        schema.register(
            PropertyDef::new(PropertyId::ClearNoteColors, "clear_note_colors")
                .describe("drop all color rules"),
        );
        schema.register(
            PropertyDef::new(PropertyId::KeyRange, "key_range")
                .param(ParamDef::new("low", ParamKind::Int).matching(byte))
                .param(ParamDef::new("high", ParamKind::Int).matching(byte))
                .describe("lowest and highest visible key"),
        );
        schema.register(
            PropertyDef::new(PropertyId::Title, "title")
                .param(ParamDef::new("title", ParamKind::String))
                .describe("window title"),
        );
        schema
    }

    /// Adds a property, replacing any with the same name.
    pub fn register(&mut self, def: PropertyDef) {
        self.properties.retain(|prop| prop.name != def.name);
        self.properties.push(def);
    }

    pub fn lookup(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|prop| prop.name == name)
    }

    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    pub fn usage(&self) -> String {
        let mut out = String::new();
        for prop in &self.properties {
            out.push_str(prop.name);
            for param in &prop.params {
                let _ = write!(out, " <{}: {}", param.name, param.kind.name());
                if let Some(matcher) = &param.matcher {
                    let _ = write!(out, " in {}", matcher);
                }
                out.push('>');
            }
            if prop.animatable {
                out.push_str(" [(time timing)]");
            }
            let _ = writeln!(out, "\n    {}", prop.description);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schema() {
        let schema = Schema::standard();
        assert_eq!(8, schema.properties().len());
        let fall = schema.lookup("fall_speed").unwrap();
        assert!(fall.animatable);
        assert_eq!("speed", fall.params[0].name);
        assert!(!schema.lookup("title").unwrap().animatable);
        assert!(schema.lookup("nope").is_none());

        let usage = schema.usage();
        assert!(usage.contains("key_range <low: int in 0-127> <high: int in 0-127>"));
        assert!(usage.contains("background_color <color: r g b> [(time timing)]"));
    }

    #[test]
    fn test_register_replaces() {
        let mut schema = Schema::standard();
        schema.register(PropertyDef::new(PropertyId::Title, "title"));
        assert_eq!(8, schema.properties().len());
        assert!(schema.lookup("title").unwrap().params.is_empty());
    }
}
