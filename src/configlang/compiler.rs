use super::{ConfigError, ParseErrorKind, PropertyId, PropertyStatement, Statement, Value};
use crate::runtime::{Action, Assignment};
use std::rc::Rc;

/// Lowers parsed statements into runtime actions, running each property's
/// own validation. The first failure aborts the whole script.
pub fn compile(statements: &[Statement]) -> Result<Vec<Action>, ConfigError> {
    statements.iter().map(compile_statement).collect()
}

fn compile_statement(statement: &Statement) -> Result<Action, ConfigError> {
    match statement {
        Statement::Property(prop) => {
            let assignment = assignment(prop).map_err(|kind| ConfigError::Property {
                property: prop.name.to_owned(),
                offset: prop.offset,
                kind,
            })?;
            Ok(Action::Assign {
                assignment,
                transition: prop.transition,
            })
        }
        Statement::On {
            condition, body, ..
        } => Ok(Action::On {
            condition: *condition,
            actions: Rc::from(compile(body)?),
        }),
        Statement::Every {
            interval,
            body,
            offset,
        } => {
            if interval.value <= 0.0 {
                return Err(ConfigError::Block {
                    keyword: "every",
                    offset: *offset,
                    kind: ParseErrorKind::ZeroInterval,
                });
            }
            Ok(Action::Every {
                interval: *interval,
                actions: Rc::from(compile(body)?),
            })
        }
    }
}

fn key(value: i64) -> Result<u8, ParseErrorKind> {
    u8::try_from(value)
        .ok()
        .filter(|key| *key < 128)
        .ok_or_else(|| ParseErrorKind::Handler(format!("{} is not a MIDI key", value)))
}

fn assignment(prop: &PropertyStatement) -> Result<Assignment, ParseErrorKind> {
    let assignment = match (prop.property, prop.args.as_slice()) {
        (PropertyId::BackgroundColor, [Value::Color(color)]) => Assignment::BackgroundColor(*color),
        (PropertyId::FallSpeed, [Value::Float(speed)]) => Assignment::FallSpeed(*speed),
        (PropertyId::PlaybackSpeed, [Value::Float(speed)]) => Assignment::PlaybackSpeed(*speed),
        (PropertyId::DefaultColor, [Value::Color(color)]) => Assignment::DefaultColor(*color),
        (PropertyId::NoteColor, [Value::Selectors(selectors), Value::Color(color)]) => {
            Assignment::NoteColor {
                selectors: selectors.clone(),
                color: *color,
            }
        }
        (PropertyId::ClearNoteColors, []) => Assignment::ClearNoteColors,
        (PropertyId::KeyRange, [Value::Int(low), Value::Int(high)]) => {
            let (low, high) = (key(*low)?, key(*high)?);
            if low > high {
                return Err(ParseErrorKind::Handler(format!(
                    "low key {} is above high key {}",
                    low, high
                )));
            }
            Assignment::KeyRange { low, high }
        }
        (PropertyId::Title, [Value::Str(title)]) => Assignment::Title(title.clone()),
        (_, args) => {
            return Err(ParseErrorKind::Handler(format!(
                "{} cannot take {} argument(s) of these kinds",
                prop.name,
                args.len()
            )))
        }
    };
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configlang::{parse_script, ParamDef, ParamKind, PropertyDef, Schema};
    use crate::runtime::Condition;

    fn compile_source(source: &str, schema: &Schema) -> Result<Vec<Action>, ConfigError> {
        compile(&parse_script(source, schema)?)
    }

    #[test]
    fn test_compile_nested() {
        let actions = compile_source(
            "key_range 30 90\non startup { every 2b { clear_note_colors } }",
            &Schema::standard(),
        )
        .unwrap();
        assert_eq!(
            Action::Assign {
                assignment: Assignment::KeyRange { low: 30, high: 90 },
                transition: None,
            },
            actions[0]
        );
        match &actions[1] {
            Action::On {
                condition: Condition::Startup,
                actions,
            } => match &actions[0] {
                Action::Every { interval, actions } => {
                    assert_eq!(2.0, interval.value);
                    assert_eq!(
                        Action::Assign {
                            assignment: Assignment::ClearNoteColors,
                            transition: None,
                        },
                        actions[0]
                    );
                }
                other => panic!("unexpected action {:?}", other),
            },
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_handler_errors() {
        let err = compile_source("title \"a\"\nkey_range 90 20", &Schema::standard()).unwrap_err();
        assert_eq!(
            ConfigError::Property {
                property: "key_range".to_owned(),
                offset: 10,
                kind: ParseErrorKind::Handler("low key 90 is above high key 20".to_owned()),
            },
            err
        );

        let err = compile_source("every 0 { }", &Schema::standard()).unwrap_err();
        assert_eq!(ParseErrorKind::ZeroInterval, *err.kind());
    }

    #[test]
    fn test_custom_schema_shape() {
        let mut schema = Schema::standard();
        schema.register(
            PropertyDef::new(PropertyId::Title, "title")
                .param(ParamDef::new("length", ParamKind::Time)),
        );
        let err = compile_source("title 3s", &schema).unwrap_err();
        assert!(matches!(err.kind(), ParseErrorKind::Handler(_)));
    }
}
