use super::PropertyId;
use crate::color::Color;
use crate::runtime::{Condition, Time, Transition};
use crate::selector::Selector;

/// A parsed argument, already checked against its parameter kind and matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Color(Color),
    Selectors(Vec<Selector>),
    Time(Time),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyStatement {
    pub property: PropertyId,
    pub name: &'static str,
    pub args: Vec<Value>,
    pub transition: Option<Transition>,
    /// Offset of the property name.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Property(PropertyStatement),
    On {
        condition: Condition,
        body: Vec<Statement>,
        offset: usize,
    },
    Every {
        interval: Time,
        body: Vec<Statement>,
        offset: usize,
    },
}

impl Statement {
    pub fn offset(&self) -> usize {
        match self {
            Statement::Property(prop) => prop.offset,
            Statement::On { offset, .. } | Statement::Every { offset, .. } => *offset,
        }
    }
}
