use super::{
    tokenize, ConfigError, ParamDef, ParamKind, ParseErrorKind, PropertyDef, PropertyStatement,
    Schema, Statement, Token, TokenKind, Value,
};
use crate::color::Color;
use crate::runtime::{Condition, PlaybackMode, Time, TimeUnit, TimingFunction, Transition};
use crate::selector::{Attribute, MatchExpr, Selector};

const COMPONENT_RANGE: MatchExpr = MatchExpr::Range {
    low: 0.0,
    high: 255.0,
};

/// An error before it is attributed to a statement.
#[derive(Debug, Clone, PartialEq)]
struct Failure {
    offset: usize,
    kind: ParseErrorKind,
}

impl Failure {
    fn new(offset: usize, kind: ParseErrorKind) -> Self {
        Failure { offset, kind }
    }

    fn in_property(self, def: &PropertyDef) -> ConfigError {
        ConfigError::Property {
            property: def.name.to_owned(),
            offset: self.offset,
            kind: self.kind,
        }
    }

    fn in_block(self, keyword: &'static str) -> ConfigError {
        ConfigError::Block {
            keyword,
            offset: self.offset,
            kind: self.kind,
        }
    }

    fn in_script(self) -> ConfigError {
        ConfigError::Syntax {
            offset: self.offset,
            kind: self.kind,
        }
    }
}

type PResult<T> = Result<T, Failure>;

struct Parser<'a, 's> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    end: usize,
    schema: &'s Schema,
}

/// Parses a script into statements, checking every argument against `schema`.
pub fn parse_script(source: &str, schema: &Schema) -> Result<Vec<Statement>, ConfigError> {
    let mut parser = Parser {
        tokens: tokenize(source),
        pos: 0,
        end: source.len(),
        schema,
    };
    let mut statements = Vec::new();
    while parser.peek().is_some() {
        statements.push(parser.statement()?);
    }
    Ok(statements)
}

impl<'a, 's> Parser<'a, 's> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek().map_or(false, |t| t.kind == kind)
    }

    fn unexpected(token: Token<'_>, expected: &'static str) -> Failure {
        let kind = if token.kind == TokenKind::Invalid {
            ParseErrorKind::InvalidToken(token.text.to_owned())
        } else {
            ParseErrorKind::UnexpectedToken {
                expected,
                found: token.text.to_owned(),
            }
        };
        Failure::new(token.offset, kind)
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> PResult<Token<'a>> {
        match self.bump() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(Self::unexpected(token, expected)),
            None => Err(Failure::new(
                self.end,
                ParseErrorKind::UnexpectedEnd { expected },
            )),
        }
    }

    fn statement(&mut self) -> Result<Statement, ConfigError> {
        let token = self
            .expect(TokenKind::Identifier, "a statement")
            .map_err(Failure::in_script)?;
        match token.text {
            "on" => {
                let condition = self.condition().map_err(|f| f.in_block("on"))?;
                let body = self.block("on")?;
                Ok(Statement::On {
                    condition,
                    body,
                    offset: token.offset,
                })
            }
            "every" => {
                let interval = self.time().map_err(|f| f.in_block("every"))?;
                let body = self.block("every")?;
                Ok(Statement::Every {
                    interval,
                    body,
                    offset: token.offset,
                })
            }
            name => {
                let schema = self.schema;
                let def = schema.lookup(name).ok_or_else(|| {
                    Failure::new(token.offset, ParseErrorKind::UnknownProperty(name.to_owned()))
                        .in_script()
                })?;
                self.property(def, token)
                    .map(Statement::Property)
                    .map_err(|f| f.in_property(def))
            }
        }
    }

    fn block(&mut self, keyword: &'static str) -> Result<Vec<Statement>, ConfigError> {
        self.expect(TokenKind::LBrace, "`{`")
            .map_err(|f| f.in_block(keyword))?;
        let mut body = Vec::new();
        loop {
            match self.peek() {
                Some(token) if token.kind == TokenKind::RBrace => {
                    self.pos += 1;
                    return Ok(body);
                }
                Some(_) => body.push(self.statement()?),
                None => {
                    return Err(Failure::new(
                        self.end,
                        ParseErrorKind::UnexpectedEnd { expected: "`}`" },
                    )
                    .in_block(keyword))
                }
            }
        }
    }

    fn property(&mut self, def: &PropertyDef, name: Token<'a>) -> PResult<PropertyStatement> {
        let mut args = Vec::with_capacity(def.params.len());
        for param in &def.params {
            args.push(self.value(param)?);
        }
        let transition = match self.peek() {
            Some(paren) if paren.kind == TokenKind::LParen => {
                if !def.animatable {
                    return Err(Failure::new(
                        paren.offset,
                        ParseErrorKind::NotAnimatable(def.name),
                    ));
                }
                self.pos += 1;
                Some(self.transition()?)
            }
            _ => None,
        };
        Ok(PropertyStatement {
            property: def.id,
            name: def.name,
            args,
            transition,
            offset: name.offset,
        })
    }

    fn transition(&mut self) -> PResult<Transition> {
        let length = self.time()?;
        let timing = match self.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {
                self.pos += 1;
                TimingFunction::from_name(token.text).ok_or_else(|| {
                    Failure::new(
                        token.offset,
                        ParseErrorKind::UnknownTimingFunction(token.text.to_owned()),
                    )
                })?
            }
            _ => TimingFunction::default(),
        };
        self.expect(TokenKind::RParen, "`)`")?;
        Ok(Transition { length, timing })
    }

    fn value(&mut self, param: &ParamDef) -> PResult<Value> {
        match param.kind {
            ParamKind::Int => {
                let (token, value) = self.integer()?;
                check(param, token, value as f64)?;
                Ok(Value::Int(value))
            }
            ParamKind::Float => {
                let (token, value) = self.float()?;
                check(param, token, value)?;
                Ok(Value::Float(value))
            }
            ParamKind::String => {
                let token = self.expect(TokenKind::String, "a string")?;
                Ok(Value::Str(token.string_value().to_owned()))
            }
            ParamKind::ColorRgb => {
                let r = self.component(param)?;
                let g = self.component(param)?;
                let b = self.component(param)?;
                Ok(Value::Color(Color::rgb(r, g, b)))
            }
            ParamKind::ColorRgba => {
                let r = self.component(param)?;
                let g = self.component(param)?;
                let b = self.component(param)?;
                let a = self.component(param)?;
                Ok(Value::Color(Color::rgba(r, g, b, a)))
            }
            ParamKind::SelectorList => self.selectors().map(Value::Selectors),
            ParamKind::Time => self.time().map(Value::Time),
        }
    }

    fn float(&mut self) -> PResult<(Token<'a>, f64)> {
        let token = self.expect(TokenKind::Number, "a number")?;
        let value = token.text.parse::<f64>().map_err(|_| {
            Failure::new(
                token.offset,
                ParseErrorKind::InvalidNumber(token.text.to_owned()),
            )
        })?;
        Ok((token, value))
    }

    fn integer(&mut self) -> PResult<(Token<'a>, i64)> {
        let token = self.expect(TokenKind::Number, "an integer")?;
        let value = token.text.parse::<i64>().map_err(|_| {
            Failure::new(
                token.offset,
                ParseErrorKind::ExpectedInteger(token.text.to_owned()),
            )
        })?;
        Ok((token, value))
    }

    fn component(&mut self, param: &ParamDef) -> PResult<u8> {
        let (token, value) = self.integer()?;
        if !COMPONENT_RANGE.matches(value as f64) {
            return Err(mismatch(param, COMPONENT_RANGE, token));
        }
        Ok(value as u8)
    }

    fn time(&mut self) -> PResult<Time> {
        let (token, value) = self.float()?;
        if value < 0.0 {
            return Err(Failure::new(
                token.offset,
                ParseErrorKind::NegativeTime(token.text.to_owned()),
            ));
        }
        let unit = match self.peek() {
            Some(suffix) if suffix.kind == TokenKind::Identifier && suffix.offset == token.end() => {
                self.pos += 1;
                TimeUnit::from_suffix(suffix.text).ok_or_else(|| {
                    Failure::new(
                        suffix.offset,
                        ParseErrorKind::UnknownUnit(suffix.text.to_owned()),
                    )
                })?
            }
            _ => TimeUnit::Ticks,
        };
        Ok(Time { value, unit })
    }

    fn condition(&mut self) -> PResult<Condition> {
        let token = self.expect(TokenKind::Identifier, "a condition")?;
        match token.text {
            "startup" => Ok(Condition::Startup),
            "end" => Ok(Condition::End),
            "time" => {
                self.expect(TokenKind::Equals, "`=`")?;
                self.time().map(Condition::Time)
            }
            "mode" => {
                self.expect(TokenKind::Equals, "`=`")?;
                let mode = self.expect(TokenKind::Identifier, "a playback mode")?;
                PlaybackMode::from_name(mode.text)
                    .map(Condition::Mode)
                    .ok_or_else(|| {
                        Failure::new(
                            mode.offset,
                            ParseErrorKind::UnknownMode(mode.text.to_owned()),
                        )
                    })
            }
            other => Err(Failure::new(
                token.offset,
                ParseErrorKind::UnknownCondition(other.to_owned()),
            )),
        }
    }

    fn selectors(&mut self) -> PResult<Vec<Selector>> {
        self.expect(TokenKind::LBracket, "`[`")?;
        let mut selectors = Vec::new();
        if self.peek_is(TokenKind::RBracket) {
            self.pos += 1;
            return Ok(selectors);
        }
        loop {
            selectors.push(self.selector()?);
            match self.bump() {
                Some(token) if token.kind == TokenKind::Comma => continue,
                Some(token) if token.kind == TokenKind::RBracket => return Ok(selectors),
                Some(token) => return Err(Self::unexpected(token, "`,` or `]`")),
                None => {
                    return Err(Failure::new(
                        self.end,
                        ParseErrorKind::UnexpectedEnd { expected: "`]`" },
                    ))
                }
            }
        }
    }

    fn selector(&mut self) -> PResult<Selector> {
        let token = self.expect(TokenKind::Identifier, "a selector attribute")?;
        let attribute = Attribute::from_name(token.text).ok_or_else(|| {
            Failure::new(
                token.offset,
                ParseErrorKind::UnknownAttribute(token.text.to_owned()),
            )
        })?;
        self.expect(TokenKind::Equals, "`=`")?;
        let matcher = self.matcher()?;
        Ok(Selector { attribute, matcher })
    }

    fn is_n(token: Option<Token<'_>>) -> bool {
        token.map_or(false, |t| t.kind == TokenKind::Identifier && t.text == "n")
    }

    /// `60`, `60-72`, `n`, `-n`, `2n+1`, `-2n-1`, `n - 1`, ...
    fn matcher(&mut self) -> PResult<MatchExpr> {
        let a = match self.peek() {
            Some(token) if token.kind == TokenKind::Number => {
                if Self::is_n(self.tokens.get(self.pos + 1).copied()) {
                    self.integer()?.1
                } else {
                    let (_, low) = self.float()?;
                    if !self.peek_is(TokenKind::Minus) {
                        return Ok(MatchExpr::Scalar(low));
                    }
                    self.pos += 1;
                    let (_, high) = self.float()?;
                    return Ok(MatchExpr::Range { low, high });
                }
            }
            Some(token) if token.kind == TokenKind::Minus => {
                self.pos += 1;
                -1
            }
            Some(token) if Self::is_n(Some(token)) => 1,
            Some(token) => return Err(Self::unexpected(token, "a number or `n`")),
            None => {
                return Err(Failure::new(
                    self.end,
                    ParseErrorKind::UnexpectedEnd {
                        expected: "a number or `n`",
                    },
                ))
            }
        };
        let n = self.expect(TokenKind::Identifier, "`n`")?;
        if n.text != "n" {
            return Err(Self::unexpected(n, "`n`"));
        }
        let b = match self.peek() {
            Some(token) if token.kind == TokenKind::Plus => {
                self.pos += 1;
                self.integer()?.1
            }
            Some(token) if token.kind == TokenKind::Minus => {
                self.pos += 1;
                -self.integer()?.1
            }
            Some(token)
                if token.kind == TokenKind::Number
                    && (token.text.starts_with('+') || token.text.starts_with('-')) =>
            {
                self.integer()?.1
            }
            _ => 0,
        };
        Ok(MatchExpr::Congruence { a, b })
    }
}

fn mismatch(param: &ParamDef, matcher: MatchExpr, token: Token<'_>) -> Failure {
    Failure::new(
        token.offset,
        ParseErrorKind::Mismatch {
            param: param.name,
            expected: matcher.to_string(),
            found: token.text.to_owned(),
        },
    )
}

fn check(param: &ParamDef, token: Token<'_>, value: f64) -> PResult<()> {
    match param.matcher {
        Some(matcher) if !matcher.matches(value) => Err(mismatch(param, matcher, token)),
        _ => Ok(()),
    }
}
