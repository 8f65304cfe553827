use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, char, digit0, digit1, multispace1, not_line_ending, one_of},
    combinator::{map, opt, recognize, rest},
    error::{context, VerboseError},
    multi::many0,
    sequence::{pair, preceded, tuple},
};

pub type LexError<'a> = VerboseError<&'a str>;

pub type LexResult<'a, T> = nom::IResult<&'a str, T, LexError<'a>>;

/// Characters after which a `+` or `-` may start a number.
const SIGN_CONTEXT: &str = "[({=,";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Minus,
    Plus,
    Equals,
    Comma,
    Invalid,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset into the source.
    pub offset: usize,
}

impl<'a> Token<'a> {
    /// The body of a string token, without its quotes. No escapes are processed.
    pub fn string_value(&self) -> &'a str {
        let len = self.text.len();
        if len >= 2 {
            &self.text[1..len - 1]
        } else {
            self.text
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

fn comment(input: &str) -> LexResult<&str> {
    context("comment", recognize(preceded(char('#'), not_line_ending)))(input)
}

fn trivia(input: &str) -> LexResult<&str> {
    recognize(many0(alt((multispace1, comment))))(input)
}

fn unsigned_number(input: &str) -> LexResult<&str> {
    context(
        "number",
        recognize(tuple((
            digit1,
            opt(pair(char('.'), digit0)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
    )(input)
}

fn signed_number(input: &str) -> LexResult<&str> {
    recognize(pair(one_of("+-"), unsigned_number))(input)
}

fn identifier(input: &str) -> LexResult<&str> {
    context(
        "identifier",
        recognize(pair(
            alt((alpha1, tag("_"))),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
    )(input)
}

fn string(input: &str) -> LexResult<&str> {
    context(
        "string",
        alt((
            recognize(tuple((char('"'), take_while(|c| c != '"'), char('"')))),
            recognize(tuple((char('\''), take_while(|c| c != '\''), char('\'')))),
        )),
    )(input)
}

fn unterminated_string(input: &str) -> LexResult<&str> {
    recognize(pair(one_of("\"'"), rest))(input)
}

fn punct(input: &str) -> LexResult<TokenKind> {
    map(one_of("[](){}-+=,"), |c| match c {
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '-' => TokenKind::Minus,
        '+' => TokenKind::Plus,
        '=' => TokenKind::Equals,
        ',' => TokenKind::Comma,
        _ => TokenKind::Invalid,
    })(input)
}

fn next_token(input: &str, sign_allowed: bool) -> LexResult<TokenKind> {
    if sign_allowed {
        if let Ok((rest, _)) = signed_number(input) {
            return Ok((rest, TokenKind::Number));
        }
    }
    alt((
        map(unsigned_number, |_| TokenKind::Number),
        map(identifier, |_| TokenKind::Identifier),
        map(string, |_| TokenKind::String),
        map(unterminated_string, |_| TokenKind::Invalid),
        punct,
    ))(input)
}

/// Splits a config script into tokens. Anything unrecognized becomes an
/// `Invalid` token for the parser to report.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut input = source;
    loop {
        if let Ok((rest, _)) = trivia(input) {
            input = rest;
        }
        if input.is_empty() {
            break;
        }
        let offset = source.len() - input.len();
        let sign_allowed = source[..offset]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || SIGN_CONTEXT.contains(c));
        let (rest, kind) = match next_token(input, sign_allowed) {
            Ok(lexed) => lexed,
            Err(_) => {
                let len = input.chars().next().map_or(1, char::len_utf8);
                (&input[len..], TokenKind::Invalid)
            }
        };
        tokens.push(Token {
            kind,
            text: &input[..input.len() - rest.len()],
            offset,
        });
        input = rest;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_basic_tokens() {
        use TokenKind::*;
        assert_eq!(
            vec![
                (Identifier, "note_color"),
                (LBracket, "["),
                (Identifier, "key"),
                (Equals, "="),
                (Number, "60"),
                (Minus, "-"),
                (Number, "72"),
                (RBracket, "]"),
                (Number, "255"),
                (Number, "1.5e3"),
                (String, "'hi there'"),
            ],
            kinds("note_color [key=60-72] 255 # trailing comment\n 1.5e3 'hi there'")
        );
    }

    #[test]
    fn test_sign_folding() {
        use TokenKind::*;
        assert_eq!(
            vec![
                (LBracket, "["),
                (Identifier, "key"),
                (Equals, "="),
                (Number, "-2"),
                (Identifier, "n"),
                (Plus, "+"),
                (Number, "1"),
                (Comma, ","),
                (Identifier, "tick"),
                (Equals, "="),
                (Minus, "-"),
                (Identifier, "n"),
                (RBracket, "]"),
            ],
            kinds("[key=-2n+1,tick=-n]")
        );
        assert_eq!(
            vec![(Identifier, "x"), (Number, "-1"), (Number, "+2")],
            kinds("x -1 +2")
        );
    }

    #[test]
    fn test_offsets_and_invalid() {
        let tokens = tokenize("a $ \"open");
        assert_eq!(3, tokens.len());
        assert_eq!(TokenKind::Invalid, tokens[1].kind);
        assert_eq!(2, tokens[1].offset);
        assert_eq!(TokenKind::Invalid, tokens[2].kind);
        assert_eq!("\"open", tokens[2].text);
        assert_eq!(4, tokens[2].offset);

        let strings = tokenize("\"a b\"");
        assert_eq!("a b", strings[0].string_value());
    }
}
