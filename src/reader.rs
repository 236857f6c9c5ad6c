// ABOUTME: Reader module turning source text into values in two phases:
// a nom-based tokenizer and a recursive parser over the token stream

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_while, take_while1},
    character::complete::{anychar, char, none_of, one_of},
    combinator::value,
    multi::many0,
    IResult, Parser,
};

use crate::error::LispError;
use crate::value::{MapKey, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    SpliceUnquote,   // ~@
    Special(char),   // one of []{}()'`^@~
    Str(String),     // decoded payload, quotes stripped
    Atom(String),    // number, symbol, keyword, nil, true, false
}

// ============================================================================
// Phase one: tokenize
// ============================================================================

/// Whitespace run; commas count as whitespace
fn blank(input: &str) -> IResult<&str, ()> {
    value((), take_while1(|c: char| c.is_whitespace() || c == ',')).parse(input)
}

/// Line comment, `;` to end of line, discarded
fn comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn skip_blanks(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((blank, comment)))).parse(input)
}

fn splice_unquote(input: &str) -> IResult<&str, Token> {
    value(Token::SpliceUnquote, tag("~@")).parse(input)
}

fn special(input: &str) -> IResult<&str, Token> {
    let (input, c) = one_of("[]{}()'`^@~")(input)?;
    Ok((input, Token::Special(c)))
}

/// A string literal. `\"`, `\n` and `\\` decode; any other escaped character
/// passes through verbatim. A missing closing quote fails the parse.
fn string_token(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('"')(input)?;

    // `escaped` needs at least one content character
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Token::Str(String::new())));
    }

    let (input, raw) = escaped(none_of("\"\\"), '\\', anychar)(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, Token::Str(decode_escapes(raw))))
}

fn decode_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other), // covers \" and \\
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Maximal run up to the next special character, whitespace, or comma
fn atom_token(input: &str) -> IResult<&str, Token> {
    let (input, text) = take_while1(|c: char| {
        !c.is_whitespace()
            && !matches!(
                c,
                ',' | ';' | '"' | '(' | ')' | '[' | ']' | '{' | '}' | '\'' | '`'
            )
    })(input)?;
    Ok((input, Token::Atom(text.to_string())))
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((splice_unquote, special, string_token, atom_token)).parse(input)
}

fn tokenize(input: &str) -> Result<Vec<Token>, LispError> {
    let mut rest = input;
    let mut tokens = Vec::new();
    loop {
        let (after, ()) = skip_blanks(rest).unwrap_or((rest, ()));
        rest = after;
        if rest.is_empty() {
            break;
        }
        match token(rest) {
            Ok((after, tok)) => {
                tokens.push(tok);
                rest = after;
            }
            // Only an unterminated string can fail here
            Err(_) => return Err(LispError::Unbalanced),
        }
    }
    Ok(tokens)
}

// ============================================================================
// Phase two: parse
// ============================================================================

struct Reader {
    tokens: Vec<Token>,
    pos: usize,
}

impl Reader {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }
}

/// Read one form from `input`.
///
/// `Ok(None)` is the "no form" condition for input that is only whitespace
/// and comments; the REPL drops it silently. Input past the first complete
/// form is ignored.
pub fn read_str(input: &str) -> Result<Option<Value>, LispError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut reader = Reader { tokens, pos: 0 };
    Ok(Some(read_form(&mut reader)?))
}

fn read_form(reader: &mut Reader) -> Result<Value, LispError> {
    let token = reader.next().ok_or(LispError::Unbalanced)?;
    match token {
        Token::Special('(') => Ok(Value::list(read_seq(reader, ')')?)),
        Token::Special('[') => Ok(Value::vector(read_seq(reader, ']')?)),
        Token::Special('{') => read_map(reader),
        Token::Special('\'') => wrap("quote", reader),
        Token::Special('`') => wrap("quasiquote", reader),
        Token::Special('~') => wrap("unquote", reader),
        Token::SpliceUnquote => wrap("splice-unquote", reader),
        Token::Special('@') => wrap("deref", reader),
        Token::Special('^') => {
            // ^m x reads as (with-meta x m): target and metadata swap places
            let meta = read_form(reader)?;
            let target = read_form(reader)?;
            Ok(Value::list(vec![Value::symbol("with-meta"), target, meta]))
        }
        Token::Special(c) => Err(LispError::msg(format!("unexpected '{}'", c))),
        Token::Str(s) => Ok(Value::Str(s)),
        Token::Atom(text) => read_atom(&text),
    }
}

fn wrap(name: &str, reader: &mut Reader) -> Result<Value, LispError> {
    let form = read_form(reader)?;
    Ok(Value::list(vec![Value::symbol(name), form]))
}

fn read_seq(reader: &mut Reader, close: char) -> Result<Vec<Value>, LispError> {
    let mut items = Vec::new();
    loop {
        match reader.peek() {
            None => return Err(LispError::Unbalanced),
            Some(Token::Special(c)) if *c == close => {
                reader.next();
                return Ok(items);
            }
            Some(_) => items.push(read_form(reader)?),
        }
    }
}

fn read_map(reader: &mut Reader) -> Result<Value, LispError> {
    let mut entries = HashMap::new();
    loop {
        match reader.peek() {
            None => return Err(LispError::Unbalanced),
            Some(Token::Special('}')) => {
                reader.next();
                return Ok(Value::map(entries));
            }
            Some(_) => {
                let key = MapKey::from_value(&read_form(reader)?)?;
                let value = match reader.peek() {
                    None => return Err(LispError::Unbalanced),
                    Some(Token::Special('}')) => {
                        return Err(LispError::msg("map literal requires an even number of forms"))
                    }
                    Some(_) => read_form(reader)?,
                };
                entries.insert(key, value);
            }
        }
    }
}

fn read_atom(text: &str) -> Result<Value, LispError> {
    match text {
        "nil" => return Ok(Value::Nil),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }
    if let Some(name) = text.strip_prefix(':') {
        return Ok(Value::keyword(name));
    }
    if looks_numeric(text) {
        return text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| LispError::msg(format!("invalid number '{}'", text)));
    }
    Ok(Value::symbol(text))
}

/// First character a digit, or `-` followed by a digit
fn looks_numeric(text: &str) -> bool {
    matches!(text.as_bytes(), [b'0'..=b'9', ..] | [b'-', b'0'..=b'9', ..])
}
