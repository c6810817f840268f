use super::Symbol;
use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(
        r#"^\s*(?:(?P<num>-?\d+)|(?P<str>"(?:[^"\\]|\\.)*")|(?P<id>_*[a-z][A-Za-z0-9_']*)|(?P<punct>[(),]))"#
    )
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(i64),
    Str(String),
    Ident(String),
    Open,
    Close,
    Comma,
}

fn unescape(quoted: &str) -> Result<String> {
    let mut result = String::with_capacity(quoted.len());
    let mut chars = quoted[1..quoted.len() - 1].chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some('n') => result.push('\n'),
            Some(other) => return Err(anyhow!(r#"unknown escape sequence "\{}""#, other)),
            None => return Err(anyhow!("unterminated escape sequence")),
        }
    }
    Ok(result)
}

fn tokenize(s: &str) -> Result<Vec<Token>> {
    let mut tokens = vec![];
    let mut remaining = s;
    while !remaining.trim_start().is_empty() {
        let captures = TOKEN_PATTERN
            .captures(remaining)
            .ok_or_else(|| anyhow!(r#"unexpected input at "{}""#, remaining.trim()))?;
        let token = if let Some(n) = captures.name("num") {
            Token::Number(
                n.as_str()
                    .parse::<i64>()
                    .with_context(|| format!("invalid number {}", n.as_str()))?,
            )
        } else if let Some(q) = captures.name("str") {
            Token::Str(unescape(q.as_str())?)
        } else if let Some(i) = captures.name("id") {
            Token::Ident(i.as_str().to_string())
        } else {
            match captures.name("punct").map(|p| p.as_str()) {
                Some("(") => Token::Open,
                Some(")") => Token::Close,
                _ => Token::Comma,
            }
        };
        tokens.push(token);
        remaining = &remaining[captures.get(0).map_or(remaining.len(), |m| m.end())..];
    }
    Ok(tokens)
}

struct TermParser {
    tokens: Vec<Token>,
    next: usize,
}

impl TermParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.next)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.next).cloned();
        self.next += 1;
        t
    }

    fn parse_term(&mut self) -> Result<Symbol> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Symbol::number(n)),
            Some(Token::Str(s)) => Ok(Symbol::string(s)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::Open) {
                    self.advance();
                    let (arguments, _) = self.parse_arguments()?;
                    Ok(Symbol::function(name, arguments))
                } else {
                    Ok(Symbol::constant(name))
                }
            }
            Some(Token::Open) => {
                let (mut arguments, trailing_comma) = self.parse_arguments()?;
                if arguments.len() == 1 && !trailing_comma {
                    Ok(arguments.remove(0))
                } else {
                    Ok(Symbol::tuple(arguments))
                }
            }
            Some(t) => Err(anyhow!("unexpected token {:?}", t)),
            None => Err(anyhow!("unexpected end of input")),
        }
    }

    // reads the arguments after an opening parenthesis, up to and including the closing one
    fn parse_arguments(&mut self) -> Result<(Vec<Symbol>, bool)> {
        let mut arguments = vec![];
        if self.peek() == Some(&Token::Close) {
            self.advance();
            return Ok((arguments, false));
        }
        loop {
            arguments.push(self.parse_term()?);
            match self.advance() {
                Some(Token::Comma) => {
                    if self.peek() == Some(&Token::Close) {
                        self.advance();
                        return Ok((arguments, true));
                    }
                }
                Some(Token::Close) => return Ok((arguments, false)),
                Some(t) => return Err(anyhow!("unexpected token {:?} in argument list", t)),
                None => return Err(anyhow!("unterminated argument list")),
            }
        }
    }
}

/// Parses the textual form of a ground term.
///
/// Accepted terms are integers, quoted strings, constants, function applications and tuples.
///
/// # Example
///
/// ```
/// # use hexprop::symbols::{parse_term, Symbol};
/// let s = parse_term(r#"p(a,"b",(1,2))"#).unwrap();
/// assert_eq!(Some("p"), s.name());
/// assert_eq!(3, s.arguments().len());
/// assert!(parse_term("p(").is_err());
/// ```
pub fn parse_term(s: &str) -> Result<Symbol> {
    let context = || format!(r#"while parsing term "{}""#, s);
    let mut parser = TermParser {
        tokens: tokenize(s).with_context(context)?,
        next: 0,
    };
    let term = parser.parse_term().with_context(context)?;
    if let Some(t) = parser.peek() {
        return Err(anyhow!("unexpected token {:?} after term", t)).with_context(context);
    }
    Ok(term)
}
