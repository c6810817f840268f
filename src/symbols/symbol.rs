use std::fmt::Display;
use strum_macros::{AsRefStr, Display as StrumDisplay};

/// The kind of a ground term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, StrumDisplay)]
pub enum SymbolType {
    /// An integer.
    Number,
    /// A quoted string.
    String,
    /// A constant, a function application or a tuple.
    Function,
}

/// An immutable ground term.
///
/// Terms are numbers, strings, and function applications.
/// Constants are functions with no arguments, and tuples are functions with an empty name.
///
/// # Example
///
/// ```
/// # use hexprop::symbols::Symbol;
/// let s = Symbol::function("p", vec![Symbol::constant("a"), Symbol::number(3)]);
/// assert_eq!("p(a,3)", s.to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// An integer.
    Number(i64),
    /// A function application.
    Function {
        /// The name; empty for tuples.
        name: String,
        /// The ordered arguments.
        arguments: Vec<Symbol>,
    },
    /// A string, stored unquoted and unescaped.
    String(String),
}

impl Symbol {
    /// Builds a number.
    pub fn number(n: i64) -> Self {
        Symbol::Number(n)
    }

    /// Builds a string term; the content is given unquoted.
    pub fn string<S: Into<String>>(s: S) -> Self {
        Symbol::String(s.into())
    }

    /// Builds a function application.
    pub fn function<S: Into<String>>(name: S, arguments: Vec<Symbol>) -> Self {
        Symbol::Function {
            name: name.into(),
            arguments,
        }
    }

    /// Builds a constant (a function without arguments).
    pub fn constant<S: Into<String>>(name: S) -> Self {
        Self::function(name, vec![])
    }

    /// Builds a tuple.
    pub fn tuple(arguments: Vec<Symbol>) -> Self {
        Self::function("", arguments)
    }

    /// Returns the kind of this term.
    pub fn symbol_type(&self) -> SymbolType {
        match self {
            Symbol::Number(_) => SymbolType::Number,
            Symbol::String(_) => SymbolType::String,
            Symbol::Function { .. } => SymbolType::Function,
        }
    }

    /// Returns the value of a number, or [Option::None] for other terms.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Symbol::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the content of a string, or [Option::None] for other terms.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Symbol::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the name of a function, or [Option::None] for other terms.
    pub fn name(&self) -> Option<&str> {
        match self {
            Symbol::Function { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the arguments of a function; other terms have no arguments.
    pub fn arguments(&self) -> &[Symbol] {
        match self {
            Symbol::Function { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Returns `true` iff this term is a constant (a named function without arguments).
    pub fn is_constant(&self) -> bool {
        matches!(self, Symbol::Function { name, arguments } if arguments.is_empty() && !name.is_empty())
    }

    /// Returns `true` iff this term is a tuple.
    pub fn is_tuple(&self) -> bool {
        matches!(self, Symbol::Function { name, .. } if name.is_empty())
    }

    /// Returns `true` iff this term is a function with the given name and arity.
    pub fn has_signature(&self, name: &str, arity: usize) -> bool {
        matches!(self, Symbol::Function { name: n, arguments } if n == name && arguments.len() == arity)
    }
}

fn write_escaped(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            _ => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Number(n) => write!(f, "{}", n),
            Symbol::String(s) => write_escaped(f, s),
            Symbol::Function { name, arguments } => {
                write!(f, "{}", name)?;
                if arguments.is_empty() && !name.is_empty() {
                    return Ok(());
                }
                write!(f, "(")?;
                for (i, a) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", a)?;
                }
                if name.is_empty() && arguments.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}
