use super::{EvaluationCall, Identifier};
use crate::{error::HexError, symbols::Symbol};
use anyhow::Result;
use std::collections::HashMap;
use strum_macros::{AsRefStr, Display};

/// The kind of an input argument of an external atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
pub enum InputKind {
    /// A predicate name; the plugin may read the extension of the predicate.
    Predicate,
    /// A plain term.
    Constant,
    /// All the remaining input terms, packed into a single argument; only allowed in final position.
    Tuple,
}

/// An argument given to a plugin callable.
#[derive(Debug, Clone)]
pub enum PluginArg<'s> {
    /// A single identifier (predicate and constant inputs).
    Id(Identifier<'s>),
    /// The identifiers packed by a [InputKind::Tuple] input.
    Tuple(Vec<Identifier<'s>>),
}

impl<'s> PluginArg<'s> {
    /// Returns the identifier of a single-valued argument.
    pub fn as_id(&self) -> Result<&Identifier<'s>> {
        match self {
            PluginArg::Id(id) => Ok(id),
            PluginArg::Tuple(_) => Err(HexError::usage(
                "expected a single identifier, got a tuple argument",
            )),
        }
    }

    /// Returns the identifiers of a tuple argument.
    pub fn as_tuple(&self) -> Result<&[Identifier<'s>]> {
        match self {
            PluginArg::Tuple(ids) => Ok(ids),
            PluginArg::Id(_) => Err(HexError::usage(
                "expected a tuple argument, got a single identifier",
            )),
        }
    }
}

/// A value reported by a plugin as part of an output tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputValue {
    /// A term given as is.
    Symbol(Symbol),
    /// An integer.
    Number(i64),
    /// A text: a quoted text is a string term, anything else is parsed as a term.
    Text(String),
}

impl From<Symbol> for OutputValue {
    fn from(s: Symbol) -> Self {
        OutputValue::Symbol(s)
    }
}

impl From<&Identifier<'_>> for OutputValue {
    fn from(id: &Identifier<'_>) -> Self {
        OutputValue::Symbol(id.symbol().clone())
    }
}

impl From<Identifier<'_>> for OutputValue {
    fn from(id: Identifier<'_>) -> Self {
        OutputValue::from(&id)
    }
}

impl From<i64> for OutputValue {
    fn from(n: i64) -> Self {
        OutputValue::Number(n)
    }
}

impl From<&str> for OutputValue {
    fn from(s: &str) -> Self {
        OutputValue::Text(s.to_string())
    }
}

impl From<String> for OutputValue {
    fn from(s: String) -> Self {
        OutputValue::Text(s)
    }
}

/// The signature of plugin callables.
///
/// A plugin reports its output tuples into the [EvaluationCall] it is given.
pub type PluginFn =
    dyn for<'s> Fn(&mut EvaluationCall<'s>, &[PluginArg<'s>]) -> Result<()> + Send + Sync;

/// An external atom: a named plugin callable with its declared shape.
///
/// # Plugin contract
///
/// When a plugin supports partial evaluation, a tuple it reports as known true under some decided inputs
/// must still be reported as known true when more inputs get decided.
/// Evaluation results are cached on the decided inputs only and rely on this property.
pub struct ExternalAtom {
    name: String,
    input_kinds: Vec<InputKind>,
    output_arity: usize,
    provides_partial: bool,
    func: Box<PluginFn>,
}

impl ExternalAtom {
    /// Builds a new external atom which does not support partial evaluation.
    pub fn new<S, F>(name: S, input_kinds: Vec<InputKind>, output_arity: usize, func: F) -> Self
    where
        S: Into<String>,
        F: for<'s> Fn(&mut EvaluationCall<'s>, &[PluginArg<'s>]) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            input_kinds,
            output_arity,
            provides_partial: false,
            func: Box::new(func),
        }
    }

    /// Declares whether the plugin is able to evaluate on partial assignments.
    ///
    /// Such plugins must be monotone: a tuple reported as true must stay true when more inputs get decided.
    /// Results are cached on the decided inputs only.
    pub fn with_partial(mut self, provides_partial: bool) -> Self {
        self.provides_partial = provides_partial;
        self
    }

    /// Returns the name of the external atom.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kinds of the input arguments.
    pub fn input_kinds(&self) -> &[InputKind] {
        &self.input_kinds
    }

    /// Returns the number of output arguments.
    pub fn output_arity(&self) -> usize {
        self.output_arity
    }

    /// Returns `true` iff the plugin supports partial evaluation.
    pub fn provides_partial(&self) -> bool {
        self.provides_partial
    }

    pub(crate) fn call<'s>(&self, call: &mut EvaluationCall<'s>, args: &[PluginArg<'s>]) -> Result<()> {
        (self.func)(call, args)
    }
}

impl std::fmt::Debug for ExternalAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalAtom")
            .field("name", &self.name)
            .field("input_kinds", &self.input_kinds)
            .field("output_arity", &self.output_arity)
            .field("provides_partial", &self.provides_partial)
            .finish()
    }
}

/// The set of external atoms available to a solving process, indexed by name.
#[derive(Debug, Default)]
pub struct ExternalAtomRegistry {
    atoms: Vec<ExternalAtom>,
    ids: HashMap<String, usize>,
}

impl ExternalAtomRegistry {
    /// Adds an external atom.
    ///
    /// Fails if an atom with the same name is already registered,
    /// or if a [InputKind::Tuple] input is not the last one.
    pub fn register(&mut self, atom: ExternalAtom) -> Result<()> {
        if self.ids.contains_key(atom.name()) {
            return Err(HexError::configuration(format!(
                r#"external atom "{}" is declared twice"#,
                atom.name()
            )));
        }
        if let Some(i) = atom.input_kinds.iter().position(|k| *k == InputKind::Tuple) {
            if i != atom.input_kinds.len() - 1 {
                return Err(HexError::configuration(format!(
                    r#"external atom "{}" has a tuple input which is not the last one"#,
                    atom.name()
                )));
            }
        }
        self.ids.insert(atom.name().to_string(), self.atoms.len());
        self.atoms.push(atom);
        Ok(())
    }

    /// Returns the external atom with the given name, if any.
    pub fn get(&self, name: &str) -> Option<&ExternalAtom> {
        self.ids.get(name).map(|i| &self.atoms[*i])
    }

    /// Returns the external atom with the given name, or a configuration error.
    pub fn get_or_fail(&self, name: &str) -> Result<&ExternalAtom> {
        self.get(name).ok_or_else(|| {
            HexError::configuration(format!(r#"unknown external atom "{}""#, name))
        })
    }

    /// Iterates over the external atoms in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ExternalAtom> + '_ {
        self.atoms.iter()
    }

    /// Returns the number of external atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Returns `true` iff no external atom is registered.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str, input_kinds: Vec<InputKind>) -> ExternalAtom {
        ExternalAtom::new(name, input_kinds, 0, |_, _| Ok(()))
    }

    #[test]
    fn test_register() {
        let mut registry = ExternalAtomRegistry::default();
        registry
            .register(noop("a", vec![InputKind::Predicate, InputKind::Tuple]))
            .unwrap();
        registry
            .register(noop("b", vec![]).with_partial(true))
            .unwrap();
        assert_eq!(2, registry.len());
        assert!(!registry.get("a").unwrap().provides_partial());
        assert!(registry.get("b").unwrap().provides_partial());
        assert!(registry.get("c").is_none());
        assert!(matches!(
            registry.get_or_fail("c").unwrap_err().downcast_ref::<HexError>(),
            Some(HexError::Configuration(_))
        ));
        assert_eq!(
            vec!["a", "b"],
            registry.iter().map(|a| a.name()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_register_twice() {
        let mut registry = ExternalAtomRegistry::default();
        registry.register(noop("a", vec![])).unwrap();
        assert!(registry.register(noop("a", vec![])).is_err());
    }

    #[test]
    fn test_tuple_not_last() {
        let mut registry = ExternalAtomRegistry::default();
        let err = registry
            .register(noop("a", vec![InputKind::Tuple, InputKind::Constant]))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HexError>(),
            Some(HexError::Configuration(_))
        ));
    }

    #[test]
    fn test_output_values() {
        assert_eq!(OutputValue::Number(2), OutputValue::from(2i64));
        assert_eq!(OutputValue::Text("a".to_string()), OutputValue::from("a"));
        assert_eq!(
            OutputValue::Symbol(Symbol::constant("a")),
            OutputValue::from(Symbol::constant("a"))
        );
    }
}
