use super::{Identifier, OutputValue, SearchScope, SymbolicLiteral};
use crate::{error::HexError, sat::Literal, symbols::Symbol};
use anyhow::Result;
use log::warn;

/// The result collector of a single plugin call.
///
/// Plugins report their output tuples through [output](Self::output) and [output_unknown](Self::output_unknown),
/// and may look up the atoms they are allowed to observe to build their own nogoods.
pub struct EvaluationCall<'s> {
    scope: &'s SearchScope<'s>,
    atom_name: String,
    input_tuple: Vec<Symbol>,
    known_true: Vec<Vec<OutputValue>>,
    unknown: Vec<Vec<OutputValue>>,
    learned: Vec<Vec<Literal>>,
}

impl<'s> EvaluationCall<'s> {
    pub(crate) fn new(scope: &'s SearchScope<'s>, atom_name: &str, input_tuple: &[Symbol]) -> Self {
        Self {
            scope,
            atom_name: atom_name.to_string(),
            input_tuple: input_tuple.to_vec(),
            known_true: vec![],
            unknown: vec![],
            learned: vec![],
        }
    }

    /// Reports an output tuple as true.
    pub fn output<I, T>(&mut self, tuple: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<OutputValue>,
    {
        self.known_true
            .push(tuple.into_iter().map(|t| t.into()).collect());
    }

    /// Reports an output tuple the plugin cannot decide under the current partial assignment.
    pub fn output_unknown<I, T>(&mut self, tuple: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<OutputValue>,
    {
        self.unknown.push(tuple.into_iter().map(|t| t.into()).collect());
    }

    /// Returns the name of the evaluated external atom.
    pub fn atom_name(&self) -> &str {
        &self.atom_name
    }

    /// Returns the input tuple of the call, as plain values.
    pub fn input_tuple(&self) -> Vec<Identifier<'s>> {
        self.input_tuple
            .iter()
            .map(|s| self.scope.identifier(SymbolicLiteral::value(s.clone())))
            .collect()
    }

    /// Returns the predicate inputs of the call.
    pub fn input_atoms(&self) -> Result<Vec<Identifier<'s>>> {
        let scope = self.scope;
        scope.with_evaluation_inputs(|inputs| {
            inputs
                .iter()
                .map(|i| scope.identifier(i.clone()))
                .collect()
        })
    }

    /// Returns the predicate inputs of the call which are currently true.
    pub fn true_input_atoms(&self) -> Result<Vec<Identifier<'s>>> {
        let scope = self.scope;
        scope.with_evaluation_inputs(|inputs| {
            inputs
                .iter()
                .filter(|i| matches!(i.literal(), Some(l) if scope.value_of(l) == Some(true)))
                .map(|i| scope.identifier(i.clone()))
                .collect()
        })
    }

    /// Looks up a predicate input atom, given as its predicate name followed by its arguments.
    ///
    /// Only the predicate inputs of the call can be found;
    /// [Option::None] is returned (and a warning is logged) for any other atom.
    pub fn store_atom(&self, tuple: &[Identifier<'s>]) -> Result<Option<Identifier<'s>>> {
        let (name, arguments) = match tuple.split_first() {
            Some((n, a)) => (n.value(), a.iter().map(|i| i.symbol().clone()).collect::<Vec<_>>()),
            None => return Err(HexError::usage("store_atom called with an empty tuple")),
        };
        let scope = self.scope;
        let found = scope.with_evaluation_inputs(|inputs| {
            inputs
                .iter()
                .find(|i| i.symbol().name() == Some(name.as_str()) && i.symbol().arguments() == arguments.as_slice())
                .cloned()
        })?;
        if found.is_none() {
            warn!(
                "store_atom called with tuple {:?} which is not a predicate input of {}",
                tuple, self.atom_name
            );
        }
        Ok(found.map(|f| scope.identifier(f)))
    }

    /// Looks up the replacement atom of the evaluated external atom for the call inputs and the given outputs.
    ///
    /// [Option::None] is returned (and a warning is logged) if there is no such atom.
    pub fn store_output_atom(&self, outputs: &[Identifier<'s>]) -> Result<Option<Identifier<'s>>> {
        self.scope.ensure_live(&self.atom_name)?;
        let arguments = self
            .input_tuple
            .iter()
            .cloned()
            .chain(outputs.iter().map(|o| o.symbol().clone()))
            .collect::<Vec<_>>();
        let found = self.scope.find_replacement(&self.atom_name, &arguments);
        if found.is_none() {
            warn!(
                "store_output_atom found no replacement atom of {} for outputs {:?}",
                self.atom_name, outputs
            );
        }
        Ok(found.map(|f| self.scope.identifier(f)))
    }

    /// Reports a nogood the plugin knows to hold; every identifier must denote an atom.
    pub fn learn(&mut self, nogood: &[Identifier<'s>]) -> Result<()> {
        let literals = nogood
            .iter()
            .map(|id| {
                id.literal().ok_or_else(|| {
                    HexError::usage(format!(
                        "cannot learn a nogood containing {} which is not an atom",
                        id
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.learned.push(literals);
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (Vec<Vec<OutputValue>>, Vec<Vec<OutputValue>>, Vec<Vec<Literal>>) {
        (self.known_true, self.unknown, self.learned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::tests::MockAssignment,
        hex::{ClaspContext, ReplacementIndex},
    };

    struct Replacements(Vec<SymbolicLiteral>);

    impl ReplacementIndex for Replacements {
        fn find_replacement(&self, eatom: &str, arguments: &[Symbol]) -> Option<SymbolicLiteral> {
            self.0
                .iter()
                .find(|r| eatom == "e" && r.symbol().arguments() == arguments)
                .cloned()
        }
    }

    fn atom(name: &str, arg: &str, lit: isize) -> SymbolicLiteral {
        SymbolicLiteral::new(
            Symbol::function(name, vec![Symbol::constant(arg)]),
            Some(Literal::from(lit)),
        )
    }

    #[test]
    fn test_store_atom() {
        let context = ClaspContext::default();
        let assignment = MockAssignment::new(&[1, -2], true);
        let round = context.enter().unwrap();
        let scope = round.scope(Some(&assignment), None);
        let inputs = vec![atom("p", "x", 1), atom("p", "y", 2)];
        let _guard = scope.start_evaluation(&inputs).unwrap();
        let call = EvaluationCall::new(&scope, "e", &[Symbol::constant("p")]);
        let p = scope.identifier(SymbolicLiteral::value(Symbol::constant("p")));
        let y = scope.identifier(SymbolicLiteral::value(Symbol::constant("y")));
        let z = scope.identifier(SymbolicLiteral::value(Symbol::constant("z")));
        let found = call.store_atom(&[p.clone(), y]).unwrap().unwrap();
        assert_eq!(Some(Literal::from(2)), found.literal());
        assert!(call.store_atom(&[p, z]).unwrap().is_none());
        assert!(call.store_atom(&[]).is_err());
        assert_eq!(2, call.input_atoms().unwrap().len());
        let true_inputs = call.true_input_atoms().unwrap();
        assert_eq!(1, true_inputs.len());
        assert!(true_inputs[0] == "p(x)");
    }

    #[test]
    fn test_store_output_atom() {
        let context = ClaspContext::default();
        let replacements = Replacements(vec![SymbolicLiteral::new(
            Symbol::function("r", vec![Symbol::constant("p"), Symbol::constant("x")]),
            Some(Literal::from(5)),
        )]);
        let round = context.enter().unwrap();
        let scope = round.scope(None, Some(&replacements));
        let call = EvaluationCall::new(&scope, "e", &[Symbol::constant("p")]);
        let x = scope.identifier(SymbolicLiteral::value(Symbol::constant("x")));
        let y = scope.identifier(SymbolicLiteral::value(Symbol::constant("y")));
        let found = call.store_output_atom(&[x]).unwrap().unwrap();
        assert_eq!(Some(Literal::from(5)), found.literal());
        assert!(call.store_output_atom(&[y]).unwrap().is_none());
    }

    #[test]
    fn test_learn() {
        let context = ClaspContext::default();
        let round = context.enter().unwrap();
        let scope = round.scope(None, None);
        let mut call = EvaluationCall::new(&scope, "e", &[]);
        let a = scope.identifier(atom("p", "x", 1));
        let b = scope.identifier(atom("p", "y", 2));
        call.learn(&[a.clone(), b.negate().unwrap()]).unwrap();
        let plain = scope.identifier(SymbolicLiteral::value(Symbol::constant("x")));
        assert!(matches!(
            call.learn(&[a, plain]).unwrap_err().downcast_ref::<HexError>(),
            Some(HexError::Usage(_))
        ));
        call.output(vec![Symbol::constant("x")]);
        call.output_unknown(vec![1i64]);
        let (known_true, unknown, learned) = call.into_parts();
        assert_eq!(1, known_true.len());
        assert_eq!(vec![vec![OutputValue::Number(1)]], unknown);
        assert_eq!(vec![vec![Literal::from(1), Literal::from(-2)]], learned);
    }
}
