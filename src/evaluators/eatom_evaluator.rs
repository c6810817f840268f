use super::{AtomEvaluator, Evaluation, EvaluationResult};
use crate::{
    error::HexError,
    hex::{EvaluationCall, ExternalAtom, InputKind, OutputValue, PluginArg, SearchScope, SymbolicLiteral},
    symbols::{parse_term, Symbol},
};
use anyhow::{Context, Result};
use log::trace;
use std::{collections::HashSet, sync::Arc};

/// The evaluator calling the plugin code on each evaluation.
#[derive(Debug, Default)]
pub struct EAtomEvaluator;

impl EAtomEvaluator {
    fn plugin_args<'s>(
        scope: &'s SearchScope<'s>,
        atom: &ExternalAtom,
        input_tuple: &[Symbol],
    ) -> Result<Vec<PluginArg<'s>>> {
        let kinds = atom.input_kinds();
        let has_tuple = kinds.last() == Some(&InputKind::Tuple);
        let n_singles = if has_tuple { kinds.len() - 1 } else { kinds.len() };
        if input_tuple.len() < n_singles || (!has_tuple && input_tuple.len() != n_singles) {
            return Err(HexError::configuration(format!(
                "external atom {} expects {}{} inputs, got {}",
                atom.name(),
                if has_tuple { "at least " } else { "" },
                n_singles,
                input_tuple.len()
            )));
        }
        let plain = |s: &Symbol| scope.identifier(SymbolicLiteral::value(s.clone()));
        let mut args = input_tuple[..n_singles]
            .iter()
            .map(|s| PluginArg::Id(plain(s)))
            .collect::<Vec<_>>();
        if has_tuple {
            args.push(PluginArg::Tuple(
                input_tuple[n_singles..].iter().map(plain).collect(),
            ));
        }
        Ok(args)
    }

    fn output_symbols(atom: &ExternalAtom, tuples: Vec<Vec<OutputValue>>) -> Result<HashSet<Vec<Symbol>>> {
        tuples
            .into_iter()
            .map(|t| {
                t.into_iter()
                    .map(output_symbol)
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("while reading an output of {}", atom.name()))
            })
            .collect()
    }
}

/// Converts a value reported by a plugin into a term.
///
/// Quoted texts become strings (without their quotes), other texts are parsed as terms.
pub fn output_symbol(value: OutputValue) -> Result<Symbol> {
    match value {
        OutputValue::Symbol(s) => Ok(s),
        OutputValue::Number(n) => Ok(Symbol::number(n)),
        OutputValue::Text(t) => match t.strip_prefix('"') {
            Some(quoted) => Ok(Symbol::string(quoted.strip_suffix('"').unwrap_or(quoted))),
            None => parse_term(&t),
        },
    }
}

impl AtomEvaluator for EAtomEvaluator {
    fn evaluate<'s>(
        &self,
        scope: &'s SearchScope<'s>,
        atom: &ExternalAtom,
        input_tuple: &[Symbol],
        predicate_inputs: &[SymbolicLiteral],
    ) -> Result<Evaluation> {
        let args = Self::plugin_args(scope, atom, input_tuple)?;
        let mut call = EvaluationCall::new(scope, atom.name(), input_tuple);
        {
            let _guard = scope.start_evaluation(predicate_inputs)?;
            atom.call(&mut call, &args)
                .with_context(|| format!("while evaluating external atom {}", atom.name()))?;
        }
        let (known_true, unknown, learned) = call.into_parts();
        let known_true = Self::output_symbols(atom, known_true)?;
        let unknown = Self::output_symbols(atom, unknown)?;
        if let Some(t) = known_true.intersection(&unknown).next() {
            return Err(HexError::contract(format!(
                "external atom {} reported output tuple ({}) both as true and unknown",
                atom.name(),
                t.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(",")
            )));
        }
        trace!(
            "evaluated {} on ({}): {} true, {} unknown, {} learned",
            atom.name(),
            input_tuple.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(","),
            known_true.len(),
            unknown.len(),
            learned.len()
        );
        Ok(Evaluation::new(
            Arc::new(EvaluationResult::new(known_true, unknown)),
            learned,
        ))
    }
}
