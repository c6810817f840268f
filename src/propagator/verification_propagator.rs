use super::{Nogood, ProgramSignatures, VerificationRecord};
use crate::{
    engine::{CheckMode, PropagateControl, PropagateInit, Propagation, Propagator},
    error::HexError,
    evaluators::AtomEvaluator,
    hex::{ClaspContext, ExternalAtom, ExternalAtomRegistry, InputKind, ReplacementIndex, SearchScope, SymbolicLiteral},
    sat::Literal,
    symbols::Symbol,
};
use anyhow::{Context, Result};
use log::{debug, info, log_enabled, trace, Level};
use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

#[derive(Debug, Default)]
struct Verifications(Vec<(String, Vec<VerificationRecord>)>);

impl ReplacementIndex for Verifications {
    fn find_replacement(&self, eatom: &str, arguments: &[Symbol]) -> Option<SymbolicLiteral> {
        self.0
            .iter()
            .filter(|(e, _)| e == eatom)
            .flat_map(|(_, records)| records)
            .find(|r| r.replacement().symbol().arguments() == arguments)
            .map(|r| r.replacement().clone())
    }
}

/// The propagator checking the guesses of the engine about external atoms.
///
/// At initialization, one [VerificationRecord] is built for each ground replacement atom.
/// At each check, the relevant records are evaluated against the current assignment;
/// when the guess of the engine differs from the actual value of the external atom,
/// a nogood made of the decided predicate inputs and the replacement literal is added.
/// Guesses confirmed by the evaluation add nothing.
pub struct VerificationPropagator {
    name: String,
    evaluator: Arc<dyn AtomEvaluator>,
    registry: Arc<ExternalAtomRegistry>,
    signatures: Arc<ProgramSignatures>,
    partial_eatoms: Arc<HashSet<String>>,
    verifications: Verifications,
    context: ClaspContext,
    learned_nogoods: HashSet<Vec<Literal>>,
}

impl VerificationPropagator {
    pub(crate) fn new(
        name: &str,
        evaluator: Arc<dyn AtomEvaluator>,
        registry: Arc<ExternalAtomRegistry>,
        signatures: Arc<ProgramSignatures>,
        partial_eatoms: Arc<HashSet<String>>,
    ) -> Self {
        Self {
            name: format!("VerificationPropagator({})", name),
            evaluator,
            registry,
            signatures,
            partial_eatoms,
            verifications: Verifications::default(),
            context: ClaspContext::default(),
            learned_nogoods: HashSet::new(),
        }
    }

    /// Returns the name of this propagator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterates over the verification records, grouped by external atom.
    pub fn records(&self) -> impl Iterator<Item = (&str, &[VerificationRecord])> + '_ {
        self.verifications
            .0
            .iter()
            .map(|(e, r)| (e.as_str(), r.as_slice()))
    }

    /// Returns the number of distinct nogoods submitted to the engine so far.
    pub fn n_learned_nogoods(&self) -> usize {
        self.learned_nogoods.len()
    }

    fn build_record(
        init: &dyn PropagateInit,
        atom: &ExternalAtom,
        relevance_predicate: &str,
        replacement: SymbolicLiteral,
        verify_on_partial: bool,
        signatures: &[(String, usize)],
    ) -> Result<VerificationRecord> {
        let arguments = replacement.symbol().arguments();
        let relevance_symbol = Symbol::function(relevance_predicate, arguments.to_vec());
        let relevance = init.symbolic_atom(&relevance_symbol).ok_or_else(|| {
            HexError::configuration(format!(
                "no relevance atom {} for replacement atom {}",
                relevance_symbol,
                replacement.symbol()
            ))
        })?;
        let mut predicate_inputs = BTreeMap::new();
        for (position, kind) in atom.input_kinds().iter().enumerate() {
            if *kind != InputKind::Predicate {
                continue;
            }
            let predicate = arguments.get(position).ok_or_else(|| {
                HexError::configuration(format!(
                    "replacement atom {} has no argument for input {} of {}",
                    replacement.symbol(),
                    position,
                    atom.name()
                ))
            })?;
            let predicate = predicate.to_string();
            let inputs = signatures
                .iter()
                .filter(|(name, _)| *name == predicate)
                .flat_map(|(name, arity)| init.symbolic_atoms_by_signature(name, *arity))
                .map(|a| SymbolicLiteral::new(a.symbol().clone(), Some(a.literal())))
                .collect::<Vec<_>>();
            trace!(
                "predicate input {} of {} has {} atoms",
                position,
                replacement.symbol(),
                inputs.len()
            );
            predicate_inputs.insert(position, inputs);
        }
        Ok(VerificationRecord::new(
            SymbolicLiteral::new(relevance.symbol().clone(), Some(relevance.literal())),
            replacement,
            predicate_inputs,
            verify_on_partial,
        ))
    }
}

impl Propagator for VerificationPropagator {
    fn init(&mut self, init: &mut dyn PropagateInit) -> Result<()> {
        let signature_table = init.signatures();
        let mut verifications = Vec::with_capacity(self.signatures.len());
        let mut require_partial_evaluation = false;
        for (eatom, signatures) in self.signatures.iter() {
            info!("{}: processing external atom {}", self.name, eatom);
            let atom = self.registry.get_or_fail(eatom)?;
            let verify_on_partial = self.partial_eatoms.contains(eatom);
            let mut records = vec![];
            for signature in signatures {
                debug!(
                    "{}: external atom {} has relevance predicate {} and replacement predicate {} with arity {}",
                    self.name,
                    eatom,
                    signature.relevance_predicate(),
                    signature.replacement_predicate(),
                    signature.arity()
                );
                if atom.output_arity() > signature.arity() {
                    return Err(HexError::configuration(format!(
                        "external atom {} has {} outputs but its replacement predicate {} has arity {}",
                        eatom,
                        atom.output_arity(),
                        signature.replacement_predicate(),
                        signature.arity()
                    )));
                }
                for replacement in init
                    .symbolic_atoms_by_signature(signature.replacement_predicate(), signature.arity())
                {
                    debug!("{}: replacement atom {}", self.name, replacement.symbol());
                    let record = Self::build_record(
                        init,
                        atom,
                        signature.relevance_predicate(),
                        SymbolicLiteral::new(replacement.symbol().clone(), Some(replacement.literal())),
                        verify_on_partial,
                        &signature_table,
                    )
                    .with_context(|| format!("while initializing {}", self.name))?;
                    records.push(record);
                }
            }
            if verify_on_partial && !records.is_empty() {
                info!(
                    "{}: checks will happen on partial assignments due to external atom {}",
                    self.name, eatom
                );
                require_partial_evaluation = true;
            }
            verifications.push((eatom.to_string(), records));
        }
        self.verifications = Verifications(verifications);
        init.set_check_mode(if require_partial_evaluation {
            CheckMode::Fixpoint
        } else {
            CheckMode::Total
        });
        Ok(())
    }

    fn check(&mut self, control: &mut dyn PropagateControl) -> Result<Propagation> {
        let is_total = control.assignment().is_total();
        info!("{}: entering check with total assignment={}", self.name, is_total);
        let round = self.context.enter()?;
        let mut status = Propagation::Continue;
        'records: for (eatom, records) in self.verifications.0.iter() {
            let atom = self.registry.get_or_fail(eatom)?;
            for record in records {
                if !is_total && !record.verify_on_partial() {
                    continue;
                }
                let relevant = matches!(record.relevance().literal(), Some(l) if control.assignment().is_true(l));
                if !relevant {
                    trace!("{}: no need to verify {}", self.name, record.replacement().symbol());
                    continue;
                }
                let nogoods = {
                    let scope = round.scope(Some(control.assignment()), Some(&self.verifications));
                    verify(&scope, self.evaluator.as_ref(), atom, record, &self.name)?
                };
                for nogood in nogoods {
                    if submit(&mut self.learned_nogoods, control, &nogood, &self.name) == Propagation::StopRound {
                        status = Propagation::StopRound;
                        break 'records;
                    }
                }
            }
        }
        if status == Propagation::StopRound {
            debug!("{}: aborted propagation", self.name);
        }
        info!("{}: leaving check", self.name);
        Ok(status)
    }
}

fn verify<'s>(
    scope: &'s SearchScope<'s>,
    evaluator: &dyn AtomEvaluator,
    atom: &ExternalAtom,
    record: &VerificationRecord,
    name: &str,
) -> Result<Vec<Nogood>> {
    let replacement = record.replacement();
    let replacement_literal = replacement.literal().ok_or_else(|| {
        HexError::configuration(format!("replacement atom {} has no literal", replacement.symbol()))
    })?;
    let target_value = scope.value_of(replacement_literal) == Some(true);
    let arguments = replacement.symbol().arguments();
    let n_inputs = arguments.len().checked_sub(atom.output_arity()).ok_or_else(|| {
        HexError::configuration(format!(
            "replacement atom {} has less arguments than the outputs of {}",
            replacement.symbol(),
            atom.name()
        ))
    })?;
    let (input_tuple, output_tuple) = arguments.split_at(n_inputs);
    debug!(
        "{}: checking if {} = {} on {} assignment",
        name,
        replacement.symbol(),
        target_value,
        if scope.assignment_is_total() { "total" } else { "partial" }
    );
    let evaluation = evaluator.evaluate(scope, atom, input_tuple, record.all_inputs())?;
    let mut nogoods = evaluation
        .learned()
        .iter()
        .filter_map(|literals| {
            let nogood = Nogood::from_literals(literals);
            if nogood.is_none() {
                debug!("{}: ignoring a learned nogood with opposite literals", name);
            }
            nogood
        })
        .collect::<Vec<_>>();
    match evaluation.result().classify(output_tuple) {
        None => info!(
            "{}: external atom {} gave output tuple of {} as unknown; cannot verify",
            name,
            atom.name(),
            replacement.symbol()
        ),
        Some(real_value) if real_value == target_value => {
            info!("{}: atom {} positively verified", name, replacement.symbol())
        }
        Some(real_value) => {
            info!("{}: verification of atom {} failed", name, replacement.symbol());
            if let Some(nogood) = explain(scope, record, replacement_literal, real_value, name) {
                nogoods.push(nogood);
            }
        }
    }
    Ok(nogoods)
}

fn explain(
    scope: &SearchScope<'_>,
    record: &VerificationRecord,
    replacement_literal: Literal,
    real_value: bool,
    name: &str,
) -> Option<Nogood> {
    let mut nogood = Nogood::default();
    let mut readable = vec![];
    for input in record.all_inputs() {
        let lit = match input.literal() {
            Some(l) => l,
            None => continue,
        };
        let signed = match scope.value_of(lit) {
            Some(true) => lit,
            Some(false) => lit.negate(),
            None => continue,
        };
        if !nogood.add(signed) {
            debug!("{}: cannot build nogood (opposite literals)", name);
            return None;
        }
        readable.push(SymbolicLiteral::new(input.symbol().clone(), Some(signed)));
    }
    let check_literal = if real_value {
        replacement_literal.negate()
    } else {
        replacement_literal
    };
    if !nogood.add(check_literal) {
        debug!("{}: cannot build nogood (opposite literals)", name);
        return None;
    }
    if log_enabled!(Level::Info) {
        readable.push(SymbolicLiteral::new(
            record.replacement().symbol().clone(),
            Some(check_literal),
        ));
        info!(
            "{}: adding nogood [{}]",
            name,
            readable.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(",")
        );
    }
    Some(nogood)
}

fn submit(
    learned_nogoods: &mut HashSet<Vec<Literal>>,
    control: &mut dyn PropagateControl,
    nogood: &Nogood,
    name: &str,
) -> Propagation {
    if !learned_nogoods.insert(nogood.key()) {
        debug!("{}: skipping known nogood {:?}", name, nogood.literals());
        return Propagation::Continue;
    }
    debug!("{}: adding nogood {:?}", name, nogood.literals());
    if control.add_nogood(nogood.literals()) {
        Propagation::Continue
    } else {
        debug!("{}: the engine refused to continue this round", name);
        Propagation::StopRound
    }
}
