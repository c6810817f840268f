use super::{AtomEvaluator, EAtomEvaluator, Evaluation, EvaluationResult};
use crate::{
    hex::{ExternalAtom, SearchScope, SymbolicLiteral},
    symbols::Symbol,
};
use anyhow::{anyhow, Result};
use log::debug;
use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

#[derive(Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    atom: String,
    input_tuple: Vec<Symbol>,
    true_inputs: BTreeSet<Symbol>,
    false_inputs: BTreeSet<Symbol>,
}

/// An evaluator memoizing the results of an [EAtomEvaluator].
///
/// Results are keyed by the atom, the input tuple and the predicate inputs which are decided in the current assignment;
/// unassigned inputs are not part of the key.
/// This is sound for plugins honoring the monotonicity contract described in [ExternalAtom].
///
/// The cache lives as long as the evaluator and is shared by all its users.
/// Only output sets are cached: nogoods learned by a plugin go to the caller whose evaluation ran the plugin,
/// and cache hits come with no learned nogoods.
#[derive(Debug, Default)]
pub struct CachedEAtomEvaluator {
    evaluator: EAtomEvaluator,
    cache: Mutex<HashMap<CacheKey, Arc<EvaluationResult>>>,
    n_hits: AtomicUsize,
    n_misses: AtomicUsize,
}

impl CachedEAtomEvaluator {
    /// Returns the number of evaluations answered from the cache.
    pub fn n_hits(&self) -> usize {
        self.n_hits.load(Ordering::Relaxed)
    }

    /// Returns the number of evaluations delegated to the plugins.
    pub fn n_misses(&self) -> usize {
        self.n_misses.load(Ordering::Relaxed)
    }

    fn cached(&self, key: &CacheKey) -> Result<Option<Arc<EvaluationResult>>> {
        let cache = self
            .cache
            .lock()
            .map_err(|_| anyhow!("the evaluation cache lock is poisoned"))?;
        Ok(cache.get(key).cloned())
    }
}

impl AtomEvaluator for CachedEAtomEvaluator {
    fn evaluate<'s>(
        &self,
        scope: &'s SearchScope<'s>,
        atom: &ExternalAtom,
        input_tuple: &[Symbol],
        predicate_inputs: &[SymbolicLiteral],
    ) -> Result<Evaluation> {
        let mut true_inputs = BTreeSet::new();
        let mut false_inputs = BTreeSet::new();
        for input in predicate_inputs {
            match input.literal().and_then(|l| scope.value_of(l)) {
                Some(true) => true_inputs.insert(input.symbol().clone()),
                Some(false) => false_inputs.insert(input.symbol().clone()),
                None => false,
            };
        }
        let key = CacheKey {
            atom: atom.name().to_string(),
            input_tuple: input_tuple.to_vec(),
            true_inputs,
            false_inputs,
        };
        if let Some(result) = self.cached(&key)? {
            self.n_hits.fetch_add(1, Ordering::Relaxed);
            debug!("cache hit for {} on {:?}", atom.name(), key.input_tuple);
            return Ok(Evaluation::new(result, vec![]));
        }
        self.n_misses.fetch_add(1, Ordering::Relaxed);
        debug!("cache miss for {} on {:?}", atom.name(), key.input_tuple);
        let evaluation = self
            .evaluator
            .evaluate(scope, atom, input_tuple, predicate_inputs)?;
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| anyhow!("the evaluation cache lock is poisoned"))?;
        cache
            .entry(key)
            .or_insert_with(|| Arc::clone(evaluation.result()));
        Ok(evaluation)
    }
}
