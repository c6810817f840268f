use crate::hex::{
    EvaluationCall, ExternalAtom, ExternalAtomRegistry, Identifier, InputKind, OutputValue,
    PluginArg,
};
use anyhow::Result;

fn zero_arity_false(_call: &mut EvaluationCall<'_>, _args: &[PluginArg<'_>]) -> Result<()> {
    Ok(())
}

fn zero_arity_true(call: &mut EvaluationCall<'_>, _args: &[PluginArg<'_>]) -> Result<()> {
    call.output(Vec::<OutputValue>::new());
    Ok(())
}

fn concat<'s>(call: &mut EvaluationCall<'s>, args: &[PluginArg<'s>]) -> Result<()> {
    let concatenation = args[0]
        .as_tuple()?
        .iter()
        .map(|i| match i.symbol().as_string() {
            Some(s) => s.to_string(),
            None => i.value(),
        })
        .collect::<String>();
    call.output(vec![format!("\"{}\"", concatenation)]);
    Ok(())
}

fn smaller_than<'s>(call: &mut EvaluationCall<'s>, args: &[PluginArg<'s>]) -> Result<()> {
    if args[0].as_id()?.int_value()? < args[1].as_id()?.int_value()? {
        call.output(Vec::<OutputValue>::new());
    }
    Ok(())
}

fn even<'s>(call: &mut EvaluationCall<'s>, args: &[PluginArg<'s>]) -> Result<()> {
    let n_true = args[0].as_id()?.extension()?.len() + args[1].as_id()?.extension()?.len();
    if n_true % 2 == 0 {
        call.output(Vec::<OutputValue>::new());
    }
    Ok(())
}

// the values X such that p(X) is true and q(X) is not
fn set_minus_values<'s>(args: &[PluginArg<'s>]) -> Result<Vec<Identifier<'s>>> {
    let removed = args[1]
        .as_id()?
        .extension()?
        .into_iter()
        .filter(|t| t.len() == 1)
        .map(|mut t| t.remove(0))
        .collect::<Vec<_>>();
    Ok(args[0]
        .as_id()?
        .extension()?
        .into_iter()
        .filter(|t| t.len() == 1)
        .map(|mut t| t.remove(0))
        .filter(|x| !removed.contains(x))
        .collect())
}

fn set_minus<'s>(call: &mut EvaluationCall<'s>, args: &[PluginArg<'s>]) -> Result<()> {
    for x in set_minus_values(args)? {
        call.output(vec![x]);
    }
    Ok(())
}

fn set_minus_partial<'s>(call: &mut EvaluationCall<'s>, args: &[PluginArg<'s>]) -> Result<()> {
    let p = args[0].as_id()?;
    let q = args[1].as_id()?;
    for atom in call.input_atoms()? {
        let tuple = atom.tuple()?;
        if tuple.len() != 2 || tuple[0] != *p {
            continue;
        }
        let x = tuple[1].clone();
        if atom.is_false()? {
            continue;
        }
        let q_value = match call.store_atom(&[q.clone(), x.clone()])? {
            Some(q_atom) => q_atom.is_assigned()?.then(|| q_atom.is_true()).transpose()?,
            None => Some(false),
        };
        match (atom.is_true()?, q_value) {
            (_, Some(true)) => {}
            (true, Some(false)) => call.output(vec![x]),
            _ => call.output_unknown(vec![x]),
        }
    }
    Ok(())
}

fn set_minus_learn<'s>(call: &mut EvaluationCall<'s>, args: &[PluginArg<'s>]) -> Result<()> {
    let p = args[0].as_id()?;
    let q = args[1].as_id()?;
    for x in set_minus_values(args)? {
        let p_atom = call.store_atom(&[p.clone(), x.clone()])?;
        let q_atom = call.store_atom(&[q.clone(), x.clone()])?;
        let output = call.store_output_atom(&[x.clone()])?;
        if let (Some(p_atom), Some(output)) = (p_atom, output) {
            let mut nogood = vec![p_atom, output.negate()?];
            if let Some(q_atom) = q_atom {
                nogood.push(q_atom.negate()?);
            }
            call.learn(&nogood)?;
        }
        call.output(vec![x]);
    }
    Ok(())
}

/// Registers the test plugins.
///
/// | name | inputs | outputs | semantics |
/// |------|--------|---------|-----------|
/// | `testZeroArity0` | | 0 | false |
/// | `testZeroArity1` | | 0 | true |
/// | `testConcat` | tuple | 1 | the concatenation of the inputs, as a string |
/// | `testSmallerThan` | constant, constant | 0 | true iff the first integer is smaller than the second one |
/// | `testEven` | predicate, predicate | 0 | true iff the predicates have an even number of true atoms |
/// | `testSetMinus` | predicate, predicate | 1 | the X such that `p(X)` is true and `q(X)` is not |
/// | `testSetMinusPartial` | predicate, predicate | 1 | `testSetMinus`, with partial evaluation |
/// | `testSetMinusLearn` | predicate, predicate | 1 | `testSetMinus`, learning its own nogoods |
pub fn register_test_plugins(registry: &mut ExternalAtomRegistry) -> Result<()> {
    use InputKind::{Constant, Predicate, Tuple};
    registry.register(ExternalAtom::new("testZeroArity0", vec![], 0, zero_arity_false))?;
    registry.register(ExternalAtom::new("testZeroArity1", vec![], 0, zero_arity_true))?;
    registry.register(ExternalAtom::new("testConcat", vec![Tuple], 1, concat))?;
    registry.register(ExternalAtom::new(
        "testSmallerThan",
        vec![Constant, Constant],
        0,
        smaller_than,
    ))?;
    registry.register(ExternalAtom::new("testEven", vec![Predicate, Predicate], 0, even))?;
    registry.register(ExternalAtom::new(
        "testSetMinus",
        vec![Predicate, Predicate],
        1,
        set_minus,
    ))?;
    registry.register(
        ExternalAtom::new(
            "testSetMinusPartial",
            vec![Predicate, Predicate],
            1,
            set_minus_partial,
        )
        .with_partial(true),
    )?;
    registry.register(ExternalAtom::new(
        "testSetMinusLearn",
        vec![Predicate, Predicate],
        1,
        set_minus_learn,
    ))?;
    Ok(())
}
