use super::WarningHandler;
use crate::{
    engine::GroundTheory,
    propagator::ReplacementSignature,
    sat::Literal,
    symbols::parse_term,
};
use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, BufReader, Read};

/// A reader for ground HEX programs.
///
/// # Format
///
/// The following content defines a program with three variables.
/// Variables 1 and 2 are bound to the atoms `p(a)` and `q(a)`;
/// the external atom `&id` has relevance predicate `aux_r_id` and replacement predicate `aux_e_id`, of arity 2.
/// The clause `-1 3 0` states that `p(a)` implies variable 3.
///
/// ```text
/// p hex 3
/// a 1 p(a)
/// a 2 q(a)
/// a 3 aux_e_id(p,a)
/// e id aux_r_id aux_e_id 2
/// 1 0
/// -1 3 0
/// ```
///
/// Lines starting with `#` are comments.
/// The preamble must come before any other content.
#[derive(Default)]
pub struct TheoryReader {
    warning_handlers: Vec<WarningHandler>,
}

impl TheoryReader {
    /// Reads a [GroundTheory].
    ///
    /// In case warnings are raised, the callback functions registered by [add_warning_handler](Self::add_warning_handler) are triggered.
    pub fn read(&self, reader: &mut dyn Read) -> Result<GroundTheory> {
        let br = BufReader::new(reader);
        let mut theory: Option<GroundTheory> = None;
        let mut signatures = vec![];
        for (i, line) in br.lines().enumerate() {
            let context = || format!("while reading line with index {}", i);
            let l = line.with_context(context)?;
            let l = l.trim();
            if l.is_empty() || l.starts_with('#') {
                continue;
            }
            let current = match theory.as_mut() {
                Some(t) => t,
                None => {
                    let words = l.split_whitespace().collect::<Vec<&str>>();
                    theory = Some(GroundTheory::new(
                        read_preamble(&words).with_context(context)?,
                    ));
                    continue;
                }
            };
            match l.split_whitespace().next() {
                Some("p") => return Err(anyhow!("multiple preambles")).with_context(context),
                Some("a") => read_atom(current, l).with_context(context)?,
                Some("e") => {
                    let (eatom, signature) = read_signature(l).with_context(context)?;
                    signatures.push((i, signature.replacement_predicate().to_string(), signature.arity()));
                    current.add_signature(&eatom, signature);
                }
                _ => {
                    let clause = read_clause(l).with_context(context)?;
                    let mut literals: Vec<Literal> = Vec::with_capacity(clause.len());
                    let mut tautology = false;
                    for lit in clause {
                        if literals.contains(&lit.negate()) {
                            tautology = true;
                        }
                        if literals.contains(&lit) {
                            self.warn(i, format!("literal {} appears more than once in the clause", isize::from(lit)));
                        } else {
                            literals.push(lit);
                        }
                    }
                    if tautology {
                        self.warn(i, "clause contains a literal and its negation".to_string());
                    }
                    current.add_clause(literals).with_context(context)?;
                }
            }
        }
        let theory = theory.ok_or_else(|| anyhow!("missing preamble"))?;
        for (i, predicate, arity) in signatures {
            if !theory
                .atoms()
                .iter()
                .any(|a| a.symbol().has_signature(&predicate, arity))
            {
                self.warn(
                    i,
                    format!("no atom matches replacement predicate {}/{}", predicate, arity),
                );
            }
        }
        Ok(theory)
    }

    /// Adds a callback function to call when warnings are raised while reading a program.
    pub fn add_warning_handler(&mut self, h: WarningHandler) {
        self.warning_handlers.push(h);
    }

    fn warn(&self, line: usize, message: String) {
        self.warning_handlers
            .iter()
            .for_each(|h| h(line, message.clone()));
    }
}

fn read_preamble(words: &[&str]) -> Result<usize> {
    if words.len() != 3 {
        return Err(anyhow!(
            r#"error in preamble; expected 3 words, got {}"#,
            words.len()
        ));
    }
    if words[0] != "p" {
        return Err(anyhow!(
            r#"error in first word of preamble; expected "p", got "{}""#,
            words[0]
        ));
    }
    if words[1] != "hex" {
        return Err(anyhow!(
            r#"error in second word of preamble; expected "hex", got "{}""#,
            words[1]
        ));
    }
    words[2]
        .parse::<usize>()
        .map_err(|_| anyhow!("error in preamble: invalid number of variables"))
}

fn read_var(word: &str) -> Result<usize> {
    match word.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow!("invalid variable index: {}", word)),
    }
}

fn read_atom(theory: &mut GroundTheory, line: &str) -> Result<()> {
    let mut parts = line.splitn(3, char::is_whitespace);
    parts.next();
    let var = read_var(parts.next().unwrap_or_default())?;
    let atom = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("missing atom after variable {}", var))?;
    let symbol = parse_term(atom).with_context(|| format!("while reading atom {}", atom))?;
    if symbol.name().is_none() || symbol.is_tuple() {
        return Err(anyhow!("{} is not an atom", atom));
    }
    theory.add_atom(symbol, var)
}

fn read_signature(line: &str) -> Result<(String, ReplacementSignature)> {
    let words = line.split_whitespace().collect::<Vec<&str>>();
    if words.len() != 5 {
        return Err(anyhow!(
            "error in external atom declaration; expected 5 words, got {}",
            words.len()
        ));
    }
    let arity = words[4]
        .parse::<usize>()
        .map_err(|_| anyhow!("invalid arity: {}", words[4]))?;
    Ok((
        words[1].to_string(),
        ReplacementSignature::new(words[2], words[3], arity),
    ))
}

fn read_clause(line: &str) -> Result<Vec<Literal>> {
    let mut words = line.split_whitespace().collect::<Vec<&str>>();
    if words.pop() != Some("0") {
        return Err(anyhow!("clauses must end with 0"));
    }
    words
        .into_iter()
        .map(|w| match w.parse::<isize>() {
            Ok(n) if n != 0 => Ok(Literal::from(n)),
            _ => Err(anyhow!("invalid literal: {}", w)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Symbol;
    use std::{cell::RefCell, rc::Rc};

    const INSTANCE: &str = "# a program\np hex 3\na 1 p(a)\na 2 q(\"a b\")\na 3 aux_e_id(p,a)\ne id aux_r_id aux_e_id 2\n1 0\n-1 3 0\n";

    #[test]
    fn test_ok() {
        let theory = TheoryReader::default()
            .read(&mut INSTANCE.as_bytes())
            .unwrap();
        assert_eq!(3, theory.n_vars());
        assert_eq!(3, theory.atoms().len());
        assert_eq!(
            Some(Literal::from(2)),
            theory
                .atom(&Symbol::function("q", vec![Symbol::string("a b")]))
                .map(|a| a.literal())
        );
        assert_eq!(2, theory.clauses().len());
        assert_eq!(1, theory.signatures().len());
        assert_eq!(1, theory.facts().len());
    }

    #[test]
    fn test_missing_preamble() {
        assert!(TheoryReader::default().read(&mut "".as_bytes()).is_err());
        assert!(TheoryReader::default()
            .read(&mut "a 1 p\n".as_bytes())
            .is_err());
    }

    #[test]
    fn test_invalid_preamble() {
        for instance in ["p af 3\n", "p hex\n", "p hex -1\n", "q hex 1\n"] {
            assert!(TheoryReader::default()
                .read(&mut instance.as_bytes())
                .is_err());
        }
    }

    #[test]
    fn test_multiple_preambles() {
        assert!(TheoryReader::default()
            .read(&mut "p hex 1\np hex 1\n".as_bytes())
            .is_err());
    }

    #[test]
    fn test_invalid_atoms() {
        for instance in [
            "p hex 1\na 1\n",
            "p hex 1\na 0 p\n",
            "p hex 1\na 2 p\n",
            "p hex 1\na 1 p(\n",
            "p hex 1\na 1 42\n",
            "p hex 2\na 1 p\na 2 p\n",
        ] {
            assert!(TheoryReader::default()
                .read(&mut instance.as_bytes())
                .is_err());
        }
    }

    #[test]
    fn test_invalid_clauses() {
        for instance in ["p hex 1\n1\n", "p hex 1\n2 0\n", "p hex 1\na 0\n", "p hex 1\n1 x 0\n"] {
            assert!(TheoryReader::default()
                .read(&mut instance.as_bytes())
                .is_err());
        }
    }

    #[test]
    fn test_error_context() {
        let err = TheoryReader::default()
            .read(&mut "p hex 1\n\n1 2 0\n".as_bytes())
            .unwrap_err();
        assert_eq!("while reading line with index 2", err.to_string());
    }

    #[test]
    fn test_invalid_signature() {
        for instance in ["p hex 1\ne id r\n", "p hex 1\ne id r e x\n"] {
            assert!(TheoryReader::default()
                .read(&mut instance.as_bytes())
                .is_err());
        }
    }

    #[test]
    fn test_warnings() {
        let warnings = Rc::new(RefCell::new(vec![]));
        let mut reader = TheoryReader::default();
        let handler_warnings = Rc::clone(&warnings);
        reader.add_warning_handler(Box::new(move |i, _| handler_warnings.borrow_mut().push(i)));
        let theory = reader
            .read(&mut "p hex 2\na 1 p\n1 1 0\n1 -1 0\ne id aux_r aux_e 1\n".as_bytes())
            .unwrap();
        assert_eq!(vec![2, 3, 4], *warnings.borrow());
        assert_eq!(vec![Literal::from(1)], theory.clauses()[0]);
    }
}
