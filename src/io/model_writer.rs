use crate::{
    engine::{is_auxiliary, Model},
    symbols::Symbol,
};
use anyhow::{Context, Result};
use std::{collections::HashSet, io::Write};

/// A writer for answer sets.
///
/// Each model is written on its own line as the set of its true atoms, e.g. `{p(a),q}`.
/// Auxiliary atoms are hidden unless [show_auxiliary](Self::show_auxiliary) is set,
/// and a set of atoms (usually the facts of the program) can be hidden with [hide](Self::hide).
#[derive(Default)]
pub struct ModelWriter {
    hidden: HashSet<Symbol>,
    show_auxiliary: bool,
}

impl ModelWriter {
    /// Hides the given atoms in the models to write.
    pub fn hide(&mut self, atoms: HashSet<Symbol>) {
        self.hidden.extend(atoms);
    }

    /// Sets whether auxiliary atoms must be written.
    pub fn show_auxiliary(&mut self, show: bool) {
        self.show_auxiliary = show;
    }

    /// Writes a single model.
    pub fn write_model(&self, writer: &mut dyn Write, model: &Model) -> Result<()> {
        let context = "while writing a model";
        let atoms = model
            .true_atoms()
            .iter()
            .filter(|a| self.show_auxiliary || !is_auxiliary(a))
            .filter(|a| !self.hidden.contains(*a))
            .map(|a| a.to_string())
            .collect::<Vec<String>>();
        writeln!(writer, "{{{}}}", atoms.join(",")).context(context)?;
        writer.flush().context(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::parse_term;
    use std::io::BufWriter;

    fn model() -> Model {
        Model::new(
            1,
            ["q", "p(a)", "aux_e(p,a)", "p(\"b c\")"]
                .iter()
                .map(|s| parse_term(s).unwrap())
                .collect(),
        )
    }

    fn write(writer: &ModelWriter, model: &Model) -> String {
        let mut buffer = BufWriter::new(Vec::new());
        writer.write_model(&mut buffer, model).unwrap();
        String::from_utf8(buffer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_write_model() {
        assert_eq!(
            "{p(a),p(\"b c\"),q}\n",
            write(&ModelWriter::default(), &model())
        );
    }

    #[test]
    fn test_write_auxiliary_atoms() {
        let mut writer = ModelWriter::default();
        writer.show_auxiliary(true);
        assert_eq!(
            "{aux_e(p,a),p(a),p(\"b c\"),q}\n",
            write(&writer, &model())
        );
    }

    #[test]
    fn test_hide_facts() {
        let mut writer = ModelWriter::default();
        writer.hide(vec![Symbol::constant("q")].into_iter().collect());
        assert_eq!("{p(a),p(\"b c\")}\n", write(&writer, &model()));
    }

    #[test]
    fn test_write_empty_model() {
        let model = Model::new(1, Default::default());
        assert_eq!("{}\n", write(&ModelWriter::default(), &model));
    }
}
