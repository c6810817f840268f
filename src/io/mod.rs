//! Objects used to read ground programs and write their answer sets.

mod model_writer;
pub use model_writer::ModelWriter;

mod specs;
pub use specs::WarningHandler;

mod theory_reader;
pub use theory_reader::TheoryReader;
