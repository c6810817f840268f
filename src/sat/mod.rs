//! SAT solver interfaces used by the reference solving engine.
//!
//! The [Literal] type is also the decision literal handle exchanged with any solving engine.

mod cadical_solver;
pub use cadical_solver::CadicalSolver;

mod sat_solver;
pub use sat_solver::default_solver;
pub use sat_solver::Assignment;
pub use sat_solver::Literal;
pub use sat_solver::SatSolver;
pub use sat_solver::SolvingResult;
pub use sat_solver::Variable;
