//! The bridge between plugin code and the solving engine.
//!
//! Plugins exchange values with the engine through [Identifier]s,
//! which are only valid in the [SearchScope] they were created in,
//! and report their results through an [EvaluationCall].

mod context;
pub use context::ClaspContext;
pub use context::ContextRound;
pub use context::ReplacementIndex;
pub use context::SearchScope;

mod evaluation_call;
pub use evaluation_call::EvaluationCall;

mod external_atom;
pub use external_atom::ExternalAtom;
pub use external_atom::ExternalAtomRegistry;
pub use external_atom::InputKind;
pub use external_atom::OutputValue;
pub use external_atom::PluginArg;
pub use external_atom::PluginFn;

mod identifier;
pub use identifier::Identifier;

mod symbolic_literal;
pub use symbolic_literal::SymbolicLiteral;
