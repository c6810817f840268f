//! The verification propagator and the objects it is built from.

mod factory;
pub use factory::PropagatorFactory;

mod verification;
pub use verification::Nogood;
pub use verification::ProgramSignatures;
pub use verification::ReplacementSignature;
pub use verification::VerificationRecord;

mod verification_propagator;
pub use verification_propagator::VerificationPropagator;
