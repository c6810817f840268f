//! hexprop checks the guesses an answer set solver makes about external atoms of HEX programs.
//!
//! The solving engine guesses the truth values of replacement atoms;
//! the [VerificationPropagator](propagator::VerificationPropagator) evaluates the external atoms
//! through plugin functions, and adds a nogood each time a guess turns out to be wrong.
//! A SAT-based reference engine ([SatEngine](engine::SatEngine)) runs the whole loop on ground programs.

#![warn(missing_docs)]

pub mod engine;

pub mod error;

pub mod evaluators;

pub mod hex;

pub mod io;

pub mod plugins;

pub mod propagator;

pub mod sat;

pub mod symbols;
