//! Built-in external atom plugins.
//!
//! Plugins are plain functions registered into an [ExternalAtomRegistry].

mod test_plugins;
pub use test_plugins::register_test_plugins;

use crate::hex::ExternalAtomRegistry;
use anyhow::Result;

/// Returns a registry containing all the built-in plugins.
pub fn builtin_registry() -> Result<ExternalAtomRegistry> {
    let mut registry = ExternalAtomRegistry::default();
    register_test_plugins(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = builtin_registry().unwrap();
        assert_eq!(8, registry.len());
        assert!(registry.get("testSetMinusPartial").unwrap().provides_partial());
        assert!(!registry.get("testSetMinus").unwrap().provides_partial());
    }
}
