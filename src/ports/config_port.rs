//! Configuration access port trait.

/// Keyed string lookup into a sectioned configuration source. Typed
/// conversion and range checks live in `config_validation`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
