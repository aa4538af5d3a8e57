//! Identity provider implementations.

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "azcli")]
pub mod azcli;

/// Registers all compiled providers with the factory.
///
/// Called by [`crate::init`]; safe to call more than once.
pub fn register_all() {
    #[cfg(feature = "mock")]
    mock::register();

    #[cfg(feature = "azcli")]
    azcli::register();
}
