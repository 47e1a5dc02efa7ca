#[cfg(feature = "secret-manager")]
pub mod secret_manager;

pub use crate::credentials::{EnvSecretProvider, SecretProvider};
#[cfg(feature = "secret-manager")]
pub use secret_manager::SecretManagerProvider;
