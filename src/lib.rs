//! spnmux - Batch creation and lookup of Azure AD service principals.
//!
//! spnmux puts directory operations behind two small traits,
//! [`IdentityProvider`] and [`RoleAssigner`], and builds the batch workflow
//! on top of them: create one service principal per display name, keep
//! going when individual names fail, then grant the default role to
//! everything that was created in one call.
//!
//! # Features
//!
//! - **Partial-failure batches**: a rejected name is logged and recorded, the
//!   rest of the batch continues
//! - **Single role assignment call**: successful principals are handed to the
//!   role assigner once, at the end
//! - **Redacted secrets**: generated passwords never reach logs; reports show
//!   them only on explicit opt-in
//! - **Lookups**: by display name, application id, or `*` pattern
//! - **Feature Flags**: optional providers compiled only when enabled
//!
//! # Quick Start
//!
//! ```
//! use spnmux::batch::BatchPrincipalCreator;
//! use spnmux::{factory, Config, IdentityProvider, ProviderType};
//!
//! #[tokio::main]
//! async fn main() -> spnmux::Result<()> {
//!     spnmux::init();
//!
//!     let config = Config::new(ProviderType::Mock);
//!     let mut provider = factory::new_provider(config.clone())?;
//!     let mut assigner = factory::new_role_assigner(config.clone())?;
//!     provider.init().await?;
//!
//!     let outcome = BatchPrincipalCreator::new(&mut *provider, &mut *assigner, &config)
//!         .create_batch(&["billing-api", "billing-worker"])
//!         .await?;
//!
//!     println!("{}", outcome.summary());
//!     Ok(())
//! }
//! ```
//!
//! # Supported Providers
//!
//! | Provider | Feature Flag | CLI Required | Notes |
//! |----------|-------------|--------------|-------|
//! | Mock | `mock` (default) | None | In-memory testing provider |
//! | Azure CLI | `azcli` | `az` | Uses the signed-in `az login` session |

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod factory;
pub mod logging;
pub mod lookup;
pub mod principal;
pub mod provider;
pub mod providers;
pub mod secret;
pub mod validation;

pub use batch::{BatchOutcome, BatchPrincipalCreator, CreationSummary};
pub use config::{Config, ProviderType};
pub use error::{ProviderError, Result, SpnError};
pub use lookup::PrincipalQuery;
pub use principal::{
    CreatedPrincipal, CreationFailure, PasswordCredential, PrincipalCreationResult,
    ServicePrincipal,
};
pub use provider::{IdentityProvider, RoleAssigner};
pub use secret::Secret;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the spnmux library.
///
/// Registers all compiled providers with the factory. Idempotent.
pub fn init() {
    INIT.call_once(providers::register_all);
}
