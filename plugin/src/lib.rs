//! Scene-as-transition plugin core.
//!
//! A transition type that plays a "bridge" scene between the two endpoints of
//! a scene switch. The host is reached only through the traits in [`host`];
//! [`sim`] provides an in-memory host for offline playback and tests.

use tracing::info;

pub mod config;
pub mod events;
pub mod host;
pub mod locale;
pub mod registry;
pub mod sim;
pub mod source;
pub mod transition;
pub mod version;

pub use registry::{RegistryError, TransitionRegistry};
pub use source::{CreateContext, TransitionInfo, TransitionSource};
pub use transition::SceneTransition;

/// Short description of the module shown by the host's plugin list.
pub fn module_description() -> &'static str {
    locale::text("Description")
}

/// Register the transition types of this module.
pub fn module_load(registry: &mut TransitionRegistry) -> Result<(), RegistryError> {
    info!(
        "{} loaded (version {}): {}",
        locale::text("SceneAsTransition"),
        version::VersionInfo::get().display_version(),
        module_description()
    );
    registry.register(SceneTransition::info())
}
