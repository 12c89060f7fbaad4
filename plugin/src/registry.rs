//! Transition type registry.

use crate::source::{CreateContext, TransitionInfo, TransitionSource};
use scene_transition_types::Settings;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Transition type already registered: {0}")]
    Duplicate(String),

    #[error("Unknown transition type: {0}")]
    Unknown(String),
}

/// Registry of the transition types a module provides.
#[derive(Debug, Default)]
pub struct TransitionRegistry {
    types: Vec<TransitionInfo>,
}

impl TransitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transition type. Ids must be unique.
    pub fn register(&mut self, info: TransitionInfo) -> Result<(), RegistryError> {
        if self.get(info.id).is_some() {
            warn!("Transition type {} registered twice, ignoring", info.id);
            return Err(RegistryError::Duplicate(info.id.to_string()));
        }
        info!("Registered transition type: {} ({})", info.name, info.id);
        self.types.push(info);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&TransitionInfo> {
        self.types.iter().find(|t| t.id == id)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.types.iter().map(|t| t.id).collect()
    }

    /// Default settings of a registered type.
    pub fn defaults(&self, id: &str) -> Result<Settings, RegistryError> {
        let info = self
            .get(id)
            .ok_or_else(|| RegistryError::Unknown(id.to_string()))?;
        let mut settings = Settings::new();
        (info.get_defaults)(&mut settings);
        Ok(settings)
    }

    /// Create an instance, layering `settings` over the type's defaults.
    pub fn create(
        &self,
        id: &str,
        ctx: CreateContext,
        settings: &Settings,
    ) -> Result<Box<dyn TransitionSource>, RegistryError> {
        let info = self
            .get(id)
            .ok_or_else(|| RegistryError::Unknown(id.to_string()))?;
        let mut layered = Settings::new();
        (info.get_defaults)(&mut layered);
        layered.apply(settings);
        Ok((info.create)(ctx, &layered))
    }
}
