//! Lazy binding of the filter toggled on the bridge scene.
//!
//! Filters are looked up by name, and a scene may not have its filters yet
//! when the transition is configured (host startup ordering). A missing filter
//! is therefore remembered by name and looked up again on the next bridge
//! entry.

use crate::host::{SourceRef, SourceRegistry};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("no bridge scene to look up filter '{0}' on")]
    SceneMissing(String),

    #[error("filter '{filter}' not found on scene '{scene}'")]
    FilterNotFound { scene: String, filter: String },
}

/// Binding state of the configured filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// No filter configured
    None,
    /// Name known, filter not found yet
    Unresolved,
    /// Filter reference held
    Resolved { enabled: bool },
}

#[derive(Debug, Default)]
pub struct FilterBinder {
    name: Option<String>,
    filter: Option<SourceRef>,
    enabled: bool,
}

impl FilterBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn filter(&self) -> Option<SourceRef> {
        self.filter
    }

    pub fn state(&self) -> FilterState {
        match (&self.name, self.filter) {
            (None, _) => FilterState::None,
            (Some(_), None) => FilterState::Unresolved,
            (Some(_), Some(_)) => FilterState::Resolved {
                enabled: self.enabled,
            },
        }
    }

    /// Apply the configured filter name.
    ///
    /// Only a changed name releases the old reference and attempts a new
    /// lookup; returns `Ok(false)` when nothing changed. A lookup failure
    /// keeps the name for a later retry.
    pub fn configure<H: SourceRegistry + ?Sized>(
        &mut self,
        host: &H,
        scene: Option<SourceRef>,
        name: Option<String>,
    ) -> Result<bool, BindError> {
        if self.name == name {
            return Ok(false);
        }
        self.release(host);
        self.name = name;
        if self.name.is_some() {
            self.resolve(host, scene)?;
        }
        Ok(true)
    }

    /// Drop the current reference and look the same name up on a new scene.
    pub fn rebind<H: SourceRegistry + ?Sized>(
        &mut self,
        host: &H,
        scene: Option<SourceRef>,
    ) -> Result<(), BindError> {
        self.release(host);
        if self.name.is_some() {
            self.resolve(host, scene)?;
        }
        Ok(())
    }

    /// Return the held filter, looking it up first if needed.
    ///
    /// `Ok(None)` means no filter is configured.
    pub fn ensure_resolved<H: SourceRegistry + ?Sized>(
        &mut self,
        host: &H,
        scene: Option<SourceRef>,
    ) -> Result<Option<SourceRef>, BindError> {
        if self.name.is_none() {
            return Ok(None);
        }
        match self.filter {
            Some(filter) => Ok(Some(filter)),
            None => self.resolve(host, scene).map(Some),
        }
    }

    fn resolve<H: SourceRegistry + ?Sized>(
        &mut self,
        host: &H,
        scene: Option<SourceRef>,
    ) -> Result<SourceRef, BindError> {
        let name = self.name.clone().unwrap_or_default();
        let scene = scene.ok_or_else(|| BindError::SceneMissing(name.clone()))?;

        match host.get_filter_by_name(scene, &name) {
            Some(filter) => {
                debug!("Resolved filter '{}' ({:?})", name, filter);
                self.filter = Some(filter);
                Ok(filter)
            }
            None => Err(BindError::FilterNotFound {
                scene: host.source_name(scene).unwrap_or_default(),
                filter: name,
            }),
        }
    }

    /// Enable the filter, resolving it lazily. Returns the enabled filter.
    pub fn enable<H: SourceRegistry + ?Sized>(
        &mut self,
        host: &H,
        scene: Option<SourceRef>,
    ) -> Result<Option<SourceRef>, BindError> {
        let filter = self.ensure_resolved(host, scene)?;
        if let Some(filter) = filter {
            host.set_enabled(filter, true);
            self.enabled = true;
        }
        Ok(filter)
    }

    /// Disable the filter if one is held. The reference is kept.
    pub fn disable<H: SourceRegistry + ?Sized>(&mut self, host: &H) {
        if let Some(filter) = self.filter {
            host.set_enabled(filter, false);
        }
        self.enabled = false;
    }

    /// Return the filter reference to the host. The name is kept.
    pub fn release<H: SourceRegistry + ?Sized>(&mut self, host: &H) {
        if let Some(filter) = self.filter.take() {
            host.release(filter);
        }
        self.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;

    fn host_with_scene() -> (SimHost, SourceRef) {
        let host = SimHost::new();
        host.add_scene("Stinger");
        let scene = host.get_source_by_name("Stinger").unwrap();
        (host, scene)
    }

    #[test]
    fn test_configure_resolves_existing_filter() {
        let (host, scene) = host_with_scene();
        let filter = host.add_filter("Stinger", "Shake");

        let mut binder = FilterBinder::new();
        assert_eq!(
            binder.configure(&host, Some(scene), Some("Shake".to_string())),
            Ok(true)
        );
        assert_eq!(binder.filter(), Some(filter));
        assert_eq!(binder.state(), FilterState::Resolved { enabled: false });
    }

    #[test]
    fn test_unchanged_name_is_noop() {
        let (host, scene) = host_with_scene();
        host.add_filter("Stinger", "Shake");

        let mut binder = FilterBinder::new();
        binder
            .configure(&host, Some(scene), Some("Shake".to_string()))
            .unwrap();
        let refs = host.ref_count_by_name("Shake");
        assert_eq!(
            binder.configure(&host, Some(scene), Some("Shake".to_string())),
            Ok(false)
        );
        assert_eq!(host.ref_count_by_name("Shake"), refs);
    }

    #[test]
    fn test_missing_filter_keeps_name_and_resolves_lazily() {
        let (host, scene) = host_with_scene();

        let mut binder = FilterBinder::new();
        let result = binder.configure(&host, Some(scene), Some("Shake".to_string()));
        assert_eq!(
            result,
            Err(BindError::FilterNotFound {
                scene: "Stinger".to_string(),
                filter: "Shake".to_string()
            })
        );
        assert_eq!(binder.name(), Some("Shake"));
        assert_eq!(binder.state(), FilterState::Unresolved);

        let filter = host.add_filter("Stinger", "Shake");
        assert_eq!(binder.enable(&host, Some(scene)), Ok(Some(filter)));
        assert!(host.enabled(filter));
        assert_eq!(binder.state(), FilterState::Resolved { enabled: true });
    }

    #[test]
    fn test_disable_keeps_reference() {
        let (host, scene) = host_with_scene();
        let filter = host.add_filter("Stinger", "Shake");

        let mut binder = FilterBinder::new();
        binder
            .configure(&host, Some(scene), Some("Shake".to_string()))
            .unwrap();
        binder.enable(&host, Some(scene)).unwrap();
        binder.disable(&host);
        assert!(!host.enabled(filter));
        assert_eq!(binder.filter(), Some(filter));
    }

    #[test]
    fn test_name_change_releases_old_filter() {
        let (host, scene) = host_with_scene();
        host.add_filter("Stinger", "Shake");
        host.add_filter("Stinger", "Blur");

        let mut binder = FilterBinder::new();
        binder
            .configure(&host, Some(scene), Some("Shake".to_string()))
            .unwrap();
        assert_eq!(host.ref_count_by_name("Shake"), 1);

        binder
            .configure(&host, Some(scene), Some("Blur".to_string()))
            .unwrap();
        assert_eq!(host.ref_count_by_name("Shake"), 0);
        assert_eq!(host.ref_count_by_name("Blur"), 1);

        binder.configure(&host, Some(scene), None).unwrap();
        assert_eq!(host.ref_count_by_name("Blur"), 0);
        assert_eq!(binder.state(), FilterState::None);
    }

    #[test]
    fn test_no_scene_is_recoverable() {
        let host = SimHost::new();
        let mut binder = FilterBinder::new();
        assert_eq!(
            binder.configure(&host, None, Some("Shake".to_string())),
            Err(BindError::SceneMissing("Shake".to_string()))
        );
        assert_eq!(binder.enable(&host, None), Err(BindError::SceneMissing("Shake".to_string())));
    }
}
