//! Ordered hook-set registry
//!
//! The registry is a flat list of `(resource, hook-set)` pairs. Hook-sets of
//! one resource run in the order they were registered.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::HookSet;

/// Two hook-sets on one resource that both claim a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipConflict {
    pub resource: String,
    pub field: String,
    pub first: String,
    pub second: String,
}

impl std::fmt::Display for OwnershipConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} is owned by both '{}' and '{}'",
            self.resource, self.field, self.first, self.second
        )
    }
}

/// Hook-sets bound to resources
#[derive(Clone, Default)]
pub struct HookRegistry {
    entries: Vec<(String, Arc<dyn HookSet>)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook-set for a resource
    pub fn register(&mut self, resource: impl Into<String>, hooks: Arc<dyn HookSet>) -> &mut Self {
        let resource = resource.into();
        debug!(resource = %resource, hook_set = hooks.name(), "Registered hook-set");
        self.entries.push((resource, hooks));
        self
    }

    /// Builder form of `register`
    pub fn with(mut self, resource: impl Into<String>, hooks: Arc<dyn HookSet>) -> Self {
        self.register(resource, hooks);
        self
    }

    /// Hook-sets of a resource, in registration order
    pub fn hooks_for(&self, resource: &str) -> Vec<Arc<dyn HookSet>> {
        self.entries
            .iter()
            .filter(|(bound, _)| bound == resource)
            .map(|(_, hooks)| hooks.clone())
            .collect()
    }

    /// Whether any hook-set is bound to a resource
    pub fn is_hooked(&self, resource: &str) -> bool {
        self.entries.iter().any(|(bound, _)| bound == resource)
    }

    /// Sequence families declared by the hook-sets of a resource
    pub fn families_for(&self, resource: &str) -> Vec<String> {
        let mut families: Vec<String> = self
            .entries
            .iter()
            .filter(|(bound, _)| bound == resource)
            .filter_map(|(_, hooks)| hooks.sequence_family().map(str::to_string))
            .collect();
        families.sort();
        families.dedup();
        families
    }

    /// Resources with at least one hook-set, sorted
    pub fn resources(&self) -> Vec<&str> {
        let mut resources: Vec<&str> = self.entries.iter().map(|(r, _)| r.as_str()).collect();
        resources.sort_unstable();
        resources.dedup();
        resources
    }

    /// Fields claimed by more than one hook-set of the same resource
    pub fn ownership_conflicts(&self) -> Vec<OwnershipConflict> {
        let mut owners: BTreeMap<(&str, &str), &str> = BTreeMap::new();
        let mut conflicts = Vec::new();

        for (resource, hooks) in &self.entries {
            for field in hooks.owned_fields() {
                match owners.get(&(resource.as_str(), *field)) {
                    Some(first) if *first != hooks.name() => conflicts.push(OwnershipConflict {
                        resource: resource.clone(),
                        field: field.to_string(),
                        first: first.to_string(),
                        second: hooks.name().to_string(),
                    }),
                    Some(_) => {}
                    None => {
                        owners.insert((resource.as_str(), *field), hooks.name());
                    }
                }
            }
        }

        conflicts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|(resource, hooks)| format!("{}:{}", resource, hooks.name())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Owns {
        name: &'static str,
        fields: &'static [&'static str],
        family: Option<&'static str>,
    }

    #[async_trait]
    impl HookSet for Owns {
        fn name(&self) -> &str {
            self.name
        }

        fn owned_fields(&self) -> &[&'static str] {
            self.fields
        }

        fn sequence_family(&self) -> Option<&str> {
            self.family
        }
    }

    fn owns(name: &'static str, fields: &'static [&'static str]) -> Arc<dyn HookSet> {
        Arc::new(Owns {
            name,
            fields,
            family: None,
        })
    }

    #[test]
    fn test_hooks_for_keeps_registration_order() {
        let registry = HookRegistry::new()
            .with("batches", owns("first", &[]))
            .with("items", owns("other", &[]))
            .with("batches", owns("second", &[]));

        let names: Vec<String> = registry
            .hooks_for("batches")
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(registry.hooks_for("users").is_empty());
        assert!(!registry.is_hooked("users"));
        assert_eq!(registry.resources(), vec!["batches", "items"]);
    }

    #[test]
    fn test_ownership_conflict_detected() {
        let registry = HookRegistry::new()
            .with("batches", owns("numbering", &["batchNumber"]))
            .with("batches", owns("legacy", &["batchNumber", "createdAt"]))
            .with("items", owns("items", &["batchNumber"]));

        let conflicts = registry.ownership_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].resource, "batches");
        assert_eq!(conflicts[0].field, "batchNumber");
        assert_eq!(conflicts[0].first, "numbering");
        assert_eq!(conflicts[0].second, "legacy");
    }

    #[test]
    fn test_families_sorted_and_deduplicated() {
        let registry = HookRegistry::new()
            .with(
                "batches",
                Arc::new(Owns {
                    name: "a",
                    fields: &[],
                    family: Some("batches"),
                }),
            )
            .with(
                "batches",
                Arc::new(Owns {
                    name: "b",
                    fields: &[],
                    family: Some("batches"),
                }),
            );
        assert_eq!(registry.families_for("batches"), vec!["batches"]);
        assert!(registry.families_for("items").is_empty());
    }
}
