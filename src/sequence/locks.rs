//! Per-family mutation locks
//!
//! One async mutex per sequence family. Holding a family's guard means no
//! other create in that family can scan or write until it is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lazily created async mutexes keyed by family name
#[derive(Default)]
pub struct FamilyLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl FamilyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, family: &str) -> Arc<AsyncMutex<()>> {
        // A poisoned map only means a panic elsewhere; the map itself is intact
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(family.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Acquire the guards of several families
    ///
    /// Families are locked in sorted order with duplicates removed, so two
    /// callers asking for overlapping sets cannot deadlock.
    pub async fn acquire(&self, families: &[&str]) -> Vec<OwnedMutexGuard<()>> {
        let mut ordered: Vec<&str> = families.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for family in ordered {
            guards.push(self.lock_for(family).lock_owned().await);
        }
        guards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_family_is_exclusive() {
        let locks = Arc::new(FamilyLocks::new());
        let guards = locks.acquire(&["batches"]).await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guards = contender.acquire(&["batches"]).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guards);
        waiting.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_family_not_blocked() {
        let locks = FamilyLocks::new();
        let _batches = locks.acquire(&["batches"]).await;
        let items = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&["items"])).await;
        assert!(items.is_ok());
    }

    #[tokio::test]
    async fn test_duplicates_are_collapsed() {
        let locks = FamilyLocks::new();
        let guards = locks.acquire(&["items", "batches", "items"]).await;
        assert_eq!(guards.len(), 2);
    }
}
