//! Mutation stages
//!
//! ```text
//! REQUESTED -> BEFORE_HOOKS -> STORE_WRITE -> AFTER_HOOKS -> AUDITED -> COMPLETE
//!                   |
//!                   +--> REJECTED
//! ```

use std::fmt;

use tracing::debug;

use crate::audit::ActivityType;

/// Where a mutation is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStage {
    Requested,
    BeforeHooks,
    StoreWrite,
    AfterHooks,
    Audited,
    Complete,
    Rejected,
}

impl MutationStage {
    /// Whether `next` directly follows this stage
    pub fn can_advance_to(self, next: MutationStage) -> bool {
        use MutationStage::*;
        matches!(
            (self, next),
            (Requested, BeforeHooks)
                | (BeforeHooks, StoreWrite)
                | (BeforeHooks, Rejected)
                | (StoreWrite, AfterHooks)
                | (AfterHooks, Audited)
                | (Audited, Complete)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MutationStage::Complete | MutationStage::Rejected)
    }
}

impl fmt::Display for MutationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationStage::Requested => "REQUESTED",
            MutationStage::BeforeHooks => "BEFORE_HOOKS",
            MutationStage::StoreWrite => "STORE_WRITE",
            MutationStage::AfterHooks => "AFTER_HOOKS",
            MutationStage::Audited => "AUDITED",
            MutationStage::Complete => "COMPLETE",
            MutationStage::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

/// Tracks one mutation through its stages
#[derive(Debug)]
pub(crate) struct Mutation<'a> {
    activity: ActivityType,
    resource: &'a str,
    stage: MutationStage,
}

impl<'a> Mutation<'a> {
    pub fn new(activity: ActivityType, resource: &'a str) -> Self {
        Self {
            activity,
            resource,
            stage: MutationStage::Requested,
        }
    }

    pub fn stage(&self) -> MutationStage {
        self.stage
    }

    pub fn advance(&mut self, next: MutationStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        debug!(
            resource = self.resource,
            activity = %self.activity,
            from = %self.stage,
            to = %next,
            "Mutation stage"
        );
        self.stage = next;
    }

    /// A before-hook refused the mutation
    pub fn reject(&mut self, hook_set: &str, reason: &dyn fmt::Display) {
        debug!(
            resource = self.resource,
            activity = %self.activity,
            hook_set,
            %reason,
            "Mutation rejected"
        );
        self.advance(MutationStage::Rejected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MutationStage::*;

    #[test]
    fn test_happy_path_is_linear() {
        let path = [Requested, BeforeHooks, StoreWrite, AfterHooks, Audited, Complete];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(Complete.is_terminal());
    }

    #[test]
    fn test_rejection_only_from_before_hooks() {
        assert!(BeforeHooks.can_advance_to(Rejected));
        assert!(!StoreWrite.can_advance_to(Rejected));
        assert!(!AfterHooks.can_advance_to(Rejected));
        assert!(Rejected.is_terminal());
    }

    #[test]
    fn test_no_skipping() {
        assert!(!Requested.can_advance_to(StoreWrite));
        assert!(!StoreWrite.can_advance_to(Audited));
        assert!(!Complete.can_advance_to(Requested));
    }

    #[test]
    fn test_mutation_tracks_stage() {
        let mut mutation = Mutation::new(ActivityType::Create, "batches");
        mutation.advance(BeforeHooks);
        mutation.reject("batch_numbering", &"bad year");
        assert_eq!(mutation.stage(), Rejected);
    }
}
