//! Audit-only hook-set
//!
//! Binding this to a resource changes no data; it only makes the dispatcher
//! treat the resource as hooked, so its mutations are audited.

use async_trait::async_trait;

use super::HookSet;

pub struct AuditTrail;

#[async_trait]
impl HookSet for AuditTrail {
    fn name(&self) -> &str {
        "audit_trail"
    }
}
