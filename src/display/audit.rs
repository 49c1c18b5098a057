//! Audit trail display formatting

use crate::audit::AuditEntry;

/// Format audit entries, one block per entry
pub fn format_audit_list(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.\n".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.format_human_readable());
        output.push('\n');
    }
    output
}
