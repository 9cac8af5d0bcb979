//! Human-readable status lines for reconciliation results

use crate::reconcile::{ReconcileOutcome, ResourceDescriptor};

/// Status line for one step, plus any follow-up lines
pub fn outcome_lines(descriptor: &ResourceDescriptor, outcome: &ReconcileOutcome) -> Vec<String> {
    let kind = descriptor.kind();

    match outcome {
        ReconcileOutcome::Created => vec![format!("[{}] ✅ Created {}", kind, descriptor)],
        ReconcileOutcome::Updated => vec![format!("[{}] ✅ Updated {}", kind, descriptor)],
        ReconcileOutcome::AlreadyExists => {
            vec![format!("[{}] ✅ Already configured: {}", kind, descriptor)]
        }
        ReconcileOutcome::DependencyMissing(missing) => {
            let available = if missing.available.is_empty() {
                "none".to_string()
            } else {
                missing.available.join(", ")
            };
            vec![
                format!(
                    "[{}] ❌ {} '{}' not found; skipped {}",
                    kind, missing.kind, missing.name, descriptor
                ),
                format!("      Available: {}", available),
                format!("      Configure manually: {}", missing.fallback_url),
            ]
        }
        ReconcileOutcome::Failed(failure) => {
            let mut lines = vec![format!(
                "[{}] ❌ Failed {}: {}",
                kind, descriptor, failure.reason
            )];
            if let Some(url) = &failure.fallback_url {
                lines.push(format!("      Configure manually: {}", url));
            }
            lines
        }
    }
}
