//! Final consistency checks over the resolved registry.

use super::registry::{EntityDraft, Registry};
use crate::error::{ResolveError, Result};
use std::collections::HashMap;

/// Check that class names are unique and every relation is resolved.
pub(crate) fn validate(registry: &Registry) -> Result<()> {
    let mut classes: HashMap<String, &EntityDraft> = HashMap::with_capacity(registry.len());

    for draft in registry.drafts() {
        let fqcn = draft.entity.fqcn().to_lowercase();
        if let Some(first) = classes.get(&fqcn) {
            return Err(ResolveError::duplicate_entity(
                &first.entity.class,
                &[first.raw_name.clone(), draft.raw_name.clone()],
            ));
        }
        classes.insert(fqcn, draft);

        if let Some(relation) = draft.entity.relations.values().find(|r| !r.is_resolved()) {
            return Err(ResolveError::unresolved_relation(draft.key(), &relation.name));
        }
    }
    Ok(())
}
