//! Dependency ordering of entities.

use super::registry::Registry;
use tracing::debug;

/// Order entity keys so that referenced entities come first.
///
/// Ties keep declaration order. A cycle is broken by emitting the earliest
/// remaining entity.
pub(crate) fn dependency_order(registry: &Registry) -> Vec<String> {
    let count = registry.len();
    let mut emitted = vec![false; count];
    let mut order = Vec::with_capacity(count);

    while order.len() < count {
        let remaining: Vec<_> = registry.ids().into_iter().filter(|id| !emitted[id.0]).collect();
        let ready = remaining.iter().copied().find(|id| {
            registry
                .get(*id)
                .depends_on
                .iter()
                .all(|dep| dep == id || emitted[dep.0])
        });

        let next = match (ready, remaining.first()) {
            (Some(id), _) => id,
            (None, Some(&id)) => {
                debug!(entity = %registry.key(id), "breaking dependency cycle");
                id
            }
            (None, None) => break,
        };
        emitted[next.0] = true;
        order.push(registry.key(next).to_string());
    }
    order
}
