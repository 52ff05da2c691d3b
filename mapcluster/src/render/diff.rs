//! Pure diff between two render-unit sets.

use std::collections::HashMap;

use crate::item::ClusterItem;
use crate::surface::MarkerKey;

use super::{MarkerOp, RenderUnit};

/// Compute the minimal marker operations transforming `prev` into `next`.
///
/// Units are matched by [`MarkerKey`]:
///
/// - matched, position and icon unchanged: no operation
/// - matched, position or icon changed: one `Move` (never a hide/show
///   pair for the same key)
/// - only in `next`: `Show`
/// - only in `prev`: `Hide`
///
/// Operations are ordered deterministically: shows and moves in `next`
/// order, then hides in `prev` order.
pub fn reconcile<T: ClusterItem>(
    prev: &[RenderUnit<T>],
    next: &[RenderUnit<T>],
) -> Vec<MarkerOp<T>> {
    let prev_by_key: HashMap<MarkerKey, &RenderUnit<T>> =
        prev.iter().map(|unit| (unit.key, unit)).collect();
    let mut matched: HashMap<MarkerKey, bool> =
        prev.iter().map(|unit| (unit.key, false)).collect();

    let mut ops = Vec::new();

    for unit in next {
        match prev_by_key.get(&unit.key) {
            Some(existing) => {
                matched.insert(unit.key, true);
                if existing.position != unit.position || existing.icon != unit.icon {
                    ops.push(MarkerOp::Move {
                        from: existing.position,
                        unit: unit.clone(),
                    });
                }
            }
            None => ops.push(MarkerOp::Show(unit.clone())),
        }
    }

    for unit in prev {
        if !matched.get(&unit.key).copied().unwrap_or(false) {
            ops.push(MarkerOp::Hide {
                key: unit.key,
                from: unit.position,
            });
        }
    }

    ops
}
