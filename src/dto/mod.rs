pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod promotions;

use std::collections::HashSet;

use uuid::Uuid;

/// Drop duplicate ids while keeping first-seen order.
pub(crate) fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
