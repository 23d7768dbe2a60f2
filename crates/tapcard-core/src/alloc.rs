//! Identifier allocation for new cards.
//!
//! The numeric id and the printed card code are two views of the same
//! allocation: a create operation calls [`next_id`] exactly once and derives
//! the code from that id with [`next_card_code`], keeping the pair in
//! lockstep. Both functions are pure.

use crate::card::CardRecord;

/// Next unique card id: `max(existing ids) + 1`, treating an empty (or
/// all-null) set as max 0. Records with a missing id are ignored.
pub fn next_id(records: &[CardRecord]) -> i64 {
  records.iter().filter_map(|c| c.id).max().unwrap_or(0) + 1
}

/// Format `id` as a card code: `NFC` + zero-padded decimal, minimum three
/// digits. Ids wider than three digits keep their full width.
pub fn next_card_code(id: i64) -> String {
  format!("NFC{id:03}")
}
