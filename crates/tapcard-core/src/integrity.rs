//! Data-integrity validation and repair.
//!
//! [`validate`] detects three issue classes: records without an id,
//! duplicate ids, and duplicate card codes. [`repair`] fixes only the first
//! class — duplicate ids and duplicate codes are detected and reported but
//! deliberately left for a human to resolve, since picking a survivor
//! automatically would silently rewrite identifiers already printed on
//! physical cards.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::card::CardRecord;

/// One detected integrity problem, with enough detail for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Issue {
  /// Records whose `id` is missing, identified by card code.
  NullIds { count: usize, card_codes: Vec<String> },
  /// Id values carried by more than one record.
  DuplicateIds { ids: Vec<i64> },
  /// Card codes carried by more than one record.
  DuplicateCardCodes { codes: Vec<String> },
}

/// A card that received a fresh id during [`repair`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairedCard {
  pub id:        i64,
  pub card_code: String,
  pub name:      String,
}

/// Outcome of a [`repair`] run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
  pub fixed:    usize,
  pub repaired: Vec<RepairedCard>,
}

/// Scan `records` for integrity issues. An empty result means valid.
pub fn validate(records: &[CardRecord]) -> Vec<Issue> {
  let mut issues = Vec::new();

  let null_codes: Vec<String> = records
    .iter()
    .filter(|c| c.id.is_none())
    .map(|c| c.card_code.clone())
    .collect();
  if !null_codes.is_empty() {
    issues.push(Issue::NullIds {
      count:      null_codes.len(),
      card_codes: null_codes,
    });
  }

  let mut id_counts: BTreeMap<i64, usize> = BTreeMap::new();
  for id in records.iter().filter_map(|c| c.id) {
    *id_counts.entry(id).or_default() += 1;
  }
  let duplicate_ids: Vec<i64> = id_counts
    .into_iter()
    .filter(|(_, n)| *n > 1)
    .map(|(id, _)| id)
    .collect();
  if !duplicate_ids.is_empty() {
    issues.push(Issue::DuplicateIds { ids: duplicate_ids });
  }

  let mut code_counts: BTreeMap<&str, usize> = BTreeMap::new();
  for code in records.iter().map(|c| c.card_code.as_str()) {
    *code_counts.entry(code).or_default() += 1;
  }
  let duplicate_codes: Vec<String> = code_counts
    .into_iter()
    .filter(|(_, n)| *n > 1)
    .map(|(code, _)| code.to_string())
    .collect();
  if !duplicate_codes.is_empty() {
    issues.push(Issue::DuplicateCardCodes {
      codes: duplicate_codes,
    });
  }

  issues
}

/// Assign fresh ids to records whose id is missing.
///
/// New ids start strictly above the current maximum valid id and are handed
/// out in iteration order, so the fix never collides with an existing id
/// and is stable across runs. Idempotent: a second run fixes nothing.
pub fn repair(records: &mut [CardRecord]) -> RepairReport {
  let valid_ids: BTreeSet<i64> = records.iter().filter_map(|c| c.id).collect();
  let mut next = valid_ids.iter().max().copied().unwrap_or(0) + 1;

  let mut repaired = Vec::new();
  for card in records.iter_mut().filter(|c| c.id.is_none()) {
    card.id = Some(next);
    repaired.push(RepairedCard {
      id:        next,
      card_code: card.card_code.clone(),
      name:      format!("{} {}", card.first_name, card.last_name),
    });
    next += 1;
  }

  RepairReport {
    fixed: repaired.len(),
    repaired,
  }
}
