//! Scan event log and on-demand analytics.
//!
//! Every successful resolution of a card's public scan endpoint appends one
//! [`ScanEvent`]. Events are never mutated or individually deleted, and they
//! outlive their card: deleting a card leaves its events behind, and
//! analytics over those orphans must keep working.
//!
//! The log is in-process and unbounded — a deliberate carry-over from the
//! original behaviour, and a capacity risk if adopted verbatim for
//! long-lived high-traffic deployments.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Request context captured at scan time.
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
  pub user_agent: String,
  pub ip:         String,
  pub referer:    Option<String>,
}

/// One observed access to a card's public scan endpoint. Immutable once
/// appended.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
  pub id:         i64,
  pub card_code:  String,
  pub card_id:    i64,
  pub timestamp:  DateTime<Utc>,
  pub user_agent: String,
  pub ip:         String,
  pub referer:    Option<String>,
}

/// Aggregates computed over one card's scan events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
  pub total_scans:           usize,
  pub unique_visitors:       usize,
  /// `total_scans / unique_visitors`, rounded to one decimal; `0.0` when
  /// there are no visitors.
  pub avg_scans_per_visitor: f64,
  pub first_scan:            Option<DateTime<Utc>>,
  pub last_scan:             Option<DateTime<Utc>>,
  /// The most recent 50 events, in chronological order.
  pub recent:                Vec<ScanEvent>,
}

/// How many events an [`AnalyticsSummary`] carries at most.
const RECENT_LIMIT: usize = 50;

#[derive(Default)]
struct LogInner {
  events:  Vec<ScanEvent>,
  last_id: i64,
}

/// Append-only, in-process log of scan events.
///
/// Appends and reads take a short plain mutex (never held across an await),
/// independent of the registry's lock, so recording a scan neither blocks
/// nor consults card state.
#[derive(Default)]
pub struct ScanLog {
  inner: Mutex<LogInner>,
}

impl ScanLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an event for `card_code`/`card_id` and return it.
  ///
  /// Event ids are millisecond timestamps, bumped past the previous id when
  /// two scans land in the same millisecond, so they stay strictly
  /// monotonic by insertion order. Infallible.
  pub fn record(
    &self,
    card_code: &str,
    card_id: i64,
    context: ScanContext,
  ) -> ScanEvent {
    let now = Utc::now();
    let mut inner = self.inner.lock().expect("scan log mutex poisoned");

    let mut id = now.timestamp_millis();
    if id <= inner.last_id {
      id = inner.last_id + 1;
    }
    inner.last_id = id;

    let event = ScanEvent {
      id,
      card_code: card_code.to_string(),
      card_id,
      timestamp: now,
      user_agent: context.user_agent,
      ip: context.ip,
      referer: context.referer,
    };
    inner.events.push(event.clone());
    event
  }

  /// Number of events in the log, across all cards.
  pub fn len(&self) -> usize {
    self.inner.lock().expect("scan log mutex poisoned").events.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Whether any event ever referenced `card_id` — used to serve analytics
  /// for cards that have since been deleted.
  pub fn has_seen(&self, card_id: i64) -> bool {
    self
      .inner
      .lock()
      .expect("scan log mutex poisoned")
      .events
      .iter()
      .any(|e| e.card_id == card_id)
  }

  /// Compute the analytics summary for `card_id`.
  ///
  /// Zero matching events yields a zeroed summary, not an error.
  pub fn analytics(&self, card_id: i64) -> AnalyticsSummary {
    let inner = self.inner.lock().expect("scan log mutex poisoned");
    let matching: Vec<&ScanEvent> =
      inner.events.iter().filter(|e| e.card_id == card_id).collect();

    let total_scans = matching.len();
    let unique_visitors = {
      let mut ips: Vec<&str> = matching.iter().map(|e| e.ip.as_str()).collect();
      ips.sort_unstable();
      ips.dedup();
      ips.len()
    };
    let avg_scans_per_visitor = if unique_visitors > 0 {
      ((total_scans as f64 / unique_visitors as f64) * 10.0).round() / 10.0
    } else {
      0.0
    };

    let recent = matching
      .iter()
      .skip(total_scans.saturating_sub(RECENT_LIMIT))
      .map(|e| (*e).clone())
      .collect();

    AnalyticsSummary {
      total_scans,
      unique_visitors,
      avg_scans_per_visitor,
      first_scan: matching.first().map(|e| e.timestamp),
      last_scan: matching.last().map(|e| e.timestamp),
      recent,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ctx(ip: &str) -> ScanContext {
    ScanContext {
      user_agent: "test-agent".to_string(),
      ip:         ip.to_string(),
      referer:    None,
    }
  }

  #[test]
  fn event_ids_are_strictly_monotonic() {
    let log = ScanLog::new();
    let a = log.record("NFC001", 1, ctx("10.0.0.1"));
    let b = log.record("NFC001", 1, ctx("10.0.0.1"));
    let c = log.record("NFC002", 2, ctx("10.0.0.2"));
    assert!(a.id < b.id);
    assert!(b.id < c.id);
  }

  #[test]
  fn analytics_over_empty_log_is_zeroed() {
    let log = ScanLog::new();
    let summary = log.analytics(42);
    assert_eq!(summary.total_scans, 0);
    assert_eq!(summary.unique_visitors, 0);
    assert_eq!(summary.avg_scans_per_visitor, 0.0);
    assert_eq!(summary.first_scan, None);
    assert_eq!(summary.last_scan, None);
    assert!(summary.recent.is_empty());
  }

  #[test]
  fn two_scans_same_ip_counts_one_visitor() {
    let log = ScanLog::new();
    log.record("NFC001", 1, ctx("10.0.0.1"));
    log.record("NFC001", 1, ctx("10.0.0.1"));

    let summary = log.analytics(1);
    assert_eq!(summary.total_scans, 2);
    assert_eq!(summary.unique_visitors, 1);
    assert_eq!(summary.avg_scans_per_visitor, 2.0);
  }

  #[test]
  fn average_is_rounded_to_one_decimal() {
    let log = ScanLog::new();
    for _ in 0..5 {
      log.record("NFC001", 1, ctx("10.0.0.1"));
    }
    log.record("NFC001", 1, ctx("10.0.0.2"));
    log.record("NFC001", 1, ctx("10.0.0.3"));

    // 7 scans / 3 visitors = 2.333… → 2.3
    let summary = log.analytics(1);
    assert_eq!(summary.avg_scans_per_visitor, 2.3);
  }

  #[test]
  fn analytics_filters_by_card_and_tolerates_orphans() {
    let log = ScanLog::new();
    log.record("NFC001", 1, ctx("10.0.0.1"));
    log.record("NFC002", 2, ctx("10.0.0.2"));
    log.record("NFC001", 1, ctx("10.0.0.3"));

    // Card 2 could be deleted from the registry by now; its events remain.
    assert!(log.has_seen(2));
    assert_eq!(log.analytics(2).total_scans, 1);
    assert_eq!(log.analytics(1).total_scans, 2);
  }

  #[test]
  fn recent_keeps_last_fifty_in_chronological_order() {
    let log = ScanLog::new();
    for i in 0..60 {
      log.record("NFC001", 1, ctx(&format!("10.0.0.{i}")));
    }

    let summary = log.analytics(1);
    assert_eq!(summary.total_scans, 60);
    assert_eq!(summary.recent.len(), 50);
    // Oldest ten dropped; remaining run oldest → newest.
    assert!(
      summary
        .recent
        .windows(2)
        .all(|pair| pair[0].id < pair[1].id)
    );
    assert_eq!(summary.recent.last().unwrap().ip, "10.0.0.59");
  }
}
