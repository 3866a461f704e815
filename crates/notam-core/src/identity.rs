//! Stable notice identity across briefing re-imports
//!
//! A re-fetched briefing assigns fresh transient ids, so identity is built from
//! the fields that describe the real-world notice: Q-code, location and start
//! of validity. The transient id only participates when all three are absent.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::notam::RawNotam;
use crate::qcode::QCode;
use crate::status::UserStatus;

/// Field separator. Stripped from field content so it can never be forged.
const SEPARATOR: char = '\u{1f}';

/// Prefix of keys built from the transient id alone
const ID_ONLY_PREFIX: &str = "id";

/// Deterministic identity of a notice
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Wrap a key previously obtained from [`IdentityKey::as_str`]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short BLAKE3 digest, suitable as a compact storage key
    pub fn digest(&self) -> String {
        blake3::hash(self.0.as_bytes()).to_hex()[..16].to_string()
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.split(SEPARATOR).enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

fn normalize(field: Option<&str>) -> String {
    field
        .unwrap_or("")
        .trim()
        .chars()
        .filter(|c| *c != SEPARATOR)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Q-codes are canonicalized so `QMRLC` and `MRLC` identify the same notice
fn normalize_q_code(q_code: Option<&str>) -> String {
    match q_code.and_then(QCode::parse) {
        Some(q) => q.to_string(),
        None => normalize(q_code),
    }
}

/// Identity key of a notice. Pure and total.
pub fn key(notam: &RawNotam) -> IdentityKey {
    let q_code = normalize_q_code(notam.q_code.as_deref());
    let location = normalize(notam.location.as_deref());
    let effective_from = notam
        .effective_from
        .map(|t| t.unix_timestamp().to_string())
        .unwrap_or_default();

    if q_code.is_empty() && location.is_empty() && effective_from.is_empty() {
        let id = normalize(notam.id.as_deref());
        return IdentityKey(format!("{ID_ONLY_PREFIX}{SEPARATOR}{id}"));
    }

    IdentityKey(format!(
        "{q_code}{SEPARATOR}{location}{SEPARATOR}{effective_from}"
    ))
}

/// Keys of every notice in a briefing
pub fn keys(notams: &[RawNotam]) -> HashSet<IdentityKey> {
    notams.iter().map(key).collect()
}

/// Keys present in `current` but not in `previous_keys`
pub fn find_new(current: &[RawNotam], previous_keys: &HashSet<IdentityKey>) -> HashSet<IdentityKey> {
    current
        .iter()
        .map(key)
        .filter(|k| !previous_keys.contains(k))
        .collect()
}

/// Carry statuses from a previous briefing over to a re-imported one.
///
/// Unmatched notices get the default (unread) status. Notices sharing a key
/// share one entry.
pub fn transfer_statuses(
    old_statuses: &HashMap<IdentityKey, UserStatus>,
    new_notams: &[RawNotam],
) -> HashMap<IdentityKey, UserStatus> {
    let mut transferred = HashMap::with_capacity(new_notams.len());

    for notam in new_notams {
        let k = key(notam);
        if transferred.contains_key(&k) {
            continue;
        }
        let status = old_statuses.get(&k).cloned().unwrap_or_default();
        transferred.insert(k, status);
    }

    transferred
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ReviewState;
    use time::macros::datetime;

    fn runway_closure(id: &str) -> RawNotam {
        RawNotam::new(id)
            .with_q_code("QMRLC")
            .with_location("LSZH")
            .with_effective(Some(datetime!(2024-03-01 06:00 UTC)), None)
            .with_message("RWY 10/28 CLSD")
    }

    #[test]
    fn test_key_is_deterministic() {
        let notam = runway_closure("A1234/24");
        assert_eq!(key(&notam), key(&notam.clone()));
    }

    #[test]
    fn test_key_ignores_transient_id() {
        assert_eq!(key(&runway_closure("A1234/24")), key(&runway_closure("db-9981")));
    }

    #[test]
    fn test_key_changes_with_identity_fields() {
        let base = runway_closure("A1");
        let moved = base.clone().with_location("LSGG");
        let later = base
            .clone()
            .with_effective(Some(datetime!(2024-03-02 06:00 UTC)), None);
        let other_subject = base.clone().with_q_code("QMXLC");

        assert_ne!(key(&base), key(&moved));
        assert_ne!(key(&base), key(&later));
        assert_ne!(key(&base), key(&other_subject));
    }

    #[test]
    fn test_key_normalizes_case_and_q_prefix() {
        let a = runway_closure("A1");
        let b = runway_closure("A1").with_q_code("mrlc").with_location(" lszh ");
        assert_eq!(key(&a), key(&b));
    }

    #[test]
    fn test_absent_fields_use_placeholders() {
        let notam = RawNotam::new("A1").with_location("LSZH");
        assert_eq!(key(&notam).to_string(), "|LSZH|");
    }

    #[test]
    fn test_fully_anonymous_notices_fall_back_to_id() {
        let a = RawNotam::new("A1").with_message("one");
        let b = RawNotam::new("A2").with_message("two");
        assert_ne!(key(&a), key(&b));
        assert_eq!(key(&a).to_string(), "id|A1");
    }

    #[test]
    fn test_separator_cannot_be_injected() {
        let forged = RawNotam::new("A1")
            .with_q_code("\u{1f}")
            .with_location("LSZH\u{1f}");
        let plain = RawNotam::new("A1").with_location("LSZH");
        assert_eq!(key(&forged), key(&plain));
        assert_eq!(key(&plain).as_str().matches(SEPARATOR).count(), 2);
    }

    #[test]
    fn test_digest_is_stable() {
        let k = key(&runway_closure("A1"));
        assert_eq!(k.digest(), key(&runway_closure("B7")).digest());
        assert_eq!(k.digest().len(), 16);
    }

    #[test]
    fn test_find_new() {
        let k1 = runway_closure("A1");
        let k2 = runway_closure("A2").with_location("LSGG");
        let k3 = runway_closure("A3").with_location("LFSB");

        let previous = keys(&[k1.clone(), k2]);
        let fresh = find_new(&[k1.clone(), k3.clone()], &previous);

        assert!(!fresh.contains(&key(&k1)));
        assert!(fresh.contains(&key(&k3)));
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn test_transfer_statuses() {
        let known = runway_closure("A1");
        let unseen = runway_closure("A2").with_location("LSGG");

        let mut old = HashMap::new();
        old.insert(key(&known), UserStatus::new(ReviewState::Important));

        let refetched = runway_closure("B1");
        let transferred = transfer_statuses(&old, &[refetched.clone(), unseen.clone()]);

        assert_eq!(transferred[&key(&refetched)].state, ReviewState::Important);
        assert_eq!(transferred[&key(&unseen)].state, ReviewState::Unread);
        assert_eq!(transferred.len(), 2);
    }

    #[test]
    fn test_transfer_collision_shares_status() {
        // Distinct notices without identity fields but with the same id collide
        let a = RawNotam::new("A1").with_message("one");
        let b = RawNotam::new("A1").with_message("two");

        let mut old = HashMap::new();
        old.insert(key(&a), UserStatus::new(ReviewState::Read));

        let transferred = transfer_statuses(&old, &[a, b.clone()]);
        assert_eq!(transferred.len(), 1);
        assert_eq!(transferred[&key(&b)].state, ReviewState::Read);
    }
}
