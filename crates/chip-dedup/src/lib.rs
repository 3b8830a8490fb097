// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate-delivery protection for inbound webhooks.
//!
//! Providers deliver webhooks at least once. [`DedupCache`] remembers a
//! [`Fingerprint`] of each handled message and reports a repeat that arrives
//! inside the rate-limit window as a duplicate. Entries older than the TTL
//! are purged lazily on every access; there is no background sweeper.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::debug;

/// Default lifetime of a cache entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default window inside which a repeat counts as a duplicate.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

const NO_ID: &str = "no-id";
const NO_RECIPIENT: &str = "no-recipient";

/// Composite key identifying one logical inbound message.
///
/// Format: `{message_id}|{recipient}|{hash}` where `hash` is the first eight
/// hex digits of SHA-256 over the trimmed, lowercased text. Missing ids and
/// recipients fall back to fixed sentinels, so anonymous senders with
/// identical text share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(message_id: Option<&str>, recipient: Option<&str>, text: &str) -> Self {
        let digest = Sha256::digest(text.trim().to_lowercase().as_bytes());
        let hash = hex::encode(&digest[..4]);
        Self(format!(
            "{}|{}|{hash}",
            message_id.filter(|s| !s.is_empty()).unwrap_or(NO_ID),
            recipient.filter(|s| !s.is_empty()).unwrap_or(NO_RECIPIENT),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-wide TTL cache of recently handled fingerprints.
///
/// All operations take a single mutex, so [`check_and_mark`](Self::check_and_mark)
/// is atomic: of N concurrent calls with the same fingerprint inside the
/// window, exactly one observes a fresh message. There is no separate
/// read-only check or mark: lookup and insert share one lock acquisition.
pub struct DedupCache {
    ttl: Duration,
    window: Duration,
    entries: Mutex<HashMap<Fingerprint, Instant>>,
}

impl DedupCache {
    pub fn new(ttl: Duration, window: Duration) -> Self {
        Self {
            ttl,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` if `fingerprint` was handled within the window.
    /// Otherwise records it as handled now and returns `false`.
    pub fn check_and_mark(&self, fingerprint: &Fingerprint) -> bool {
        self.check_and_mark_at(fingerprint, Instant::now())
    }

    /// [`check_and_mark`](Self::check_and_mark) against an explicit clock.
    pub fn check_and_mark_at(&self, fingerprint: &Fingerprint, now: Instant) -> bool {
        let mut entries = self.lock();
        self.purge(&mut entries, now);

        if let Some(last_seen) = entries.get(fingerprint)
            && now.saturating_duration_since(*last_seen) < self.window
        {
            debug!(%fingerprint, "duplicate delivery inside rate-limit window");
            return true;
        }

        entries.insert(fingerprint.clone(), now);
        false
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Fingerprint, Instant>> {
        // Entries are plain timestamps; a panic mid-update leaves them usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn purge(&self, entries: &mut HashMap<Fingerprint, Instant>, now: Instant) {
        let before = entries.len();
        entries.retain(|_, last_seen| now.saturating_duration_since(*last_seen) <= self.ttl);
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, remaining = entries.len(), "purged expired dedup entries");
        }
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_WINDOW)
    }
}

impl fmt::Debug for DedupCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DedupCache")
            .field("ttl", &self.ttl)
            .field("window", &self.window)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use proptest::prelude::*;

    use super::*;

    fn fp(text: &str) -> Fingerprint {
        Fingerprint::new(Some("in-1"), Some("+15551234567"), text)
    }

    #[test]
    fn fingerprint_format() {
        let fingerprint = fp("Hi Chip!");
        let parts: Vec<&str> = fingerprint.as_str().split('|').collect();
        assert_eq!(parts[0], "in-1");
        assert_eq!(parts[1], "+15551234567");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_sentinels() {
        let fingerprint = Fingerprint::new(None, Some(""), "hello");
        assert!(fingerprint.as_str().starts_with("no-id|no-recipient|"));
    }

    #[test]
    fn fingerprint_ignores_case_and_outer_whitespace() {
        assert_eq!(fp("  Hello "), fp("hello"));
        assert_ne!(fp("hello"), fp("goodbye"));
    }

    #[test]
    fn second_delivery_inside_window_is_duplicate() {
        let cache = DedupCache::default();
        let now = Instant::now();
        assert!(!cache.check_and_mark_at(&fp("hi"), now));
        assert!(cache.check_and_mark_at(&fp("hi"), now + Duration::from_secs(3)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn repeat_after_window_is_fresh() {
        let cache = DedupCache::default();
        let now = Instant::now();
        assert!(!cache.check_and_mark_at(&fp("hi"), now));
        assert!(!cache.check_and_mark_at(&fp("hi"), now + Duration::from_secs(11)));
        // The fresh pass refreshed the timestamp.
        assert!(cache.check_and_mark_at(&fp("hi"), now + Duration::from_secs(15)));
    }

    #[test]
    fn duplicate_does_not_extend_window() {
        let cache = DedupCache::default();
        let now = Instant::now();
        assert!(!cache.check_and_mark_at(&fp("hi"), now));
        assert!(cache.check_and_mark_at(&fp("hi"), now + Duration::from_secs(9)));
        assert!(!cache.check_and_mark_at(&fp("hi"), now + Duration::from_secs(10)));
    }

    #[test]
    fn expired_entries_are_purged_on_access() {
        let cache = DedupCache::new(Duration::from_secs(60), Duration::from_secs(10));
        let now = Instant::now();
        assert!(!cache.check_and_mark_at(&fp("one"), now));
        assert!(!cache.check_and_mark_at(&fp("two"), now + Duration::from_secs(30)));
        assert_eq!(cache.len(), 2);

        assert!(!cache.check_and_mark_at(&fp("three"), now + Duration::from_secs(61)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn concurrent_check_and_mark_admits_exactly_one() {
        const THREADS: usize = 32;
        let cache = Arc::new(DedupCache::default());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    !cache.check_and_mark(&fp("same body"))
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|fresh| *fresh)
            .count();
        assert_eq!(admitted, 1);
        assert_eq!(cache.len(), 1);
    }

    proptest! {
        #[test]
        fn whitespace_and_case_variants_collapse(text in "[a-zA-Z ]{1,30}", pad in 0usize..4) {
            let padded = format!("{}{}{}", " ".repeat(pad), text.to_uppercase(), "\t".repeat(pad));
            prop_assert_eq!(fp(&padded), fp(&text.to_lowercase()));
        }
    }
}
