//! Connection probe.
//!
//! Times a single image load to decide whether the low-resolution thumbnail
//! pass is worth running before the full images arrive. The verdict is
//! advisory: the probe never fails, and a load error counts as "slow" so that
//! placeholders are shown when in doubt.

use crate::loader::ImageLoader;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Loads slower than this are considered a slow connection.
pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(100);

/// Result of one probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub elapsed: Duration,
    pub loaded: bool,
    pub slow: bool,
}

/// Append a cache-busting `cb` parameter so the sample is never served from cache.
pub fn cache_bust(url: &str, stamp: u128) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}cb={stamp}")
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Load `sample_url` once and report how long it took.
pub fn probe(loader: &dyn ImageLoader, sample_url: &str, threshold: Duration) -> ProbeReport {
    let url = cache_bust(sample_url, now_millis());
    let start = Instant::now();
    let result = loader.load(&url);
    let elapsed = start.elapsed();

    let report = match result {
        Ok(_) => ProbeReport {
            elapsed,
            loaded: true,
            slow: elapsed > threshold,
        },
        Err(e) => {
            log::warn!("Connection probe failed for {sample_url}: {e}");
            ProbeReport {
                elapsed,
                loaded: false,
                slow: true,
            }
        }
    };
    log::debug!(
        "Probe {sample_url}: {:?} (threshold {:?}) -> {}",
        report.elapsed,
        threshold,
        if report.slow { "slow" } else { "fast" }
    );
    report
}

/// `true` when the sample loads slower than `threshold` or fails to load.
pub fn is_slow_connection(loader: &dyn ImageLoader, sample_url: &str, threshold: Duration) -> bool {
    probe(loader, sample_url, threshold).slow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedLoader;

    #[test]
    fn cache_bust_appends_parameter() {
        assert_eq!(cache_bust("images/a.jpg", 17), "images/a.jpg?cb=17");
        assert_eq!(cache_bust("images/a.jpg?w=800", 17), "images/a.jpg?w=800&cb=17");
    }

    #[test]
    fn fast_load_is_not_slow() {
        let loader = ScriptedLoader::new();
        assert!(!is_slow_connection(&loader, "images/1.jpg", DEFAULT_THRESHOLD));
    }

    #[test]
    fn slow_load_is_slow() {
        let loader = ScriptedLoader::new().with_delay(Duration::from_millis(150));
        assert!(is_slow_connection(&loader, "images/1.jpg", DEFAULT_THRESHOLD));
    }

    #[test]
    fn failed_load_is_slow_regardless_of_time() {
        let loader = ScriptedLoader::new().failing("images/1.jpg");
        let report = probe(&loader, "images/1.jpg", Duration::from_secs(3600));
        assert!(report.slow);
        assert!(!report.loaded);
    }

    #[test]
    fn probe_requests_cache_busted_url() {
        let loader = ScriptedLoader::new();
        probe(&loader, "images/1.jpg", DEFAULT_THRESHOLD);
        let requested = loader.requests();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].starts_with("images/1.jpg?cb="));
    }
}
