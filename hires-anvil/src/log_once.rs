//! Rate-limited warnings for data problems that repeat per block.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

// cause -> occurrences dropped after the first
static SEEN: LazyLock<Mutex<HashMap<String, usize>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

/// Log `message` at warn level the first time `cause` is seen. Later
/// occurrences are only counted.
///
/// Returns true if the message was logged.
pub fn warn_once(cause: &str, message: impl FnOnce() -> String) -> bool {
    let first = match SEEN.lock() {
        Ok(mut seen) => match seen.get_mut(cause) {
            Some(dropped) => {
                *dropped += 1;
                false
            }
            None => {
                seen.insert(cause.to_string(), 0);
                true
            }
        },
        Err(_) => false,
    };
    if first {
        log::warn!("{} (future occurrences will not be logged)", message());
    }
    first
}

/// Occurrences dropped for `cause` since its first warning.
pub fn suppressed(cause: &str) -> usize {
    SEEN.lock().map(|seen| seen.get(cause).copied().unwrap_or(0)).unwrap_or(0)
}

/// Causes with dropped occurrences, sorted by cause.
pub fn suppressed_counts() -> Vec<(String, usize)> {
    let Ok(seen) = SEEN.lock() else {
        return Vec::new();
    };
    let mut counts: Vec<(String, usize)> = seen
        .iter()
        .filter(|(_, dropped)| **dropped > 0)
        .map(|(cause, dropped)| (cause.clone(), *dropped))
        .collect();
    counts.sort();
    counts
}
