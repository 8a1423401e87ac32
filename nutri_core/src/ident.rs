//! Entry identifier generation.
//!
//! Identifiers combine the current Unix time in milliseconds with a 128-bit
//! random component, both base36-encoded into one compact string. The time
//! prefix keeps ids roughly monotonic within a process; the random suffix
//! makes collisions vanishingly unlikely across sessions. No cross-process
//! uniqueness is claimed beyond collision avoidance, and an id is never
//! reused after its entry is deleted.

use chrono::Utc;
use uuid::Uuid;

const BASE36_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random suffix length in base36 digits
const RANDOM_DIGITS: usize = 10;

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

/// Generate a fresh collision-resistant entry identifier
pub fn new_entry_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    let random = Uuid::new_v4().as_u128();
    let suffix: String = to_base36(random).chars().take(RANDOM_DIGITS).collect();
    format!("{}{}", to_base36(millis), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1234567890), "kf12oi");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(new_entry_id()));
        }
    }

    #[test]
    fn test_ids_are_compact_ascii() {
        let id = new_entry_id();
        assert!(id.len() <= 9 + RANDOM_DIGITS);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
