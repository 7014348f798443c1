//! Record identifiers.
//!
//! ```text
//! inv-1718035200123-k3j9x0a2b
//! ─┬─ ──────┬────── ────┬────
//!  │        │           └── 9 random base-36 characters
//!  │        └────────────── milliseconds since the Unix epoch
//!  └─────────────────────── entity prefix (cl, pr, inv, pay, item)
//! ```

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 9;

/// Generates a new identifier with the given prefix.
pub fn generate_id(prefix: &str) -> String {
    generate_id_with(prefix, &mut rand::thread_rng())
}

/// Same as [`generate_id`] with a caller-supplied random source.
pub fn generate_id_with<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{prefix}-{millis}-{suffix}")
}
