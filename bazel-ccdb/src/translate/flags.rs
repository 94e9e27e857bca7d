// SPDX-License-Identifier: GPL-3.0-or-later

//! Flag level clean-up of the compiler arguments.
//!
//! Bazel expands flags from multiple layers (toolchain, configuration, target),
//! which often repeats warning and language standard flags. The first
//! occurrence is kept, the repeats are dropped. Older C++ standard flags are
//! pinned to one canonical version before the duplicate check, so they
//! collapse into a single argument.

use std::collections::HashSet;

/// Flags with these prefixes appear at most once in an invocation.
pub const DEDUPLICATED_FLAG_PREFIXES: [&str; 2] = ["-W", "-std="];

/// The language standard the legacy standard flags are replaced with.
pub const PINNED_STANDARD: &str = "-std=c++23";

/// The language standard flags which are replaced with the pinned one.
pub const LEGACY_STANDARDS: [&str; 3] = ["-std=c++11", "-std=c++14", "-std=c++17"];

/// Replace a legacy language standard flag with the pinned one.
pub fn pin_version(token: &str) -> &str {
    if LEGACY_STANDARDS.contains(&token) { PINNED_STANDARD } else { token }
}

/// Tracks the deduplicated flags of one compiler invocation.
#[derive(Debug, Default)]
pub struct FlagDeduplicator {
    seen: HashSet<String>,
}

impl FlagDeduplicator {
    /// Returns `true` if the token shall be kept.
    pub fn admit(&mut self, token: &str) -> bool {
        if !DEDUPLICATED_FLAG_PREFIXES.iter().any(|prefix| token.starts_with(prefix)) {
            return true;
        }
        self.seen.insert(token.to_string())
    }
}
