//! Handle derivation and collision probing — the Username Resolver.
//!
//! The pure half lives here: deriving a base candidate from a person's name
//! and walking the numbered suffixes until a free one turns up. The stateful
//! half (the prefix scan against the store) is on
//! [`crate::account::AccountManager::resolve_handle`].

use std::collections::HashSet;

/// Derive the base handle candidate from a first name and a surname:
/// lower-case and trim both, join with `.`, strip any internal whitespace.
///
/// Empty inputs yield a degenerate candidate (a bare `.`); rejecting those
/// is the caller's job, before this function is ever reached.
pub fn base_candidate(first_name: &str, surname: &str) -> String {
  let joined = format!(
    "{}.{}",
    first_name.trim().to_lowercase(),
    surname.trim().to_lowercase()
  );
  joined.split_whitespace().collect()
}

/// Whether `handle` is `base` itself or one of its numbered variants
/// (`base1`, `base2`, …). A handle that already carries a suffix still
/// derives from the same name, so resubmitting that name must not
/// re-resolve it.
pub fn is_variant(handle: &str, base: &str) -> bool {
  match handle.strip_prefix(base) {
    Some(suffix) => suffix.chars().all(|c| c.is_ascii_digit()),
    None => false,
  }
}

/// Return `base` if it is not taken; otherwise probe `base1`, `base2`, …
/// in ascending order and return the first free candidate. The suffix
/// starts at 1 — `base0` is never produced.
pub fn next_available(base: &str, taken: &HashSet<String>) -> String {
  if !taken.contains(base) {
    return base.to_owned();
  }
  let mut i: u64 = 1;
  loop {
    let candidate = format!("{base}{i}");
    if !taken.contains(&candidate) {
      return candidate;
    }
    i += 1;
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn taken(handles: &[&str]) -> HashSet<String> {
    handles.iter().map(|h| h.to_string()).collect()
  }

  #[test]
  fn base_candidate_lowercases_and_joins() {
    assert_eq!(base_candidate("Jane", "Doe"), "jane.doe");
  }

  #[test]
  fn base_candidate_trims_and_strips_internal_whitespace() {
    assert_eq!(base_candidate("  Mary Jane ", "van der Berg"), "maryjane.vanderberg");
  }

  #[test]
  fn base_candidate_empty_names_degenerate() {
    // Not rejected here; callers validate name fields first.
    assert_eq!(base_candidate("", ""), ".");
  }

  #[test]
  fn free_base_returned_unchanged() {
    assert_eq!(next_available("a", &taken(&[])), "a");
  }

  #[test]
  fn probe_skips_zero_and_fills_first_gap() {
    assert_eq!(next_available("a", &taken(&["a"])), "a1");
    assert_eq!(next_available("a", &taken(&["a", "a1", "a2"])), "a3");
  }

  #[test]
  fn probe_reuses_gaps_in_the_sequence() {
    assert_eq!(next_available("a", &taken(&["a", "a2"])), "a1");
  }

  #[test]
  fn variant_detection_accepts_base_and_numbered_forms() {
    assert!(is_variant("jane.doe", "jane.doe"));
    assert!(is_variant("jane.doe1", "jane.doe"));
    assert!(is_variant("jane.doe12", "jane.doe"));
    assert!(!is_variant("jane.doex", "jane.doe"));
    assert!(!is_variant("jane.doe", "john.roe"));
  }

  #[test]
  fn unrelated_prefix_matches_do_not_collide() {
    // "ab" starts with "a" but is not a numbered variant of it.
    assert_eq!(next_available("a", &taken(&["ab"])), "a");
  }
}
