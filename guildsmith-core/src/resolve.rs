//! Identifier resolution — maps a raw user identifier to a roster member.
//!
//! Strategies are pure functions over the roster snapshot, tried in fixed
//! priority order. The identifier's shape gates which strategies apply, so
//! an all-digits identifier is only ever an account id and a `name#0000`
//! identifier is only ever a legacy tag. An unmatched identifier is a
//! normal outcome, not an error.

use crate::types::{AccountId, RosterMember};

/// A single resolution strategy. Returns the index of the first matching
/// roster member, or `None` when the strategy does not apply or misses.
type Matcher = fn(&str, &[RosterMember]) -> Option<usize>;

/// Strategy order: numeric id, legacy `name#discriminator`, username,
/// display name.
const MATCHERS: &[Matcher] = &[by_account_id, by_legacy_tag, by_name, by_display_name];

/// Resolve `identifier` against `roster`.
pub fn resolve<'a>(identifier: &str, roster: &'a [RosterMember]) -> Option<&'a RosterMember> {
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(identifier, roster))
        .map(|index| &roster[index])
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn by_account_id(identifier: &str, roster: &[RosterMember]) -> Option<usize> {
    if !is_all_digits(identifier) {
        return None;
    }
    let id = identifier.parse::<u64>().ok()?;
    roster.iter().position(|m| m.id == AccountId(id))
}

fn by_legacy_tag(identifier: &str, roster: &[RosterMember]) -> Option<usize> {
    if is_all_digits(identifier) {
        return None;
    }
    // Split on the *last* '#': the name part may itself contain one.
    let (name, discriminator) = identifier.rsplit_once('#')?;
    roster.iter().position(|m| {
        m.name == name && m.discriminator_str().is_some_and(|d| d == discriminator)
    })
}

fn by_name(identifier: &str, roster: &[RosterMember]) -> Option<usize> {
    if is_all_digits(identifier) || identifier.contains('#') {
        return None;
    }
    roster.iter().position(|m| m.name == identifier)
}

fn by_display_name(identifier: &str, roster: &[RosterMember]) -> Option<usize> {
    if is_all_digits(identifier) || identifier.contains('#') {
        return None;
    }
    roster
        .iter()
        .position(|m| m.display_name.as_deref() == Some(identifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u64, name: &str) -> RosterMember {
        RosterMember {
            id: AccountId(id),
            name: name.to_string(),
            display_name: None,
            discriminator: None,
            bot: false,
        }
    }

    #[test]
    fn numeric_id_wins_over_display_name() {
        let roster = vec![
            member(12345, "alice"),
            RosterMember {
                display_name: Some("12345".to_string()),
                ..member(999, "impostor")
            },
        ];
        let found = resolve("12345", &roster).unwrap();
        assert_eq!(found.name, "alice");
    }

    #[test]
    fn digits_only_never_falls_back_to_names() {
        let roster = vec![RosterMember {
            display_name: Some("777".to_string()),
            ..member(1, "sevens")
        }];
        assert!(resolve("777", &roster).is_none());
    }

    #[test]
    fn legacy_tag_matches_canonical_discriminator() {
        let roster = vec![RosterMember {
            discriminator: Some(42),
            ..member(2, "bob")
        }];
        assert_eq!(resolve("bob#0042", &roster).unwrap().name, "bob");
        // Only the zero-padded form matches.
        assert!(resolve("bob#42", &roster).is_none());
        assert!(resolve("bob#0041", &roster).is_none());
    }

    #[test]
    fn legacy_tag_splits_on_last_hash() {
        let roster = vec![RosterMember {
            discriminator: Some(7),
            ..member(3, "team#lead")
        }];
        assert_eq!(resolve("team#lead#0007", &roster).unwrap().name, "team#lead");
    }

    #[test]
    fn username_beats_display_name_anywhere_in_roster() {
        let roster = vec![
            RosterMember {
                display_name: Some("alice".to_string()),
                ..member(1, "zed")
            },
            member(2, "alice"),
        ];
        assert_eq!(resolve("alice", &roster).unwrap().id, AccountId(2));
    }

    #[test]
    fn display_name_is_the_fallback() {
        let roster = vec![RosterMember {
            display_name: Some("The Architect".to_string()),
            ..member(4, "arch")
        }];
        assert_eq!(resolve("The Architect", &roster).unwrap().id, AccountId(4));
    }

    #[test]
    fn unknown_identifier_is_none() {
        let roster = vec![member(1, "alice")];
        assert!(resolve("ghost_user", &roster).is_none());
    }
}
