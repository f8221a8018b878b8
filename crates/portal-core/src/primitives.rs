//! # Primitives
//!
//! Fixed limits and defaults compiled into One Portal.
//!
//! These values bound every input accepted at the record boundary so a single
//! request cannot grow a document without limit.

/// Minimum username length in characters.
pub const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum username length in characters.
pub const USERNAME_MAX_LENGTH: usize = 20;

/// Minimum password length in bytes, checked before hashing.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum length for short text fields (names, titles, roles, links).
pub const MAX_SHORT_TEXT_LENGTH: usize = 256;

/// Maximum length for long text fields (descriptions, messages).
pub const MAX_LONG_TEXT_LENGTH: usize = 10_000;

/// Maximum number of entries in a free-form list (skills, interests, roles).
pub const MAX_LIST_LENGTH: usize = 100;

/// Maximum headcount accepted for `maxParticipants` and `maxTeamSize`.
///
/// Also bounds the per-role `count` of a project posting.
pub const MAX_CAPACITY: u32 = 100_000;

/// Location stored for a college created without one.
pub const DEFAULT_COLLEGE_LOCATION: &str = "India";
