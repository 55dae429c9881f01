//! Message composition: the daily digest and the rotating content post.

pub mod digest;
pub mod rotation;

pub use digest::{render_test_message, DigestComposer};
pub use rotation::{Rotator, Selection};

use chrono::{DateTime, Utc};

/// Append the posting signature (UTC time and channel hashtag).
pub fn format_post(message: &str, now: DateTime<Utc>) -> String {
    format!("{message}\n\n🕘 {} UTC • #SPOREXZONE", now.format("%d/%m %H:%M"))
}
