//! Path normalization
//!
//! Turns caller-supplied path strings into canonical, root-relative paths
//! and rejects anything that would climb above the virtual root.

use crate::error::StorageError;

/// Normalizes a raw caller path into a canonical relative path.
///
/// Backslashes become `/`, control and format characters are stripped,
/// `.` and empty segments are dropped and `..` pops the previous segment.
/// Popping past the root fails with [`StorageError::PathTraversal`]
/// carrying the original input. The empty string denotes the root itself.
pub fn normalize_path(raw: &str) -> Result<String, StorageError> {
    let path = strip_unprintable(&raw.replace('\\', "/"));
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(StorageError::PathTraversal {
                        path: raw.to_string(),
                    });
                }
            }
            other => segments.push(other),
        }
    }

    Ok(segments.join("/"))
}

/// Strips unprintable characters and a leading `./` until nothing changes.
fn strip_unprintable(path: &str) -> String {
    let mut current = path.to_string();

    loop {
        let mut next: String = current.chars().filter(|c| !is_unprintable(*c)).collect();
        if let Some(rest) = next.strip_prefix("./") {
            next = rest.to_string();
        }
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Control, format, private-use and noncharacter code points.
///
/// Unassigned code points are not covered and pass through unchanged.
fn is_unprintable(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{00AD}'
                | '\u{0600}'..='\u{0605}'
                | '\u{061C}'
                | '\u{06DD}'
                | '\u{070F}'
                | '\u{0890}'..='\u{0891}'
                | '\u{08E2}'
                | '\u{180E}'
                | '\u{200B}'..='\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{206F}'
                | '\u{FEFF}'
                | '\u{FFF9}'..='\u{FFFB}'
                | '\u{FFFE}'..='\u{FFFF}'
                | '\u{110BD}'
                | '\u{110CD}'
                | '\u{13430}'..='\u{1343F}'
                | '\u{1BCA0}'..='\u{1BCA3}'
                | '\u{1D173}'..='\u{1D17A}'
                | '\u{E0001}'
                | '\u{E0020}'..='\u{E007F}'
                | '\u{E000}'..='\u{F8FF}'
                | '\u{F0000}'..='\u{FFFFD}'
                | '\u{100000}'..='\u{10FFFD}'
        )
}
