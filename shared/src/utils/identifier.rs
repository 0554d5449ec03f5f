//! Identifier utilities shared by the passcode engine and its transports

/// Canonical form of an identifier: surrounding whitespace removed, lower-cased.
///
/// Two submissions that differ only in case or padding address the same record.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Mask an identifier for logs (e.g., j***@example.com)
pub fn mask_identifier(identifier: &str) -> String {
    match identifier.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => {
            let chars: Vec<char> = identifier.chars().collect();
            if chars.len() >= 7 {
                let head: String = chars[..3].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{}****{}", head, tail)
            } else {
                "****".to_string()
            }
        }
    }
}
