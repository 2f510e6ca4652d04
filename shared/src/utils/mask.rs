//! Log masking for subject identifiers

/// Number of trailing characters left visible by [`mask_subject`]
const VISIBLE_SUFFIX: usize = 4;

/// Mask a subject identifier for logging (e.g. `***5678`)
///
/// Subjects are usually phone numbers or user ids; only the last four
/// characters survive. Short subjects are masked entirely.
pub fn mask_subject(subject: &str) -> String {
    let chars: Vec<char> = subject.chars().collect();
    if chars.len() <= VISIBLE_SUFFIX {
        return "****".to_string();
    }
    let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    format!("***{}", suffix)
}
