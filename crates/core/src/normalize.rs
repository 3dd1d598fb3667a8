//! Segment terminator normalisation.
//!
//! HL7 v2 requires `\r` between segments, but messages routinely arrive with `\r\n` or `\n`
//! after passing through files, editors and HTTP clients. Callers declare which variants they
//! expect; everything else is left untouched.

use crate::constants::SEGMENT_SEPARATOR;

/// Rewrite every declared terminator to `\r` and drop empty segments.
///
/// Hints are applied in the order given, so `["\r\n", "\n"]` turns `\r\n` into a single `\r`
/// before lone `\n` is considered. With no hints only empty-segment removal is performed.
/// A segment holding only spaces or tabs is content, not a separator artefact, and is kept.
///
/// # Arguments
///
/// * `text` - Raw message or batch text.
/// * `hints` - Terminator substrings the caller expects, e.g. `["\r\n", "\n"]`.
///
/// # Returns
///
/// Text whose only segment separator is `\r`, with no leading, trailing or consecutive
/// separators. Applying it again to its own output returns the same text.
pub fn normalize_terminators<S: AsRef<str>>(text: &str, hints: &[S]) -> String {
    let mut normalized = text.to_string();

    for hint in hints {
        let hint = hint.as_ref();
        if hint.is_empty() || hint == "\r" {
            continue;
        }
        normalized = normalized.replace(hint, "\r");
    }

    let segments: Vec<&str> = normalized
        .split(SEGMENT_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect();

    segments.join("\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HINTS: [&str; 2] = ["\r\n", "\n"];

    #[test]
    fn test_crlf_and_lf_become_cr() {
        let text = "MSH|^~\\&|A\r\nPID|1\nPV1|1";
        assert_eq!(
            normalize_terminators(text, &HINTS),
            "MSH|^~\\&|A\rPID|1\rPV1|1"
        );
    }

    #[test]
    fn test_blank_segments_removed() {
        let text = "\r\rMSH|A\r\r\rPID|1\r";
        assert_eq!(normalize_terminators(text, &HINTS), "MSH|A\rPID|1");
    }

    #[test]
    fn test_whitespace_only_segment_kept() {
        let text = "MSH|A\r  \rPID|1\n\t\n";
        assert_eq!(
            normalize_terminators(text, &HINTS),
            "MSH|A\r  \rPID|1\r\t"
        );
    }

    #[test]
    fn test_no_hints_only_strips_blanks() {
        let text = "MSH|A\nPID|1\r\r";
        let none: [&str; 0] = [];
        assert_eq!(normalize_terminators(text, &none), "MSH|A\nPID|1");
    }

    #[test]
    fn test_hint_order_matters() {
        let text = "A\r\nB";
        assert_eq!(normalize_terminators(text, &["\n", "\r\n"]), "A\rB");
        assert_eq!(normalize_terminators(text, &["\r\n"]), "A\rB");
    }

    #[test]
    fn test_custom_terminator() {
        assert_eq!(normalize_terminators("A<EOS>B<EOS>", &["<EOS>"]), "A\rB");
    }

    #[test]
    fn test_idempotent_on_canonical_text() {
        let inputs = [
            "MSH|^~\\&|A\rPID|1",
            "MSH|A\r\n\r\nPID|1\n\n",
            "",
            "\r\r\r",
        ];
        for input in inputs {
            let once = normalize_terminators(input, &HINTS);
            assert_eq!(normalize_terminators(&once, &HINTS), once);
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_terminators("", &HINTS), "");
    }
}
