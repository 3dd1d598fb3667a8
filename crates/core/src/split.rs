//! Batch splitting.
//!
//! A batch file is a concatenation of messages, each starting with an `MSH` segment. Splitting
//! only happens at segment boundaries, so an `MSH` that appears inside a field value does not
//! start a new message.

use crate::constants::{MESSAGE_HEADER, SEGMENT_SEPARATOR};
use std::borrow::Cow;

/// Split normalised batch text into individual messages.
///
/// The returned iterator is lazy and cheap to clone; cloning restarts from the clone point.
/// Text before the first header is treated as a message of its own with `MSH` prepended, so
/// that it reaches the grammar and is rejected there rather than silently dropped.
pub fn split_messages(text: &str) -> Messages<'_> {
    Messages { rest: text }
}

/// Iterator over the messages of a batch, in input order.
#[derive(Clone, Debug)]
pub struct Messages<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Messages<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let rest: &'a str = self.rest;
            let boundary = rest
                .match_indices(SEGMENT_SEPARATOR)
                .map(|(i, _)| i)
                .find(|&i| rest[i + 1..].starts_with(MESSAGE_HEADER));

            let fragment = match boundary {
                Some(i) => {
                    self.rest = &rest[i + 1..];
                    &rest[..i]
                }
                None => {
                    self.rest = "";
                    rest
                }
            };

            let fragment = fragment.trim_matches(SEGMENT_SEPARATOR);
            if fragment.is_empty() {
                continue;
            }

            if fragment.starts_with(MESSAGE_HEADER) {
                return Some(Cow::Borrowed(fragment));
            }
            return Some(Cow::Owned(format!("{}{}", MESSAGE_HEADER, fragment)));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_messages() {
        let batch = "MSH|^~\\&|A|1\rPID|1\rMSH|^~\\&|A|2\rPID|2";
        let messages: Vec<_> = split_messages(batch).collect();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "MSH|^~\\&|A|1\rPID|1");
        assert_eq!(messages[1], "MSH|^~\\&|A|2\rPID|2");
        assert!(messages.iter().all(|m| m.starts_with("MSH")));
    }

    #[test]
    fn test_single_message() {
        let messages: Vec<_> = split_messages("MSH|^~\\&|A\rPID|1").collect();
        assert_eq!(messages, vec!["MSH|^~\\&|A\rPID|1"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(split_messages("").count(), 0);
        assert_eq!(split_messages("\r\r").count(), 0);
    }

    #[test]
    fn test_header_inside_field_is_not_a_boundary() {
        let text = "MSH|^~\\&|A\rNTE|1||see MSH segment";
        assert_eq!(split_messages(text).count(), 1);
    }

    #[test]
    fn test_leading_text_gets_header() {
        let messages: Vec<_> = split_messages("junk\rMSH|^~\\&|A").collect();
        assert_eq!(messages, vec!["MSHjunk", "MSH|^~\\&|A"]);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let batch = "MSH|1\rMSH|2\rMSH|3";
        let mut messages = split_messages(batch);
        assert_eq!(messages.next().as_deref(), Some("MSH|1"));

        let replay = messages.clone();
        assert_eq!(messages.collect::<Vec<_>>(), vec!["MSH|2", "MSH|3"]);
        assert_eq!(replay.collect::<Vec<_>>(), vec!["MSH|2", "MSH|3"]);
    }
}
