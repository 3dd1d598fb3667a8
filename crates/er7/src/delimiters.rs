use crate::{Er7Error, HEADER_SEGMENT};

/// Delimiters declared by a message's MSH segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Delimiters {
    /// Read delimiters from the start of an MSH segment.
    ///
    /// The field separator is the character right after `MSH`; MSH-2 holds the component,
    /// repetition, escape and sub-component characters in that order. A fifth (truncation)
    /// character from later versions is tolerated and ignored.
    pub fn from_header(segment: &str) -> Result<Self, Er7Error> {
        let rest = segment
            .strip_prefix(HEADER_SEGMENT)
            .ok_or_else(|| Er7Error::MissingHeader(segment.chars().take(3).collect()))?;

        let mut chars = rest.chars();
        let field = chars
            .next()
            .ok_or_else(|| Er7Error::InvalidDelimiters("missing field separator".into()))?;
        if field.is_alphanumeric() {
            return Err(Er7Error::InvalidDelimiters(format!(
                "field separator must not be alphanumeric, got {:?}",
                field
            )));
        }

        let encoding: Vec<char> = chars.take_while(|c| *c != field).collect();
        if encoding.len() < 4 {
            return Err(Er7Error::InvalidDelimiters(format!(
                "MSH-2 must declare 4 encoding characters, got {:?}",
                encoding.iter().collect::<String>()
            )));
        }

        let delimiters = Self {
            field,
            component: encoding[0],
            repetition: encoding[1],
            escape: encoding[2],
            subcomponent: encoding[3],
        };

        let all = [
            delimiters.field,
            delimiters.component,
            delimiters.repetition,
            delimiters.escape,
            delimiters.subcomponent,
        ];
        for (i, c) in all.iter().enumerate() {
            if all[i + 1..].contains(c) {
                return Err(Er7Error::InvalidDelimiters(format!(
                    "delimiter {:?} declared more than once",
                    c
                )));
            }
        }

        Ok(delimiters)
    }

    /// The MSH-2 value as it appears on the wire.
    pub fn encoding_characters(&self) -> String {
        [self.component, self.repetition, self.escape, self.subcomponent]
            .iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_delimiters() {
        let d = Delimiters::from_header("MSH|^~\\&|A|B").unwrap();
        assert_eq!(d, Delimiters::default());
        assert_eq!(d.encoding_characters(), "^~\\&");
    }

    #[test]
    fn test_custom_delimiters() {
        let d = Delimiters::from_header("MSH#$*!@#A").unwrap();
        assert_eq!(d.field, '#');
        assert_eq!(d.component, '$');
        assert_eq!(d.repetition, '*');
        assert_eq!(d.escape, '!');
        assert_eq!(d.subcomponent, '@');
    }

    #[test]
    fn test_truncation_character_ignored() {
        let d = Delimiters::from_header("MSH|^~\\&#|A").unwrap();
        assert_eq!(d.subcomponent, '&');
    }

    #[test]
    fn test_short_encoding_characters() {
        assert!(matches!(
            Delimiters::from_header("MSH|^~|A"),
            Err(Er7Error::InvalidDelimiters(_))
        ));
    }

    #[test]
    fn test_duplicate_delimiters() {
        assert!(matches!(
            Delimiters::from_header("MSH|^^\\&|A"),
            Err(Er7Error::InvalidDelimiters(_))
        ));
    }

    #[test]
    fn test_not_a_header() {
        assert_eq!(
            Delimiters::from_header("PID|1"),
            Err(Er7Error::MissingHeader("PID".into()))
        );
    }
}
