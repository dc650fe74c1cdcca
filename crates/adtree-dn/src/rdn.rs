use std::fmt;

/// Characters that must be escaped in an attribute value and may not appear
/// in an attribute type at all. `=` ends a type scan, so it is checked there.
pub(crate) const RESERVED: &[char] = &[',', '+', '"', '<', '>', ';', '=', '\r', '\n'];

pub(crate) fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// One `type=value` segment of a distinguished name, already unescaped and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rdn {
    attribute_type: String,
    attribute_value: String,
}

impl Rdn {
    pub fn new(attribute_type: impl Into<String>, attribute_value: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            attribute_value: attribute_value.into(),
        }
    }

    pub fn attribute_type(&self) -> &str {
        &self.attribute_type
    }

    pub fn attribute_value(&self) -> &str {
        &self.attribute_value
    }

    /// Serializes the segment so that scanning it again yields the same pair.
    pub fn to_escaped_string(&self) -> String {
        let mut out =
            String::with_capacity(self.attribute_type.len() + self.attribute_value.len() + 1);
        out.push_str(&self.attribute_type);
        out.push('=');
        for c in self.attribute_value.chars() {
            match c {
                '\r' => out.push_str("\\0d"),
                '\n' => out.push_str("\\0a"),
                '\\' => out.push_str("\\\\"),
                c if is_reserved(c) => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out
    }
}

/// Unescaped `type=value`, as shown to users.
impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute_type, self.attribute_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn display_is_unescaped() {
        let rdn = Rdn::new("CN", "Baxter, Sam");
        assert_eq!(rdn.to_string(), "CN=Baxter, Sam");
    }

    #[rstest]
    #[case("plain", "cn=plain")]
    #[case("a,b", "cn=a\\,b")]
    #[case("a+b=c", "cn=a\\+b\\=c")]
    #[case("<\"q\">;", "cn=\\<\\\"q\\\"\\>\\;")]
    #[case("back\\slash", "cn=back\\\\slash")]
    #[case("line\r\nbreak", "cn=line\\0d\\0abreak")]
    fn escaped_string(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(Rdn::new("cn", value).to_escaped_string(), expected);
    }

    #[test]
    fn reserved_set_covers_special_characters() {
        for c in [',', '+', '"', '<', '>', ';', '=', '\r', '\n'] {
            assert!(is_reserved(c), "{c:?} should be reserved");
        }
        assert!(!is_reserved('\\'));
        assert!(!is_reserved(' '));
        assert!(!is_reserved('#'));
    }
}
