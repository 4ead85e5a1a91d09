//! URI escaping for query keys and values.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in a data component: everything but RFC 3986 unreserved.
const DATA: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters escaped in a URI string: reserved characters pass through.
const URI: &AsciiSet = &DATA
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

/// Escape a query key. Reserved characters such as `/` are kept literal.
#[must_use]
pub fn escape_key(key: &str) -> String {
    utf8_percent_encode(key, URI).to_string()
}

/// Escape a query value as a data component. Only unreserved characters are
/// kept literal.
#[must_use]
pub fn escape_value(value: &str) -> String {
    utf8_percent_encode(value, DATA).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_is_literal_in_keys_and_escaped_in_values() {
        assert_eq!(escape_key("a/b"), "a/b");
        assert_eq!(escape_value("a/b"), "a%2Fb");
    }

    #[test]
    fn spaces_and_unicode_are_escaped_everywhere() {
        assert_eq!(escape_key("a b"), "a%20b");
        assert_eq!(escape_value("é"), "%C3%A9");
        assert_eq!(escape_value("x-y_z.~"), "x-y_z.~");
        assert_eq!(escape_value("a=b&c"), "a%3Db%26c");
    }
}
