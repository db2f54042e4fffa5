//! Pair encoding
//!
//! Two token streams become one document for the vectorizer. The order is
//! fixed (A then B) and the separator is a single space even when a stream is
//! empty; vectorizers were fitted on exactly this layout.

use crate::lexer::TokenStream;
use std::fmt;

/// Document handed to the vectorizer for one file pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedFeatures(String);

impl PairedFeatures {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairedFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join the streams of file A and file B. Not commutative.
pub fn encode_pair(a: &TokenStream, b: &TokenStream) -> PairedFeatures {
    let mut joined = String::with_capacity(a.as_str().len() + b.as_str().len() + 1);
    joined.push_str(a.as_str());
    joined.push(' ');
    joined.push_str(b.as_str());
    PairedFeatures(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{JavaTokenizer, Tokenizer};

    fn stream(src: &str) -> TokenStream {
        JavaTokenizer::new().extract(src)
    }

    #[test]
    fn test_encode_is_concatenation_with_single_space() {
        let a = stream("int x;\n");
        let b = stream("return y;\n");
        let paired = encode_pair(&a, &b);
        assert_eq!(paired.as_str(), format!("{} {}", a, b));
        assert_eq!(paired.as_str(), "Keyword:int Name:x Keyword:return Name:y");
    }

    #[test]
    fn test_encode_keeps_delimiter_for_empty_streams() {
        let a = stream("int x;\n");
        let empty = stream("");
        assert_eq!(encode_pair(&a, &empty).as_str(), "Keyword:int Name:x ");
        assert_eq!(encode_pair(&empty, &a).as_str(), " Keyword:int Name:x");
        assert_eq!(encode_pair(&empty, &empty).as_str(), " ");
    }

    #[test]
    fn test_encode_is_not_commutative() {
        let a = stream("int x;\n");
        let b = stream("while (y) {}\n");
        assert_ne!(encode_pair(&a, &b), encode_pair(&b, &a));
        assert_eq!(encode_pair(&a, &a), encode_pair(&a, &a));
    }
}
