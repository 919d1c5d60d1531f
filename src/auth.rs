use std::fmt;

/// An API access token.
///
/// Wraps the raw secret so it never ends up in `Debug` output or log lines.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Picks the first non-empty token: an explicit flag/env value wins over the
/// stored one.
pub fn resolve(explicit: Option<&str>, stored: Option<&str>) -> Option<Token> {
    explicit
        .map(Token::from)
        .filter(|t| !t.is_empty())
        .or_else(|| stored.map(Token::from).filter(|t| !t.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_trimmed() {
        let token = Token::from("  glpat-abc\n");
        assert_eq!(token.as_str(), "glpat-abc");
    }

    #[test]
    fn test_debug_hides_secret() {
        let token = Token::from("glpat-secret");
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let token = resolve(Some("flag"), Some("stored")).unwrap();
        assert_eq!(token.as_str(), "flag");
    }

    #[test]
    fn test_resolve_falls_back_to_stored_when_explicit_blank() {
        let token = resolve(Some("  "), Some("stored")).unwrap();
        assert_eq!(token.as_str(), "stored");
    }

    #[test]
    fn test_resolve_none_when_everything_empty() {
        assert!(resolve(None, Some("")).is_none());
        assert!(resolve(None, None).is_none());
    }
}
