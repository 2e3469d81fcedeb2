// Filter tokens for lexical analysis

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Unquoted run of unreserved characters: a selector, a bare value or a keyword
    Word(String),
    /// Single- or double-quoted value with escapes resolved
    Quoted(String),
    /// Comparison operator as written, e.g. `==`, `>=`, `=in=`
    Comparator(String),

    // Delimiters
    LeftParen,
    RightParen,
    Semicolon,
    Comma,

    Eof,
}

impl Token {
    /// `and` written as a word joins constraints like `;`
    pub fn is_and(&self) -> bool {
        match self {
            Token::Semicolon => true,
            Token::Word(word) => word.eq_ignore_ascii_case("and"),
            _ => false,
        }
    }

    /// `or` written as a word joins constraints like `,`
    pub fn is_or(&self) -> bool {
        match self {
            Token::Comma => true,
            Token::Word(word) => word.eq_ignore_ascii_case("or"),
            _ => false,
        }
    }

    /// Short human-readable form for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Word(word) => format!("'{}'", word),
            Token::Quoted(value) => format!("quoted value '{}'", value),
            Token::Comparator(op) => format!("operator '{}'", op),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_keywords() {
        assert!(Token::Semicolon.is_and());
        assert!(Token::Word("AND".to_string()).is_and());
        assert!(!Token::Word("android".to_string()).is_and());
        assert!(Token::Comma.is_or());
        assert!(Token::Word("Or".to_string()).is_or());
        assert!(!Token::Quoted("or".to_string()).is_or());
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::Eof.describe(), "end of input");
        assert_eq!(
            Token::Comparator("=gt=".to_string()).describe(),
            "operator '=gt='"
        );
    }
}
