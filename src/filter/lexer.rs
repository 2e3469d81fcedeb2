// Filter lexer - tokenizes RSQL-style filter expressions

use super::error::SyntaxError;
use super::token::Token;

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

/// Characters that cannot appear in an unquoted word
fn is_reserved(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '"' | '\'' | '(' | ')' | ';' | ',' | '=' | '!' | '<' | '>')
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let current_char = input.first().copied();
        Lexer {
            input,
            position: 0,
            current_char,
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();

        let ch = match self.current_char {
            Some(ch) => ch,
            None => return Ok(Token::Eof),
        };

        let token = match ch {
            '(' => {
                self.advance();
                Token::LeftParen
            }
            ')' => {
                self.advance();
                Token::RightParen
            }
            ';' => {
                self.advance();
                Token::Semicolon
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '<' | '>' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::Comparator(format!("{}=", ch))
                } else {
                    Token::Comparator(ch.to_string())
                }
            }
            '!' => {
                let start = self.position;
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::Comparator("!=".to_string())
                } else {
                    return Err(SyntaxError::UnexpectedCharacter {
                        ch: '!',
                        position: start,
                    });
                }
            }
            '=' => self.read_equals_comparator()?,
            '\'' | '"' => self.read_quoted(ch)?,
            _ => self.read_word(),
        };

        Ok(token)
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read `==` or an alphabetic comparator such as `=gt=` or `=in=`
    fn read_equals_comparator(&mut self) -> Result<Token, SyntaxError> {
        let start = self.position;
        self.advance(); // Skip opening '='

        if self.current_char == Some('=') {
            self.advance();
            return Ok(Token::Comparator("==".to_string()));
        }

        let mut name = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphabetic() {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if name.is_empty() || self.current_char != Some('=') {
            return Err(SyntaxError::UnexpectedCharacter {
                ch: '=',
                position: start,
            });
        }
        self.advance(); // Skip closing '='

        Ok(Token::Comparator(format!("={}=", name)))
    }

    /// Read a quoted value; a backslash escapes the next character
    fn read_quoted(&mut self, quote: char) -> Result<Token, SyntaxError> {
        let start = self.position;
        self.advance(); // Skip opening quote
        let mut value = String::new();

        loop {
            match self.current_char {
                None => return Err(SyntaxError::UnterminatedString { position: start }),
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(Token::Quoted(value));
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char {
                        Some(escaped) => {
                            value.push(escaped);
                            self.advance();
                        }
                        None => return Err(SyntaxError::UnterminatedString { position: start }),
                    }
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Read an unquoted word
    fn read_word(&mut self) -> Token {
        let mut word = String::new();

        while let Some(ch) = self.current_char {
            if is_reserved(ch) {
                break;
            }
            word.push(ch);
            self.advance();
        }

        Token::Word(word)
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }
}
