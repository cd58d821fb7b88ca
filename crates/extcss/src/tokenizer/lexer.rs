use super::token::{Token, is_mark};

/// A delimited group whose content is folded into a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    /// `( … )`, with nested parentheses counted.
    Paren,
    /// `[ … ]`.
    Bracket,
    /// A quoted string at the top level.
    Quote(char),
}

/// Selector tokenizer.
///
/// Splits a selector into [`Token`]s such that concatenating every token
/// value reproduces the trimmed input. Structural characters become marks
/// only at the top nesting level; the content of a parenthesized, bracketed
/// or quoted group is emitted as exactly one word between its opening and
/// closing marks.
///
/// Unterminated groups are not an error here: the group simply has no
/// closing mark, and the AST builder reports the imbalance with the whole
/// selector in hand.
pub struct SelectorTokenizer {
    /// The trimmed input.
    input: Vec<char>,
    /// Current position in the input.
    position: usize,
    /// Collected tokens.
    tokens: Vec<Token>,
}

impl SelectorTokenizer {
    /// Create a tokenizer for `input`. Leading and trailing whitespace is
    /// trimmed before tokenizing.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.trim().chars().collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input.
    pub fn run(&mut self) {
        let mut word = String::new();
        let mut word_start = 0;

        while let Some(c) = self.peek() {
            if !is_mark(c) {
                if word.is_empty() {
                    word_start = self.position;
                }
                word.push(c);
                self.position += 1;
                // An escaped character never acts as a mark: `.a\:b`
                if c == '\\'
                    && let Some(escaped) = self.peek()
                {
                    word.push(escaped);
                    self.position += 1;
                }
                continue;
            }

            self.flush_word(&mut word, word_start);
            self.tokens.push(Token::mark(c, self.position));
            self.position += 1;

            match c {
                '(' => self.consume_group(Group::Paren),
                '[' => self.consume_group(Group::Bracket),
                '"' | '\'' => self.consume_group(Group::Quote(c)),
                _ => {}
            }
        }

        self.flush_word(&mut word, word_start);
    }

    /// Return the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Return a reference to the collected tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn flush_word(&mut self, word: &mut String, start: usize) {
        if !word.is_empty() {
            self.tokens.push(Token::word(std::mem::take(word), start));
        }
    }

    /// Consume the content of a group whose opening mark was just emitted,
    /// then its closing mark if there is one.
    fn consume_group(&mut self, group: Group) {
        let start = self.position;
        let mut content = String::new();
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        // The opening delimiter counts as the previous character, so a quote
        // right after `(` opens a string.
        let mut prev = match group {
            Group::Paren => '(',
            Group::Bracket => '[',
            Group::Quote(q) => q,
        };

        let closing = match group {
            Group::Paren => ')',
            Group::Bracket => ']',
            Group::Quote(q) => q,
        };

        while let Some(c) = self.peek() {
            if c == '\\' {
                content.push(c);
                self.position += 1;
                if let Some(escaped) = self.peek() {
                    content.push(escaped);
                    self.position += 1;
                    prev = escaped;
                }
                continue;
            }

            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
            } else {
                match group {
                    Group::Paren => match c {
                        // A quote only opens a string where a string may start;
                        // `:contains(it's)` is plain text.
                        '"' | '\'' if matches!(prev, '(' | '=' | ',') || prev.is_whitespace() => {
                            quote = Some(c);
                        }
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    },
                    Group::Bracket => match c {
                        '"' | '\'' => quote = Some(c),
                        ']' => break,
                        _ => {}
                    },
                    Group::Quote(q) => {
                        if c == q {
                            break;
                        }
                    }
                }
            }

            content.push(c);
            self.position += 1;
            prev = c;
        }

        if !content.is_empty() {
            self.tokens.push(Token::word(content, start));
        }
        if self.peek() == Some(closing) {
            self.tokens.push(Token::mark(closing, self.position));
            self.position += 1;
        }
    }
}

/// Tokenize a selector in one call.
///
/// # Example
/// ```
/// use extcss::tokenizer::{tokenize, TokenKind};
///
/// let tokens = tokenize("div:has(> a)");
/// let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
/// assert_eq!(values, ["div", ":", "has", "(", "> a", ")"]);
/// assert_eq!(tokens[4].kind, TokenKind::Word);
/// ```
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = SelectorTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_tokens()
}
