//! A module implementing lexical analysis (tokenization) of a command line.
//!
//! The lexer is a small finite state machine. It understands single quotes
//! (everything literal), double quotes (whitespace kept, a minimal escape set)
//! and backslash escapes outside of quotes. Fragments that touch each other
//! without whitespace in between are glued into one word, so `a'b c'"d"`
//! becomes the single word `ab cd`.

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Runs the machine over the whole input and returns the words.
    fn make_tokens(&mut self) -> Result<Vec<String>, ParseError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch),
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote => return Err(ParseError::UnterminatedQuote('\'')),
            LexingState::ReadingDoubleQuote => return Err(ParseError::UnterminatedQuote('"')),
            LexingState::ReadingWord => out.push(std::mem::take(&mut self.buffer)),
            LexingState::Start => {}
        }

        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_start(&mut self, ch: char) {
        if ch.is_whitespace() {
            return;
        }
        self.state = LexingState::ReadingWord;
        self.consume_word_char(ch);
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) {
        if ch.is_whitespace() {
            out.push(std::mem::take(&mut self.buffer));
            self.state = LexingState::Start;
        } else {
            self.consume_word_char(ch);
        }
    }

    /// Unquoted character inside (or starting) a word.
    fn consume_word_char(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            '\\' => match self.read_char() {
                Some(next) => self.buffer.push(next),
                None => self.buffer.push('\\'),
            },
            c => self.buffer.push(c),
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => match self.peek_char() {
                Some(next @ ('\\' | '"' | '$' | '`')) => {
                    self.read_char();
                    self.buffer.push(next);
                }
                _ => self.buffer.push('\\'),
            },
            c => self.buffer.push(c),
        }
    }
}

/// Splits a command line into words.
///
/// Empty or blank input yields an empty vector. A quote that is never closed
/// is reported as [`ParseError::UnterminatedQuote`].
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut lexer = LexingFSM::new(line);
    lexer.make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        tokenize(line).unwrap()
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(words("echo  hello\tworld "), vec!["echo", "hello", "world"]);
        assert!(words("").is_empty());
        assert!(words("   \t").is_empty());
    }

    #[test]
    fn single_quotes_keep_everything() {
        assert_eq!(words("echo 'a b' c"), vec!["echo", "a b", "c"]);
        assert_eq!(words(r#"echo 'x\ny "q"'"#), vec!["echo", r#"x\ny "q""#]);
    }

    #[test]
    fn double_quotes_process_minimal_escapes() {
        assert_eq!(
            words(r#"echo "say \"hi\" \\ \n""#),
            vec!["echo", r#"say "hi" \ \n"#]
        );
        assert_eq!(words(r#"echo "it's""#), vec!["echo", "it's"]);
    }

    #[test]
    fn backslash_outside_quotes() {
        assert_eq!(words(r"echo a\ b \'c"), vec!["echo", "a b", "'c"]);
        assert_eq!(words(r"echo end\"), vec!["echo", r"end\"]);
    }

    #[test]
    fn adjacent_fragments_concatenate() {
        assert_eq!(words(r#"echo a'b c'"d""#), vec!["echo", "ab cd"]);
        assert_eq!(words("echo '' x"), vec!["echo", "", "x"]);
    }

    #[test]
    fn unterminated_quotes_fail() {
        assert_eq!(tokenize("echo 'a"), Err(ParseError::UnterminatedQuote('\'')));
        assert_eq!(tokenize(r#"echo "a"#), Err(ParseError::UnterminatedQuote('"')));
    }

    #[test]
    fn operators_are_plain_words() {
        assert_eq!(words("ls 2>> err.log"), vec!["ls", "2>>", "err.log"]);
    }
}
