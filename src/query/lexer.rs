use crate::analysis::tokenizer::{Separator, default_separator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeKind {
    Field,
    Term,
    EditDistance,
    Boost,
    Presence,
    Comparator,
    Comparand,
    RangeStart,
    RangeEnd,
}

/// One lexeme with byte offsets into the source query string.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub kind: LexemeKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

enum State {
    Text,
    Field,
    Term,
    EditDistance,
    Boost,
    RangeEnd,
    Eos,
}

/// State-machine lexer for the query language.
///
/// `\` escapes the following character; the backslash itself is elided
/// from the emitted lexeme. Lexeme offsets are byte positions so parse
/// errors can point into the source string.
pub struct QueryLexer<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    start: usize,
    escapes: Vec<usize>,
    separator: Separator,
    pub lexemes: Vec<Lexeme>,
}

impl<'a> QueryLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        QueryLexer::with_separator(source, default_separator)
    }

    pub fn with_separator(source: &'a str, separator: Separator) -> Self {
        QueryLexer {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
            start: 0,
            escapes: Vec::new(),
            separator,
            lexemes: Vec::new(),
        }
    }

    pub fn run(mut self) -> Vec<Lexeme> {
        let mut state = State::Text;
        loop {
            let next = match state {
                State::Text => self.lex_text(),
                State::Field => self.lex_field(),
                State::Term => self.lex_term(),
                State::EditDistance => self.lex_modifier(LexemeKind::EditDistance),
                State::Boost => self.lex_modifier(LexemeKind::Boost),
                State::RangeEnd => self.lex_range_end(),
                State::Eos => {
                    if self.width() > 0 {
                        self.emit(LexemeKind::Term);
                    }
                    None
                }
            };

            match next {
                Some(s) => state = s,
                None => return self.lexemes,
            }
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).map(|&(_, c)| c);
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn peek_char(&self) -> Option<char> {
        self.char_at(self.pos)
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).map(|&(_, c)| c)
    }

    fn byte_at(&self, pos: usize) -> usize {
        self.chars
            .get(pos)
            .map_or(self.source.len(), |&(byte, _)| byte)
    }

    fn width(&self) -> usize {
        self.pos.min(self.chars.len()) - self.start
    }

    fn more(&self) -> bool {
        self.pos < self.chars.len()
    }

    fn backup(&mut self) {
        self.pos -= 1;
    }

    /// Skip the current character without emitting it.
    fn ignore(&mut self) {
        if self.start == self.pos {
            self.pos += 1;
        }
        self.start = self.pos;
    }

    /// Record the just-consumed backslash for elision and skip the
    /// character it escapes.
    fn escape_character(&mut self) {
        self.escapes.push(self.pos - 1);
        self.pos += 1;
    }

    fn accept_digit_run(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn emit(&mut self, kind: LexemeKind) {
        let end = self.pos.min(self.chars.len());
        let text: String = (self.start..end)
            .filter(|pos| !self.escapes.contains(pos))
            .filter_map(|pos| self.char_at(pos))
            .collect();

        self.lexemes.push(Lexeme {
            kind,
            text,
            start: self.byte_at(self.start),
            end: self.byte_at(end),
        });

        self.start = end;
        self.escapes.clear();
    }

    fn lex_text(&mut self) -> Option<State> {
        loop {
            let Some(c) = self.next_char() else {
                return Some(State::Eos);
            };

            if c == '\\' {
                self.escape_character();
                continue;
            }

            if c == ':' {
                return Some(State::Field);
            }

            if c == '~' {
                self.backup();
                if self.width() > 0 {
                    self.emit(LexemeKind::Term);
                }
                return Some(State::EditDistance);
            }

            if c == '^' {
                self.backup();
                if self.width() > 0 {
                    self.emit(LexemeKind::Term);
                }
                return Some(State::Boost);
            }

            // only a leading "+" or "-" marks presence
            if (c == '+' || c == '-') && self.width() == 1 {
                self.emit(LexemeKind::Presence);
                return Some(State::Text);
            }

            if c == '.' && self.peek_char() == Some('.') {
                self.backup();
                self.emit(LexemeKind::RangeStart);
                self.pos += 2;
                self.start = self.pos;
                return Some(State::RangeEnd);
            }

            if (self.separator)(c) {
                return Some(State::Term);
            }
        }
    }

    fn lex_field(&mut self) -> Option<State> {
        self.backup();
        self.emit(LexemeKind::Field);
        self.ignore();

        // a comparator may follow the colon directly
        if matches!(self.peek_char(), Some('<') | Some('>')) {
            self.pos += 1;
            if self.peek_char() == Some('=') {
                self.pos += 1;
            }
            self.emit(LexemeKind::Comparator);

            self.accept_digit_run();
            if self.peek_char() == Some('.')
                && self.char_at(self.pos + 1).is_some_and(|c| c.is_ascii_digit())
            {
                self.pos += 1;
                self.accept_digit_run();
            }
            self.emit(LexemeKind::Comparand);
        }

        Some(State::Text)
    }

    fn lex_term(&mut self) -> Option<State> {
        if self.width() > 1 {
            self.backup();
            self.emit(LexemeKind::Term);
        }

        self.ignore();

        if self.more() { Some(State::Text) } else { None }
    }

    fn lex_modifier(&mut self, kind: LexemeKind) -> Option<State> {
        self.ignore();
        self.accept_digit_run();
        self.emit(kind);
        Some(State::Text)
    }

    fn lex_range_end(&mut self) -> Option<State> {
        loop {
            match self.peek_char() {
                None => {
                    self.emit(LexemeKind::RangeEnd);
                    return Some(State::Eos);
                }
                Some(c)
                    if c == ':'
                        || c == '~'
                        || c == '^'
                        || c == '+'
                        || c == '-'
                        || (self.separator)(c)
                        || (c == '.' && self.char_at(self.pos + 1) == Some('.')) =>
                {
                    self.emit(LexemeKind::RangeEnd);
                    return Some(State::Text);
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
    }
}
