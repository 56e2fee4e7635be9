use crate::core::error::{Error, Result};
use crate::index::builder::FieldType;
use crate::query::ast::{Bound, Clause, ComparatorOp, Presence, Query, QueryTerm};
use crate::query::lexer::{Lexeme, LexemeKind, QueryLexer};

enum State {
    Clause,
    Presence,
    Field,
    Term,
    EditDistance,
    Boost,
    RangeStart,
    RangeEnd,
    Comparator,
    Comparand,
}

/// State-machine parser compiling a query string into clauses on a
/// `Query`. All failures carry byte offsets of the offending lexeme.
pub struct QueryParser<'q> {
    lexemes: Vec<Lexeme>,
    index: usize,
    query: &'q mut Query,
    current: Clause,
    pending_op: Option<ComparatorOp>,
    pending_range_start: Option<Bound>,
}

impl<'q> QueryParser<'q> {
    pub fn new(source: &str, query: &'q mut Query) -> Self {
        QueryParser {
            lexemes: QueryLexer::new(source).run(),
            index: 0,
            query,
            current: Clause::default(),
            pending_op: None,
            pending_range_start: None,
        }
    }

    pub fn parse(mut self) -> Result<()> {
        let mut state = State::Clause;
        loop {
            let next = match state {
                State::Clause => self.parse_clause()?,
                State::Presence => self.parse_presence()?,
                State::Field => self.parse_field()?,
                State::Term => self.parse_term()?,
                State::EditDistance => self.parse_edit_distance()?,
                State::Boost => self.parse_boost()?,
                State::RangeStart => self.parse_range_start()?,
                State::RangeEnd => self.parse_range_end()?,
                State::Comparator => self.parse_comparator()?,
                State::Comparand => self.parse_comparand()?,
            };

            match next {
                Some(s) => state = s,
                None => return Ok(()),
            }
        }
    }

    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.index)
    }

    fn consume(&mut self) -> Lexeme {
        let lexeme = self.lexemes[self.index].clone();
        self.index += 1;
        lexeme
    }

    fn end_offset(&self) -> usize {
        self.lexemes.last().map_or(0, |l| l.end)
    }

    fn next_clause(&mut self) {
        let clause = std::mem::take(&mut self.current);
        self.query.clause(clause);
    }

    fn parse_clause(&mut self) -> Result<Option<State>> {
        let Some(lexeme) = self.peek() else {
            return Ok(None);
        };

        match lexeme.kind {
            LexemeKind::Presence => Ok(Some(State::Presence)),
            LexemeKind::Field => Ok(Some(State::Field)),
            LexemeKind::Term => Ok(Some(State::Term)),
            LexemeKind::RangeStart => Ok(Some(State::RangeStart)),
            _ => {
                let mut message = format!("expected either a field or a term, found {:?}", lexeme.kind);
                if !lexeme.text.is_empty() {
                    message.push_str(&format!(" with value '{}'", lexeme.text));
                }
                Err(Error::query_parse(message, lexeme.start, lexeme.end))
            }
        }
    }

    fn parse_presence(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();

        match lexeme.text.as_str() {
            "-" => self.current.presence = Presence::Prohibited,
            "+" => self.current.presence = Presence::Required,
            other => {
                return Err(Error::query_parse(
                    format!("unrecognised presence operator '{}'", other),
                    lexeme.start,
                    lexeme.end,
                ));
            }
        }

        let end = self.end_offset();
        let Some(next) = self.peek() else {
            return Err(Error::query_parse(
                "expecting term or field, found nothing",
                end,
                end,
            ));
        };

        match next.kind {
            LexemeKind::Field => Ok(Some(State::Field)),
            LexemeKind::Term => Ok(Some(State::Term)),
            LexemeKind::RangeStart => Ok(Some(State::RangeStart)),
            _ => Err(Error::query_parse(
                format!("expecting term or field, found '{:?}'", next.kind),
                next.start,
                next.end,
            )),
        }
    }

    fn parse_field(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();

        if !self.query.all_fields.iter().any(|f| f == &lexeme.text) {
            let possible = self.query.all_fields.join(", ");
            return Err(Error::query_parse(
                format!(
                    "unrecognised field '{}', possible fields: {}",
                    lexeme.text, possible
                ),
                lexeme.start,
                lexeme.end,
            ));
        }

        let numeric = self.query.field_types.get(&lexeme.text) == Some(&FieldType::Number);
        self.current.fields = vec![lexeme.text.clone()];

        let end = self.end_offset();
        let Some(next) = self.peek() else {
            return Err(Error::query_parse("expecting term, found nothing", end, end));
        };

        match next.kind {
            LexemeKind::Term => Ok(Some(State::Term)),
            LexemeKind::RangeStart if numeric => Ok(Some(State::RangeStart)),
            LexemeKind::Comparator if numeric => Ok(Some(State::Comparator)),
            LexemeKind::RangeStart | LexemeKind::Comparator => Err(Error::query_parse(
                format!("field '{}' is not numeric", lexeme.text),
                next.start,
                next.end,
            )),
            _ => Err(Error::query_parse(
                format!("expecting term, found '{:?}'", next.kind),
                next.start,
                next.end,
            )),
        }
    }

    fn parse_term(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();

        let term = lexeme.text.to_lowercase();
        if term.contains('*') {
            self.current.use_pipeline = false;
        }
        self.current.term = QueryTerm::Text(term);

        self.after_term()
    }

    /// Dispatch after a completed term: modifiers extend the current
    /// clause, anything else commits it and starts the next one.
    fn after_term(&mut self) -> Result<Option<State>> {
        let Some(next) = self.peek() else {
            self.next_clause();
            return Ok(None);
        };

        match next.kind {
            LexemeKind::Term => {
                self.next_clause();
                Ok(Some(State::Term))
            }
            LexemeKind::Field => {
                self.next_clause();
                Ok(Some(State::Field))
            }
            LexemeKind::Presence => {
                self.next_clause();
                Ok(Some(State::Presence))
            }
            LexemeKind::RangeStart => {
                self.next_clause();
                Ok(Some(State::RangeStart))
            }
            LexemeKind::EditDistance => Ok(Some(State::EditDistance)),
            LexemeKind::Boost => Ok(Some(State::Boost)),
            _ => Err(Error::query_parse(
                format!("unexpected lexeme '{:?}'", next.kind),
                next.start,
                next.end,
            )),
        }
    }

    fn parse_edit_distance(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();

        let edit_distance = lexeme.text.parse::<u32>().map_err(|_| {
            Error::query_parse("edit distance must be numeric", lexeme.start, lexeme.end)
        })?;
        self.current.edit_distance = edit_distance;

        self.after_term()
    }

    fn parse_boost(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();

        let boost = lexeme
            .text
            .parse::<u32>()
            .map_err(|_| Error::query_parse("boost must be numeric", lexeme.start, lexeme.end))?;
        self.current.boost = f64::from(boost);

        self.after_term()
    }

    fn parse_bound(lexeme: &Lexeme) -> Result<Bound> {
        if lexeme.text == "*" {
            return Ok(Bound::Open);
        }

        lexeme
            .text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Bound::Value)
            .ok_or_else(|| {
                Error::query_parse(
                    format!("range endpoint must be numeric or '*', found '{}'", lexeme.text),
                    lexeme.start,
                    lexeme.end,
                )
            })
    }

    fn parse_range_start(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        self.pending_range_start = Some(Self::parse_bound(&lexeme)?);

        let end = self.end_offset();
        match self.peek() {
            Some(next) if next.kind == LexemeKind::RangeEnd => Ok(Some(State::RangeEnd)),
            Some(next) => Err(Error::query_parse(
                format!("expecting range end, found '{:?}'", next.kind),
                next.start,
                next.end,
            )),
            None => Err(Error::query_parse(
                "expecting range end, found nothing",
                end,
                end,
            )),
        }
    }

    fn parse_range_end(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        let end = Self::parse_bound(&lexeme)?;

        let start = self.pending_range_start.take().ok_or_else(|| {
            Error::query_parse("range end without a start", lexeme.start, lexeme.end)
        })?;
        self.current.term = QueryTerm::Range { start, end };

        self.after_term()
    }

    fn parse_comparator(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();

        let op = ComparatorOp::from_str(&lexeme.text).ok_or_else(|| {
            Error::query_parse(
                format!("unrecognised comparator '{}'", lexeme.text),
                lexeme.start,
                lexeme.end,
            )
        })?;
        self.pending_op = Some(op);

        let end = self.end_offset();
        match self.peek() {
            Some(next) if next.kind == LexemeKind::Comparand => Ok(Some(State::Comparand)),
            Some(next) => Err(Error::query_parse(
                format!("expecting number, found '{:?}'", next.kind),
                next.start,
                next.end,
            )),
            None => Err(Error::query_parse(
                "expecting number, found nothing",
                end,
                end,
            )),
        }
    }

    fn parse_comparand(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();

        let comparand = lexeme
            .text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                Error::query_parse(
                    format!("comparand must be numeric, found '{}'", lexeme.text),
                    lexeme.start,
                    lexeme.end,
                )
            })?;

        let op = self.pending_op.take().ok_or_else(|| {
            Error::query_parse("comparand without a comparator", lexeme.start, lexeme.end)
        })?;
        self.current.term = QueryTerm::Comparator { op, comparand };

        self.after_term()
    }
}
