use crate::expression::error::ExprError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),

    LParen,
    RParen,
    Comma,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Bang,

    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    AndAnd,
    OrOr,

    Question,
    Colon,

    Eof,
}

/// Byte cursor over the source text.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + ahead).copied()
    }

    fn eat_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> usize {
        let from = self.pos;
        while self.peek().is_some_and(&mut pred) {
            self.pos += 1;
        }
        self.pos - from
    }

    fn eat_if(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        if self.peek().is_some_and(pred) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn slice(&self, start: usize) -> &'a str {
        &self.src[start..self.pos]
    }

    /// `123`, `1.5`, `.5`, with an optional `e[+-]digits` exponent.
    fn number(&mut self, start: usize) -> Result<TokenKind, ExprError> {
        self.eat_while(|b| b.is_ascii_digit());
        if self.eat_if(|b| b == b'.') {
            self.eat_while(|b| b.is_ascii_digit());
        }
        if self.peek().is_some_and(|b| b == b'e' || b == b'E') {
            let e_pos = self.pos;
            self.pos += 1;
            self.eat_if(|b| b == b'+' || b == b'-');
            if self.eat_while(|b| b.is_ascii_digit()) == 0 {
                return Err(ExprError::new(e_pos, "exponent needs digits"));
            }
        }
        self.slice(start)
            .parse()
            .map(TokenKind::Number)
            .map_err(|_| ExprError::new(start, "invalid number"))
    }

    fn operator(&mut self, start: usize) -> Result<TokenKind, ExprError> {
        let pair = (self.peek(), self.peek_at(1));
        let double = match pair {
            (Some(b'&'), Some(b'&')) => Some(TokenKind::AndAnd),
            (Some(b'|'), Some(b'|')) => Some(TokenKind::OrOr),
            (Some(b'='), Some(b'=')) => Some(TokenKind::EqEq),
            (Some(b'!'), Some(b'=')) => Some(TokenKind::Ne),
            (Some(b'<'), Some(b'=')) => Some(TokenKind::Le),
            (Some(b'>'), Some(b'=')) => Some(TokenKind::Ge),
            _ => None,
        };
        if let Some(kind) = double {
            self.pos += 2;
            return Ok(kind);
        }
        let kind = match pair.0 {
            Some(b'(') => TokenKind::LParen,
            Some(b')') => TokenKind::RParen,
            Some(b',') => TokenKind::Comma,
            Some(b'+') => TokenKind::Plus,
            Some(b'-') => TokenKind::Minus,
            Some(b'*') => TokenKind::Star,
            Some(b'/') => TokenKind::Slash,
            Some(b'%') => TokenKind::Percent,
            Some(b'!') => TokenKind::Bang,
            Some(b'<') => TokenKind::Lt,
            Some(b'>') => TokenKind::Gt,
            Some(b'?') => TokenKind::Question,
            Some(b':') => TokenKind::Colon,
            _ => {
                let ch = self.src[start..].chars().next().unwrap_or('?');
                return Err(ExprError::new(start, format!("unexpected character '{ch}'")));
            }
        };
        self.pos += 1;
        Ok(kind)
    }
}

pub(crate) fn lex(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut cur = Cursor { src: input, pos: 0 };
    let mut out = Vec::new();
    loop {
        cur.eat_while(|b| b.is_ascii_whitespace());
        let start = cur.pos;
        let Some(b) = cur.peek() else {
            break;
        };
        let kind = if b.is_ascii_digit() || (b == b'.' && cur.peek_at(1).is_some_and(|n| n.is_ascii_digit())) {
            cur.number(start)?
        } else if b.is_ascii_alphabetic() || b == b'_' {
            cur.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
            TokenKind::Ident(cur.slice(start).to_owned())
        } else {
            cur.operator(start)?
        };
        out.push(Token {
            kind,
            span: Span { start, end: cur.pos },
        });
    }
    out.push(Token {
        kind: TokenKind::Eof,
        span: Span {
            start: input.len(),
            end: input.len(),
        },
    });
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/expression/lexer.rs"]
mod tests;
