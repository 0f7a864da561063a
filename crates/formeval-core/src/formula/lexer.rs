//! Formula tokenizer.

use std::fmt;

use chumsky::prelude::*;

use crate::error::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Dot,
    Comma,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Question,
    Colon,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    And,
    Or,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::Number(n) => return write!(f, "{n}"),
            Token::Str(s) => return write!(f, "{s:?}"),
            Token::Ident(name) => name,
            Token::Dot => ".",
            Token::Comma => ",",
            Token::ParenOpen => "(",
            Token::ParenClose => ")",
            Token::BracketOpen => "[",
            Token::BracketClose => "]",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Bang => "!",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Less => "<",
            Token::LessEq => "<=",
            Token::Greater => ">",
            Token::GreaterEq => ">=",
            Token::Eq => "==",
            Token::NotEq => "!=",
            Token::StrictEq => "===",
            Token::StrictNotEq => "!==",
            Token::And => "&&",
            Token::Or => "||",
        };
        f.write_str(s)
    }
}

/// A token and the source bytes it covers.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub span: SimpleSpan,
}

/// Characters that no token accepts are consumed one at a time and reported
/// as errors, so the token stream always covers the whole source.
pub(crate) fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<Spanned>, extra::Err<Rich<'a, char>>> {
    let exponent = one_of("eE")
        .then(one_of("+-").or_not())
        .then(text::digits(10));

    let number = choice((
        text::digits(10)
            .then(just('.').then(text::digits(10)).or_not())
            .ignored(),
        just('.').then(text::digits(10)).ignored(),
    ))
    .then(exponent.or_not())
    .to_slice()
    .from_str()
    .unwrapped()
    .map(Token::Number);

    let escape = just('\\').ignore_then(any().map(|c| match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }));

    let single_quoted = just('\'')
        .ignore_then(
            none_of("'\\")
                .or(escape.clone())
                .repeated()
                .collect::<String>(),
        )
        .then(just('\'').or_not());

    let double_quoted = just('"')
        .ignore_then(none_of("\"\\").or(escape).repeated().collect::<String>())
        .then(just('"').or_not());

    let string = single_quoted
        .or(double_quoted)
        .validate(|(text, closing), extra, emitter| {
            if closing.is_none() {
                emitter.emit(Rich::custom(extra.span(), "unterminated string"));
            }
            Token::Str(text)
        });

    let identifier = any()
        .filter(|c: &char| c.is_alphabetic() || *c == '_' || *c == '$')
        .then(
            any()
                .filter(|c: &char| c.is_alphanumeric() || *c == '_' || *c == '$')
                .repeated(),
        )
        .to_slice()
        .map(|name: &str| Token::Ident(name.to_string()));

    let comparator = choice((
        just("===").to(Token::StrictEq),
        just("!==").to(Token::StrictNotEq),
        just("==").to(Token::Eq),
        just("!=").to(Token::NotEq),
        just("<=").to(Token::LessEq),
        just(">=").to(Token::GreaterEq),
        just('<').to(Token::Less),
        just('>').to(Token::Greater),
    ));

    let logic = choice((
        just("&&").to(Token::And),
        just("||").to(Token::Or),
        just('!').to(Token::Bang),
    ));

    let arithmetic = choice((
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('%').to(Token::Percent),
    ));

    let punctuation = choice((
        just('(').to(Token::ParenOpen),
        just(')').to(Token::ParenClose),
        just('[').to(Token::BracketOpen),
        just(']').to(Token::BracketClose),
        just(',').to(Token::Comma),
        just('.').to(Token::Dot),
        just('?').to(Token::Question),
        just(':').to(Token::Colon),
    ));

    let token = choice((
        number,
        string,
        identifier,
        comparator,
        logic,
        arithmetic,
        punctuation,
    ))
    .map_with(|token, extra| {
        Some(Spanned {
            token,
            span: extra.span(),
        })
    });

    let stray = any().validate(|_, extra, emitter| {
        emitter.emit(Rich::custom(extra.span(), "unexpected character"));
        None::<Spanned>
    });

    token
        .or(stray)
        .padded()
        .repeated()
        .collect::<Vec<_>>()
        .padded()
        .map(|tokens| tokens.into_iter().flatten().collect())
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, FormulaError> {
    let (tokens, errors) = lexer().parse(source).into_output_errors();
    if let Some(err) = errors.first() {
        return Err(lex_error(source, err.span().start));
    }
    Ok(tokens.unwrap_or_default())
}

/// Lexer errors only start on an unclosed quote or on a stray character.
fn lex_error(source: &str, offset: usize) -> FormulaError {
    match source.get(offset..).and_then(|rest| rest.chars().next()) {
        Some('\'' | '"') => FormulaError::UnterminatedString(offset),
        Some(ch) => FormulaError::UnexpectedChar { ch, offset },
        None => FormulaError::UnexpectedEnd("a token".to_string()),
    }
}
