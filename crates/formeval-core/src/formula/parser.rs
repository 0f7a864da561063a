//! Token stream to expression tree.
//!
//! Precedence, loosest first: `?:`, `||`, `&&`, equality, comparison,
//! additive, multiplicative, unary. Binary and unary operators go through a
//! pratt parser; the conditional wraps it and recurses on its branches.
//!
//! Semantic failures (unknown identifiers, helpers, arity, nesting) travel
//! inside the parser output, so a syntactically valid formula always
//! reports the leftmost of them.

use chumsky::{input::ValueInput, pratt::*, prelude::*};

use crate::error::FormulaError;
use crate::model::Value;

use super::lexer::{Spanned, Token};

/// Deepest nesting accepted for brackets, prefix operators, conditionals and
/// operator chains.
pub(crate) const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    /// `values.key` or `values["key"]`.
    Field(String),
    Call {
        helper: Helper,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Helper {
    Age,
    Num,
}

impl Helper {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "age" => Some(Helper::Age),
            "num" => Some(Helper::Num),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Helper::Age => "age",
            Helper::Num => "num",
        }
    }

    fn arity(self) -> usize {
        1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
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

/// An expression and the height of its tree.
#[derive(Debug)]
struct Parsed {
    expr: Expr,
    depth: usize,
}

type Node = Result<Parsed, FormulaError>;

pub(crate) fn parse(tokens: &[Spanned], source_len: usize) -> Result<Expr, FormulaError> {
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    check_nesting(tokens)?;

    let eoi = SimpleSpan::from(source_len..source_len);
    let (node, errors) = parser()
        .parse(tokens.map(eoi, |Spanned { token, span }| (token, span)))
        .into_output_errors();
    if let Some(err) = errors.first() {
        return Err(syntax_error(err));
    }
    match node {
        Some(node) => node.map(|parsed| parsed.expr),
        None => Err(FormulaError::Empty),
    }
}

fn parser<'a, I>() -> impl Parser<'a, I, Node, extra::Err<Rich<'a, Token>>>
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expression| {
        let identifier = select! { Token::Ident(name) => name };
        let keyword = |word: &'static str| select! { Token::Ident(name) if name == word => () };

        let literal = select! {
            Token::Number(n) => Value::Number(n),
            Token::Str(s) => Value::Text(s),
            Token::Ident(name) if name == "true" => Value::Bool(true),
            Token::Ident(name) if name == "false" => Value::Bool(false),
            Token::Ident(name) if name == "null" || name == "undefined" => Value::Null,
        }
        .map(|value| leaf(Expr::Literal(value)));

        let field = keyword("values")
            .ignore_then(choice((
                just(Token::Dot).ignore_then(identifier.clone()),
                select! { Token::Str(key) => key }
                    .delimited_by(just(Token::BracketOpen), just(Token::BracketClose)),
            )))
            .map(|key| leaf(Expr::Field(key)));

        let arguments = expression
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let helper_call = keyword("helpers")
            .ignore_then(just(Token::Dot))
            .ignore_then(identifier.clone())
            .then(arguments.clone())
            .map(|(name, args)| call(name, args, true));

        let bare_call = identifier
            .clone()
            .then(arguments)
            .map(|(name, args)| call(name, args, false));

        let unknown = select! {
            Token::Ident(name) if name != "values" && name != "helpers" => name
        }
        .map(|name| Err(FormulaError::UnknownIdentifier(name)));

        let nested = expression
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let equality = select! {
            Token::Eq => BinaryOp::Eq,
            Token::NotEq => BinaryOp::NotEq,
            Token::StrictEq => BinaryOp::StrictEq,
            Token::StrictNotEq => BinaryOp::StrictNotEq,
        };
        let comparison = select! {
            Token::Less => BinaryOp::Less,
            Token::LessEq => BinaryOp::LessEq,
            Token::Greater => BinaryOp::Greater,
            Token::GreaterEq => BinaryOp::GreaterEq,
        };
        let additive = select! {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
        };
        let multiplicative = select! {
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Rem,
        };
        let prefix_op = select! {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            Token::Bang => UnaryOp::Not,
        };

        let operation = choice((literal, field, helper_call, bare_call, unknown, nested)).pratt((
            infix(left(1), just(Token::Or), |l, _, r, _| binary(BinaryOp::Or, l, r)),
            infix(left(2), just(Token::And), |l, _, r, _| binary(BinaryOp::And, l, r)),
            infix(left(3), equality, |l, op, r, _| binary(op, l, r)),
            infix(left(4), comparison, |l, op, r, _| binary(op, l, r)),
            infix(left(5), additive, |l, op, r, _| binary(op, l, r)),
            infix(left(6), multiplicative, |l, op, r, _| binary(op, l, r)),
            prefix(7, prefix_op, |op, operand, _| unary(op, operand)),
        ));

        operation
            .then(
                just(Token::Question)
                    .ignore_then(expression.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expression)
                    .or_not(),
            )
            .map(|(cond, branches)| match branches {
                Some((then, otherwise)) => conditional(cond, then, otherwise),
                None => cond,
            })
    })
}

fn leaf(expr: Expr) -> Node {
    Ok(Parsed { expr, depth: 1 })
}

fn nest(expr: Expr, child_depth: usize) -> Node {
    let depth = child_depth + 1;
    if depth > MAX_DEPTH {
        return Err(FormulaError::TooDeep(MAX_DEPTH));
    }
    Ok(Parsed { expr, depth })
}

fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
    let (lhs, rhs) = (lhs?, rhs?);
    nest(
        Expr::Binary {
            op,
            lhs: Box::new(lhs.expr),
            rhs: Box::new(rhs.expr),
        },
        lhs.depth.max(rhs.depth),
    )
}

fn unary(op: UnaryOp, operand: Node) -> Node {
    let operand = operand?;
    nest(
        Expr::Unary {
            op,
            operand: Box::new(operand.expr),
        },
        operand.depth,
    )
}

fn conditional(cond: Node, then: Node, otherwise: Node) -> Node {
    let (cond, then, otherwise) = (cond?, then?, otherwise?);
    let depth = cond.depth.max(then.depth).max(otherwise.depth);
    nest(
        Expr::Conditional {
            cond: Box::new(cond.expr),
            then: Box::new(then.expr),
            otherwise: Box::new(otherwise.expr),
        },
        depth,
    )
}

/// `helpers.name(..)` may only name a helper; a bare `name(..)` that is not
/// one is just an unknown identifier.
fn call(name: String, args: Vec<Node>, prefixed: bool) -> Node {
    let helper = match Helper::lookup(&name) {
        Some(helper) => helper,
        None if prefixed => return Err(FormulaError::UnknownHelper(name)),
        None => return Err(FormulaError::UnknownIdentifier(name)),
    };
    let args = args.into_iter().collect::<Result<Vec<_>, _>>()?;
    if args.len() != helper.arity() {
        return Err(FormulaError::Arity {
            name: helper.name(),
            expected: helper.arity(),
            got: args.len(),
        });
    }
    let depth = args.iter().map(|arg| arg.depth).max().unwrap_or(0);
    nest(
        Expr::Call {
            helper,
            args: args.into_iter().map(|arg| arg.expr).collect(),
        },
        depth,
    )
}

/// Rejects input whose bracket, prefix or conditional nesting would recurse
/// past [`MAX_DEPTH`] while parsing. Operator chains are bounded afterwards by
/// the tree height check in `nest`.
fn check_nesting(tokens: &[Spanned]) -> Result<(), FormulaError> {
    let mut enclosing = Vec::new();
    let mut depth = 0usize;
    let mut prefixes = 0usize;
    for spanned in tokens {
        match spanned.token {
            Token::ParenOpen | Token::BracketOpen => {
                enclosing.push(depth);
                depth += prefixes + 1;
                prefixes = 0;
            }
            Token::ParenClose | Token::BracketClose => {
                depth = enclosing.pop().unwrap_or(0);
                prefixes = 0;
            }
            Token::Question => depth += 1,
            Token::Minus | Token::Plus | Token::Bang => prefixes += 1,
            _ => prefixes = 0,
        }
        if depth + prefixes > MAX_DEPTH {
            return Err(FormulaError::TooDeep(MAX_DEPTH));
        }
    }
    Ok(())
}

fn syntax_error(err: &Rich<'_, Token>) -> FormulaError {
    let mut expected: Vec<String> = err.expected().map(ToString::to_string).collect();
    expected.sort();
    expected.dedup();
    let expected = if expected.is_empty() {
        "a value".to_string()
    } else {
        expected.join(" or ")
    };
    match err.found() {
        Some(token) => FormulaError::UnexpectedToken {
            found: token.to_string(),
            offset: err.span().start,
            expected,
        },
        None => FormulaError::UnexpectedEnd(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_str(source: &str) -> Result<Expr, FormulaError> {
        let tokens = tokenize(source)?;
        parse(&tokens, source.len())
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_str("1 + 2 * 3").unwrap();
        let Expr::Binary { op, rhs, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let expr = parse_str("10 - 4 - 3").unwrap();
        let Expr::Binary { op, lhs, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Sub);
        assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Sub, .. }));
    }

    #[test]
    fn logic_binds_looser_than_comparison() {
        let expr = parse_str("values.a > 1 && values.b < 2 || !values.c").unwrap();
        let Expr::Binary { op, lhs, rhs } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::And, .. }));
        assert!(matches!(*rhs, Expr::Unary { op: UnaryOp::Not, .. }));
    }

    #[test]
    fn field_access_forms() {
        assert_eq!(parse_str("values.dob").unwrap(), Expr::Field("dob".into()));
        assert_eq!(
            parse_str("values['first name']").unwrap(),
            Expr::Field("first name".into())
        );
    }

    #[test]
    fn helper_calls_with_and_without_prefix() {
        let prefixed = parse_str("helpers.num(values.a)").unwrap();
        let bare = parse_str("num(values.a)").unwrap();
        assert_eq!(prefixed, bare);
        assert!(matches!(
            parse_str("helpers.eval('x')"),
            Err(FormulaError::UnknownHelper(name)) if name == "eval"
        ));
        assert!(matches!(
            parse_str("eval('x')"),
            Err(FormulaError::UnknownIdentifier(name)) if name == "eval"
        ));
        assert!(matches!(
            parse_str("helpers.age()"),
            Err(FormulaError::Arity { name: "age", got: 0, .. })
        ));
    }

    #[test]
    fn rejects_incomplete_and_trailing_input() {
        assert!(matches!(
            parse_str("1/0/"),
            Err(FormulaError::UnexpectedEnd(_))
        ));
        assert!(matches!(
            parse_str("1 2"),
            Err(FormulaError::UnexpectedToken { offset: 2, .. })
        ));
        assert!(matches!(parse_str("   "), Err(FormulaError::Empty)));
        assert!(matches!(
            parse_str("values"),
            Err(FormulaError::UnexpectedEnd(_))
        ));
        assert!(matches!(
            parse_str("(1 + 2"),
            Err(FormulaError::UnexpectedEnd(_))
        ));
    }

    #[test]
    fn rejects_arbitrary_identifiers() {
        assert!(matches!(
            parse_str("window"),
            Err(FormulaError::UnknownIdentifier(name)) if name == "window"
        ));
        assert!(matches!(
            parse_str("values.a + process"),
            Err(FormulaError::UnknownIdentifier(name)) if name == "process"
        ));
        assert!(matches!(
            parse_str("window.alert(1)"),
            Err(FormulaError::UnexpectedToken { offset: 6, .. })
        ));
        assert!(matches!(
            parse_str("values.constructor.constructor('x')"),
            Err(FormulaError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn conditional_is_right_associative() {
        let expr = parse_str("values.a ? 1 : values.b ? 2 : 3").unwrap();
        let Expr::Conditional { otherwise, .. } = expr else {
            panic!("expected conditional");
        };
        assert!(matches!(*otherwise, Expr::Conditional { .. }));
    }

    #[test]
    fn nesting_within_the_limit_parses() {
        let depth = MAX_DEPTH / 2;
        let source = format!("{}values.a{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_str(&source).unwrap(), Expr::Field("a".into()));
        assert!(parse_str(&format!("{}1", "-".repeat(depth))).is_ok());
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let too_deep = MAX_DEPTH + 1;
        for source in [
            "(".repeat(10_000),
            format!("{}1{}", "(".repeat(too_deep), ")".repeat(too_deep)),
            format!("{}1", "!".repeat(too_deep)),
            format!("{}1", "- ".repeat(10_000)),
            "values.a ? 1 : ".repeat(too_deep) + "0",
            format!("num({}1{})", "num(".repeat(too_deep), ")".repeat(too_deep)),
        ] {
            assert_eq!(
                parse_str(&source),
                Err(FormulaError::TooDeep(MAX_DEPTH)),
                "{}",
                &source[..source.len().min(40)]
            );
        }
    }

    #[test]
    fn long_operator_chains_are_bounded() {
        let within = vec!["1"; MAX_DEPTH].join(" + ");
        assert!(parse_str(&within).is_ok());
        let beyond = vec!["1"; 10_000].join(" + ");
        assert_eq!(parse_str(&beyond), Err(FormulaError::TooDeep(MAX_DEPTH)));
    }
}
