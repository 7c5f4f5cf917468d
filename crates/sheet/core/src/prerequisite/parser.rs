//! Recursive-descent parser producing the expression tree.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr       := and ("or" and)*
//! and        := not ("and" not)*
//! not        := "not" not | comparison
//! comparison := primary (op primary)*        // chained: a < b < c
//! primary    := number | trait | trait.specialty | powerstat | "(" expr ")"
//! ```

use crate::prerequisite::PrerequisiteError;
use crate::prerequisite::lexer::{CompareOp, Token};
use crate::state::TraitType;

/// Parsed prerequisite expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Literal(i32),
    Trait {
        trait_type: Option<TraitType>,
        name: String,
    },
    Specialty {
        trait_type: Option<TraitType>,
        name: String,
        specialty: String,
    },
    Powerstat,
    /// `first op1 e1 op2 e2 ...`, true when every adjacent pair holds.
    Compare {
        first: Box<Expr>,
        rest: Vec<(CompareOp, Expr)>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

/// Parses a token stream. The whole stream must form one expression.
pub fn parse(tokens: &[Token]) -> Result<Expr, PrerequisiteError> {
    if tokens.is_empty() {
        return Err(PrerequisiteError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(PrerequisiteError::UnexpectedToken {
            found: token.to_string(),
        }),
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<&'t Token, PrerequisiteError> {
        let token = self.peek().ok_or(PrerequisiteError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<Expr, PrerequisiteError> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, PrerequisiteError> {
        let mut left = self.not_expr()?;
        while self.eat(&Token::And) {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, PrerequisiteError> {
        if self.eat(&Token::Not) {
            let inner = self.not_expr()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, PrerequisiteError> {
        let first = self.primary()?;
        let mut rest = Vec::new();
        while let Some(Token::Compare(op)) = self.peek() {
            self.pos += 1;
            rest.push((*op, self.primary()?));
        }

        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn primary(&mut self) -> Result<Expr, PrerequisiteError> {
        match self.next()? {
            Token::Number(n) => Ok(Expr::Literal(*n)),
            Token::Trait { trait_type, name } => Ok(Expr::Trait {
                trait_type: *trait_type,
                name: name.clone(),
            }),
            Token::Specialty {
                trait_type,
                name,
                specialty,
            } => Ok(Expr::Specialty {
                trait_type: *trait_type,
                name: name.clone(),
                specialty: specialty.clone(),
            }),
            Token::Powerstat => Ok(Expr::Powerstat),
            Token::LParen => {
                let inner = self.or_expr()?;
                match self.next()? {
                    Token::RParen => Ok(inner),
                    other => Err(PrerequisiteError::UnexpectedToken {
                        found: other.to_string(),
                    }),
                }
            }
            other => Err(PrerequisiteError::UnexpectedToken {
                found: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wits() -> Token {
        Token::Trait {
            trait_type: None,
            name: "Wits".into(),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        // 1 or 0 and 0  ==  1 or (0 and 0)
        let tokens = [
            Token::Number(1),
            Token::Or,
            Token::Number(0),
            Token::And,
            Token::Number(0),
        ];
        let expr = parse(&tokens).unwrap();
        assert!(matches!(expr, Expr::Or(_, ref right) if matches!(**right, Expr::And(_, _))));
    }

    #[test]
    fn comparisons_chain() {
        let tokens = [
            Token::Number(1),
            Token::Compare(CompareOp::Less),
            wits(),
            Token::Compare(CompareOp::Less),
            Token::Number(4),
        ];
        let Expr::Compare { rest, .. } = parse(&tokens).unwrap() else {
            panic!("expected comparison");
        };
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn dangling_operator_is_rejected() {
        let tokens = [wits(), Token::Compare(CompareOp::Greater)];
        assert_eq!(parse(&tokens), Err(PrerequisiteError::UnexpectedEnd));
    }

    #[test]
    fn unbalanced_parentheses_are_rejected() {
        let open = [Token::LParen, wits()];
        assert_eq!(parse(&open), Err(PrerequisiteError::UnexpectedEnd));

        let close = [wits(), Token::RParen];
        assert!(matches!(
            parse(&close),
            Err(PrerequisiteError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(parse(&[]), Err(PrerequisiteError::Empty));
    }
}
