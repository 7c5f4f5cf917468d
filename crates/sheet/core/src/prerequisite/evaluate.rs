//! Expression evaluation against live trait values.

use crate::prerequisite::{Expr, PrerequisiteError, TraitLookup};

/// Evaluates `expr` to an integer.
///
/// Comparisons yield 1 or 0. `and`/`or` short-circuit and return the operand
/// that decided the result, so a bare trait reference is true when rated.
pub fn evaluate(
    expr: &Expr,
    lookup: &dyn TraitLookup,
    powerstat: i32,
) -> Result<i32, PrerequisiteError> {
    match expr {
        Expr::Literal(n) => Ok(*n),
        Expr::Trait { trait_type, name } => lookup
            .value_of(*trait_type, name)
            .ok_or_else(|| PrerequisiteError::UnresolvedTrait(name.clone())),
        Expr::Specialty {
            trait_type,
            name,
            specialty,
        } => lookup
            .has_specialty(*trait_type, name, specialty)
            .map(i32::from)
            .ok_or_else(|| PrerequisiteError::UnresolvedTrait(name.clone())),
        Expr::Powerstat => Ok(powerstat),
        Expr::Compare { first, rest } => {
            let mut left = evaluate(first, lookup, powerstat)?;
            for (op, operand) in rest {
                let right = evaluate(operand, lookup, powerstat)?;
                if !op.apply(left, right) {
                    return Ok(0);
                }
                left = right;
            }
            Ok(1)
        }
        Expr::And(left, right) => {
            let l = evaluate(left, lookup, powerstat)?;
            if l == 0 {
                Ok(l)
            } else {
                evaluate(right, lookup, powerstat)
            }
        }
        Expr::Or(left, right) => {
            let l = evaluate(left, lookup, powerstat)?;
            if l != 0 {
                Ok(l)
            } else {
                evaluate(right, lookup, powerstat)
            }
        }
        Expr::Not(inner) => Ok(i32::from(evaluate(inner, lookup, powerstat)? == 0)),
    }
}
