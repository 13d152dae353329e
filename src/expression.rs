/// The scalar part of a conditional expression node. Operands are the
/// node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Expression {
    pub operator: u32,
    pub integer_value: i32,
}

impl Expression {
    #[inline]
    pub fn arity(&self) -> usize {
        operator_arity(self.operator)
    }
}

/// Number of operand sub-expressions that follow an expression with the
/// given operator code.
///
/// Literal and variable operators are leaves, comparisons and the binary
/// logical combinators take two operands, and everything else (the function
/// style operators, logical not, and codes with no known meaning) takes one.
///
/// ```rust
/// use sisinfo::operator_arity;
/// assert_eq!(operator_arity(14), 0);
/// assert_eq!(operator_arity(10), 1);
/// assert_eq!(operator_arity(9), 1);
/// assert_eq!(operator_arity(1), 2);
/// ```
#[inline]
pub const fn operator_arity(operator: u32) -> usize {
    match operator {
        14..=16 => 0,
        1..=8 | 11 | 12 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(14, 0)]
    #[case(15, 0)]
    #[case(16, 0)]
    #[case(10, 1)]
    #[case(13, 1)]
    #[case(1, 2)]
    #[case(2, 2)]
    #[case(6, 2)]
    #[case(7, 2)]
    #[case(8, 2)]
    #[case(9, 1)]
    #[case(0, 1)]
    #[case(17, 1)]
    #[case(u32::MAX, 1)]
    #[case(11, 2)]
    #[case(12, 2)]
    fn test_operator_arity(#[case] operator: u32, #[case] expected: usize) {
        let expr = Expression {
            operator,
            integer_value: 0,
        };
        assert_eq!(expr.arity(), expected);
    }
}
