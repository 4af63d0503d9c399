//! Conditional directive expression evaluation.
//!
//! By the time an `#if`/`#elif` expression reaches this module, `defined` has been resolved and every identifier
//! has been macro-expanded or replaced by `0`, so the expression consists of integers, operators and parentheses.
//! It is evaluated with the shunting-yard algorithm: operands go onto one stack, operators onto another, and an
//! operator is applied as soon as an operator of lower or equal precedence follows it.

use crate::{error::EvalError, lexer::Token, literal, pool::StringPool};

/// A binary operator of the conditional expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
	Or,
	And,
	BitOr,
	BitXor,
	BitAnd,
	Eq,
	NotEq,
	Lt,
	Gt,
	Le,
	Ge,
	LShift,
	RShift,
	Add,
	Sub,
	Mul,
	Div,
	Rem,
}

impl BinOp {
	fn from_token(token: &Token) -> Option<Self> {
		Some(match token {
			Token::Or => BinOp::Or,
			Token::And => BinOp::And,
			Token::BitOr => BinOp::BitOr,
			Token::BitXor => BinOp::BitXor,
			Token::BitAnd => BinOp::BitAnd,
			Token::Equal => BinOp::Eq,
			Token::NotEqual => BinOp::NotEq,
			Token::Less => BinOp::Lt,
			Token::Greater => BinOp::Gt,
			Token::LessEqual => BinOp::Le,
			Token::GreaterEqual => BinOp::Ge,
			Token::LShift => BinOp::LShift,
			Token::RShift => BinOp::RShift,
			Token::Plus => BinOp::Add,
			Token::Minus => BinOp::Sub,
			Token::Star => BinOp::Mul,
			Token::Slash => BinOp::Div,
			Token::Modulo => BinOp::Rem,
			_ => return None,
		})
	}

	/// Binding power; higher binds tighter.
	fn precedence(&self) -> u8 {
		match self {
			BinOp::Or => 1,
			BinOp::And => 2,
			BinOp::BitOr => 3,
			BinOp::BitXor => 4,
			BinOp::BitAnd => 5,
			BinOp::Eq | BinOp::NotEq => 6,
			BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 7,
			BinOp::LShift | BinOp::RShift => 8,
			BinOp::Add | BinOp::Sub => 9,
			BinOp::Mul | BinOp::Div | BinOp::Rem => 10,
		}
	}

	fn apply(&self, l: i64, r: i64) -> Result<i64, EvalError> {
		Ok(match self {
			BinOp::Or => (l != 0 || r != 0) as i64,
			BinOp::And => (l != 0 && r != 0) as i64,
			BinOp::BitOr => l | r,
			BinOp::BitXor => l ^ r,
			BinOp::BitAnd => l & r,
			BinOp::Eq => (l == r) as i64,
			BinOp::NotEq => (l != r) as i64,
			BinOp::Lt => (l < r) as i64,
			BinOp::Gt => (l > r) as i64,
			BinOp::Le => (l <= r) as i64,
			BinOp::Ge => (l >= r) as i64,
			BinOp::LShift => l.wrapping_shl(r as u32),
			BinOp::RShift => l.wrapping_shr(r as u32),
			BinOp::Add => l.wrapping_add(r),
			BinOp::Sub => l.wrapping_sub(r),
			BinOp::Mul => l.wrapping_mul(r),
			BinOp::Div => {
				if r == 0 {
					return Err(EvalError::DivisionByZero);
				}
				l.wrapping_div(r)
			}
			BinOp::Rem => {
				if r == 0 {
					return Err(EvalError::DivisionByZero);
				}
				l.wrapping_rem(r)
			}
		})
	}
}

/// A prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreOp {
	Plus,
	Neg,
	Not,
	Flip,
}

impl PreOp {
	fn from_token(token: &Token) -> Option<Self> {
		Some(match token {
			Token::Plus => PreOp::Plus,
			Token::Minus => PreOp::Neg,
			Token::Not => PreOp::Not,
			Token::BitNot => PreOp::Flip,
			_ => return None,
		})
	}

	fn apply(&self, v: i64) -> i64 {
		match self {
			PreOp::Plus => v,
			PreOp::Neg => v.wrapping_neg(),
			PreOp::Not => (v == 0) as i64,
			PreOp::Flip => !v,
		}
	}
}

/// An entry of the operator stack.
#[derive(Debug, Clone, Copy)]
enum Op {
	Bin(BinOp),
	Pre(PreOp),
	/// An open parenthesis; acts as a barrier.
	Paren,
}

/// Evaluates a fully-expanded conditional expression.
///
/// Whitespace tokens are ignored. The result is non-zero if the condition holds.
pub(crate) fn evaluate(
	pool: &StringPool,
	tokens: &[Token],
) -> Result<i64, EvalError> {
	let mut operands: Vec<i64> = Vec::new();
	let mut operators: Vec<Op> = Vec::new();
	// Whether the next token must start an operand (a number, a prefix operator or `(`).
	let mut expect_operand = true;

	for token in tokens {
		match token {
			Token::Whitespace => {}
			Token::Uint(symbol) => {
				if !expect_operand {
					return Err(EvalError::ExpectedOperator);
				}
				let text = pool.resolve(*symbol);
				let value = literal::parse_integer(text)
					.ok_or_else(|| EvalError::InvalidInteger(text.to_owned()))?;
				operands.push(value);
				expect_operand = false;
			}
			Token::Float(symbol) => {
				return Err(EvalError::InvalidInteger(
					pool.resolve(*symbol).to_owned(),
				));
			}
			Token::LParen => {
				if !expect_operand {
					return Err(EvalError::ExpectedOperator);
				}
				operators.push(Op::Paren);
			}
			Token::RParen => {
				if expect_operand {
					return Err(EvalError::ExpectedOperand);
				}
				loop {
					match operators.pop() {
						Some(Op::Paren) => break,
						Some(op) => reduce(op, &mut operands)?,
						None => return Err(EvalError::UnbalancedParens),
					}
				}
			}
			t if expect_operand => match PreOp::from_token(t) {
				Some(op) => operators.push(Op::Pre(op)),
				None if BinOp::from_token(t).is_some() => {
					return Err(EvalError::ExpectedOperand)
				}
				None => return Err(EvalError::InvalidToken),
			},
			t => {
				let op = match BinOp::from_token(t) {
					Some(op) => op,
					None => return Err(EvalError::InvalidToken),
				};
				// All binary operators are left-associative, and prefix operators bind tighter than any of them.
				while let Some(top) = operators.last().copied() {
					let should_reduce = match top {
						Op::Pre(_) => true,
						Op::Bin(prev) => prev.precedence() >= op.precedence(),
						Op::Paren => false,
					};
					if !should_reduce {
						break;
					}
					operators.pop();
					reduce(top, &mut operands)?;
				}
				operators.push(Op::Bin(op));
				expect_operand = true;
			}
		}
	}

	if expect_operand {
		return Err(EvalError::ExpectedOperand);
	}
	while let Some(op) = operators.pop() {
		if let Op::Paren = op {
			return Err(EvalError::UnbalancedParens);
		}
		reduce(op, &mut operands)?;
	}

	match (operands.pop(), operands.is_empty()) {
		(Some(value), true) => Ok(value),
		_ => Err(EvalError::ExpectedOperator),
	}
}

/// Applies an operator to the top of the operand stack.
fn reduce(op: Op, operands: &mut Vec<i64>) -> Result<(), EvalError> {
	match op {
		Op::Pre(op) => {
			let v = operands.pop().ok_or(EvalError::ExpectedOperand)?;
			operands.push(op.apply(v));
		}
		Op::Bin(op) => {
			let r = operands.pop().ok_or(EvalError::ExpectedOperand)?;
			let l = operands.pop().ok_or(EvalError::ExpectedOperand)?;
			operands.push(op.apply(l, r)?);
		}
		Op::Paren => return Err(EvalError::UnbalancedParens),
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	//! Behaviour tests for the evaluator on its own; `defined` and macro expansion are tested through the
	//! directive processor.

	use super::evaluate;
	use crate::{error::EvalError, lexer::tokenize, pool::StringPool};

	macro_rules! assert_eval {
		($src:expr, $result:expr) => {
			let mut pool = StringPool::new();
			let mut tokens = tokenize(&mut pool, $src);
			tokens.pop();
			assert_eq!(evaluate(&pool, &tokens), $result, "{}", $src);
		};
	}

	#[test]
	fn single_value() {
		assert_eval!("0", Ok(0));
		assert_eval!("1", Ok(1));
		assert_eval!("0x10", Ok(16));
		assert_eval!("010", Ok(8));
		assert_eval!("(5)", Ok(5));
		assert_eval!("((((7))))", Ok(7));
	}

	#[test]
	fn prefix() {
		assert_eval!("-5", Ok(-5));
		assert_eval!("+5", Ok(5));
		assert_eval!("!0", Ok(1));
		assert_eval!("!7", Ok(0));
		assert_eval!("~0", Ok(-1));
		assert_eval!("- -5", Ok(5));
		assert_eval!("!!3", Ok(1));
		assert_eval!("-(2 + 3)", Ok(-5));
	}

	#[test]
	fn binary() {
		assert_eval!("1 + 1 == 2", Ok(1));
		assert_eval!("2 + 3 * 4", Ok(14));
		assert_eval!("(2 + 3) * 4", Ok(20));
		assert_eval!("10 - 4 - 3", Ok(3));
		assert_eval!("100 / 10 / 5", Ok(2));
		assert_eval!("7 % 4", Ok(3));
		assert_eval!("1 << 4 >> 2", Ok(4));
		assert_eval!("1 < 2 && 3 > 2", Ok(1));
		assert_eval!("0 || 0", Ok(0));
		assert_eval!("2 <= 2 && 3 >= 4", Ok(0));
		assert_eval!("6 & 3 | 8 ^ 1", Ok(11));
		assert_eval!("1 != 2", Ok(1));
		assert_eval!("-2 * -3", Ok(6));
		assert_eval!("1 + 2 == 3 && 4 == 4 || 0", Ok(1));
	}

	#[test]
	fn errors() {
		assert_eval!("1 / 0", Err(EvalError::DivisionByZero));
		assert_eval!("1 % (2 - 2)", Err(EvalError::DivisionByZero));
		assert_eval!("", Err(EvalError::ExpectedOperand));
		assert_eval!("1 +", Err(EvalError::ExpectedOperand));
		assert_eval!("* 1", Err(EvalError::ExpectedOperand));
		assert_eval!("1 2", Err(EvalError::ExpectedOperator));
		assert_eval!("(1", Err(EvalError::UnbalancedParens));
		assert_eval!("1)", Err(EvalError::UnbalancedParens));
		assert_eval!("()", Err(EvalError::ExpectedOperand));
		assert_eval!("1.5", Err(EvalError::InvalidInteger("1.5".into())));
		assert_eval!("09", Err(EvalError::InvalidInteger("09".into())));
		assert_eval!("1 ; 2", Err(EvalError::InvalidToken));
	}
}
