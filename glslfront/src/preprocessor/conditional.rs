//! The stack of open conditional directives.

use crate::error::DirectiveError;

/// One open `#if`/`#ifdef`/`#ifndef` chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
	/// Whether the current branch of this chain is being taken.
	active: bool,
	/// Whether any branch of this chain has been taken so far.
	taken: bool,
	/// Whether the `#else` of this chain has been seen.
	seen_else: bool,
}

/// Tracks nested conditional directives to decide which regions of the source are active.
#[derive(Debug, Clone)]
pub(crate) struct ConditionalStack {
	frames: Vec<Frame>,
	max_depth: usize,
}

impl ConditionalStack {
	pub(crate) fn new(max_depth: usize) -> Self {
		Self {
			frames: Vec::new(),
			max_depth,
		}
	}

	/// Returns whether the current region is active, i.e. every open chain is on a taken branch.
	pub(crate) fn is_active(&self) -> bool {
		self.frames.iter().all(|f| f.active)
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	pub(crate) fn depth(&self) -> usize {
		self.frames.len()
	}

	/// Opens a new chain whose first branch is `value`.
	///
	/// If the enclosing region is inactive, the chain can never become active and `value` is ignored; callers
	/// should avoid evaluating the condition in that case.
	pub(crate) fn push(&mut self, value: bool) -> Result<(), DirectiveError> {
		if self.frames.len() >= self.max_depth {
			return Err(DirectiveError::NestingTooDeep);
		}

		let frame = if self.is_active() {
			Frame {
				active: value,
				taken: value,
				seen_else: false,
			}
		} else {
			Frame {
				active: false,
				taken: true,
				seen_else: false,
			}
		};
		self.frames.push(frame);
		Ok(())
	}

	/// Checks an `#elif` is allowed, returning whether its condition needs to be evaluated.
	///
	/// The condition only matters if no earlier branch of the chain was taken.
	pub(crate) fn begin_elif(&self) -> Result<bool, DirectiveError> {
		match self.frames.last() {
			None => Err(DirectiveError::NoMatchingIf),
			Some(f) if f.seen_else => Err(DirectiveError::ElifAfterElse),
			Some(f) => Ok(!f.taken),
		}
	}

	/// Switches the current chain to an `#elif` branch with the given value.
	pub(crate) fn elif(&mut self, value: bool) -> Result<(), DirectiveError> {
		let needs_value = self.begin_elif()?;
		if let Some(frame) = self.frames.last_mut() {
			frame.active = needs_value && value;
			frame.taken |= frame.active;
		}
		Ok(())
	}

	/// Switches the current chain to its `#else` branch.
	pub(crate) fn else_(&mut self) -> Result<(), DirectiveError> {
		match self.frames.last_mut() {
			None => Err(DirectiveError::NoMatchingIf),
			Some(f) if f.seen_else => Err(DirectiveError::DuplicateElse),
			Some(f) => {
				f.active = !f.taken;
				f.taken = true;
				f.seen_else = true;
				Ok(())
			}
		}
	}

	/// Closes the current chain.
	pub(crate) fn endif(&mut self) -> Result<(), DirectiveError> {
		match self.frames.pop() {
			Some(_) => Ok(()),
			None => Err(DirectiveError::NoMatchingIf),
		}
	}

	/// Drops every open chain.
	pub(crate) fn clear(&mut self) {
		self.frames.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::ConditionalStack;
	use crate::error::DirectiveError;

	#[test]
	fn if_else() {
		let mut stack = ConditionalStack::new(64);
		assert!(stack.is_active());
		stack.push(false).unwrap();
		assert!(!stack.is_active());
		stack.else_().unwrap();
		assert!(stack.is_active());
		assert_eq!(stack.else_(), Err(DirectiveError::DuplicateElse));
		stack.endif().unwrap();
		assert!(stack.is_empty());
	}

	#[test]
	fn elif_chain() {
		let mut stack = ConditionalStack::new(64);
		stack.push(true).unwrap();
		// A taken branch makes every later branch inactive, even if its condition holds.
		assert_eq!(stack.begin_elif(), Ok(false));
		stack.elif(true).unwrap();
		assert!(!stack.is_active());
		stack.else_().unwrap();
		assert!(!stack.is_active());
		assert_eq!(stack.elif(true), Err(DirectiveError::ElifAfterElse));
		stack.endif().unwrap();

		stack.push(false).unwrap();
		stack.elif(false).unwrap();
		assert!(!stack.is_active());
		stack.elif(true).unwrap();
		assert!(stack.is_active());
		stack.elif(true).unwrap();
		assert!(!stack.is_active());
		stack.endif().unwrap();
	}

	#[test]
	fn inactive_parent() {
		let mut stack = ConditionalStack::new(64);
		stack.push(false).unwrap();
		stack.push(true).unwrap();
		assert!(!stack.is_active());
		assert_eq!(stack.begin_elif(), Ok(false));
		stack.else_().unwrap();
		assert!(!stack.is_active());
		stack.endif().unwrap();
		stack.else_().unwrap();
		assert!(stack.is_active());
	}

	#[test]
	fn underflow() {
		let mut stack = ConditionalStack::new(64);
		assert_eq!(stack.endif(), Err(DirectiveError::NoMatchingIf));
		assert_eq!(stack.else_(), Err(DirectiveError::NoMatchingIf));
		assert_eq!(stack.elif(true), Err(DirectiveError::NoMatchingIf));
	}

	#[test]
	fn overflow() {
		let mut stack = ConditionalStack::new(3);
		for _ in 0..3 {
			stack.push(true).unwrap();
		}
		assert_eq!(stack.push(true), Err(DirectiveError::NestingTooDeep));
		assert_eq!(stack.depth(), 3);
	}

	#[test]
	fn nesting_restores_predicate() {
		// Each pattern is a well-matched sequence; `p` pushes, `e` is #else, `l` is #elif, `x` closes.
		let patterns = ["pTx", "pFlTex", "pTpFexlFx", "pFpTxepFlTxx", "pTlFlTex"];
		for outer in [true, false] {
			for pattern in patterns {
				let mut stack = ConditionalStack::new(64);
				stack.push(outer).unwrap();
				let before = stack.is_active();
				let mut chars = pattern.chars();
				while let Some(c) = chars.next() {
					match c {
						'p' => stack.push(chars.next() == Some('T')).unwrap(),
						'l' => stack.elif(chars.next() == Some('T')).unwrap(),
						'e' => stack.else_().unwrap(),
						'x' => stack.endif().unwrap(),
						_ => unreachable!(),
					}
				}
				assert_eq!(stack.is_active(), before, "{pattern}");
				assert_eq!(stack.depth(), 1);
			}
		}
	}
}
