//! The macro table and the macro expander.

use super::skip_whitespace;
use crate::{
	error::{DirectiveError, Error, MacroError},
	lexer::Token,
	pool::Symbol,
	Context,
};
use fnv::FnvHashMap;
use log::{debug, trace};

/// A `#define`d macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Macro {
	/// The formal parameters; `None` for an object-like macro.
	pub(crate) params: Option<Vec<Symbol>>,
	/// The replacement list, with whitespace removed.
	pub(crate) body: Vec<Token>,
}

/// All macros defined by the source being processed.
#[derive(Debug, Default)]
pub(crate) struct MacroTable {
	macros: FnvHashMap<Symbol, Macro>,
}

impl MacroTable {
	pub(crate) fn get(&self, name: Symbol) -> Option<&Macro> {
		self.macros.get(&name)
	}

	pub(crate) fn contains(&self, name: Symbol) -> bool {
		self.macros.contains_key(&name)
	}

	/// Installs a macro, replacing any previous definition with the same name.
	pub(crate) fn insert(&mut self, name: Symbol, macro_: Macro) {
		self.macros.insert(name, macro_);
	}

	pub(crate) fn remove(&mut self, name: Symbol) {
		self.macros.remove(&name);
	}
}

/// Returns whether a macro name is reserved; names starting with `GL_` or containing `__` are reserved for the
/// implementation.
pub(crate) fn is_reserved(name: &str) -> bool {
	name.starts_with("GL_") || name.contains("__")
}

/// Processes the tokens of a `#define` directive, i.e. everything after the `define` name up to the end of the
/// line.
pub(crate) fn define(ctx: &mut Context, tokens: &[Token]) -> Result<(), Error> {
	let mut pos = skip_whitespace(tokens, 0);
	let name = match tokens.get(pos) {
		Some(Token::Identifier(name)) => *name,
		_ => return Err(DirectiveError::ExpectedIdentifier.into()),
	};
	pos += 1;

	let text = ctx.pool.resolve(name);
	if is_reserved(text) {
		return Err(DirectiveError::ReservedName(text.to_owned()).into());
	}

	// A parameter list only exists if the `(` immediately follows the name; `#define A (x)` is an object-like
	// macro whose body starts with a parenthesis.
	let params = if tokens.get(pos) == Some(&Token::LParen) {
		pos += 1;
		let mut params = Vec::new();
		pos = skip_whitespace(tokens, pos);
		if tokens.get(pos) == Some(&Token::RParen) {
			pos += 1;
		} else {
			loop {
				pos = skip_whitespace(tokens, pos);
				match tokens.get(pos) {
					Some(Token::Identifier(param)) => params.push(*param),
					_ => {
						return Err(DirectiveError::ExpectedIdentifier.into())
					}
				}
				pos = skip_whitespace(tokens, pos + 1);
				match tokens.get(pos) {
					Some(Token::Comma) => pos += 1,
					Some(Token::RParen) => {
						pos += 1;
						break;
					}
					_ => {
						return Err(
							DirectiveError::ExpectedCommaOrRParen.into()
						)
					}
				}
			}
		}
		Some(params)
	} else {
		None
	};

	let body = tokens[pos.min(tokens.len())..]
		.iter()
		.filter(|t| {
			!matches!(t, Token::Whitespace | Token::Newline | Token::Eof)
		})
		.copied()
		.collect::<Vec<_>>();

	debug!(
		"#define {} ({} params, {} body tokens)",
		ctx.pool.resolve(name),
		params.as_ref().map_or(0, |p| p.len()),
		body.len()
	);
	ctx.macros.insert(name, Macro { params, body });
	Ok(())
}

/// Processes the tokens of an `#undef` directive.
pub(crate) fn undef(ctx: &mut Context, tokens: &[Token]) -> Result<(), Error> {
	let pos = skip_whitespace(tokens, 0);
	let name = match tokens.get(pos) {
		Some(Token::Identifier(name)) => *name,
		_ => return Err(DirectiveError::ExpectedIdentifier.into()),
	};
	if skip_whitespace(tokens, pos + 1) != tokens.len() {
		return Err(DirectiveError::TrailingTokens.into());
	}

	debug!("#undef {}", ctx.pool.resolve(name));
	ctx.macros.remove(name);
	Ok(())
}

/// What to do with an identifier that doesn't name a macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandMode {
	/// Emit the identifier unchanged.
	Normal,
	/// Emit nothing at all; used for inactive regions.
	Mute,
	/// Emit the integer `0`; used for `#if` expressions.
	UnknownToZero,
}

/// The actual arguments of a function-like macro invocation, keyed by formal parameter.
type Scope = FnvHashMap<Symbol, Vec<Token>>;

/// A single top-level macro expansion.
///
/// The expander keeps the chain of macros currently being expanded; a macro name met again whilst it is on the
/// chain is not expanded a second time, which is what stops `#define A A` from recursing forever.
pub(crate) struct Expander<'a> {
	ctx: &'a mut Context,
	mode: ExpandMode,
	/// Macros whose bodies are currently being rescanned, innermost last.
	active: Vec<Symbol>,
	/// The number of newlines consumed whilst looking for or capturing an argument list.
	pub(crate) newlines: u32,
}

impl<'a> Expander<'a> {
	pub(crate) fn new(ctx: &'a mut Context, mode: ExpandMode) -> Self {
		Self {
			ctx,
			mode,
			active: Vec::new(),
			newlines: 0,
		}
	}

	/// Expands the identifier `name`, which was read from `input` just before `*pos`.
	///
	/// If `name` is a function-like macro, its argument list is read from `input` and `pos` is advanced past it.
	/// The replacement tokens are appended to `out`.
	pub(crate) fn expand(
		&mut self,
		name: Symbol,
		input: &[Token],
		pos: &mut usize,
		scope: Option<&Scope>,
		out: &mut Vec<Token>,
	) -> Result<(), Error> {
		let mute = self.mode == ExpandMode::Mute;

		if let Some(value) = self.ctx.builtin_macro_value(name) {
			if !mute {
				let symbol = self.ctx.pool.intern(&value.to_string());
				out.push(Token::Uint(symbol));
			}
			return Ok(());
		}

		if let Some(args) = scope.and_then(|s| s.get(&name)) {
			if !mute {
				out.extend_from_slice(args);
			}
			return Ok(());
		}

		if self.active.contains(&name) {
			self.unmatched(name, out);
			return Ok(());
		}

		let macro_ = match self.ctx.macros.get(name) {
			Some(m) => m.clone(),
			None => {
				self.unmatched(name, out);
				return Ok(());
			}
		};

		let params = match macro_.params {
			Some(params) => params,
			None => {
				trace!("expanding `{}`", self.ctx.pool.resolve(name));
				self.active.push(name);
				let result = self.rescan(&macro_.body, None, out);
				self.active.pop();
				return result;
			}
		};

		let args = match self.capture_arguments(name, input, pos)? {
			Some(args) => args,
			// Only reachable in mute mode.
			None => return Ok(()),
		};

		// `F()` is a single empty argument, which is also what a zero-parameter macro expects.
		let arg_count = if params.is_empty() && args.len() == 1 && args[0].is_empty() {
			0
		} else {
			args.len()
		};
		if !mute {
			let macro_name = || self.ctx.pool.resolve(name).to_owned();
			if arg_count < params.len() {
				return Err(MacroError::TooFewArguments(macro_name()).into());
			} else if arg_count > params.len() {
				return Err(MacroError::TooManyArguments(macro_name()).into());
			}
		}

		// Each argument is fully expanded in the caller's scope before it is bound to its parameter.
		let mut locals = Scope::default();
		for (param, arg) in params.iter().zip(args) {
			let mut expanded = Vec::with_capacity(arg.len());
			self.rescan(&arg, scope, &mut expanded)?;
			locals.insert(*param, expanded);
		}

		trace!(
			"expanding `{}` with {} arguments",
			self.ctx.pool.resolve(name),
			params.len()
		);
		self.active.push(name);
		let result = self.rescan(&macro_.body, Some(&locals), out);
		self.active.pop();
		result
	}

	/// Expands every identifier in `tokens` and copies everything else.
	fn rescan(
		&mut self,
		tokens: &[Token],
		scope: Option<&Scope>,
		out: &mut Vec<Token>,
	) -> Result<(), Error> {
		let mut pos = 0;
		while let Some(token) = tokens.get(pos) {
			pos += 1;
			match token {
				Token::Identifier(name) => {
					self.expand(*name, tokens, &mut pos, scope, out)?
				}
				t => {
					if self.mode != ExpandMode::Mute {
						out.push(*t);
					}
				}
			}
		}
		Ok(())
	}

	/// Emits an identifier which is not (or may not be) expanded.
	fn unmatched(&mut self, name: Symbol, out: &mut Vec<Token>) {
		match self.mode {
			ExpandMode::Normal => out.push(Token::Identifier(name)),
			ExpandMode::Mute => {}
			ExpandMode::UnknownToZero => {
				out.push(Token::Uint(self.ctx.pool.intern("0")))
			}
		}
	}

	/// Reads the argument list of a function-like macro invocation.
	///
	/// Commas only separate arguments at the outermost parenthesis level. In mute mode a missing argument list is
	/// not an error and capture stops at the end of the line; `None` is returned in the former case.
	fn capture_arguments(
		&mut self,
		name: Symbol,
		input: &[Token],
		pos: &mut usize,
	) -> Result<Option<Vec<Vec<Token>>>, Error> {
		let mute = self.mode == ExpandMode::Mute;
		let macro_name = |ctx: &Context| ctx.pool.resolve(name).to_owned();

		let mut cursor = *pos;
		let mut newlines = 0;
		loop {
			match input.get(cursor) {
				Some(Token::Whitespace) => cursor += 1,
				Some(Token::Newline) if !mute => {
					newlines += 1;
					cursor += 1;
				}
				_ => break,
			}
		}
		if input.get(cursor) != Some(&Token::LParen) {
			if mute {
				return Ok(None);
			}
			return Err(MacroError::ExpectedLParen(macro_name(self.ctx)).into());
		}
		cursor += 1;

		let mut args = Vec::new();
		let mut current = Vec::new();
		let mut depth = 0;
		loop {
			let token = match input.get(cursor) {
				Some(Token::Eof) | None => {
					if mute {
						break;
					}
					return Err(MacroError::UnterminatedArguments(macro_name(
						self.ctx,
					))
					.into());
				}
				Some(Token::Newline) if mute => break,
				Some(t) => *t,
			};
			cursor += 1;

			match token {
				Token::LParen => {
					depth += 1;
					current.push(token);
				}
				Token::RParen if depth == 0 => {
					args.push(std::mem::take(&mut current));
					break;
				}
				Token::RParen => {
					depth -= 1;
					current.push(token);
				}
				Token::Comma if depth == 0 => {
					args.push(std::mem::take(&mut current));
				}
				Token::Whitespace => {}
				Token::Newline => newlines += 1,
				t => current.push(t),
			}
		}

		*pos = cursor;
		self.newlines += newlines;
		Ok(Some(args))
	}
}

#[cfg(test)]
mod tests {
	use super::ExpandMode;
	use crate::{error::Error, error::MacroError, printing::render_tokens, Context};

	/// Defines each macro of `defines`, then expands every identifier of `src` and renders the result.
	fn expand(defines: &[&str], src: &str, mode: ExpandMode) -> Result<String, Error> {
		let mut ctx = Context::new();
		for define in defines {
			let tokens = ctx.tokenize(define);
			super::define(&mut ctx, &tokens[..tokens.len() - 1])?;
		}
		let tokens = ctx.tokenize(src);
		let mut out = Vec::new();
		let mut expander = super::Expander::new(&mut ctx, mode);
		let mut pos = 0;
		while let Some(token) = tokens.get(pos) {
			pos += 1;
			match token {
				crate::lexer::Token::Identifier(name) => {
					expander.expand(*name, &tokens, &mut pos, None, &mut out)?
				}
				crate::lexer::Token::Whitespace | crate::lexer::Token::Eof => {}
				t => out.push(*t),
			}
		}
		Ok(render_tokens(&ctx, &out))
	}

	macro_rules! assert_expand {
		([$($define:expr),*], $src:expr, $out:expr) => {
			assert_eq!(
				expand(&[$($define),*], $src, ExpandMode::Normal).map_err(|e| e.to_string()),
				Ok($out.to_owned())
			);
		};
	}

	#[test]
	fn object_like() {
		assert_expand!(["FOO 42"], "FOO", "42");
		assert_expand!(["FOO"], "a FOO b", "a b");
		assert_expand!(["A B", "B 1 + 2"], "A", "1 + 2");
		assert_expand!(["A (x)"], "A", "( x )");
	}

	#[test]
	fn function_like() {
		assert_expand!(["M(a,b) a+b"], "M(1,2)", "1 + 2");
		assert_expand!(["A(x) x+x"], "A(1+2)", "1 + 2 + 1 + 2");
		assert_expand!(["F() 7"], "F()", "7");
		assert_expand!(["F(x) [x]"], "F()", "[ ]");
		assert_expand!(["F(x) x"], "F((a, b))", "( a , b )");
		assert_expand!(["F(x, y) y x"], "F( 1 , 2 )", "2 1");
		assert_expand!(
			["ADD(a,b) a+b", "TWICE(x) ADD(x,x)"],
			"TWICE(3)",
			"3 + 3"
		);
	}

	#[test]
	fn arguments_expand_in_caller_scope() {
		assert_expand!(["ONE 1", "F(x) x"], "F(ONE)", "1");
		// `x` in the argument refers to the global macro, not to the parameter of `F`.
		assert_expand!(["x 5", "F(x) x"], "F(x)", "5");
		assert_expand!(["F(x) x"], "F(x)", "x");
	}

	#[test]
	fn self_reference() {
		assert_expand!(["A A"], "A", "A");
		assert_expand!(["A B", "B A"], "A B", "A B");
		assert_expand!(["f(x) f(x)"], "f(1)", "f ( 1 )");
		// A blocked macro can still be used afterwards.
		assert_expand!(["A A + 1"], "A A", "A + 1 A + 1");
	}

	#[test]
	fn predefined() {
		assert_expand!([], "__LINE__ __FILE__ __VERSION__", "1 0 110");
	}

	#[test]
	fn modes() {
		assert_eq!(
			expand(&["A 1"], "A B", ExpandMode::UnknownToZero).unwrap(),
			"1 0"
		);
		assert_eq!(expand(&["A 1"], "A B", ExpandMode::Mute).unwrap(), "");
		// Mute mode tolerates a function-like macro without arguments.
		assert_eq!(expand(&["F(x) x"], "F", ExpandMode::Mute).unwrap(), "");
	}

	#[test]
	fn argument_errors() {
		let err = |defines: &[&str], src| expand(defines, src, ExpandMode::Normal).unwrap_err();
		assert_eq!(
			err(&["M(a,b) a"], "M(1)"),
			Error::Macro(MacroError::TooFewArguments("M".into()))
		);
		assert_eq!(
			err(&["M(a) a"], "M(1,2)"),
			Error::Macro(MacroError::TooManyArguments("M".into()))
		);
		assert_eq!(
			err(&["M(a) a"], "M + 1"),
			Error::Macro(MacroError::ExpectedLParen("M".into()))
		);
		assert_eq!(
			err(&["M(a) a"], "M(1"),
			Error::Macro(MacroError::UnterminatedArguments("M".into()))
		);
	}

	#[test]
	fn reserved() {
		let mut ctx = Context::new();
		for name in ["GL_foo", "a__b", "__LINE__"] {
			let tokens = ctx.tokenize(name);
			assert!(super::define(&mut ctx, &tokens).is_err(), "{name}");
		}
		let tokens = ctx.tokenize("gl_ok 1");
		assert!(super::define(&mut ctx, &tokens).is_ok());
	}
}
