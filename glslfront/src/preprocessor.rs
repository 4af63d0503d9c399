//! The directive processor.
//!
//! The preprocessor works in two steps. [`parse_version_directive()`] reads the `#version` block at the very top
//! of the token stream, and then a [`Processor`] runs over the remaining tokens one logical line at a time:
//!
//! - Directive lines are dispatched by name. The conditional directives are always processed so that nesting is
//!   tracked correctly inside inactive regions; every other directive is only processed in an active region.
//! - Text lines have their identifiers macro-expanded. In an inactive region, expansion runs in
//!   [`Mute`](macros::ExpandMode::Mute) mode, which consumes macro arguments but produces nothing.
//!
//! The output contains no whitespace. Every source line produces exactly one [`Newline`](Token::Newline) token,
//! including directive lines and lines inside inactive regions, so the consumer can track line numbers by
//! counting. `#line`, `#pragma` and `#extension` produce structured tokens in place of their line's content.
//!
//! # Differences in behaviour
//! - Division by zero in an `#if` expression is an error.
//! - `&&` and `||` in `#if` expressions do not short-circuit, so `#if 0 && 1/0` is still an error.
//! - `#elif` after `#else` in the same chain is an error.

pub(crate) mod conditional;
pub(crate) mod conditional_eval;
pub mod macros;

use crate::{
	error::{DirectiveError, Error},
	lexer::Token,
	literal,
	pool::Symbol,
	printing::token_text,
	Context,
};
use log::{debug, trace};
use macros::{ExpandMode, Expander};
use std::collections::VecDeque;

/// The version assumed when the source has no `#version` directive.
pub(crate) const DEFAULT_VERSION: u32 = 110;

/// The largest line number `#line` accepts; the line counter keeps advancing past it without overflowing.
const MAX_LINE_NUMBER: u32 = i32::MAX as u32;

crate::dictionary! {
	/// Identifiers with a special meaning to the preprocessor.
	pub(crate) struct Keywords {
		define => "define",
		undef => "undef",
		if_ => "if",
		ifdef => "ifdef",
		ifndef => "ifndef",
		elif => "elif",
		else_ => "else",
		endif => "endif",
		error => "error",
		pragma => "pragma",
		extension => "extension",
		version => "version",
		line => "line",
		defined => "defined",
		all => "all",
		require => "require",
		enable => "enable",
		warn => "warn",
		disable => "disable",
		optimize => "optimize",
		debug => "debug",
		on => "on",
		off => "off",
		line_macro => "__LINE__",
		file_macro => "__FILE__",
		version_macro => "__VERSION__",
	}
}

/// Returns the position of the first non-whitespace token at or after `pos`.
pub(crate) fn skip_whitespace(tokens: &[Token], mut pos: usize) -> usize {
	while let Some(Token::Whitespace) = tokens.get(pos) {
		pos += 1;
	}
	pos
}

/// Scans the `#version` directives at the start of a token stream.
///
/// Blank lines before a `#version` directive are consumed along with it; blank lines after the last one are left
/// for the processor. If there are several directives, the last one wins. Returns the version and the number of
/// tokens consumed, and advances the context's line counter past the consumed lines.
pub(crate) fn parse_version_directive(
	ctx: &mut Context,
	tokens: &[Token],
) -> Result<(u32, usize), Error> {
	let keyword = ctx.keywords.version;
	let mut version = DEFAULT_VERSION;
	let mut consumed = 0;
	let mut lines = 0;

	let mut pos = 0;
	let mut pending_lines = 0;
	loop {
		let start = skip_whitespace(tokens, pos);
		match tokens.get(start) {
			Some(Token::Newline) => {
				pos = start + 1;
				pending_lines += 1;
			}
			Some(Token::Hash) => {
				let name = skip_whitespace(tokens, start + 1);
				if tokens.get(name) != Some(&Token::Identifier(keyword)) {
					break;
				}

				let number = skip_whitespace(tokens, name + 1);
				version = match tokens.get(number) {
					Some(Token::Uint(s)) => {
						let text = ctx.pool.resolve(*s);
						if !text.bytes().all(|b| b.is_ascii_digit()) {
							return Err(DirectiveError::ExpectedVersionNumber.into());
						}
						text.parse::<u32>()
							.map_err(|_| DirectiveError::ExpectedVersionNumber)?
					}
					_ => return Err(DirectiveError::ExpectedVersionNumber.into()),
				};

				let end = skip_whitespace(tokens, number + 1);
				match tokens.get(end) {
					Some(Token::Newline) => {
						pos = end + 1;
						pending_lines += 1;
					}
					Some(Token::Eof) | None => pos = end,
					Some(_) => return Err(DirectiveError::TrailingTokens.into()),
				}
				debug!("#version {version}");
				consumed = pos;
				lines += pending_lines;
				pending_lines = 0;
			}
			_ => break,
		}
	}

	ctx.version = version;
	ctx.line += lines;
	Ok((version, consumed))
}

/// The directive processor.
///
/// The processor is pull-based: each call to [`next_token()`](Self::next_token) returns the next preprocessed
/// token, processing another source line whenever the tokens of the previous one have all been handed out. This
/// lets the parser drive preprocessing lazily.
#[derive(Debug)]
pub struct Processor {
	input: Vec<Token>,
	/// The start of the next unprocessed line.
	pos: usize,
	/// Processed tokens which have not been handed out yet.
	queue: VecDeque<Token>,
	started: bool,
	finished: bool,
}

impl Processor {
	/// Creates a processor over the tokens following the `#version` block.
	pub fn new(input: Vec<Token>) -> Self {
		Self {
			input,
			pos: 0,
			queue: VecDeque::new(),
			started: false,
			finished: false,
		}
	}

	/// Returns the next preprocessed token.
	///
	/// Once [`Token::Eof`] has been returned, every further call returns it again. After an error, the processor
	/// is finished and also only returns [`Token::Eof`].
	pub fn next_token(&mut self, ctx: &mut Context) -> Result<Token, Error> {
		loop {
			if let Some(token) = self.queue.pop_front() {
				return Ok(token);
			}
			if self.finished {
				return Ok(Token::Eof);
			}
			if let Err(e) = self.process_line(ctx) {
				self.finished = true;
				self.queue.clear();
				return Err(e);
			}
		}
	}

	/// Processes one logical line, queueing its output.
	fn process_line(&mut self, ctx: &mut Context) -> Result<(), Error> {
		if !self.started {
			self.started = true;
			ctx.conditionals.clear();
			// Lines were consumed by the version block, so tell the consumer where the first line really is.
			if ctx.line > 1 {
				self.queue.push_back(Token::Line {
					line: ctx.line - 1,
					file: ctx.file,
				});
				self.queue.push_back(Token::Newline);
			}
			return Ok(());
		}

		let start = skip_whitespace(&self.input, self.pos);
		match self.input.get(start) {
			Some(Token::Eof) | None => {
				if !ctx.conditionals.is_empty() {
					return Err(DirectiveError::ExpectedEndif.into());
				}
				self.pos = start;
				self.queue.push_back(Token::Eof);
				self.finished = true;
				Ok(())
			}
			Some(Token::Hash) => self.directive(ctx, start + 1),
			Some(_) => self.text_line(ctx, start),
		}
	}

	/// Returns the position of the `Newline` or `Eof` ending the line which contains `pos`.
	fn line_end(&self, mut pos: usize) -> usize {
		while let Some(token) = self.input.get(pos) {
			if let Token::Newline | Token::Eof = token {
				break;
			}
			pos += 1;
		}
		pos
	}

	/// Processes a directive line; `after_hash` is the position just past the `#`.
	fn directive(
		&mut self,
		ctx: &mut Context,
		after_hash: usize,
	) -> Result<(), Error> {
		let name_pos = skip_whitespace(&self.input, after_hash);
		let end = self.line_end(name_pos);
		let has_newline = self.input.get(end) == Some(&Token::Newline);
		self.pos = if has_newline { end + 1 } else { end };

		let active = ctx.conditionals.is_active();
		let name = match self.input.get(name_pos) {
			Some(Token::Identifier(name)) => Some(*name),
			// The null directive.
			_ if name_pos == end => None,
			_ if active => {
				return Err(DirectiveError::UnknownDirective.into())
			}
			_ => None,
		};

		let mut line_change = None;
		if let Some(name) = name {
			let args = &self.input[name_pos + 1..end];
			let queue = &mut self.queue;
			let kw = ctx.keywords;

			if name == kw.if_ {
				let value = active && eval_condition(ctx, args)?;
				ctx.conditionals.push(value)?;
				debug!("#if -> {value}");
			} else if name == kw.ifdef || name == kw.ifndef {
				let value = active && {
					let defined = ctx.is_defined(single_identifier(args)?);
					defined == (name == kw.ifdef)
				};
				ctx.conditionals.push(value)?;
				debug!("#{} -> {value}", ctx.pool.resolve(name));
			} else if name == kw.elif {
				let value =
					ctx.conditionals.begin_elif()? && eval_condition(ctx, args)?;
				ctx.conditionals.elif(value)?;
				debug!("#elif -> {value}");
			} else if name == kw.else_ {
				ctx.conditionals.else_()?;
				debug!("#else");
			} else if name == kw.endif {
				ctx.conditionals.endif()?;
				debug!("#endif");
			} else if !active {
				trace!(
					"skipping #{} in an inactive region",
					ctx.pool.resolve(name)
				);
			} else if name == kw.define {
				macros::define(ctx, args)?;
			} else if name == kw.undef {
				macros::undef(ctx, args)?;
			} else if name == kw.error {
				let message = args
					.iter()
					.map(|t| token_text(&ctx.pool, t))
					.collect::<String>();
				return Err(
					DirectiveError::User(message.trim().to_owned()).into()
				);
			} else if name == kw.extension {
				extension(ctx, args, queue)?;
			} else if name == kw.line {
				line_change = Some(line(ctx, args)?);
			} else if name == kw.pragma {
				pragma(ctx, args, queue);
			} else if name == kw.version {
				return Err(DirectiveError::MisplacedVersion.into());
			} else {
				return Err(DirectiveError::UnknownDirective.into());
			}
		}

		if let Some((line, file)) = line_change {
			if line != ctx.line + 1 || file != ctx.file {
				self.queue.push_back(Token::Line {
					line: line - 1,
					file,
				});
			}
		}
		if has_newline {
			self.queue.push_back(Token::Newline);
			ctx.line += 1;
		}
		if let Some((line, file)) = line_change {
			debug!("#line {line} {file}");
			ctx.line = line;
			ctx.file = file;
		}
		Ok(())
	}

	/// Processes a line of text starting at `start`.
	fn text_line(&mut self, ctx: &mut Context, start: usize) -> Result<(), Error> {
		let active = ctx.conditionals.is_active();
		let mode = if active {
			ExpandMode::Normal
		} else {
			ExpandMode::Mute
		};

		let input = &self.input;
		let mut out = Vec::new();
		let mut expander = Expander::new(ctx, mode);
		let mut has_newline = false;
		let mut pos = start;
		while let Some(token) = input.get(pos) {
			match token {
				Token::Eof => break,
				Token::Newline => {
					pos += 1;
					has_newline = true;
					break;
				}
				Token::Whitespace => pos += 1,
				Token::Identifier(name) => {
					pos += 1;
					expander.expand(*name, input, &mut pos, None, &mut out)?;
				}
				t => {
					pos += 1;
					if active {
						out.push(*t);
					}
				}
			}
		}
		// An argument list which spans lines consumes their newlines; they are emitted here instead.
		let lines = expander.newlines + has_newline as u32;
		self.pos = pos;

		self.queue
			.extend(out.into_iter().filter(|t| *t != Token::Whitespace));
		for _ in 0..lines {
			self.queue.push_back(Token::Newline);
		}
		ctx.line += lines;
		Ok(())
	}
}

/// Returns the only identifier of a directive such as `#ifdef NAME`.
fn single_identifier(args: &[Token]) -> Result<Symbol, Error> {
	let pos = skip_whitespace(args, 0);
	let name = match args.get(pos) {
		Some(Token::Identifier(name)) => *name,
		_ => return Err(DirectiveError::ExpectedIdentifier.into()),
	};
	if skip_whitespace(args, pos + 1) != args.len() {
		return Err(DirectiveError::TrailingTokens.into());
	}
	Ok(name)
}

/// Evaluates the expression of an `#if` or `#elif`.
///
/// `defined NAME` and `defined(NAME)` are resolved first, so that the operand is not macro-expanded. Everything
/// else is then expanded with unknown identifiers becoming `0`.
fn eval_condition(ctx: &mut Context, args: &[Token]) -> Result<bool, Error> {
	let defined = ctx.keywords.defined;
	let mut resolved = Vec::with_capacity(args.len());
	let mut pos = 0;
	while let Some(token) = args.get(pos) {
		pos += 1;
		match token {
			Token::Identifier(name) if *name == defined => {
				pos = skip_whitespace(args, pos);
				let parenthesized = args.get(pos) == Some(&Token::LParen);
				if parenthesized {
					pos = skip_whitespace(args, pos + 1);
				}
				let operand = match args.get(pos) {
					Some(Token::Identifier(name)) => *name,
					_ => return Err(DirectiveError::ExpectedIdentifier.into()),
				};
				pos += 1;
				if parenthesized {
					pos = skip_whitespace(args, pos);
					if args.get(pos) != Some(&Token::RParen) {
						return Err(DirectiveError::ExpectedRParen.into());
					}
					pos += 1;
				}
				let value = if ctx.is_defined(operand) { "1" } else { "0" };
				resolved.push(Token::Uint(ctx.pool.intern(value)));
			}
			Token::Whitespace => {}
			t => resolved.push(*t),
		}
	}

	let mut expanded = Vec::with_capacity(resolved.len());
	let mut expander = Expander::new(ctx, ExpandMode::UnknownToZero);
	let mut pos = 0;
	while let Some(token) = resolved.get(pos) {
		pos += 1;
		match token {
			Token::Identifier(name) => {
				expander.expand(*name, &resolved, &mut pos, None, &mut expanded)?
			}
			t => expanded.push(*t),
		}
	}

	let value = conditional_eval::evaluate(&ctx.pool, &expanded)?;
	Ok(value != 0)
}

/// Processes an `#extension NAME : BEHAVIOUR` directive.
///
/// An unsupported extension is an error with `require` and ignored otherwise.
fn extension(
	ctx: &mut Context,
	args: &[Token],
	queue: &mut VecDeque<Token>,
) -> Result<(), Error> {
	let mut pos = skip_whitespace(args, 0);
	let name = match args.get(pos) {
		Some(Token::Identifier(name)) => *name,
		_ => return Err(DirectiveError::ExpectedExtensionName.into()),
	};
	pos = skip_whitespace(args, pos + 1);
	if args.get(pos) != Some(&Token::Colon) {
		return Err(DirectiveError::ExpectedColon.into());
	}
	pos = skip_whitespace(args, pos + 1);
	let behaviour = match args.get(pos) {
		Some(Token::Identifier(behaviour)) => *behaviour,
		_ => return Err(DirectiveError::ExpectedBehaviour.into()),
	};
	if skip_whitespace(args, pos + 1) != args.len() {
		return Err(DirectiveError::TrailingTokens.into());
	}

	let kw = ctx.keywords;
	let token = if behaviour == kw.require {
		Token::ExtensionRequire(name)
	} else if behaviour == kw.enable {
		Token::ExtensionEnable(name)
	} else if behaviour == kw.warn {
		Token::ExtensionWarn(name)
	} else if behaviour == kw.disable {
		Token::ExtensionDisable(name)
	} else {
		return Err(DirectiveError::ExpectedBehaviour.into());
	};

	if name == kw.all {
		if !matches!(token, Token::ExtensionWarn(_) | Token::ExtensionDisable(_))
		{
			return Err(DirectiveError::InvalidBehaviourForAll.into());
		}
	} else if !ctx.is_extension_supported(name) {
		let name = ctx.pool.resolve(name);
		if let Token::ExtensionRequire(_) = token {
			return Err(DirectiveError::UnsupportedExtension(name.to_owned()).into());
		}
		debug!("ignoring unsupported extension `{name}`");
		return Ok(());
	}

	debug!(
		"#extension {} : {}",
		ctx.pool.resolve(name),
		ctx.pool.resolve(behaviour)
	);
	queue.push_back(token);
	Ok(())
}

/// Processes a `#line LINE [FILE]` directive, returning the new line and file numbers.
///
/// The arguments are macro-expanded first. The line number must be between 1 and [`MAX_LINE_NUMBER`].
fn line(ctx: &mut Context, args: &[Token]) -> Result<(u32, u32), Error> {
	let mut expanded = Vec::new();
	let mut expander = Expander::new(ctx, ExpandMode::Normal);
	let mut pos = 0;
	while let Some(token) = args.get(pos) {
		pos += 1;
		match token {
			Token::Identifier(name) => {
				expander.expand(*name, args, &mut pos, None, &mut expanded)?
			}
			Token::Whitespace => {}
			t => expanded.push(*t),
		}
	}

	let mut tokens = expanded.into_iter();
	let line = match tokens.next() {
		Some(Token::Uint(s)) => line_number(ctx, s)?,
		_ => return Err(DirectiveError::ExpectedLineNumber.into()),
	};
	if line == 0 || line > MAX_LINE_NUMBER {
		return Err(DirectiveError::InvalidLineNumber.into());
	}
	let file = match tokens.next() {
		Some(Token::Uint(s)) => line_number(ctx, s)?,
		Some(_) => return Err(DirectiveError::TrailingTokens.into()),
		None => ctx.file,
	};
	if tokens.next().is_some() {
		return Err(DirectiveError::TrailingTokens.into());
	}
	Ok((line, file))
}

fn line_number(ctx: &Context, symbol: Symbol) -> Result<u32, Error> {
	literal::parse_integer(ctx.pool.resolve(symbol))
		.and_then(|v| u32::try_from(v).ok())
		.ok_or_else(|| DirectiveError::InvalidLineNumber.into())
}

/// Processes a `#pragma` directive.
///
/// Only `optimize(on|off)` and `debug(on|off)` are recognised; any other pragma is ignored.
fn pragma(ctx: &mut Context, args: &[Token], queue: &mut VecDeque<Token>) {
	let tokens = args
		.iter()
		.filter(|t| **t != Token::Whitespace)
		.copied()
		.collect::<Vec<_>>();
	let kw = ctx.keywords;

	if let [Token::Identifier(name), Token::LParen, Token::Identifier(value), Token::RParen] =
		tokens.as_slice()
	{
		let on = if *value == kw.on {
			Some(true)
		} else if *value == kw.off {
			Some(false)
		} else {
			None
		};
		let token = match on {
			Some(on) if *name == kw.optimize => Some(Token::PragmaOptimize(on)),
			Some(on) if *name == kw.debug => Some(Token::PragmaDebug(on)),
			_ => None,
		};
		if let Some(token) = token {
			debug!("#pragma {}", token_text(&ctx.pool, &token));
			queue.push_back(token);
			return;
		}
	}
	debug!("ignoring unrecognised pragma");
}

#[cfg(test)]
mod tests {
	use super::parse_version_directive;
	use crate::{
		error::{DirectiveError, Error},
		lexer::Token,
		printing::render_tokens,
		Context, Options,
	};

	/// Runs the version scan and the processor over `src`, rendering the output.
	fn process_in(mut ctx: Context, src: &str) -> Result<String, String> {
		let tokens = ctx.tokenize(src);
		let run = |ctx: &mut Context| -> Result<Vec<Token>, Error> {
			let (_, consumed) = ctx.parse_version_directive(&tokens)?;
			ctx.preprocess(&tokens[consumed..])
		};
		match run(&mut ctx) {
			Ok(out) => Ok(render_tokens(&ctx, &out)),
			Err(e) => Err(e.to_string()),
		}
	}

	fn process(src: &str) -> Result<String, String> {
		process_in(Context::new(), src)
	}

	macro_rules! assert_process {
		($src:expr, $out:expr) => {
			assert_eq!(process($src), Ok($out.to_owned()), "{:?}", $src);
		};
		($src:expr, err: $msg:expr) => {
			assert_eq!(process($src), Err($msg.to_owned()), "{:?}", $src);
		};
	}

	#[test]
	fn define() {
		assert_process!("#define FOO 42\nint x = FOO;\n", "int x = 42 ;\n");
		assert_process!("#define M(a,b) a+b\nM(1,2)\n", "1 + 2\n");
		assert_process!("#define A 1\n#undef A\nA\n", "A\n");
		assert_process!("#define GL_X 1\n", err: "macro name `GL_X' is reserved");
		assert_process!("#undef A B\n", err: "expected end of line");
	}

	#[test]
	fn conditionals() {
		assert_process!("#if 1 + 1 == 2\nA\n#else\nB\n#endif\n", "A\n");
		assert_process!("#ifdef UNDEFINED_NAME\nX\n#endif\n", "");
		assert_process!("#ifndef UNDEFINED_NAME\nX\n#endif\n", "X\n");
		assert_process!(
			"#if 0\na\n#elif 1\nb\n#elif 1\nc\n#else\nd\n#endif\n",
			"b\n"
		);
		assert_process!("#if UNKNOWN\na\n#else\nb\n#endif\n", "b\n");
		assert_process!(
			"#define ADD(a,b) a+b\n#if ADD(1,2) == 3\nyes\n#endif\n",
			"yes\n"
		);
		// Nothing inside an inactive region is evaluated or checked.
		assert_process!("#if 0\n#if 1/0\n#endif\n#foo\n#error no\n#endif\nok\n", "ok\n");
	}

	#[test]
	fn defined() {
		assert_process!(
			"#define X\n#if defined(X)\na\n#endif\n#undef X\n#if defined X\nb\n#else\nc\n#endif\n",
			"a\nc\n"
		);
		assert_process!("#if defined __LINE__ && defined(__VERSION__)\nok\n#endif\n", "ok\n");
		assert_process!("#if defined(X\n#endif\n", err: "expected `)'");
		assert_process!("#if defined 1\n#endif\n", err: "expected an identifier");
	}

	#[test]
	fn conditional_errors() {
		assert_process!("#endif\n", err: "no matching `#if'");
		assert_process!("#else\n", err: "no matching `#if'");
		assert_process!("#elif 1\n", err: "no matching `#if'");
		assert_process!("#if 1\n", err: "expected `#endif'");
		assert_process!("#if 1\n#else\n#else\n#endif\n", err: "duplicate `#else' directive");
		assert_process!("#if 1\n#else\n#elif 1\n#endif\n", err: "`#elif' directive after `#else'");
		assert_process!("#if 1/0\n#endif\n", err: "division by zero");

		let ctx = Context::with_options(Options {
			max_conditional_depth: 1,
			..Default::default()
		})
		.unwrap();
		assert_eq!(
			process_in(ctx, "#if 1\n#if 1\n#endif\n#endif\n"),
			Err("`#if' nesting too deep".to_owned())
		);
	}

	#[test]
	fn directives() {
		assert_process!("#\nx\n", "x\n");
		assert_process!("#foo\n", err: "unrecognised directive name");
		assert_process!("# 5\n", err: "unrecognised directive name");
		assert_process!("#error this  is   bad \n", err: "this is bad");
		assert_process!("int x;\n#version 110\n", err: "`#version' must occur before anything else");
		assert_process!(
			"#pragma optimize(off)\n#pragma debug( on )\n#pragma STDGL invariant(all)\n",
			"#pragma optimize(off)\n#pragma debug(on)\n"
		);
	}

	#[test]
	fn line() {
		assert_process!("#line 10\n__LINE__\n", "#line 9 0\n10\n");
		assert_process!("#line 5 3\n__FILE__ __LINE__\n", "#line 4 3\n3 5\n");
		// The counters don't change, so no token is needed.
		assert_process!("#line 2\n__LINE__\n", "2\n");
		assert_process!("#define L 20\n#line L\n__LINE__\n", "#line 19 0\n20\n");
		assert_process!("#line\n", err: "expected a line number");
		assert_process!("#line 0\n", err: "invalid line number");
		assert_process!("#line 2147483647\n__LINE__\n", "#line 2147483646 0\n2147483647\n");
		assert_process!("#line 4294967295\nx\ny\n", err: "invalid line number");
		assert_process!("#line 2147483648\n", err: "invalid line number");
		assert_process!("#line 1 2 3\n", err: "expected end of line");
	}

	#[test]
	fn extension() {
		let mut ctx = Context::new();
		ctx.add_extension("GL_foo").unwrap();
		assert_eq!(
			process_in(ctx, "#extension GL_foo : enable\n#extension all : warn\n"),
			Ok("#extension GL_foo : enable\n#extension all : warn\n".to_owned())
		);
		assert_process!("#extension GL_bar : warn\n", "");
		assert_process!("#extension GL_bar : require\n", err: "extension `GL_bar' not supported");
		assert_process!(
			"#extension all : enable\n",
			err: "extension `all' may only be used with `warn' or `disable'"
		);
		assert_process!("#extension GL_bar enable\n", err: "expected `:'");
		assert_process!(
			"#extension GL_bar : maybe\n",
			err: "expected `require', `enable', `warn' or `disable'"
		);
	}

	#[test]
	fn newlines() {
		// An argument list spanning two lines still yields one newline per source line.
		let mut ctx = Context::new();
		let tokens = ctx.tokenize("#define F(a,b) a b\nF(1,\n2)\n__LINE__\n");
		let out = ctx.preprocess(&tokens).unwrap();
		assert_eq!(out.iter().filter(|t| **t == Token::Newline).count(), 4);
		assert_eq!(render_tokens(&ctx, &out), "1 2\n4\n");

		// Inactive lines count too, and mute expansion stops at the end of the line.
		assert_process!("#define F(x) x\n#if 0\nF(\n#endif\n__LINE__\n", "5\n");
	}

	#[test]
	fn version() {
		let mut ctx = Context::new();
		let tokens = ctx.tokenize("\n\n#version 130\nvoid");
		assert_eq!(parse_version_directive(&mut ctx, &tokens), Ok((130, 7)));
		assert_eq!(ctx.line(), 4);
		assert_eq!(ctx.version(), 130);

		let mut ctx = Context::new();
		let tokens = ctx.tokenize("\nint x;");
		assert_eq!(parse_version_directive(&mut ctx, &tokens), Ok((110, 0)));
		assert_eq!(ctx.line(), 1);

		let mut ctx = Context::new();
		let tokens = ctx.tokenize("#version 100\n #  version 120\n");
		assert_eq!(
			parse_version_directive(&mut ctx, &tokens).map(|r| r.0),
			Ok(120)
		);

		for src in ["#version abc\n", "#version 1.10\n", "#version 0x10\n"] {
			let mut ctx = Context::new();
			let tokens = ctx.tokenize(src);
			assert_eq!(
				parse_version_directive(&mut ctx, &tokens),
				Err(Error::Directive(DirectiveError::ExpectedVersionNumber)),
				"{src}"
			);
		}

		assert_process!("#version 120\n__VERSION__ __LINE__\n", "#line 1 0\n120 2\n");
	}
}
