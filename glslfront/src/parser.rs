//! The parser, which turns preprocessed tokens into an opcode stream.
//!
//! The grammar is implemented as a backtracking recursive-descent parser. Every production receives a
//! [`ParseState`], which is a pair of cursors: one into the token stream and one into the output buffer. A
//! production that wants to try something speculatively works on a copy of the state and only writes it back once
//! it has succeeded; a failed alternative therefore costs nothing but the work done. Output written beyond the
//! committed cursor is discarded by the next emit, so the final stream is exactly the bytes up to the committed
//! cursor of the top-level production.
//!
//! Tokens are pulled from a [`TokenSource`] only when the grammar first looks at them, and are cached so that
//! backtracking can revisit them. When compiling source text the source is the [`Processor`] itself, so
//! preprocessing and parsing are interleaved.
//!
//! The meaning of every emitted byte is documented in the [`opcodes`] module.
//!
//! # Differences in behaviour
//! - Characters which do not form a token, and stray `#` characters, are passed to the grammar rather than
//!   dropped, so they result in a syntax error.
//! - Numeric literals are validated as they are consumed; a malformed literal such as `1e` or `09` is reported
//!   as an invalid constant instead of being emitted as-is.
//! - If the token source fails, its error is returned in preference to any message the grammar recorded, since
//!   the grammar only ever saw a truncated stream.

mod grammar;
pub mod opcodes;

use crate::{
	error::Error,
	lexer::Token,
	pool::Symbol,
	preprocessor::Processor,
	Context,
};
use bitflags::bitflags;
use fnv::FnvHashMap;
use log::{debug, trace};

/// The stage of the pipeline a shader is compiled for.
///
/// The discriminants are the values the code generator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
	Fragment = 1,
	Vertex = 2,
}

bitflags! {
	/// Toggles which change the accepted grammar.
	pub struct ParseFlags: u8 {
		/// Accept the syntax only valid in the built-in library source: `__constructor`, `__operator`, `__asm`,
		/// `__fixed_input` and `__fixed_output`.
		const BUILTIN_SYNTAX = 1;
		/// The `GL_ARB_fragment_coord_conventions` extension is enabled, making `layout` qualifiers available.
		/// Toggled by `#extension` tokens in the stream.
		const FRAGMENT_COORD_CONVENTIONS = 2;
	}
}

/// A producer of preprocessed tokens.
///
/// Once a source has returned [`Token::Eof`] it must keep returning it.
pub trait TokenSource {
	/// Returns the next token.
	fn next_token(&mut self, ctx: &mut Context) -> Result<Token, Error>;
}

impl TokenSource for Processor {
	fn next_token(&mut self, ctx: &mut Context) -> Result<Token, Error> {
		Processor::next_token(self, ctx)
	}
}

/// A [`TokenSource`] over an already preprocessed token slice.
///
/// Reading past the end of the slice produces [`Token::Eof`].
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
	tokens: &'a [Token],
	cursor: usize,
}

impl<'a> SliceSource<'a> {
	pub fn new(tokens: &'a [Token]) -> Self {
		Self { tokens, cursor: 0 }
	}
}

impl TokenSource for SliceSource<'_> {
	fn next_token(&mut self, _ctx: &mut Context) -> Result<Token, Error> {
		match self.tokens.get(self.cursor) {
			Some(token) => {
				self.cursor += 1;
				Ok(*token)
			}
			None => Ok(Token::Eof),
		}
	}
}

/// Parses a whole translation unit, returning the opcode stream.
///
/// On failure the error is either the error of the token source, or [`Error::Parse`] carrying the first message
/// the grammar recorded.
pub(crate) fn parse<S: TokenSource>(
	ctx: &mut Context,
	source: S,
	stage: ShaderStage,
	allow_builtin_syntax: bool,
) -> Result<Vec<u8>, Error> {
	let mut flags = ParseFlags::empty();
	flags.set(ParseFlags::BUILTIN_SYNTAX, allow_builtin_syntax);

	let mut parser = Parser::new(ctx, source, stage, flags);
	let mut ps = ParseState::default();
	match parser.translation_unit(&mut ps) {
		Ok(()) => {
			let mut out = parser.out;
			out.truncate(ps.out);
			debug!("emitted {} opcode bytes", out.len());
			Ok(out)
		}
		Err(NoMatch) => Err(parser.into_error()),
	}
}

/// A production did not match the input at the given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NoMatch;

/// The result of a production. The state is only advanced on `Ok`, unless the production says otherwise.
pub(crate) type Res = Result<(), NoMatch>;

/// Cursors into the token cache and the output buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParseState {
	input: usize,
	out: usize,
}

crate::dictionary! {
	/// Keywords the grammar matches against.
	pub(crate) struct Dict {
		void => "void",
		invariant => "invariant",
		centroid => "centroid",
		precision => "precision",
		lowp => "lowp",
		mediump => "mediump",
		highp => "highp",
		const_ => "const",
		attribute => "attribute",
		varying => "varying",
		uniform => "uniform",
		fixed_output => "__fixed_output",
		fixed_input => "__fixed_input",
		in_ => "in",
		out => "out",
		inout => "inout",
		layout => "layout",
		origin_upper_left => "origin_upper_left",
		pixel_center_integer => "pixel_center_integer",
		struct_ => "struct",
		constructor => "__constructor",
		operator => "__operator",
		asm => "__asm",
		if_ => "if",
		else_ => "else",
		for_ => "for",
		while_ => "while",
		do_ => "do",
		continue_ => "continue",
		break_ => "break",
		return_ => "return",
		discard => "discard",
		false_ => "false",
		true_ => "true",
		all => "all",
		fragment_coord_conventions => "GL_ARB_fragment_coord_conventions",
	}
}

/// The built-in type names and their type specifier codes.
const TYPE_SPECIFIERS: &[(&str, u8)] = {
	use opcodes::*;
	&[
		("void", TYPE_SPECIFIER_VOID),
		("bool", TYPE_SPECIFIER_BOOL),
		("bvec2", TYPE_SPECIFIER_BVEC2),
		("bvec3", TYPE_SPECIFIER_BVEC3),
		("bvec4", TYPE_SPECIFIER_BVEC4),
		("int", TYPE_SPECIFIER_INT),
		("ivec2", TYPE_SPECIFIER_IVEC2),
		("ivec3", TYPE_SPECIFIER_IVEC3),
		("ivec4", TYPE_SPECIFIER_IVEC4),
		("float", TYPE_SPECIFIER_FLOAT),
		("vec2", TYPE_SPECIFIER_VEC2),
		("vec3", TYPE_SPECIFIER_VEC3),
		("vec4", TYPE_SPECIFIER_VEC4),
		("mat2", TYPE_SPECIFIER_MAT2),
		("mat3", TYPE_SPECIFIER_MAT3),
		("mat4", TYPE_SPECIFIER_MAT4),
		("mat2x3", TYPE_SPECIFIER_MAT23),
		("mat3x2", TYPE_SPECIFIER_MAT32),
		("mat2x4", TYPE_SPECIFIER_MAT24),
		("mat4x2", TYPE_SPECIFIER_MAT42),
		("mat3x4", TYPE_SPECIFIER_MAT34),
		("mat4x3", TYPE_SPECIFIER_MAT43),
		("sampler1D", TYPE_SPECIFIER_SAMPLER1D),
		("sampler2D", TYPE_SPECIFIER_SAMPLER2D),
		("sampler3D", TYPE_SPECIFIER_SAMPLER3D),
		("samplerCube", TYPE_SPECIFIER_SAMPLERCUBE),
		("sampler1DShadow", TYPE_SPECIFIER_SAMPLER1DSHADOW),
		("sampler2DShadow", TYPE_SPECIFIER_SAMPLER2DSHADOW),
		("sampler2DRect", TYPE_SPECIFIER_SAMPLER2DRECT),
		("sampler2DRectShadow", TYPE_SPECIFIER_SAMPLER2DRECTSHADOW),
		("sampler1DArray", TYPE_SPECIFIER_SAMPLER_1D_ARRAY),
		("sampler2DArray", TYPE_SPECIFIER_SAMPLER_2D_ARRAY),
		("sampler1DArrayShadow", TYPE_SPECIFIER_SAMPLER_1D_ARRAY_SHADOW),
		("sampler2DArrayShadow", TYPE_SPECIFIER_SAMPLER_2D_ARRAY_SHADOW),
	]
};

/// The types which a `precision` statement may apply to.
const PRECISION_TYPES: &[&str] = &[
	"int",
	"float",
	"sampler1D",
	"sampler2D",
	"sampler3D",
	"samplerCube",
	"sampler1DShadow",
	"sampler2DShadow",
	"sampler2DRect",
	"sampler2DRectShadow",
	"sampler1DArray",
	"sampler2DArray",
	"sampler1DArrayShadow",
	"sampler2DArrayShadow",
];

/// The parser state shared by all productions.
pub(crate) struct Parser<'a, S> {
	ctx: &'a mut Context,
	source: S,
	dict: Dict,
	/// Built-in type names to their type specifier codes.
	types: FnvHashMap<Symbol, u8>,
	/// The subset of `types` which can be given a default precision.
	precision_types: FnvHashMap<Symbol, u8>,
	/// Every significant token fetched so far.
	tokens: Vec<Token>,
	out: Vec<u8>,
	stage: ShaderStage,
	flags: ParseFlags,
	/// The first message recorded by the grammar.
	error: Option<String>,
	/// Set once the token source fails; no more tokens are fetched after that.
	source_error: Option<Error>,
}

impl<'a, S: TokenSource> Parser<'a, S> {
	fn new(
		ctx: &'a mut Context,
		source: S,
		stage: ShaderStage,
		flags: ParseFlags,
	) -> Self {
		let dict = Dict::new(&mut ctx.pool);
		let mut types = FnvHashMap::default();
		for (name, code) in TYPE_SPECIFIERS {
			types.insert(ctx.pool.intern(name), *code);
		}
		let mut precision_types = FnvHashMap::default();
		for name in PRECISION_TYPES {
			let symbol = ctx.pool.intern(name);
			if let Some(code) = types.get(&symbol) {
				precision_types.insert(symbol, *code);
			}
		}

		Self {
			ctx,
			source,
			dict,
			types,
			precision_types,
			tokens: Vec::new(),
			out: Vec::new(),
			stage,
			flags,
			error: None,
			source_error: None,
		}
	}

	fn into_error(self) -> Error {
		match (self.source_error, self.error) {
			(Some(e), _) => e,
			(None, Some(msg)) => Error::Parse(msg),
			(None, None) => Error::Parse("syntax error".to_owned()),
		}
	}

	/// Returns the significant token at `index`, pulling from the source as needed.
	///
	/// Newlines, `#line` and `#pragma` tokens carry no meaning for the grammar and are skipped here. Returns
	/// `None` once the source has failed.
	fn fetch(&mut self, index: usize) -> Option<Token> {
		while index >= self.tokens.len() {
			if self.source_error.is_some() {
				return None;
			}
			match self.source.next_token(self.ctx) {
				Ok(
					Token::Whitespace
					| Token::Newline
					| Token::Line { .. }
					| Token::PragmaOptimize(_)
					| Token::PragmaDebug(_),
				) => {}
				Ok(token) => {
					trace!("fetched {token:?}");
					self.tokens.push(token);
				}
				Err(e) => {
					debug!("token source failed: {e}");
					self.source_error = Some(e);
				}
			}
		}
		self.tokens.get(index).copied()
	}

	/// Records an error message; only the first one is kept.
	fn error(&mut self, msg: &str) {
		if self.error.is_none() {
			trace!("recorded error: {msg}");
			self.error = Some(msg.to_owned());
		}
	}

	/// Records an error message and fails.
	fn fail(&mut self, msg: &str) -> Res {
		self.error(msg);
		Err(NoMatch)
	}

	/// Writes a byte at the state's output cursor, discarding anything written beyond it. Returns the position of
	/// the byte so that it can be [patched](Self::patch) later.
	fn emit(&mut self, ps: &mut ParseState, byte: u8) -> usize {
		self.out.truncate(ps.out);
		self.out.push(byte);
		ps.out += 1;
		ps.out - 1
	}

	/// Overwrites a previously emitted byte.
	fn patch(&mut self, at: usize, byte: u8) {
		if let Some(b) = self.out.get_mut(at) {
			*b = byte;
		}
	}

	/// Writes a string followed by a `0` terminator.
	fn emit_text(&mut self, ps: &mut ParseState, symbol: Symbol) {
		let text = self.ctx.pool.resolve(symbol);
		self.out.truncate(ps.out);
		self.out.extend_from_slice(text.as_bytes());
		self.out.push(0);
		ps.out = self.out.len();
	}

	fn is_builtin(&self) -> bool {
		self.flags.contains(ParseFlags::BUILTIN_SYNTAX)
	}

	/// Consumes the given token.
	fn token(&mut self, ps: &mut ParseState, token: Token) -> Res {
		if self.fetch(ps.input) == Some(token) {
			ps.input += 1;
			Ok(())
		} else {
			Err(NoMatch)
		}
	}

	/// Consumes the given keyword.
	fn keyword(&mut self, ps: &mut ParseState, keyword: Symbol) -> Res {
		self.token(ps, Token::Identifier(keyword))
	}

	/// Returns the identifier at the cursor without consuming it.
	fn peek_identifier(&mut self, ps: &ParseState) -> Option<Symbol> {
		match self.fetch(ps.input) {
			Some(Token::Identifier(symbol)) => Some(symbol),
			_ => None,
		}
	}

	/// Consumes any identifier, emitting its name.
	fn identifier(&mut self, ps: &mut ParseState) -> Res {
		let symbol = self.peek_identifier(ps).ok_or(NoMatch)?;
		ps.input += 1;
		self.emit_text(ps, symbol);
		Ok(())
	}

	/// Consumes a floating-point literal, emitting its text.
	fn float(&mut self, ps: &mut ParseState) -> Res {
		let symbol = match self.fetch(ps.input) {
			Some(Token::Float(symbol)) => symbol,
			_ => return Err(NoMatch),
		};
		if !crate::literal::is_valid_float(self.ctx.pool.resolve(symbol)) {
			return self.fail("invalid floating-point constant");
		}
		ps.input += 1;
		self.emit(ps, opcodes::LITERAL_NUMBER);
		self.emit_text(ps, symbol);
		Ok(())
	}

	/// Consumes an integer literal, emitting its text.
	fn uint(&mut self, ps: &mut ParseState) -> Res {
		let symbol = match self.fetch(ps.input) {
			Some(Token::Uint(symbol)) => symbol,
			_ => return Err(NoMatch),
		};
		if !crate::literal::is_valid_integer(self.ctx.pool.resolve(symbol)) {
			return self.fail("invalid integer constant");
		}
		ps.input += 1;
		self.emit(ps, opcodes::LITERAL_NUMBER);
		self.emit_text(ps, symbol);
		Ok(())
	}
}
