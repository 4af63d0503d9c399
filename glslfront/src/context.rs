use crate::{
	error::{ConfigError, Error},
	lexer::{self, Token},
	parser::{self, ShaderStage, SliceSource},
	pool::{StringPool, Symbol},
	preprocessor::{
		self, conditional::ConditionalStack, macros::MacroTable, Keywords,
		Processor,
	},
	purify::{self, PurifyOptions},
};
use fnv::FnvHashMap;
use log::debug;

/// Configuration of a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
	/// The maximum nesting depth of conditional directives. Must be at least 1.
	pub max_conditional_depth: usize,
	/// The options used by [`Context::purify()`] and [`Context::compile()`].
	pub purify: PurifyOptions,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			max_conditional_depth: 64,
			purify: PurifyOptions::default(),
		}
	}
}

/// The state of one compile.
///
/// A context owns the string pool, the macro table, the conditional stack, the line/file counters and the
/// embedder-supplied configuration (supported extensions and predefined macros). Contexts are independent of
/// each other; use one per shader.
///
/// Every fallible method returns the error directly and also records it; the first error recorded is kept and
/// can be retrieved later with [`error_message()`](Self::error_message).
#[derive(Debug)]
pub struct Context {
	pub(crate) pool: StringPool,
	pub(crate) keywords: Keywords,
	pub(crate) macros: MacroTable,
	pub(crate) conditionals: ConditionalStack,
	/// The line currently being processed, starting at 1.
	pub(crate) line: u32,
	/// The file number, as set by `#line`.
	pub(crate) file: u32,
	/// The language version found by the `#version` scan.
	pub(crate) version: u32,
	predefined: FnvHashMap<Symbol, i64>,
	extensions: Vec<Symbol>,
	options: Options,
	error: Option<Error>,
}

impl Default for Context {
	fn default() -> Self {
		Self::new()
	}
}

impl Context {
	/// Creates a context with the default [`Options`].
	pub fn new() -> Self {
		let options = Options::default();
		let mut pool = StringPool::new();
		let keywords = Keywords::new(&mut pool);
		Self {
			pool,
			keywords,
			macros: MacroTable::default(),
			conditionals: ConditionalStack::new(options.max_conditional_depth),
			line: 1,
			file: 0,
			version: preprocessor::DEFAULT_VERSION,
			predefined: FnvHashMap::default(),
			extensions: Vec::new(),
			options,
			error: None,
		}
	}

	/// Creates a context with custom [`Options`].
	pub fn with_options(options: Options) -> Result<Self, Error> {
		if options.max_conditional_depth == 0 {
			return Err(ConfigError::InvalidDepth.into());
		}
		let mut ctx = Self::new();
		ctx.conditionals = ConditionalStack::new(options.max_conditional_depth);
		ctx.options = options;
		Ok(ctx)
	}

	pub fn options(&self) -> &Options {
		&self.options
	}

	/// Returns the first error recorded by this context.
	pub fn error(&self) -> Option<&Error> {
		self.error.as_ref()
	}

	/// Returns the message of the first error recorded by this context, or an empty string.
	pub fn error_message(&self) -> String {
		self.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
	}

	/// Interns a string into this context's pool.
	pub fn intern(&mut self, text: &str) -> Symbol {
		self.pool.intern(text)
	}

	/// Returns the text of an interned string.
	pub fn resolve(&self, symbol: Symbol) -> &str {
		self.pool.resolve(symbol)
	}

	pub fn pool(&self) -> &StringPool {
		&self.pool
	}

	/// The line counter, as used by `__LINE__`.
	pub fn line(&self) -> u32 {
		self.line
	}

	/// The file counter, as used by `__FILE__`.
	pub fn file(&self) -> u32 {
		self.file
	}

	/// The language version; 110 until a `#version` directive has been scanned.
	pub fn version(&self) -> u32 {
		self.version
	}

	/// Registers an extension the implementation supports.
	///
	/// Supported extensions can be enabled with `#extension`, count as defined macros, and expand to `1`.
	pub fn add_extension(&mut self, name: &str) -> Result<(), Error> {
		let result = if !lexer::is_identifier(name) {
			Err(ConfigError::InvalidName(name.to_owned()).into())
		} else if name == "all" {
			Err(ConfigError::ReservedExtensionName(name.to_owned()).into())
		} else {
			let symbol = self.pool.intern(name);
			if !self.extensions.contains(&symbol) {
				debug!("registered extension `{name}`");
				self.extensions.push(symbol);
			}
			Ok(())
		};
		self.record(result)
	}

	/// Returns whether an extension has been registered with [`add_extension()`](Self::add_extension).
	pub fn is_extension_supported(&self, name: Symbol) -> bool {
		self.extensions.contains(&name)
	}

	/// Defines a macro expanding to an integer, as if by `#define NAME VALUE` ahead of the source.
	///
	/// Unlike `#define`, reserved names are allowed. Defining the same name again replaces the value.
	pub fn add_predefined_macro(
		&mut self,
		name: &str,
		value: i64,
	) -> Result<(), Error> {
		let result = if lexer::is_identifier(name) {
			let symbol = self.pool.intern(name);
			self.predefined.insert(symbol, value);
			Ok(())
		} else {
			Err(ConfigError::InvalidName(name.to_owned()).into())
		};
		self.record(result)
	}

	/// Runs the source purifier with this context's [`PurifyOptions`].
	pub fn purify(&mut self, source: &str) -> Result<String, Error> {
		let result = purify::purify(source, &self.options.purify)
			.map_err(Error::from);
		self.record(result)
	}

	/// Tokenizes purified source text.
	pub fn tokenize(&mut self, source: &str) -> Vec<Token> {
		let tokens = lexer::tokenize(&mut self.pool, source);
		debug!("tokenized {} tokens", tokens.len());
		tokens
	}

	/// Scans the `#version` directives at the top of `tokens`.
	///
	/// Returns the version (110 if there is none; the last one wins if there are several) and the number of
	/// tokens consumed. The line counter is advanced past the consumed lines.
	pub fn parse_version_directive(
		&mut self,
		tokens: &[Token],
	) -> Result<(u32, usize), Error> {
		let result = preprocessor::parse_version_directive(self, tokens);
		self.record(result)
	}

	/// Runs the preprocessor over the tokens following the version block.
	///
	/// The output contains no whitespace tokens, one newline token per source line, and ends with
	/// [`Token::Eof`].
	pub fn preprocess(&mut self, tokens: &[Token]) -> Result<Vec<Token>, Error> {
		let mut processor = Processor::new(tokens.to_vec());
		let mut out = Vec::new();
		let result = loop {
			match processor.next_token(self) {
				Ok(Token::Eof) => {
					out.push(Token::Eof);
					break Ok(out);
				}
				Ok(token) => out.push(token),
				Err(e) => break Err(e),
			}
		};
		self.record(result)
	}

	/// Parses preprocessed tokens into an opcode stream.
	///
	/// `allow_builtin_syntax` unlocks the constructs only valid in the built-in library source.
	pub fn parse(
		&mut self,
		tokens: &[Token],
		stage: ShaderStage,
		allow_builtin_syntax: bool,
	) -> Result<Vec<u8>, Error> {
		let result = parser::parse(
			self,
			SliceSource::new(tokens),
			stage,
			allow_builtin_syntax,
		);
		self.record(result)
	}

	/// Runs every stage over raw source text, pulling preprocessed tokens lazily into the parser.
	pub fn compile(
		&mut self,
		source: &str,
		stage: ShaderStage,
		allow_builtin_syntax: bool,
	) -> Result<Vec<u8>, Error> {
		let result = self.compile_inner(source, stage, allow_builtin_syntax);
		self.record(result)
	}

	fn compile_inner(
		&mut self,
		source: &str,
		stage: ShaderStage,
		allow_builtin_syntax: bool,
	) -> Result<Vec<u8>, Error> {
		let text = purify::purify(source, &self.options.purify)?;
		let tokens = self.tokenize(&text);
		let (version, consumed) =
			preprocessor::parse_version_directive(self, &tokens)?;
		debug!("compiling {stage:?} shader, version {version}");
		let processor = Processor::new(tokens[consumed..].to_vec());
		parser::parse(self, processor, stage, allow_builtin_syntax)
	}

	/// Returns the value of a macro which is not defined by the source: `__LINE__`, `__FILE__` and
	/// `__VERSION__`, then the embedder's predefined macros, then supported extensions.
	pub(crate) fn builtin_macro_value(&self, name: Symbol) -> Option<i64> {
		if name == self.keywords.line_macro {
			Some(self.line as i64)
		} else if name == self.keywords.file_macro {
			Some(self.file as i64)
		} else if name == self.keywords.version_macro {
			Some(self.version as i64)
		} else if let Some(value) = self.predefined.get(&name) {
			Some(*value)
		} else if self.extensions.contains(&name) {
			Some(1)
		} else {
			None
		}
	}

	/// Returns whether `name` is defined for the purposes of `defined`, `#ifdef` and `#ifndef`.
	pub(crate) fn is_defined(&self, name: Symbol) -> bool {
		self.builtin_macro_value(name).is_some() || self.macros.contains(name)
	}

	/// Keeps the first error.
	fn record<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
		if let Err(e) = &result {
			if self.error.is_none() {
				self.error = Some(e.clone());
			}
		}
		result
	}
}
