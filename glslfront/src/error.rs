//! All error types that can be emitted.
//!
//! Every stage of the front end fails by returning an [`Error`]. The top-level enum has one variant per stage,
//! each wrapping a stage-specific enum; the `Display` implementations produce the message that is surfaced
//! through [`Context::error_message()`](crate::Context::error_message).

use std::fmt;

/// An error produced by any stage of the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// Errors from the source purifier.
	Purify(PurifyError),
	/// Errors from directive processing.
	Directive(DirectiveError),
	/// Errors from invoking a function-like macro.
	Macro(MacroError),
	/// Errors from evaluating an `#if`/`#elif` expression.
	Eval(EvalError),
	/// A grammar error; this is the first message the parser recorded.
	Parse(String),
	/// The embedder configured the context incorrectly.
	Config(ConfigError),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Purify(e) => write!(f, "{e}"),
			Error::Directive(e) => write!(f, "{e}"),
			Error::Macro(e) => write!(f, "{e}"),
			Error::Eval(e) => write!(f, "{e}"),
			Error::Parse(msg) => write!(f, "{msg}"),
			Error::Config(e) => write!(f, "{e}"),
		}
	}
}

/// Errors emitted by the source purifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurifyError {
	/// ERROR - Reached the end of the source string whilst inside a block comment.
	///
	/// - `line` - the line the input ended on.
	UnterminatedComment { line: u32 },
}

impl fmt::Display for PurifyError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PurifyError::UnterminatedComment { line } => {
				write!(f, "expected `*/' before end of input (line {line})")
			}
		}
	}
}

/// Errors emitted whilst processing preprocessor directives.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DirectiveError {
	/* GENERAL */
	/// ERROR - Found a directive name that is not recognised, in an active region. E.g. `#foo`.
	UnknownDirective,
	/// ERROR - Found tokens after the end of a directive which takes no further arguments. E.g.
	/// `#line 5 0 foo`.
	TrailingTokens,
	/// ERROR - Found a `#version` directive after the version block at the top of the source.
	MisplacedVersion,
	/// ERROR - The `#version` directive is not followed by a decimal integer.
	ExpectedVersionNumber,
	/// ERROR - The user aborted with an `#error` directive.
	///
	/// - `0` - the reconstructed text of the directive line.
	User(String),

	/* DEFINE */
	/// ERROR - Expected an identifier. E.g. `#define 5`, `#undef`, `#ifdef (`.
	ExpectedIdentifier,
	/// ERROR - The macro name starts with `GL_` or contains `__`.
	///
	/// - `0` - the macro name.
	ReservedName(String),
	/// ERROR - The parameter list of a function-like macro is malformed. E.g. `#define F(a b)`.
	ExpectedCommaOrRParen,

	/* CONDITIONALS */
	/// ERROR - The operand of `defined` opens a parenthesis which is not closed. E.g. `#if defined(A`.
	ExpectedRParen,
	/// ERROR - Found an `#elif`, `#else` or `#endif` without a preceding `#if`.
	NoMatchingIf,
	/// ERROR - Found an `#elif` after the `#else` of the same chain.
	ElifAfterElse,
	/// ERROR - Found a second `#else` in the same chain.
	DuplicateElse,
	/// ERROR - Conditional directives are nested deeper than the configured maximum.
	NestingTooDeep,
	/// ERROR - Reached the end of input with conditional directives still open.
	ExpectedEndif,

	/* EXTENSION */
	/// ERROR - Expected an extension name after `#extension`.
	ExpectedExtensionName,
	/// ERROR - Expected a `:` between the extension name and the behaviour.
	ExpectedColon,
	/// ERROR - The behaviour is not one of `require`, `enable`, `warn`, `disable`.
	ExpectedBehaviour,
	/// ERROR - The pseudo-extension `all` may only be used with `warn` or `disable`.
	InvalidBehaviourForAll,
	/// ERROR - An extension that the implementation doesn't support was required.
	///
	/// - `0` - the extension name.
	UnsupportedExtension(String),

	/* LINE */
	/// ERROR - `#line` is not followed by a line number.
	ExpectedLineNumber,
	/// ERROR - The line or file number of `#line` is not a valid integer.
	InvalidLineNumber,
}

impl fmt::Display for DirectiveError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DirectiveError::UnknownDirective => {
				write!(f, "unrecognised directive name")
			}
			DirectiveError::TrailingTokens => {
				write!(f, "expected end of line")
			}
			DirectiveError::MisplacedVersion => {
				write!(f, "`#version' must occur before anything else")
			}
			DirectiveError::ExpectedVersionNumber => {
				write!(f, "expected version number after `#version'")
			}
			DirectiveError::User(msg) => write!(f, "{msg}"),
			DirectiveError::ExpectedIdentifier => {
				write!(f, "expected an identifier")
			}
			DirectiveError::ReservedName(name) => {
				write!(f, "macro name `{name}' is reserved")
			}
			DirectiveError::ExpectedCommaOrRParen => {
				write!(f, "expected `,' or `)'")
			}
			DirectiveError::ExpectedRParen => write!(f, "expected `)'"),
			DirectiveError::NoMatchingIf => write!(f, "no matching `#if'"),
			DirectiveError::ElifAfterElse => {
				write!(f, "`#elif' directive after `#else'")
			}
			DirectiveError::DuplicateElse => {
				write!(f, "duplicate `#else' directive")
			}
			DirectiveError::NestingTooDeep => {
				write!(f, "`#if' nesting too deep")
			}
			DirectiveError::ExpectedEndif => write!(f, "expected `#endif'"),
			DirectiveError::ExpectedExtensionName => {
				write!(f, "expected an extension name")
			}
			DirectiveError::ExpectedColon => write!(f, "expected `:'"),
			DirectiveError::ExpectedBehaviour => write!(
				f,
				"expected `require', `enable', `warn' or `disable'"
			),
			DirectiveError::InvalidBehaviourForAll => write!(
				f,
				"extension `all' may only be used with `warn' or `disable'"
			),
			DirectiveError::UnsupportedExtension(name) => {
				write!(f, "extension `{name}' not supported")
			}
			DirectiveError::ExpectedLineNumber => {
				write!(f, "expected a line number")
			}
			DirectiveError::InvalidLineNumber => {
				write!(f, "invalid line number")
			}
		}
	}
}

/// Errors emitted whilst invoking a function-like macro.
///
/// Each variant carries the name of the macro being invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroError {
	/// ERROR - The macro name is not followed by an argument list.
	ExpectedLParen(String),
	/// ERROR - Reached the end of input before the closing `)` of the argument list.
	UnterminatedArguments(String),
	/// ERROR - Fewer arguments than parameters.
	TooFewArguments(String),
	/// ERROR - More arguments than parameters.
	TooManyArguments(String),
}

impl fmt::Display for MacroError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MacroError::ExpectedLParen(name) => {
				write!(f, "expected `(' after macro `{name}'")
			}
			MacroError::UnterminatedArguments(name) => {
				write!(f, "expected `)' to close arguments of macro `{name}'")
			}
			MacroError::TooFewArguments(name) => {
				write!(f, "too few arguments to macro `{name}'")
			}
			MacroError::TooManyArguments(name) => {
				write!(f, "too many arguments to macro `{name}'")
			}
		}
	}
}

/// Errors emitted whilst evaluating a conditional expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
	/// ERROR - The right-hand side of a `/` or `%` evaluated to zero.
	DivisionByZero,
	/// ERROR - A numeric literal is not a valid integer. E.g. `1.5`, `0x`, `09`.
	///
	/// - `0` - the literal text.
	InvalidInteger(String),
	/// ERROR - Expected a number, a prefix operator or `(`. This includes the empty expression.
	ExpectedOperand,
	/// ERROR - Expected a binary operator or `)` after an operand. E.g. `1 2`.
	ExpectedOperator,
	/// ERROR - Found a `(` without a matching `)` or vice versa.
	UnbalancedParens,
	/// ERROR - Found a token which cannot appear in a conditional expression. E.g. `;`.
	InvalidToken,
}

impl fmt::Display for EvalError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EvalError::DivisionByZero => write!(f, "division by zero"),
			EvalError::InvalidInteger(text) => {
				write!(f, "`{text}' is not a valid integer")
			}
			EvalError::ExpectedOperand => write!(f, "expected an operand"),
			EvalError::ExpectedOperator => write!(f, "expected an operator"),
			EvalError::UnbalancedParens => {
				write!(f, "unbalanced parentheses in expression")
			}
			EvalError::InvalidToken => {
				write!(f, "unexpected token in expression")
			}
		}
	}
}

/// Errors caused by embedder-side configuration of a [`Context`](crate::Context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
	/// ERROR - The name is not a valid identifier.
	///
	/// - `0` - the offending name.
	InvalidName(String),
	/// ERROR - The extension name is reserved by the `#extension` directive itself, i.e. `all`.
	ReservedExtensionName(String),
	/// ERROR - The maximum conditional depth must be at least one.
	InvalidDepth,
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::InvalidName(name) => {
				write!(f, "`{name}' is not a valid identifier")
			}
			ConfigError::ReservedExtensionName(name) => {
				write!(f, "extension name `{name}' is reserved")
			}
			ConfigError::InvalidDepth => {
				write!(f, "maximum conditional depth must be at least 1")
			}
		}
	}
}

impl From<PurifyError> for Error {
	fn from(e: PurifyError) -> Self {
		Error::Purify(e)
	}
}

impl From<DirectiveError> for Error {
	fn from(e: DirectiveError) -> Self {
		Error::Directive(e)
	}
}

impl From<MacroError> for Error {
	fn from(e: MacroError) -> Self {
		Error::Macro(e)
	}
}

impl From<EvalError> for Error {
	fn from(e: EvalError) -> Self {
		Error::Eval(e)
	}
}

impl From<ConfigError> for Error {
	fn from(e: ConfigError) -> Self {
		Error::Config(e)
	}
}
