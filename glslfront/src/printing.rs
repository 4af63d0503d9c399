//! Reconstructing text from token streams.
//!
//! This is not a pretty-printer; the output only needs to retokenize to the same stream. It is used by the
//! `process` command, by `#error` to build its message, and throughout the tests to compare token streams against
//! readable strings.

use crate::{lexer::Token, pool::StringPool, Context};

/// Returns the source text of a single token.
///
/// Structured directive tokens produce the directive which would recreate them, e.g. `#line 4 0`.
pub fn token_text(pool: &StringPool, token: &Token) -> String {
	match token {
		Token::Identifier(s) | Token::Uint(s) | Token::Float(s) => {
			pool.resolve(*s).to_owned()
		}
		Token::Other(c) => c.to_string(),
		Token::PragmaOptimize(on) => {
			format!("#pragma optimize({})", on_off(*on))
		}
		Token::PragmaDebug(on) => format!("#pragma debug({})", on_off(*on)),
		Token::ExtensionRequire(s) => extension(pool, *s, "require"),
		Token::ExtensionEnable(s) => extension(pool, *s, "enable"),
		Token::ExtensionWarn(s) => extension(pool, *s, "warn"),
		Token::ExtensionDisable(s) => extension(pool, *s, "disable"),
		Token::Line { line, file } => format!("#line {line} {file}"),
		Token::Whitespace => " ".to_owned(),
		Token::Newline => "\n".to_owned(),
		Token::Eof => String::new(),
		t => t.spelling().unwrap_or_default().to_owned(),
	}
}

fn on_off(on: bool) -> &'static str {
	if on {
		"on"
	} else {
		"off"
	}
}

fn extension(
	pool: &StringPool,
	name: crate::pool::Symbol,
	behaviour: &str,
) -> String {
	format!("#extension {} : {behaviour}", pool.resolve(name))
}

/// Returns whether the token stands for a whole directive line.
fn is_directive(token: &Token) -> bool {
	matches!(
		token,
		Token::PragmaOptimize(_)
			| Token::PragmaDebug(_)
			| Token::ExtensionRequire(_)
			| Token::ExtensionEnable(_)
			| Token::ExtensionWarn(_)
			| Token::ExtensionDisable(_)
			| Token::Line { .. }
	)
}

/// Renders a token stream as text.
///
/// Tokens on the same line are separated by a single space and each [`Newline`](Token::Newline) ends a line;
/// lines without any tokens are left out. Directive tokens are written on a line of their own. Whitespace and
/// [`Eof`](Token::Eof) tokens produce nothing.
///
/// # Examples
/// ```rust
/// # use glslfront::{printing::render_tokens, Context};
/// let mut ctx = Context::new();
/// let tokens = ctx.tokenize("int  x=1;\n\n");
/// assert_eq!(render_tokens(&ctx, &tokens), "int x = 1 ;\n");
/// ```
pub fn render_tokens(ctx: &Context, tokens: &[Token]) -> String {
	let pool = ctx.pool();
	let mut out = String::new();
	let mut line = Vec::new();

	for token in tokens {
		match token {
			Token::Whitespace | Token::Eof => {}
			Token::Newline => {
				if !line.is_empty() {
					out.push_str(&line.join(" "));
					out.push('\n');
					line.clear();
				}
			}
			t if is_directive(t) => {
				if !line.is_empty() {
					out.push_str(&line.join(" "));
					out.push('\n');
					line.clear();
				}
				out.push_str(&token_text(pool, t));
				out.push('\n');
			}
			t => line.push(token_text(pool, t)),
		}
	}
	out.push_str(&line.join(" "));
	out
}
