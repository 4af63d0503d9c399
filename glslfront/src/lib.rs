//! A preprocessor and parser front end for the OpenGL Shading Language.
//!
//! This crate turns GLSL source text into a compact opcode stream meant for a separate code generator. The work
//! is split into the following stages, each of which can be driven on its own through a [`Context`]:
//!
//! 1. [`purify`] - normalizes line endings, splices continued lines and strips comments.
//! 2. [`lexer`] - turns the purified text into [`Token`](lexer::Token)s, interning identifiers and numbers into
//!    the context's [`StringPool`](pool::StringPool).
//! 3. [`preprocessor`] - reads the `#version` block, then processes directives and expands macros.
//! 4. [`parser`] - parses the preprocessed tokens and emits the opcode stream.
//!
//! [`Context::compile()`] chains all four stages, pulling tokens from the preprocessor lazily as the parser
//! needs them.
//!
//! # Examples
//! ```rust
//! use glslfront::{Context, ShaderStage};
//!
//! let mut ctx = Context::new();
//! let opcodes = ctx
//! 	.compile("void main() { gl_FragColor = vec4(1.0); }", ShaderStage::Fragment, false)
//! 	.unwrap();
//! assert_eq!(opcodes[0], glslfront::parser::opcodes::REVISION);
//! ```
//!
//! # Logging
//! The crate logs through the [`log`] facade: directive handling at the `debug` level, individual macro
//! expansions and parser token fetches at the `trace` level. Nothing is printed unless the embedder installs a
//! logger.

/// Declares a struct of interned keyword handles, together with a constructor interning each keyword into a
/// [`StringPool`](crate::pool::StringPool).
macro_rules! dictionary {
	(
		$(#[$attr:meta])*
		$vis:vis struct $name:ident {
			$($field:ident => $text:literal),* $(,)?
		}
	) => {
		$(#[$attr])*
		#[derive(Debug, Clone, Copy)]
		$vis struct $name {
			$(pub(crate) $field: $crate::pool::Symbol,)*
		}

		impl $name {
			pub(crate) fn new(pool: &mut $crate::pool::StringPool) -> Self {
				Self {
					$($field: pool.intern($text),)*
				}
			}
		}
	};
}
pub(crate) use dictionary;

mod context;
pub mod error;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod pool;
pub mod preprocessor;
pub mod printing;
pub mod purify;

pub use context::{Context, Options};
pub use error::Error;
pub use parser::ShaderStage;
