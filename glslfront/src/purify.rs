//! The source purifier.
//!
//! This is the first stage of the front end. It operates on raw text and produces text in which:
//! - every `\r\n`, `\n\r`, `\r` and `\n` sequence has become a single `\n`,
//! - every backslash immediately followed by a newline has been removed together with that newline,
//! - line comments have been removed (their terminating newline is kept),
//! - block comments have been replaced by whitespace, keeping any newlines they contained.
//!
//! Running the purifier over its own output is a no-op.

use crate::error::PurifyError;

/// Options controlling how comments are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurifyOptions {
	/// Replace a block comment by as many spaces as the columns it occupied, rather than a single space.
	pub preserve_columns: bool,
	/// The width of a tab stop, used to count columns when `preserve_columns` is set.
	pub tab_width: u8,
}

impl Default for PurifyOptions {
	fn default() -> Self {
		Self {
			preserve_columns: false,
			tab_width: 4,
		}
	}
}

/// Purifies a GLSL source string.
///
/// # Examples
/// ```rust
/// # use glslfront::purify::{purify, PurifyOptions};
/// let src = "float a; // comment\r\nfloat /* x */ b;";
/// let out = purify(src, &PurifyOptions::default()).unwrap();
/// assert_eq!(out, "float a; \nfloat   b;");
/// ```
pub fn purify(
	input: &str,
	options: &PurifyOptions,
) -> Result<String, PurifyError> {
	let mut reader = Reader::new(input);
	let mut out = String::with_capacity(input.len());
	let tab_width = options.tab_width.max(1) as usize;
	// The display column of the next character written to `out`.
	let mut column = 0;

	while let Some(c) = reader.next() {
		match c {
			'/' if reader.peek() == Some('/') => {
				while let Some(c) = reader.peek() {
					if c == '\n' {
						break;
					}
					reader.next();
				}
			}
			'/' if reader.peek() == Some('*') => {
				reader.next();

				// The columns covered by the comment on the line it currently spans.
				let mut start = column;
				let mut end = column + 2;
				let mut closed = false;
				while let Some(c) = reader.next() {
					match c {
						'*' if reader.peek() == Some('/') => {
							reader.next();
							end += 2;
							closed = true;
							break;
						}
						'\n' => {
							push_newline(&mut out);
							start = 0;
							end = 0;
						}
						c => end = advance_column(end, c, tab_width),
					}
				}

				if !closed {
					return Err(PurifyError::UnterminatedComment {
						line: reader.line,
					});
				}

				if options.preserve_columns {
					out.extend(std::iter::repeat(' ').take(end - start));
					column = end;
				} else {
					out.push(' ');
					column = start + 1;
				}
			}
			'\n' => {
				push_newline(&mut out);
				column = 0;
			}
			c => {
				out.push(c);
				column = advance_column(column, c, tab_width);
			}
		}
	}

	Ok(out)
}

/// Ends the current line.
///
/// Once a comment has been removed, a backslash can end up directly before a newline. A space is put between the
/// two so that purifying the output again doesn't join the lines.
fn push_newline(out: &mut String) {
	if out.ends_with('\\') {
		out.push(' ');
	}
	out.push('\n');
}

/// Returns the column after `c` is displayed at `column`.
fn advance_column(column: usize, c: char, tab_width: usize) -> usize {
	if c == '\t' {
		(column / tab_width + 1) * tab_width
	} else {
		column + 1
	}
}

/// Yields the characters of the source with newlines normalized and line-continuations removed.
struct Reader {
	chars: Vec<char>,
	cursor: usize,
	/// The current physical line, starting at 1.
	line: u32,
}

impl Reader {
	fn new(source: &str) -> Self {
		Self {
			chars: source.chars().collect(),
			cursor: 0,
			line: 1,
		}
	}

	/// Returns the length of the newline sequence starting at `idx`, if there is one.
	fn newline_len(&self, idx: usize) -> Option<usize> {
		match (self.chars.get(idx), self.chars.get(idx + 1)) {
			(Some('\r'), Some('\n')) | (Some('\n'), Some('\r')) => Some(2),
			(Some('\r'), _) | (Some('\n'), _) => Some(1),
			_ => None,
		}
	}

	fn next(&mut self) -> Option<char> {
		loop {
			let c = *self.chars.get(self.cursor)?;

			if let Some(len) = self.newline_len(self.cursor) {
				self.cursor += len;
				self.line += 1;
				return Some('\n');
			}

			if c == '\\' {
				if let Some(len) = self.newline_len(self.cursor + 1) {
					self.cursor += 1 + len;
					self.line += 1;
					continue;
				}
			}

			self.cursor += 1;
			return Some(c);
		}
	}

	fn peek(&self) -> Option<char> {
		let mut cursor = self.cursor;
		loop {
			let c = *self.chars.get(cursor)?;
			if self.newline_len(cursor).is_some() {
				return Some('\n');
			}
			if c == '\\' {
				if let Some(len) = self.newline_len(cursor + 1) {
					cursor += 1 + len;
					continue;
				}
			}
			return Some(c);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{purify, PurifyOptions};
	use crate::error::PurifyError;

	macro_rules! assert_purify {
		($src:expr, $out:expr) => {
			assert_eq!(purify($src, &PurifyOptions::default()), Ok($out.into()));
		};
	}

	#[test]
	fn newlines() {
		assert_purify!("a\r\nb", "a\nb");
		assert_purify!("a\n\rb", "a\nb");
		assert_purify!("a\rb", "a\nb");
		assert_purify!("a\n\r\nb", "a\n\nb");
		assert_purify!("a\r\r\nb", "a\n\nb");
	}

	#[test]
	fn continuations() {
		assert_purify!("ab\\\ncd", "abcd");
		assert_purify!("ab\\\r\ncd", "abcd");
		assert_purify!("a\\\n\\\nb", "ab");
		// Whitespace between the backslash and the newline breaks the continuation.
		assert_purify!("a\\ \nb", "a\\ \nb");
		assert_purify!("a\\b", "a\\b");
	}

	#[test]
	fn line_comments() {
		assert_purify!("a // b\nc", "a \nc");
		assert_purify!("a //b", "a ");
		assert_purify!("a // b \\\n c\nd", "a \nd");
		assert_purify!("a / b", "a / b");
	}

	#[test]
	fn block_comments() {
		assert_purify!("a/* b */c", "a c");
		assert_purify!("a/* b\n\nc */d", "a\n\n d");
		assert_purify!("a/**/b", "a b");
		assert_purify!("a/* // */b", "a b");
		assert_purify!("a// /* \nb", "a\nb");
		assert_purify!("/* * / */x", " x");
		assert_purify!("a\\/*\n*/b", "a\\ \n b");
		assert_purify!("a\\// x\nb", "a\\ \nb");
	}

	#[test]
	fn unterminated() {
		assert_eq!(
			purify("a\nb /* c\nd", &PurifyOptions::default()),
			Err(PurifyError::UnterminatedComment { line: 3 })
		);
		assert_eq!(
			purify("/*", &PurifyOptions::default()),
			Err(PurifyError::UnterminatedComment { line: 1 })
		);
	}

	#[test]
	fn preserve_columns() {
		let options = PurifyOptions {
			preserve_columns: true,
			tab_width: 4,
		};
		assert_eq!(purify("a/*bc*/d", &options), Ok("a      d".into()));
		assert_eq!(purify("a/*\nxy*/d", &options), Ok("a\n    d".into()));
		assert_eq!(purify("/*\t*/d", &options), Ok("      d".into()));
	}

	#[test]
	fn idempotent() {
		let sources = [
			"void main() {\n\tgl_FragColor = vec4(1.0);\n}\n",
			"#define A 1 /* x */ \n// y\nA\r\n",
			"a\\b\\ \nc",
			"a\\/*\n*/b",
			"a\\// x\nb",
			"x\\/* 1 */\\/*\n\n*/\\\n",
		];
		for src in sources {
			let once = purify(src, &PurifyOptions::default()).unwrap();
			let twice = purify(&once, &PurifyOptions::default()).unwrap();
			assert_eq!(once, twice);
		}
	}
}
