//! Types and functionality related to the lexer.
//!
//! This module contains the [`Token`] type shared by every later stage, and the [`tokenize()`] function which
//! turns purified source text into a flat vector of tokens. Identifiers and numbers are interned into the
//! [`StringPool`], so tokens themselves are small `Copy` values.
//!
//! # Differences in behaviour
//! - Numbers are tokenized permissively: the lexer accepts any run of digits, hex letters, one `.`, a hex prefix
//!   and an exponent sign, and classifies the result as [`Uint`](Token::Uint) or [`Float`](Token::Float) by a
//!   simple heuristic. Whether the text is actually a well-formed literal is checked by the consumers (the
//!   conditional evaluator and the parser).
//! - Any character which doesn't start a token becomes an [`Other`](Token::Other) token rather than an error.
//! - Keywords are not distinguished from identifiers; the parser recognises them by comparing interned handles.

use crate::pool::{StringPool, Symbol};

/// A token representing a unit of text in the GLSL source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
	/* PUNCTUATION */
	/// `,`
	Comma,
	/// `;`
	Semicolon,
	/// `{`
	LBrace,
	/// `}`
	RBrace,
	/// `(`
	LParen,
	/// `)`
	RParen,
	/// `[`
	LBracket,
	/// `]`
	RBracket,
	/// `.`
	Dot,
	/// `++`
	Increment,
	/// `+=`
	AddAssign,
	/// `+`
	Plus,
	/// `--`
	Decrement,
	/// `-=`
	SubAssign,
	/// `-`
	Minus,
	/// `~`
	BitNot,
	/// `!=`
	NotEqual,
	/// `!`
	Not,
	/// `*=`
	MulAssign,
	/// `*`
	Star,
	/// `/=`
	DivAssign,
	/// `/`
	Slash,
	/// `%=`
	ModAssign,
	/// `%`
	Modulo,
	/// `<<=`
	LShiftAssign,
	/// `<<`
	LShift,
	/// `<=`
	LessEqual,
	/// `<`
	Less,
	/// `>>=`
	RShiftAssign,
	/// `>>`
	RShift,
	/// `>=`
	GreaterEqual,
	/// `>`
	Greater,
	/// `==`
	Equal,
	/// `=`
	Assign,
	/// `&&`
	And,
	/// `&=`
	BitAndAssign,
	/// `&`
	BitAnd,
	/// `^^`
	Xor,
	/// `^=`
	BitXorAssign,
	/// `^`
	BitXor,
	/// `||`
	Or,
	/// `|=`
	BitOrAssign,
	/// `|`
	BitOr,
	/// `?`
	Question,
	/// `:`
	Colon,

	/* TEXT */
	/// An identifier or keyword.
	Identifier(Symbol),
	/// A number classified as an integer.
	Uint(Symbol),
	/// A number classified as floating-point.
	Float(Symbol),
	/// A character which doesn't start any other token.
	Other(char),

	/* STRUCTURED DIRECTIVES */
	/// `#pragma optimize(on|off)`.
	PragmaOptimize(bool),
	/// `#pragma debug(on|off)`.
	PragmaDebug(bool),
	/// `#extension NAME : require`.
	ExtensionRequire(Symbol),
	/// `#extension NAME : enable`.
	ExtensionEnable(Symbol),
	/// `#extension NAME : warn`.
	ExtensionWarn(Symbol),
	/// `#extension NAME : disable`.
	ExtensionDisable(Symbol),
	/// Sets the current line and file number; the line number is that of the line the token is on, so the line
	/// after the following [`Newline`](Token::Newline) is `line + 1`.
	Line { line: u32, file: u32 },
	/// The end of the token stream. Every stream ends with exactly one of these.
	Eof,

	/* INTERNAL */
	/// A run of horizontal whitespace. Only produced by the lexer; removed by the preprocessor.
	Whitespace,
	/// A line break.
	Newline,
	/// `#`
	Hash,
}

impl Token {
	/// Returns the fixed spelling of this token, if it has one.
	pub fn spelling(&self) -> Option<&'static str> {
		let s = match self {
			Token::Comma => ",",
			Token::Semicolon => ";",
			Token::LBrace => "{",
			Token::RBrace => "}",
			Token::LParen => "(",
			Token::RParen => ")",
			Token::LBracket => "[",
			Token::RBracket => "]",
			Token::Dot => ".",
			Token::Increment => "++",
			Token::AddAssign => "+=",
			Token::Plus => "+",
			Token::Decrement => "--",
			Token::SubAssign => "-=",
			Token::Minus => "-",
			Token::BitNot => "~",
			Token::NotEqual => "!=",
			Token::Not => "!",
			Token::MulAssign => "*=",
			Token::Star => "*",
			Token::DivAssign => "/=",
			Token::Slash => "/",
			Token::ModAssign => "%=",
			Token::Modulo => "%",
			Token::LShiftAssign => "<<=",
			Token::LShift => "<<",
			Token::LessEqual => "<=",
			Token::Less => "<",
			Token::RShiftAssign => ">>=",
			Token::RShift => ">>",
			Token::GreaterEqual => ">=",
			Token::Greater => ">",
			Token::Equal => "==",
			Token::Assign => "=",
			Token::And => "&&",
			Token::BitAndAssign => "&=",
			Token::BitAnd => "&",
			Token::Xor => "^^",
			Token::BitXorAssign => "^=",
			Token::BitXor => "^",
			Token::Or => "||",
			Token::BitOrAssign => "|=",
			Token::BitOr => "|",
			Token::Question => "?",
			Token::Colon => ":",
			Token::Hash => "#",
			_ => return None,
		};
		Some(s)
	}

	/// Returns a short name for the kind of this token, ignoring any payload.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Token::Identifier(_) => "identifier",
			Token::Uint(_) => "uint",
			Token::Float(_) => "float",
			Token::Other(_) => "other",
			Token::PragmaOptimize(_) => "pragma-optimize",
			Token::PragmaDebug(_) => "pragma-debug",
			Token::ExtensionRequire(_) => "extension-require",
			Token::ExtensionEnable(_) => "extension-enable",
			Token::ExtensionWarn(_) => "extension-warn",
			Token::ExtensionDisable(_) => "extension-disable",
			Token::Line { .. } => "line",
			Token::Eof => "eof",
			Token::Whitespace => "whitespace",
			Token::Newline => "newline",
			_ => "punctuation",
		}
	}

	/// Returns the identifier handle, if this is an identifier.
	pub fn as_identifier(&self) -> Option<Symbol> {
		match self {
			Token::Identifier(s) => Some(*s),
			_ => None,
		}
	}
}

/// Tokenizes a purified GLSL source string.
///
/// This lexer uses the "Maximal munch" principle to greedily create tokens, so `a<<=b` becomes `(a) (<<=) (b)`
/// and `i---7` becomes `(i) (--) (-) (7)`. The returned vector always ends with [`Token::Eof`].
///
/// # Examples
/// ```rust
/// # use glslfront::{lexer::{tokenize, Token}, pool::StringPool};
/// let mut pool = StringPool::new();
/// let tokens = tokenize(&mut pool, "x+=1;");
/// assert_eq!(tokens[1], Token::AddAssign);
/// assert_eq!(tokens.last(), Some(&Token::Eof));
/// ```
pub fn tokenize(pool: &mut StringPool, source: &str) -> Vec<Token> {
	let mut lexer = Lexer::new(source);
	let mut tokens = Vec::new();
	// Reused for every identifier and number; grows as needed.
	let mut buffer = String::new();

	while let Some(c) = lexer.peek() {
		if c == ' ' || c == '\t' || c == '\x0B' || c == '\x0C' {
			while let Some(' ' | '\t' | '\x0B' | '\x0C') = lexer.peek() {
				lexer.advance();
			}
			tokens.push(Token::Whitespace);
		} else if c == '\n' {
			lexer.advance();
			tokens.push(Token::Newline);
		} else if c == '\r' {
			lexer.advance();
			if lexer.peek() == Some('\n') {
				lexer.advance();
			}
			tokens.push(Token::Newline);
		} else if c == '#' {
			lexer.advance();
			tokens.push(Token::Hash);
		} else if is_word_start(&c) {
			buffer.clear();
			while let Some(c) = lexer.peek() {
				if !is_word(&c) {
					break;
				}
				buffer.push(c);
				lexer.advance();
			}
			tokens.push(Token::Identifier(pool.intern(&buffer)));
		} else if is_number_start(&c, lexer.lookahead_1()) {
			buffer.clear();
			let is_float = match_number(&mut lexer, &mut buffer);
			let symbol = pool.intern(&buffer);
			tokens.push(if is_float {
				Token::Float(symbol)
			} else {
				Token::Uint(symbol)
			});
		} else if is_punctuation_start(&c) {
			tokens.push(match_punctuation(&mut lexer));
		} else {
			lexer.advance();
			tokens.push(Token::Other(c));
		}
	}

	tokens.push(Token::Eof);
	tokens
}

/// A lexer which allows stepping through a source string character by character.
struct Lexer {
	/// The source string stored as a vector of characters.
	chars: Vec<char>,
	/// The index of the current character.
	cursor: usize,
}

impl Lexer {
	fn new(source: &str) -> Self {
		Lexer {
			chars: source.chars().collect(),
			cursor: 0,
		}
	}

	/// Returns the current character under the cursor, without advancing the cursor.
	fn peek(&self) -> Option<char> {
		self.chars.get(self.cursor).copied()
	}

	/// Peeks the next character without advancing the cursor.
	fn lookahead_1(&self) -> Option<char> {
		self.chars.get(self.cursor + 1).copied()
	}

	/// Advances the cursor by one.
	fn advance(&mut self) {
		self.cursor += 1;
	}

	/// Tries to match a pattern starting at the current character under the cursor.
	///
	/// If the match is successful, `true` is returned and the cursor is advanced to consume the pattern. If the
	/// match is unsuccessful, `false` is returned and the cursor stays in place.
	fn take_pat(&mut self, pat: &str) -> bool {
		let mut idx = self.cursor;
		for c in pat.chars() {
			if self.chars.get(idx) != Some(&c) {
				return false;
			}
			idx += 1;
		}
		self.cursor = idx;
		true
	}
}

/// Returns whether the character is allowed to start a word.
fn is_word_start(c: &char) -> bool {
	c.is_ascii_alphabetic() || *c == '_'
}

/// Returns whether the character is allowed to be part of a word.
fn is_word(c: &char) -> bool {
	c.is_ascii_alphanumeric() || *c == '_'
}

/// Returns whether the whole string would be tokenized as a single identifier.
pub(crate) fn is_identifier(text: &str) -> bool {
	let mut chars = text.chars();
	match chars.next() {
		Some(c) if is_word_start(&c) => chars.all(|c| is_word(&c)),
		_ => false,
	}
}

/// Returns whether the character is allowed to start a number; a `.` only does so if a digit follows.
fn is_number_start(c: &char, next: Option<char>) -> bool {
	c.is_ascii_digit()
		|| (*c == '.' && next.map_or(false, |n| n.is_ascii_digit()))
}

/// Returns whether the character is allowed to start a punctuation token.
fn is_punctuation_start(c: &char) -> bool {
	matches!(
		c,
		'=' | ',' | '.' | ';' | '(' | ')' | '[' | ']' | '{' | '}' | ':'
			| '+' | '-' | '*' | '/' | '%' | '>' | '<' | '!' | '~' | '?'
			| '&' | '|' | '^'
	)
}

/// Consumes a number into `buffer`, returning whether it should be classified as a float.
fn match_number(lexer: &mut Lexer, buffer: &mut String) -> bool {
	let mut is_hex = false;
	let mut seen_dot = false;

	while let Some(c) = lexer.peek() {
		let accept = match c {
			'0'..='9' | 'a'..='f' | 'A'..='F' => true,
			'x' | 'X' => buffer == "0",
			'.' => !seen_dot,
			'+' | '-' => !is_hex && buffer.ends_with(['e', 'E']),
			_ => false,
		};
		if !accept {
			break;
		}

		match c {
			'x' | 'X' => is_hex = true,
			'.' => seen_dot = true,
			_ => {}
		}
		buffer.push(c);
		lexer.advance();
	}

	!is_hex && buffer.contains(['.', 'e', 'E', 'f', 'F'])
}

macro_rules! match_op {
	($lexer:ident, $str:expr, $token:expr) => {
		if $lexer.take_pat($str) {
			return $token;
		}
	};
}

/// Matches a punctuation symbol, longest spelling first.
fn match_punctuation(lexer: &mut Lexer) -> Token {
	match_op!(lexer, "<<=", Token::LShiftAssign);
	match_op!(lexer, ">>=", Token::RShiftAssign);
	match_op!(lexer, "==", Token::Equal);
	match_op!(lexer, "!=", Token::NotEqual);
	match_op!(lexer, ">=", Token::GreaterEqual);
	match_op!(lexer, "<=", Token::LessEqual);
	match_op!(lexer, "&&", Token::And);
	match_op!(lexer, "||", Token::Or);
	match_op!(lexer, "^^", Token::Xor);
	match_op!(lexer, "++", Token::Increment);
	match_op!(lexer, "--", Token::Decrement);
	match_op!(lexer, "<<", Token::LShift);
	match_op!(lexer, ">>", Token::RShift);
	match_op!(lexer, "+=", Token::AddAssign);
	match_op!(lexer, "-=", Token::SubAssign);
	match_op!(lexer, "*=", Token::MulAssign);
	match_op!(lexer, "/=", Token::DivAssign);
	match_op!(lexer, "%=", Token::ModAssign);
	match_op!(lexer, "&=", Token::BitAndAssign);
	match_op!(lexer, "|=", Token::BitOrAssign);
	match_op!(lexer, "^=", Token::BitXorAssign);
	match_op!(lexer, "=", Token::Assign);
	match_op!(lexer, ";", Token::Semicolon);
	match_op!(lexer, ".", Token::Dot);
	match_op!(lexer, ",", Token::Comma);
	match_op!(lexer, "(", Token::LParen);
	match_op!(lexer, ")", Token::RParen);
	match_op!(lexer, "[", Token::LBracket);
	match_op!(lexer, "]", Token::RBracket);
	match_op!(lexer, "{", Token::LBrace);
	match_op!(lexer, "}", Token::RBrace);
	match_op!(lexer, "+", Token::Plus);
	match_op!(lexer, "-", Token::Minus);
	match_op!(lexer, "*", Token::Star);
	match_op!(lexer, "/", Token::Slash);
	match_op!(lexer, ">", Token::Greater);
	match_op!(lexer, "<", Token::Less);
	match_op!(lexer, "!", Token::Not);
	match_op!(lexer, "~", Token::BitNot);
	match_op!(lexer, "?", Token::Question);
	match_op!(lexer, ":", Token::Colon);
	match_op!(lexer, "%", Token::Modulo);
	match_op!(lexer, "&", Token::BitAnd);
	match_op!(lexer, "|", Token::BitOr);
	match_op!(lexer, "^", Token::BitXor);

	// `is_punctuation_start()` only lets through characters matched above; consume the character regardless so
	// the caller always makes progress.
	let c = lexer.peek().unwrap_or('\0');
	lexer.advance();
	Token::Other(c)
}

#[cfg(test)]
mod tests {
	use super::{tokenize, Token};
	use crate::pool::StringPool;

	/// Tokenizes `src` and describes each token as a string, so expectations don't need access to the pool.
	fn lex(src: &str) -> Vec<String> {
		let mut pool = StringPool::new();
		tokenize(&mut pool, src)
			.into_iter()
			.map(|t| match t {
				Token::Identifier(s) => format!("id:{}", pool.resolve(s)),
				Token::Uint(s) => format!("uint:{}", pool.resolve(s)),
				Token::Float(s) => format!("float:{}", pool.resolve(s)),
				Token::Other(c) => format!("other:{c}"),
				Token::Whitespace => " ".into(),
				Token::Newline => "\\n".into(),
				Token::Eof => "eof".into(),
				t => t.spelling().unwrap_or("?").into(),
			})
			.collect()
	}

	/// Asserts the described tokens of `$src` match the right hand side; the trailing EOF is implied.
	macro_rules! assert_tokens {
		($src:expr, $($token:expr),*) => {
			assert_eq!(lex($src), vec![$($token,)* "eof"]);
		};
	}

	#[test]
	fn empty() {
		assert_eq!(lex(""), vec!["eof"]);
	}

	#[test]
	fn identifiers() {
		assert_tokens!("ident", "id:ident");
		assert_tokens!("gl_something", "id:gl_something");
		assert_tokens!("_9ga", "id:_9ga");
		assert_tokens!("a b", "id:a", " ", "id:b");
		assert_tokens!("a \t b", "id:a", " ", "id:b");
	}

	#[test]
	fn integers() {
		assert_tokens!("0", "uint:0");
		assert_tokens!("1234", "uint:1234");
		assert_tokens!("0x1F", "uint:0x1F");
		assert_tokens!("0777", "uint:0777");
		// The lexer does not validate; the parser rejects these later.
		assert_tokens!("0abc", "uint:0abc");
		assert_tokens!("1u", "uint:1", "id:u");
	}

	#[test]
	fn floats() {
		assert_tokens!("1.0", "float:1.0");
		assert_tokens!(".5", "float:.5");
		assert_tokens!("5.", "float:5.");
		assert_tokens!("1e10", "float:1e10");
		assert_tokens!("1.5e-3", "float:1.5e-3");
		assert_tokens!("2E+2", "float:2E+2");
		assert_tokens!("1.0f", "float:1.0f");
		assert_tokens!("1.2.3", "float:1.2", "float:.3");
		// A sign only belongs to the number after an exponent marker.
		assert_tokens!("1+2", "uint:1", "+", "uint:2");
		assert_tokens!("0x1e+2", "uint:0x1e", "+", "uint:2");
		assert_tokens!("0x1.5", "uint:0x1.5");
	}

	#[test]
	fn punctuation() {
		assert_tokens!("<<=", "<<=");
		assert_tokens!("<<", "<<");
		assert_tokens!("<", "<");
		assert_tokens!("^^", "^^");
		assert_tokens!("^=", "^=");
		assert_tokens!("i---7", "id:i", "--", "-", "uint:7");
		assert_tokens!("a.b", "id:a", ".", "id:b");
		assert_tokens!(
			"{}[]();,?:~",
			"{", "}", "[", "]", "(", ")", ";", ",", "?", ":", "~"
		);
	}

	#[test]
	fn directives_and_other() {
		assert_tokens!("# define\n", "#", " ", "id:define", "\\n");
		assert_tokens!("@$", "other:@", "other:$");
		assert_tokens!("a\r\nb", "id:a", "\\n", "id:b");
	}

	#[test]
	fn interning() {
		let mut pool = StringPool::new();
		let tokens = tokenize(&mut pool, "foo bar foo");
		assert_eq!(tokens[0], tokens[4]);
		assert_ne!(tokens[0], tokens[2]);
	}
}
