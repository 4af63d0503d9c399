//! Validation of numeric literal text.
//!
//! The lexer classifies numbers permissively; these functions decide whether the captured text is actually a
//! well-formed GLSL literal.

/// Parses an integer literal: decimal, octal (leading `0`) or hexadecimal (`0x`/`0X` prefix).
///
/// Returns `None` if the text is malformed or doesn't fit into an `i64`.
pub fn parse_integer(text: &str) -> Option<i64> {
	let (digits, radix) = if let Some(hex) =
		text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
	{
		(hex, 16)
	} else if text.len() > 1 && text.starts_with('0') {
		(&text[1..], 8)
	} else {
		(text, 10)
	};

	if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
		return None;
	}
	i64::from_str_radix(digits, radix).ok()
}

/// Returns whether the text is a valid integer literal.
pub fn is_valid_integer(text: &str) -> bool {
	parse_integer(text).is_some()
}

/// Returns whether the text is a valid floating-point literal.
///
/// ```text
/// float    := fraction exponent? suffix? | digits exponent suffix?
/// fraction := digits '.' digits? | '.' digits
/// exponent := ('e' | 'E') ('+' | '-')? digits
/// suffix   := 'f' | 'F'
/// ```
pub fn is_valid_float(text: &str) -> bool {
	let bytes = text.as_bytes();
	let mut i = 0;

	let count_digits = |i: &mut usize| {
		let start = *i;
		while *i < bytes.len() && bytes[*i].is_ascii_digit() {
			*i += 1;
		}
		*i - start
	};

	let whole = count_digits(&mut i);
	let mut fraction = 0;
	let has_dot = i < bytes.len() && bytes[i] == b'.';
	if has_dot {
		i += 1;
		fraction = count_digits(&mut i);
	}
	if whole == 0 && fraction == 0 {
		return false;
	}

	let mut has_exponent = false;
	if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
		i += 1;
		if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
			i += 1;
		}
		if count_digits(&mut i) == 0 {
			return false;
		}
		has_exponent = true;
	}

	if !has_dot && !has_exponent {
		return false;
	}

	if i < bytes.len() && (bytes[i] == b'f' || bytes[i] == b'F') {
		i += 1;
	}
	i == bytes.len()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integers() {
		assert_eq!(parse_integer("0"), Some(0));
		assert_eq!(parse_integer("42"), Some(42));
		assert_eq!(parse_integer("017"), Some(15));
		assert_eq!(parse_integer("0x1F"), Some(31));
		assert_eq!(parse_integer("0XfF"), Some(255));
		assert_eq!(parse_integer("09"), None);
		assert_eq!(parse_integer("0x"), None);
		assert_eq!(parse_integer("0x1.5"), None);
		assert_eq!(parse_integer("1.0"), None);
		assert_eq!(parse_integer("0abc"), None);
		assert_eq!(parse_integer("99999999999999999999"), None);
	}

	#[test]
	fn floats() {
		for valid in ["1.0", ".5", "5.", "1e10", "1.5e-3", "2E+2", "1.0f", "3e2F"] {
			assert!(is_valid_float(valid), "{valid}");
		}
		for invalid in ["1", ".", "1e", "1e+", "e5", "1.0ff", "0x1.5", "1.2.3", "1f"] {
			assert!(!is_valid_float(invalid), "{invalid}");
		}
	}
}
