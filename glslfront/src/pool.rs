//! String interning.
//!
//! Every identifier and numeric literal that passes through the front end is stored exactly once in a
//! [`StringPool`] and referred to elsewhere by a [`Symbol`]. Because the pool deduplicates, two symbols are equal
//! if and only if the text they refer to is byte-identical; this is what lets the preprocessor and the parser
//! compare keywords and macro names by handle rather than by string.

use fnv::FnvHashMap;

/// A handle to a string stored in a [`StringPool`].
///
/// The handle is the byte offset of the string within the pool's buffer. It is only meaningful for the pool
/// which produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
	/// Returns the raw offset of this handle.
	pub fn offset(self) -> u32 {
		self.0
	}
}

/// An append-only, deduplicating string store.
#[derive(Debug, Default)]
pub struct StringPool {
	/// The contents of every interned string, each followed by a NUL.
	buffer: String,
	/// The `(start, end)` byte range of each handle, keyed by the handle's offset.
	ranges: FnvHashMap<u32, u32>,
	/// Reverse index used to deduplicate on insertion.
	index: FnvHashMap<Box<str>, Symbol>,
}

impl StringPool {
	pub fn new() -> Self {
		Self::default()
	}

	/// Interns `text`, returning the existing handle if the same text was interned before.
	pub fn intern(&mut self, text: &str) -> Symbol {
		if let Some(symbol) = self.index.get(text) {
			return *symbol;
		}

		let start = self.buffer.len() as u32;
		self.buffer.push_str(text);
		let end = self.buffer.len() as u32;
		// Every entry is NUL-terminated so that even the empty string gets an offset of its own.
		self.buffer.push('\0');

		let symbol = Symbol(start);
		self.ranges.insert(start, end);
		self.index.insert(text.into(), symbol);
		symbol
	}

	/// Returns the text behind `symbol`.
	///
	/// A handle produced by a different pool resolves to an empty string rather than panicking.
	pub fn resolve(&self, symbol: Symbol) -> &str {
		match self.ranges.get(&symbol.0) {
			Some(end) => {
				&self.buffer[symbol.0 as usize..*end as usize]
			}
			None => "",
		}
	}

	/// Returns the handle of `text` if it has already been interned.
	pub fn lookup(&self, text: &str) -> Option<Symbol> {
		self.index.get(text).copied()
	}

	/// Returns the number of distinct strings in the pool.
	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}
}
