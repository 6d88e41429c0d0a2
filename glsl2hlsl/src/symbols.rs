//! Interning of identifier text

use bimap::BiHashMap;

use crate::{Error, Result};

/// Dense index of an interned identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolIndex(u32);

impl SymbolIndex {
    /// Position of this symbol in its table
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only mapping between identifier text and symbol indices
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: BiHashMap<String, SymbolIndex>,
    /// Set when at least one symbol starts with the corresponding ASCII character
    first_chars: [bool; 128],
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self {
            symbols: BiHashMap::new(),
            first_chars: [false; 128],
        }
    }
}

impl SymbolTable {
    /// Create a new, empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the existing index if it was interned before
    ///
    /// # Errors
    ///
    /// Returns an internal error if `text` is empty or not ASCII, which the lexer never produces.
    pub fn intern(&mut self, text: &str) -> Result<SymbolIndex> {
        if let Some(index) = self.symbols.get_by_left(text) {
            return Ok(*index);
        }

        let first = match text.chars().next() {
            Some(c) if text.is_ascii() => c,
            _ => return Err(Error::internal(format!("cannot intern symbol {:?}", text))),
        };

        let index = SymbolIndex(self.symbols.len() as u32);
        self.symbols.insert(text.to_owned(), index);
        self.first_chars[first as usize] = true;
        Ok(index)
    }

    /// Look up the index of `text` without interning it
    pub fn find(&self, text: &str) -> Option<SymbolIndex> {
        if !self.may_contain(text) {
            return None;
        }

        self.symbols.get_by_left(text).copied()
    }

    /// Quick probe: false when no symbol can possibly match `text`
    pub fn may_contain(&self, text: &str) -> bool {
        match text.chars().next() {
            Some(c) if c.is_ascii() => self.first_chars[c as usize],
            _ => false,
        }
    }

    /// Text of an interned symbol
    pub fn text(&self, index: SymbolIndex) -> &str {
        self.symbols
            .get_by_right(&index)
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    /// Number of interned symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Return true if no symbol was interned
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.intern("color").unwrap();
        let b = table.intern("normal").unwrap();

        assert_ne!(a, b);
        assert_eq!(table.intern("color").unwrap(), a);
        assert_eq!(table.text(b), "normal");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn indices_are_dense() {
        let mut table = SymbolTable::new();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            assert_eq!(table.intern(name).unwrap().index(), i);
        }
    }

    #[test]
    fn first_char_probe() {
        let mut table = SymbolTable::new();
        table.intern("value").unwrap();

        assert!(table.may_contain("vertex"));
        assert!(!table.may_contain("xyz"));
        assert_eq!(table.find("xyz"), None);
        assert!(table.find("value").is_some());
    }

    #[test]
    fn rejects_non_ascii() {
        let mut table = SymbolTable::new();
        assert!(table.intern("café").is_err());
        assert!(table.intern("").is_err());
        assert!(table.is_empty());
    }
}
