use std::collections::BTreeMap;

use smol_str::SmolStr;

/// Region known to the encoder after the first pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Position in declaration order.
    pub index: u32,
    /// Content size from the layout oracle, before any padding.
    pub provisional_size: u64,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<SmolStr, Symbol>,
}

impl SymbolTable {
    /// Insert the symbol, unless one with the same name exists.
    ///
    /// Returns the rejected symbol when the name is taken.
    #[inline]
    pub fn add_symbol(&mut self, symbol: Symbol) -> Result<(), Symbol> {
        if self.symbols.contains_key(&symbol.name) {
            return Err(symbol);
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    #[inline]
    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    #[inline]
    pub fn contains_symbol(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
