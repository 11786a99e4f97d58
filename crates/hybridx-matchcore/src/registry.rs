//! Per-pair books held in one registry.

use std::collections::BTreeMap;

use hybridx_types::{BookConfig, HybridxError, MarketPair, Result};

use crate::HybridBook;

/// Independent [`HybridBook`]s keyed by market pair.
#[derive(Debug, Default)]
pub struct Markets {
    books: BTreeMap<MarketPair, HybridBook>,
}

impl Markets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a book for `pair`. Each pair has at most one book.
    pub fn open(&mut self, pair: MarketPair, config: BookConfig) -> Result<&mut HybridBook> {
        if self.books.contains_key(&pair) {
            return Err(HybridxError::DuplicateMarket(pair));
        }
        let book = HybridBook::new(pair.clone(), config)?;
        Ok(self.books.entry(pair).or_insert(book))
    }

    pub fn get(&self, pair: &MarketPair) -> Result<&HybridBook> {
        self.books
            .get(pair)
            .ok_or_else(|| HybridxError::MarketNotFound(pair.clone()))
    }

    pub fn get_mut(&mut self, pair: &MarketPair) -> Result<&mut HybridBook> {
        self.books
            .get_mut(pair)
            .ok_or_else(|| HybridxError::MarketNotFound(pair.clone()))
    }

    /// Registered pairs in sorted order.
    pub fn pairs(&self) -> impl Iterator<Item = &MarketPair> + '_ {
        self.books.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
