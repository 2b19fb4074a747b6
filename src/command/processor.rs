//! Runs parsed commands against a [`Catalog`] and accumulates their results.
//!
//! Every command contributes to a running total:
//!
//! | Command | Contribution |
//! |---------|--------------|
//! | Insert | 1 if created, else 0 |
//! | Delete | category checksum |
//! | FindPriceRange | item count |
//! | Find / FindMinPrice / FindMaxPrice | price in currency units, 0 if absent |
//! | PriceHike | sum of increments in currency units |

use std::io::BufRead;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::command::Command;
use crate::types::price::{fixed_to_decimal, DECIMAL_PLACES};
use crate::types::Price;

/// Drives a catalog from a command stream.
#[derive(Debug, Default)]
pub struct CommandProcessor {
    catalog: Catalog,
    total: Decimal,
    executed: u64,
    rejected: u64,
}

impl CommandProcessor {
    /// Create a processor over an existing catalog
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            total: Decimal::ZERO,
            executed: 0,
            rejected: 0,
        }
    }

    /// Get a reference to the catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Consume the processor, returning the catalog
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Unrounded running total
    #[inline]
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Running total rounded half-up to two decimals
    pub fn rounded_total(&self) -> Decimal {
        self.total
            .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Number of commands executed
    #[inline]
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Number of lines skipped because they failed to parse
    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Execute one command and add its result to the total.
    ///
    /// # Returns
    ///
    /// The command's own contribution
    ///
    /// # Example
    ///
    /// ```
    /// use aisle_catalog::catalog::Catalog;
    /// use aisle_catalog::command::{Command, CommandProcessor};
    /// use rust_decimal::Decimal;
    ///
    /// let mut processor = CommandProcessor::new(Catalog::new());
    /// processor.apply(&Command::Insert { id: 1, price: 1_999, categories: Some(vec![4]) });
    ///
    /// let found = processor.apply(&Command::FindMinPrice { category: 4 });
    /// assert_eq!(found, Decimal::new(1_999, 2));
    /// assert_eq!(processor.total(), Decimal::new(2_099, 2));
    /// ```
    pub fn apply(&mut self, command: &Command) -> Decimal {
        let catalog = &mut self.catalog;
        let result = match *command {
            Command::Insert {
                id,
                price,
                ref categories,
            } => Decimal::from(catalog.insert(id, price, categories.as_deref()).as_count()),
            Command::Find { id } => currency(catalog.find(id)),
            Command::Delete { id } => Decimal::from(catalog.delete(id)),
            Command::FindMinPrice { category } => currency(catalog.find_min_price(category)),
            Command::FindMaxPrice { category } => currency(catalog.find_max_price(category)),
            Command::FindPriceRange { category, lo, hi } => {
                Decimal::from(catalog.find_price_range(category, lo, hi))
            }
            Command::PriceHike { lo, hi, percent } => {
                // Anything outside u32 is an invalid percentage as well
                let percent = u32::try_from(percent).unwrap_or(0);
                currency(Some(catalog.price_hike(lo, hi, percent)))
            }
        };

        self.total += result;
        self.executed += 1;
        debug!(command = command.name(), %result, "command applied");
        result
    }

    /// Parse and execute one input line.
    ///
    /// Blank lines and comments are ignored. A line that fails to parse is
    /// logged and skipped.
    pub fn apply_line(&mut self, line: &str) -> Option<Decimal> {
        match Command::parse(line) {
            Ok(Some(command)) => Some(self.apply(&command)),
            Ok(None) => None,
            Err(err) => {
                self.rejected += 1;
                warn!(%err, line, "skipping malformed command");
                None
            }
        }
    }

    /// Process every line of `reader`.
    ///
    /// # Returns
    ///
    /// The rounded total after the last line
    pub fn run<R: BufRead>(&mut self, reader: R) -> std::io::Result<Decimal> {
        for line in reader.lines() {
            self.apply_line(&line?);
        }
        Ok(self.rounded_total())
    }
}

/// A price in currency units; absent prices count as zero
fn currency(price: Option<Price>) -> Decimal {
    price.map_or(Decimal::ZERO, fixed_to_decimal)
}
