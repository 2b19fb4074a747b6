//! Line-oriented command parser.
//!
//! ## Grammar
//!
//! ```text
//! Insert         <id> <price> [<category> ...] <terminator>
//! Find           <id>
//! Delete         <id>
//! FindMinPrice   <category>
//! FindMaxPrice   <category>
//! FindPriceRange <category> <lo price> <hi price>
//! PriceHike      <lo id> <hi id> <percent>
//! ```
//!
//! Tokens are separated by whitespace. Prices are decimal strings such as
//! `12.34`, truncated to cents. Extra trailing tokens are ignored.

use std::num::ParseIntError;

use thiserror::Error;

use crate::types::price::to_fixed;
use crate::types::{CategoryId, ItemId, Price};

/// Errors produced while parsing a command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{command}` is missing its {argument}")]
    MissingArgument {
        command: String,
        argument: &'static str,
    },

    #[error("invalid integer `{token}`")]
    InvalidInteger {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid price `{0}`")]
    InvalidPrice(String),
}

/// One catalog operation read from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create or update an item.
    /// `categories: None` is a price-only update.
    Insert {
        id: ItemId,
        price: Price,
        categories: Option<Vec<CategoryId>>,
    },
    Find {
        id: ItemId,
    },
    Delete {
        id: ItemId,
    },
    FindMinPrice {
        category: CategoryId,
    },
    FindMaxPrice {
        category: CategoryId,
    },
    FindPriceRange {
        category: CategoryId,
        lo: Price,
        hi: Price,
    },
    /// `percent` is kept signed; out-of-range values are rejected by the
    /// catalog as a no-op.
    PriceHike {
        lo: ItemId,
        hi: ItemId,
        percent: i64,
    },
}

impl Command {
    /// Parse one input line.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    ///
    /// # Example
    ///
    /// ```
    /// use aisle_catalog::command::Command;
    ///
    /// let cmd = Command::parse("Insert 7 12.50 3 9 0").unwrap();
    /// assert_eq!(
    ///     cmd,
    ///     Some(Command::Insert { id: 7, price: 1_250, categories: Some(vec![3, 9]) })
    /// );
    ///
    /// assert_eq!(Command::parse("# comment").unwrap(), None);
    /// ```
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let args = Args {
            command: tokens[0],
            tokens: &tokens[1..],
        };

        let command = match args.command {
            "Insert" => {
                let id = args.integer(0, "id")?;
                let price = args.price(1, "price")?;
                // The last token terminates the category list
                if args.tokens.len() < 3 {
                    return Err(args.missing("terminator"));
                }
                let names = &args.tokens[2..args.tokens.len() - 1];
                let categories = if names.is_empty() {
                    None
                } else {
                    let categories: Vec<CategoryId> = names
                        .iter()
                        .map(|token| parse_integer(token))
                        .collect::<Result<_, _>>()?;
                    Some(categories)
                };
                Command::Insert { id, price, categories }
            }
            "Find" => Command::Find {
                id: args.integer(0, "id")?,
            },
            "Delete" => Command::Delete {
                id: args.integer(0, "id")?,
            },
            "FindMinPrice" => Command::FindMinPrice {
                category: args.integer(0, "category")?,
            },
            "FindMaxPrice" => Command::FindMaxPrice {
                category: args.integer(0, "category")?,
            },
            "FindPriceRange" => Command::FindPriceRange {
                category: args.integer(0, "category")?,
                lo: args.price(1, "low price")?,
                hi: args.price(2, "high price")?,
            },
            "PriceHike" => Command::PriceHike {
                lo: args.integer(0, "low id")?,
                hi: args.integer(1, "high id")?,
                percent: args.integer(2, "percent")?,
            },
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };

        Ok(Some(command))
    }

    /// Command keyword as it appears in the input
    pub fn name(&self) -> &'static str {
        match self {
            Command::Insert { .. } => "Insert",
            Command::Find { .. } => "Find",
            Command::Delete { .. } => "Delete",
            Command::FindMinPrice { .. } => "FindMinPrice",
            Command::FindMaxPrice { .. } => "FindMaxPrice",
            Command::FindPriceRange { .. } => "FindPriceRange",
            Command::PriceHike { .. } => "PriceHike",
        }
    }
}

/// Positional arguments following the command keyword
struct Args<'a> {
    command: &'a str,
    tokens: &'a [&'a str],
}

impl<'a> Args<'a> {
    fn token(&self, position: usize, argument: &'static str) -> Result<&'a str, ParseError> {
        self.tokens
            .get(position)
            .copied()
            .ok_or_else(|| self.missing(argument))
    }

    fn integer<T>(&self, position: usize, argument: &'static str) -> Result<T, ParseError>
    where
        T: std::str::FromStr<Err = ParseIntError>,
    {
        parse_integer(self.token(position, argument)?)
    }

    fn price(&self, position: usize, argument: &'static str) -> Result<Price, ParseError> {
        let token = self.token(position, argument)?;
        to_fixed(token).ok_or_else(|| ParseError::InvalidPrice(token.to_string()))
    }

    fn missing(&self, argument: &'static str) -> ParseError {
        ParseError::MissingArgument {
            command: self.command.to_string(),
            argument,
        }
    }
}

fn parse_integer<T>(token: &str) -> Result<T, ParseError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    token.parse().map_err(|source| ParseError::InvalidInteger {
        token: token.to_string(),
        source,
    })
}
