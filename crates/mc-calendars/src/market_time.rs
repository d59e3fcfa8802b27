//! Named points in a trading session.

use std::borrow::{Borrow, Cow};
use std::str::FromStr;

use mc_core::config_ensure;
use mc_core::errors::{Error, Result};

/// Names that collide with the accessors of a calendar definition.
pub const RESERVED_NAMES: &[&str] = &[
    "name",
    "aliases",
    "timezone",
    "weekmask",
    "open_time",
    "close_time",
    "special_opens",
    "special_opens_adhoc",
    "special_closes",
    "special_closes_adhoc",
    "holidays",
    "schedule",
];

/// A named market time such as `market_open` or `break_start`.
///
/// `open` and `close` are accepted as spellings of `market_open` and
/// `market_close`; every other name is kept as given.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarketTime(Cow<'static, str>);

impl MarketTime {
    /// Regular session open.
    pub const OPEN: MarketTime = MarketTime(Cow::Borrowed("market_open"));
    /// Regular session close.
    pub const CLOSE: MarketTime = MarketTime(Cow::Borrowed("market_close"));
    /// Start of the intraday break.
    pub const BREAK_START: MarketTime = MarketTime(Cow::Borrowed("break_start"));
    /// End of the intraday break.
    pub const BREAK_END: MarketTime = MarketTime(Cow::Borrowed("break_end"));
    /// Pre-market session start.
    pub const PRE: MarketTime = MarketTime(Cow::Borrowed("pre"));
    /// Post-market session end.
    pub const POST: MarketTime = MarketTime(Cow::Borrowed("post"));

    /// Validate and normalize a market-time name.
    ///
    /// Names are lower-case identifiers (`[a-z][a-z0-9_]*`) that are not
    /// in [`RESERVED_NAMES`].
    pub fn new(name: &str) -> Result<Self> {
        match name {
            "open" | "market_open" => return Ok(Self::OPEN),
            "close" | "market_close" => return Ok(Self::CLOSE),
            _ => {}
        }
        let mut chars = name.chars();
        let well_formed = chars.next().is_some_and(|c| c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        config_ensure!(well_formed, "invalid market time name {name:?}");
        config_ensure!(
            !RESERVED_NAMES.contains(&name),
            "market time name {name:?} is reserved"
        );
        Ok(MarketTime(Cow::Owned(name.to_owned())))
    }

    /// The canonical name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return `true` for `market_open`.
    pub fn is_open(&self) -> bool {
        *self == Self::OPEN
    }

    /// Return `true` for `market_close`.
    pub fn is_close(&self) -> bool {
        *self == Self::CLOSE
    }
}

impl FromStr for MarketTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MarketTime::new(s)
    }
}

impl Borrow<str> for MarketTime {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MarketTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}
