//! Static per-field source precedence and plausibility bounds.
//!
//! The table is data: changing which source wins for a field is a
//! configuration change, not a code change. It is read-only once built.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::metric::CanonicalFieldKey;

pub const NSE: &str = "nse";
pub const YAHOO: &str = "yahoo";
pub const SCREENER: &str = "screener";
pub const MONEYCONTROL: &str = "moneycontrol";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Limit {
    Inclusive(f64),
    Exclusive(f64),
    Unbounded,
}

/// Closed, open or half-open interval a plausible value must fall in.
/// Non-finite values are never plausible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: Limit,
    pub upper: Limit,
}

impl Bounds {
    pub const UNBOUNDED: Bounds = Bounds {
        lower: Limit::Unbounded,
        upper: Limit::Unbounded,
    };

    /// `[min, max]`
    pub fn closed(min: f64, max: f64) -> Self {
        Self {
            lower: Limit::Inclusive(min),
            upper: Limit::Inclusive(max),
        }
    }

    /// `(min, max)`
    pub fn open(min: f64, max: f64) -> Self {
        Self {
            lower: Limit::Exclusive(min),
            upper: Limit::Exclusive(max),
        }
    }

    /// `(min, )`
    pub fn above(min: f64) -> Self {
        Self {
            lower: Limit::Exclusive(min),
            upper: Limit::Unbounded,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let lower_ok = match self.lower {
            Limit::Inclusive(min) => value >= min,
            Limit::Exclusive(min) => value > min,
            Limit::Unbounded => true,
        };
        let upper_ok = match self.upper {
            Limit::Inclusive(max) => value <= max,
            Limit::Exclusive(max) => value < max,
            Limit::Unbounded => true,
        };
        lower_ok && upper_ok
    }

    /// True when no finite value can satisfy the bounds.
    pub fn is_empty(&self) -> bool {
        let (lo, lo_incl) = match self.lower {
            Limit::Inclusive(v) => (v, true),
            Limit::Exclusive(v) => (v, false),
            Limit::Unbounded => return false,
        };
        let (hi, hi_incl) = match self.upper {
            Limit::Inclusive(v) => (v, true),
            Limit::Exclusive(v) => (v, false),
            Limit::Unbounded => return false,
        };
        lo > hi || (lo == hi && !(lo_incl && hi_incl))
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lower {
            Limit::Inclusive(v) => write!(f, "[{}, ", v)?,
            Limit::Exclusive(v) => write!(f, "({}, ", v)?,
            Limit::Unbounded => write!(f, "(, ")?,
        }
        match self.upper {
            Limit::Inclusive(v) => write!(f, "{}]", v),
            Limit::Exclusive(v) => write!(f, "{})", v),
            Limit::Unbounded => write!(f, ")"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid interval {input:?}: {reason}")]
pub struct BoundsParseError {
    pub input: String,
    pub reason: String,
}

impl FromStr for Bounds {
    type Err = BoundsParseError;

    /// Interval notation: `[0, 10]`, `(0, 1000)`, `[0, )`, `(, 5]`.
    /// An empty side means unbounded on that side.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| BoundsParseError {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let open = chars.next().ok_or_else(|| err("empty"))?;
        let close = chars.next_back().ok_or_else(|| err("too short"))?;
        let inner = chars.as_str();

        let (lo_text, hi_text) = inner
            .split_once(',')
            .ok_or_else(|| err("expected two comma-separated limits"))?;

        let parse_side = |text: &str| -> Result<Option<f64>, BoundsParseError> {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            let value: f64 = text.parse().map_err(|_| err("limit is not a number"))?;
            if value.is_nan() {
                return Err(err("limit is NaN"));
            }
            Ok(Some(value))
        };

        let lower = match (open, parse_side(lo_text)?) {
            (_, None) => Limit::Unbounded,
            ('[', Some(v)) => Limit::Inclusive(v),
            ('(', Some(v)) => Limit::Exclusive(v),
            _ => return Err(err("interval must start with '[' or '('")),
        };
        let upper = match (close, parse_side(hi_text)?) {
            (_, None) => Limit::Unbounded,
            (']', Some(v)) => Limit::Inclusive(v),
            (')', Some(v)) => Limit::Exclusive(v),
            _ => return Err(err("interval must end with ']' or ')'")),
        };
        if !matches!(open, '[' | '(') || !matches!(close, ']' | ')') {
            return Err(err("interval must be bracketed"));
        }

        let bounds = Bounds { lower, upper };
        if bounds.is_empty() {
            return Err(err("interval admits no value"));
        }
        Ok(bounds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPolicy {
    pub sources: Vec<String>,
    pub bounds: Bounds,
}

/// Per-key ordered source list and plausibility bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecedenceTable {
    policies: BTreeMap<CanonicalFieldKey, FieldPolicy>,
    /// Whether sources absent from a key's list may still fill it, after the
    /// listed ones and in lexicographic source-id order.
    pub admit_unlisted: bool,
}

impl PrecedenceTable {
    /// Table with every key present but no sources listed.
    pub fn empty() -> Self {
        let policies = CanonicalFieldKey::ALL
            .into_iter()
            .map(|key| {
                (
                    key,
                    FieldPolicy {
                        sources: Vec::new(),
                        bounds: Bounds::UNBOUNDED,
                    },
                )
            })
            .collect();
        Self {
            policies,
            admit_unlisted: false,
        }
    }

    pub fn sources(&self, key: CanonicalFieldKey) -> &[String] {
        self.policies
            .get(&key)
            .map(|p| p.sources.as_slice())
            .unwrap_or(&[])
    }

    pub fn bounds(&self, key: CanonicalFieldKey) -> Bounds {
        self.policies
            .get(&key)
            .map(|p| p.bounds)
            .unwrap_or(Bounds::UNBOUNDED)
    }

    pub fn with_sources<I, S>(mut self, key: CanonicalFieldKey, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let policy = self.policy_mut(key);
        policy.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bounds(mut self, key: CanonicalFieldKey, bounds: Bounds) -> Self {
        self.policy_mut(key).bounds = bounds;
        self
    }

    pub fn with_admit_unlisted(mut self, admit: bool) -> Self {
        self.admit_unlisted = admit;
        self
    }

    /// Every source id named anywhere in the table, sorted and de-duplicated.
    pub fn source_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .policies
            .values()
            .flat_map(|p| p.sources.iter().cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalFieldKey, &FieldPolicy)> {
        self.policies.iter()
    }

    fn policy_mut(&mut self, key: CanonicalFieldKey) -> &mut FieldPolicy {
        self.policies.entry(key).or_insert_with(|| FieldPolicy {
            sources: Vec::new(),
            bounds: Bounds::UNBOUNDED,
        })
    }
}

impl Default for PrecedenceTable {
    /// NSE leads on price-derived ratios with Yahoo filling its gaps;
    /// Screener.in leads on reported fundamentals; Moneycontrol only fills the
    /// fields it is known to carry.
    fn default() -> Self {
        use CanonicalFieldKey::*;

        let price_led = [NSE, YAHOO, SCREENER];
        let fundamentals_led = [SCREENER, NSE, YAHOO];
        let with_moneycontrol = [SCREENER, NSE, YAHOO, MONEYCONTROL];

        PrecedenceTable::empty()
            .with_sources(PeRatio, price_led)
            .with_sources(Eps, price_led)
            .with_sources(DividendYield, fundamentals_led)
            .with_sources(ReturnOnEquity, fundamentals_led)
            .with_sources(Revenue, fundamentals_led)
            .with_sources(PriceToSales, fundamentals_led)
            .with_sources(Beta, with_moneycontrol)
            .with_sources(PriceToBook, with_moneycontrol)
            .with_sources(DebtToEquity, with_moneycontrol)
            .with_sources(ProfitMargin, with_moneycontrol)
            .with_bounds(PeRatio, Bounds::open(0.0, 10_000.0))
            .with_bounds(DividendYield, Bounds::closed(0.0, 1.0))
            .with_bounds(Beta, Bounds::closed(0.0, 10.0))
            .with_bounds(Eps, Bounds::UNBOUNDED)
            .with_bounds(PriceToBook, Bounds::open(0.0, 1000.0))
            .with_bounds(PriceToSales, Bounds::open(0.0, 1000.0))
            .with_bounds(Revenue, Bounds::above(0.0))
            .with_bounds(ProfitMargin, Bounds::closed(-10.0, 10.0))
            .with_bounds(ReturnOnEquity, Bounds::closed(-10.0, 10.0))
            .with_bounds(DebtToEquity, Bounds::closed(0.0, 100.0))
    }
}
