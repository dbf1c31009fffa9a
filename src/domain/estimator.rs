//! Fallback estimation for fields fusion left empty.
//!
//! Each key has an ordered chain of rules. A rule is a total function of
//! fields already known (observed or estimated earlier in the pass) plus the
//! instrument context, returning `None` when its preconditions do not hold.
//! The first rule that yields a finite value wins; otherwise the chain's
//! terminal constant is used, so the result is always complete.
//!
//! The coefficients and constants below are placeholder policy calibrated on
//! a single large-cap IT issuer. They are kept stable, not tuned.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::metric::{CanonicalFieldKey, MetricField, MetricRecord};
use CanonicalFieldKey::*;

pub const ESTIMATOR_SOURCE: &str = "estimator";

const IT_KEYWORDS: [&str; 4] = ["software", "technology", "computers", "consulting"];

/// Non-canonical facts about the instrument that estimation rules may use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentContext {
    pub current_price: Option<f64>,
    /// Absolute currency units, not millions.
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub face_value: Option<f64>,
    pub industry: Option<String>,
}

impl InstrumentContext {
    pub fn is_it_sector(&self) -> bool {
        let Some(industry) = &self.industry else {
            return false;
        };
        let lower = industry.to_lowercase();
        IT_KEYWORDS.iter().any(|kw| lower.contains(kw))
            || lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == "it")
    }
}

/// Read-only view over what is known while estimating.
pub struct Known<'a> {
    record: &'a MetricRecord,
    context: &'a InstrumentContext,
}

impl Known<'_> {
    fn get(&self, key: CanonicalFieldKey) -> Option<f64> {
        self.record.value(key).filter(|v| v.is_finite())
    }

    fn positive(&self, key: CanonicalFieldKey) -> Option<f64> {
        self.get(key).filter(|v| *v > 0.0)
    }

    fn price(&self) -> Option<f64> {
        positive(self.context.current_price)
    }

    /// ROE as a percentage; values at or below 1 are taken as fractions.
    /// Zero counts as unknown.
    fn roe_pct(&self) -> Option<f64> {
        self.get(CanonicalFieldKey::ReturnOnEquity)
            .filter(|roe| *roe != 0.0)
            .map(|roe| if roe > 1.0 { roe } else { roe * 100.0 })
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn within_open(value: f64, min: f64, max: f64) -> Option<f64> {
    (value > min && value < max).then_some(value)
}

pub struct EstimationRule {
    pub name: &'static str,
    pub formula: fn(&Known<'_>) -> Option<f64>,
}

pub struct FallbackChain {
    pub key: CanonicalFieldKey,
    pub rules: &'static [EstimationRule],
    pub terminal: f64,
}

const PRICE_TO_BOOK_RULES: &[EstimationRule] = &[
    EstimationRule {
        name: "pe_over_2_5",
        formula: |k| {
            let pe = k.positive(PeRatio)?;
            within_open(pe / 2.5, 0.0, 1000.0)
        },
    },
    EstimationRule {
        name: "book_value_from_market_cap",
        formula: |k| {
            let pe = k.positive(PeRatio)?;
            let price = k.price()?;
            let market_cap = positive(k.context.market_cap)?;
            let shares = positive(k.context.shares_outstanding)?;
            let book_value_per_share = market_cap / (pe * shares);
            if book_value_per_share <= 0.0 {
                return None;
            }
            within_open(price / book_value_per_share, 0.0, 1000.0)
        },
    },
    EstimationRule {
        name: "face_value",
        formula: |k| {
            let pe = k.get(PeRatio)?;
            let price = k.price()?;
            let face_value = positive(k.context.face_value)?;
            let book_value = face_value * (pe / 10.0).max(1.0);
            within_open(price / book_value, 0.0, 1000.0)
        },
    },
];

const PROFIT_MARGIN_RULES: &[EstimationRule] = &[
    EstimationRule {
        name: "roe_coefficient",
        formula: |k| {
            let roe_pct = k.roe_pct().filter(|r| *r > 0.0)?;
            Some((roe_pct / 100.0 * 0.38).clamp(0.15, 0.30))
        },
    },
    EstimationRule {
        name: "roe_tiers",
        formula: |k| {
            let roe_pct = k.roe_pct()?;
            Some(if roe_pct > 60.0 {
                0.25
            } else if roe_pct > 50.0 {
                0.22
            } else if roe_pct > 40.0 {
                0.20
            } else {
                (roe_pct / 100.0 * 0.4).max(0.15)
            })
        },
    },
];

const DEBT_TO_EQUITY_RULES: &[EstimationRule] = &[
    EstimationRule {
        name: "it_sector_roe_tiers",
        formula: |k| {
            if !k.context.is_it_sector() {
                return None;
            }
            let roe_pct = k.roe_pct()?;
            Some(if roe_pct > 60.0 {
                0.05
            } else if roe_pct > 50.0 {
                0.08
            } else if roe_pct > 40.0 {
                0.12
            } else {
                0.15
            })
        },
    },
    EstimationRule {
        name: "roe_tiers",
        formula: |k| {
            let roe_pct = k.roe_pct()?;
            Some(if roe_pct > 50.0 {
                0.05
            } else if roe_pct > 30.0 {
                0.15
            } else {
                0.25
            })
        },
    },
];

const PE_RATIO_RULES: &[EstimationRule] = &[EstimationRule {
    name: "price_over_eps",
    formula: |k| Some(k.price()? / k.positive(Eps)?),
}];

const EPS_RULES: &[EstimationRule] = &[EstimationRule {
    name: "price_over_pe",
    formula: |k| Some(k.price()? / k.positive(PeRatio)?),
}];

const RETURN_ON_EQUITY_RULES: &[EstimationRule] = &[EstimationRule {
    name: "book_over_earnings_multiple",
    formula: |k| Some(k.positive(PriceToBook)? / k.positive(PeRatio)?),
}];

const REVENUE_RULES: &[EstimationRule] = &[
    EstimationRule {
        name: "market_cap_over_price_to_sales",
        formula: |k| Some(positive(k.context.market_cap)? / k.positive(PriceToSales)?),
    },
    EstimationRule {
        name: "earnings_over_margin",
        formula: |k| {
            let eps = k.positive(Eps)?;
            let shares = positive(k.context.shares_outstanding)?;
            let margin = k.positive(ProfitMargin)?;
            Some(eps * shares / margin)
        },
    },
];

const PRICE_TO_SALES_RULES: &[EstimationRule] = &[
    EstimationRule {
        name: "market_cap_over_revenue",
        formula: |k| Some(positive(k.context.market_cap)? / k.positive(Revenue)?),
    },
    EstimationRule {
        name: "pe_times_margin",
        formula: |k| Some(k.positive(PeRatio)? * k.positive(ProfitMargin)?),
    },
];

/// Chains in evaluation order. Later chains may read values estimated by
/// earlier ones.
pub const FALLBACK_CHAINS: &[FallbackChain] = &[
    FallbackChain {
        key: PriceToBook,
        rules: PRICE_TO_BOOK_RULES,
        terminal: 9.2,
    },
    FallbackChain {
        key: ProfitMargin,
        rules: PROFIT_MARGIN_RULES,
        terminal: 0.22,
    },
    FallbackChain {
        key: DebtToEquity,
        rules: DEBT_TO_EQUITY_RULES,
        terminal: 0.08,
    },
    FallbackChain {
        key: PeRatio,
        rules: PE_RATIO_RULES,
        terminal: 23.0,
    },
    FallbackChain {
        key: Eps,
        rules: EPS_RULES,
        terminal: 0.0,
    },
    FallbackChain {
        key: ReturnOnEquity,
        rules: RETURN_ON_EQUITY_RULES,
        terminal: 0.0,
    },
    FallbackChain {
        key: Revenue,
        rules: REVENUE_RULES,
        terminal: 0.0,
    },
    FallbackChain {
        key: PriceToSales,
        rules: PRICE_TO_SALES_RULES,
        terminal: 0.0,
    },
    FallbackChain {
        key: DividendYield,
        rules: &[],
        terminal: 0.0,
    },
    FallbackChain {
        key: Beta,
        rules: &[],
        terminal: 1.0,
    },
];

impl FallbackChain {
    /// First applicable rule's value and name, or the terminal constant.
    pub fn evaluate(&self, known: &Known<'_>) -> (f64, &'static str) {
        self.rules
            .iter()
            .find_map(|rule| {
                (rule.formula)(known)
                    .filter(|v| v.is_finite())
                    .map(|v| (v, rule.name))
            })
            .unwrap_or((self.terminal, "default"))
    }
}

/// Fills every empty key, tagging each filled field `Estimated`.
/// Observed fields are never touched.
pub fn estimate(mut record: MetricRecord, context: &InstrumentContext) -> MetricRecord {
    for chain in FALLBACK_CHAINS {
        if record.contains(chain.key) {
            continue;
        }
        let (value, rule) = chain.evaluate(&Known {
            record: &record,
            context,
        });
        debug!(field = %chain.key, rule, value, "estimated missing field");
        record.insert(
            chain.key,
            MetricField::estimated(value, format!("{}:{}", ESTIMATOR_SOURCE, rule)),
        );
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::Confidence;
    use approx::assert_relative_eq;

    fn observed(values: &[(CanonicalFieldKey, f64)]) -> MetricRecord {
        let mut record = MetricRecord::new();
        for &(key, value) in values {
            record.insert(key, MetricField::observed(value, "test"));
        }
        record
    }

    fn it_context() -> InstrumentContext {
        InstrumentContext {
            industry: Some("Computers - Software & Consulting".into()),
            ..InstrumentContext::default()
        }
    }

    #[test]
    fn chains_cover_every_key_once() {
        let mut keys: Vec<_> = FALLBACK_CHAINS.iter().map(|c| c.key).collect();
        keys.sort();
        let mut all = CanonicalFieldKey::ALL.to_vec();
        all.sort();
        assert_eq!(keys, all);
    }

    #[test]
    fn empty_record_uses_terminal_constants() {
        let record = estimate(MetricRecord::new(), &InstrumentContext::default());
        assert!(record.is_complete());
        assert_eq!(record.count_with(Confidence::Estimated), 10);
        assert_eq!(record.value(PriceToBook), Some(9.2));
        assert_eq!(record.value(ProfitMargin), Some(0.22));
        assert_eq!(record.value(DebtToEquity), Some(0.08));
        assert_eq!(record.value(Beta), Some(1.0));
        assert_eq!(
            record.get(PriceToBook).unwrap().source_id,
            "estimator:default"
        );
    }

    #[test]
    fn observed_fields_are_untouched() {
        let record = estimate(observed(&[(Beta, 0.7)]), &InstrumentContext::default());
        let beta = record.get(Beta).unwrap();
        assert_eq!(beta.value, 0.7);
        assert_eq!(beta.confidence, Confidence::Observed);
        assert_eq!(beta.source_id, "test");
    }

    #[test]
    fn price_to_book_from_pe() {
        let record = estimate(observed(&[(PeRatio, 23.0)]), &InstrumentContext::default());
        assert_relative_eq!(record.value(PriceToBook).unwrap(), 9.2, epsilon = 1e-12);
        assert_eq!(
            record.get(PriceToBook).unwrap().source_id,
            "estimator:pe_over_2_5"
        );
    }

    #[test]
    fn price_to_book_from_face_value_when_pe_out_of_range() {
        // pe / 2.5 = 4000, outside (0, 1000): fall through to later rules.
        let context = InstrumentContext {
            current_price: Some(500.0),
            face_value: Some(10.0),
            ..InstrumentContext::default()
        };
        let record = estimate(observed(&[(PeRatio, 10_000.0)]), &context);
        // book = 10 * max(1, 1000) = 10000; 500 / 10000 = 0.05
        assert_relative_eq!(record.value(PriceToBook).unwrap(), 0.05, epsilon = 1e-12);
        assert_eq!(record.get(PriceToBook).unwrap().source_id, "estimator:face_value");
    }

    #[test]
    fn price_to_book_from_market_cap() {
        let context = InstrumentContext {
            current_price: Some(10.0),
            market_cap: Some(1_000_000.0),
            shares_outstanding: Some(10_000.0),
            ..InstrumentContext::default()
        };
        // pe / 2.5 = 1200 is out of range; bvps = 1e6 / (3000 * 1e4) = 1/30
        let record = estimate(observed(&[(PeRatio, 3000.0)]), &context);
        assert_relative_eq!(record.value(PriceToBook).unwrap(), 300.0, epsilon = 1e-9);
        assert_eq!(
            record.get(PriceToBook).unwrap().source_id,
            "estimator:book_value_from_market_cap"
        );
    }

    #[test]
    fn profit_margin_from_roe_coefficient() {
        // 0.65 ROE -> 65% * 0.38 = 24.7%
        let record = estimate(observed(&[(ReturnOnEquity, 0.65)]), &InstrumentContext::default());
        assert_relative_eq!(record.value(ProfitMargin).unwrap(), 0.247, epsilon = 1e-12);
    }

    #[test]
    fn profit_margin_coefficient_is_clamped() {
        let low = estimate(observed(&[(ReturnOnEquity, 0.10)]), &InstrumentContext::default());
        assert_relative_eq!(low.value(ProfitMargin).unwrap(), 0.15);
        let high = estimate(observed(&[(ReturnOnEquity, 95.0)]), &InstrumentContext::default());
        assert_relative_eq!(high.value(ProfitMargin).unwrap(), 0.30);
    }

    #[test]
    fn profit_margin_tiers_handle_negative_roe() {
        let record = estimate(observed(&[(ReturnOnEquity, -0.2)]), &InstrumentContext::default());
        assert_relative_eq!(record.value(ProfitMargin).unwrap(), 0.15);
        assert_eq!(
            record.get(ProfitMargin).unwrap().source_id,
            "estimator:roe_tiers"
        );
    }

    #[test]
    fn zero_roe_counts_as_unknown() {
        let record = estimate(observed(&[(ReturnOnEquity, 0.0)]), &InstrumentContext::default());
        assert_eq!(record.value(ProfitMargin), Some(0.22));
        assert_eq!(record.value(DebtToEquity), Some(0.08));
    }

    #[test]
    fn debt_to_equity_it_sector_tiers() {
        let cases = [(0.65, 0.05), (0.55, 0.08), (0.45, 0.12), (0.20, 0.15)];
        for (roe, expected) in cases {
            let record = estimate(observed(&[(ReturnOnEquity, roe)]), &it_context());
            assert_relative_eq!(record.value(DebtToEquity).unwrap(), expected);
        }
    }

    #[test]
    fn debt_to_equity_roe_only_tiers() {
        let cases = [(0.65, 0.05), (0.40, 0.15), (0.20, 0.25)];
        for (roe, expected) in cases {
            let record = estimate(observed(&[(ReturnOnEquity, roe)]), &InstrumentContext::default());
            assert_relative_eq!(record.value(DebtToEquity).unwrap(), expected);
        }
    }

    #[test]
    fn it_sector_detection() {
        let ctx = |s: &str| InstrumentContext {
            industry: Some(s.into()),
            ..InstrumentContext::default()
        };
        assert!(ctx("Computers - Software").is_it_sector());
        assert!(ctx("Information Technology").is_it_sector());
        assert!(ctx("IT Services").is_it_sector());
        assert!(!ctx("Utilities").is_it_sector());
        assert!(!ctx("Banks").is_it_sector());
        assert!(!InstrumentContext::default().is_it_sector());
    }

    #[test]
    fn later_chains_see_earlier_estimates() {
        let context = InstrumentContext {
            current_price: Some(230.0),
            ..InstrumentContext::default()
        };
        let record = estimate(MetricRecord::new(), &context);
        // pe falls back to 23, so eps = 230 / 23
        assert_relative_eq!(record.value(PeRatio).unwrap(), 23.0);
        assert_relative_eq!(record.value(Eps).unwrap(), 10.0);
        // roe = pb / pe = 9.2 / 23
        assert_relative_eq!(record.value(ReturnOnEquity).unwrap(), 0.4, epsilon = 1e-12);
        // p/s = pe * margin
        assert_relative_eq!(record.value(PriceToSales).unwrap(), 23.0 * 0.22, epsilon = 1e-12);
    }

    #[test]
    fn pe_and_eps_derive_from_each_other() {
        let context = InstrumentContext {
            current_price: Some(3500.0),
            ..InstrumentContext::default()
        };
        let record = estimate(observed(&[(Eps, 140.0)]), &context);
        assert_relative_eq!(record.value(PeRatio).unwrap(), 25.0);

        let record = estimate(observed(&[(PeRatio, 25.0)]), &context);
        assert_relative_eq!(record.value(Eps).unwrap(), 140.0);
    }

    #[test]
    fn revenue_and_price_to_sales() {
        let context = InstrumentContext {
            market_cap: Some(1.2e13),
            ..InstrumentContext::default()
        };
        let record = estimate(observed(&[(Revenue, 2.4e12)]), &context);
        assert_relative_eq!(record.value(PriceToSales).unwrap(), 5.0);

        let record = estimate(observed(&[(PriceToSales, 6.0)]), &context);
        assert_relative_eq!(record.value(Revenue).unwrap(), 2.0e12);
    }

    #[test]
    fn revenue_from_earnings_and_margin() {
        let context = InstrumentContext {
            shares_outstanding: Some(1000.0),
            ..InstrumentContext::default()
        };
        let record = estimate(observed(&[(Eps, 5.0), (ProfitMargin, 0.25)]), &context);
        assert_relative_eq!(record.value(Revenue).unwrap(), 20_000.0);
    }
}
