//! 50/30/20 budget allocation.
//!
//! Pure functions of the reference balance and the cumulative spend per
//! category type. Savings-type spend is excluded from the Necessity/Want
//! totals, so recording a Savings expense lowers the wallet balance but
//! not `savings_available`; the projection treats that money as having
//! left the wallet for good.

use serde::{Deserialize, Serialize};

use crate::{Currency, MoneyCents};

/// Cumulative spend per category type, as returned by
/// [`Ledger::spend_by_type`](crate::Ledger::spend_by_type).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendByType {
    pub necessity: MoneyCents,
    pub want: MoneyCents,
    pub savings: MoneyCents,
}

impl SpendByType {
    /// Necessity + Want: the spend that counts against the projection.
    #[must_use]
    pub fn committed(&self) -> MoneyCents {
        self.necessity + self.want
    }
}

/// Alert banding over the savings percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsBand {
    Excellent,
    Good,
    Warning,
    Danger,
    Critical,
}

impl SavingsBand {
    /// Thresholds: ≥80 excellent, ≥50 good, ≥30 warning, ≥20 danger,
    /// below that critical.
    #[must_use]
    pub fn classify(savings_pct: f64) -> Self {
        if savings_pct >= 80.0 {
            Self::Excellent
        } else if savings_pct >= 50.0 {
            Self::Good
        } else if savings_pct >= 30.0 {
            Self::Warning
        } else if savings_pct >= 20.0 {
            Self::Danger
        } else {
            Self::Critical
        }
    }
}

/// What the notification subsystem consumes. It re-derives its own banding
/// from the raw percentage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BudgetSignal {
    pub savings_pct: f64,
    pub savings_available: MoneyCents,
    pub currency_code: &'static str,
}

/// The full 50/30/20 projection for one user.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub reference: MoneyCents,
    pub ideal_necessity: MoneyCents,
    pub ideal_want: MoneyCents,
    pub ideal_savings: MoneyCents,
    /// `max(0, ideal - spent)`, never negative even on overspend.
    pub available_necessity: MoneyCents,
    pub available_want: MoneyCents,
    /// Share of the ideal already spent, clamped to `[0, 100]`.
    pub spent_pct_necessity: f64,
    pub spent_pct_want: f64,
    /// `reference - (necessity + want)`. May go negative; the percentage
    /// below is clamped, this amount is not.
    pub savings_available: MoneyCents,
    pub savings_pct: f64,
}

fn share(reference: MoneyCents, percent: i64) -> MoneyCents {
    MoneyCents::new(reference.cents() * percent / 100)
}

fn available(ideal: MoneyCents, spent: MoneyCents) -> MoneyCents {
    MoneyCents::new((ideal - spent).cents().max(0))
}

fn pct(part: MoneyCents, whole: MoneyCents) -> f64 {
    if whole.is_positive() {
        (part.cents() as f64 / whole.cents() as f64 * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

impl BudgetReport {
    #[must_use]
    pub fn compute(reference: MoneyCents, spend: &SpendByType) -> Self {
        let ideal_necessity = share(reference, 50);
        let ideal_want = share(reference, 30);
        let ideal_savings = share(reference, 20);
        let savings_available = reference - spend.committed();

        Self {
            reference,
            ideal_necessity,
            ideal_want,
            ideal_savings,
            available_necessity: available(ideal_necessity, spend.necessity),
            available_want: available(ideal_want, spend.want),
            spent_pct_necessity: pct(spend.necessity, ideal_necessity),
            spent_pct_want: pct(spend.want, ideal_want),
            savings_available,
            savings_pct: pct(savings_available, reference),
        }
    }

    #[must_use]
    pub fn band(&self) -> SavingsBand {
        SavingsBand::classify(self.savings_pct)
    }

    #[must_use]
    pub fn signal(&self, currency: Currency) -> BudgetSignal {
        BudgetSignal {
            savings_pct: self.savings_pct,
            savings_available: self.savings_available,
            currency_code: currency.code(),
        }
    }
}
