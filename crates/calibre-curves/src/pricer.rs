//! Trade pricers.

use calibre_core::CurrencyAmount;

use crate::error::{CurveError, CurveResult};
use crate::products::{Fra, Swap, Trade};
use crate::provider::RatesProvider;

/// Prices trades against a rates provider.
///
/// Calibration takes a pricer as a parameter, so alternative pricing
/// models can be substituted without touching the calibration code.
pub trait TradePricer: Send + Sync {
    /// Present value in the trade currency.
    fn present_value(&self, trade: &Trade, provider: &dyn RatesProvider) -> CurveResult<CurrencyAmount>;

    /// Fixed rate at which the trade has zero present value.
    fn par_rate(&self, trade: &Trade, provider: &dyn RatesProvider) -> CurveResult<f64>;
}

/// Discounting pricer for FRAs and swaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountingTradePricer;

impl DiscountingTradePricer {
    /// Present value of an FRA.
    pub fn fra_present_value(&self, fra: &Fra, provider: &dyn RatesProvider) -> CurveResult<f64> {
        let forward = provider.ibor_rate(fra.index, fra.fixing_date)?;
        let df = provider.discount_factor(fra.currency, fra.payment_date)?;
        let tau = fra.year_fraction;
        Ok(fra.notional * (forward - fra.fixed_rate) * tau / (1.0 + forward * tau) * df)
    }

    /// Present value of the floating leg per unit notional.
    pub fn float_leg_value(&self, swap: &Swap, provider: &dyn RatesProvider) -> CurveResult<f64> {
        swap.float_periods.iter().try_fold(0.0, |acc, period| {
            let rate = provider.ibor_rate(swap.index, period.fixing_date)?;
            let df = provider.discount_factor(swap.currency, period.payment_date)?;
            Ok(acc + rate * period.year_fraction * df)
        })
    }

    /// Discounted sum of fixed leg accrual fractions per unit notional.
    pub fn annuity(&self, swap: &Swap, provider: &dyn RatesProvider) -> CurveResult<f64> {
        swap.fixed_periods.iter().try_fold(0.0, |acc, period| {
            let df = provider.discount_factor(swap.currency, period.payment_date)?;
            Ok(acc + period.year_fraction * df)
        })
    }

    /// Present value of a swap.
    pub fn swap_present_value(&self, swap: &Swap, provider: &dyn RatesProvider) -> CurveResult<f64> {
        let float = self.float_leg_value(swap, provider)?;
        let annuity = self.annuity(swap, provider)?;
        Ok(swap.notional * (float - swap.fixed_rate * annuity))
    }
}

impl TradePricer for DiscountingTradePricer {
    fn present_value(&self, trade: &Trade, provider: &dyn RatesProvider) -> CurveResult<CurrencyAmount> {
        let amount = match trade {
            Trade::Fra(fra) => self.fra_present_value(fra, provider)?,
            Trade::Swap(swap) => self.swap_present_value(swap, provider)?,
        };
        Ok(CurrencyAmount::new(trade.currency(), amount))
    }

    fn par_rate(&self, trade: &Trade, provider: &dyn RatesProvider) -> CurveResult<f64> {
        match trade {
            Trade::Fra(fra) => provider.ibor_rate(fra.index, fra.fixing_date),
            Trade::Swap(swap) => {
                let annuity = self.annuity(swap, provider)?;
                if annuity == 0.0 {
                    return Err(CurveError::invalid_product("swap has zero annuity"));
                }
                Ok(self.float_leg_value(swap, provider)? / annuity)
            }
        }
    }
}
