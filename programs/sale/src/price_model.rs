//! Dual-slope pricing curve
//!
//! Price multiplier as a function of the fraction of capacity sold:
//! - below the breakpoint: linear ramp from `base_rate` to `optimal_rate`
//! - above the breakpoint: steeper ramp from `optimal_rate` to `max_rate`
//!
//! price = starting_price * (1 + multiplier / FULL_SCALE)

use curve_sale_common::{add_checked, mul_div, to_u64, SaleError, FULL_SCALE};

/// Curve constants, all scaled to `FULL_SCALE` (1e18 == 100%)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveParameters {
    /// Multiplier slope at zero demand
    pub base_rate: u128,
    /// Multiplier reached exactly at the breakpoint
    pub optimal_rate: u128,
    /// Multiplier reached at full sellout
    pub max_rate: u128,
    /// Fraction sold where the slope steepens
    pub breakpoint: u128,
}

impl CurveParameters {
    /// Validate ordering: 0 < base <= optimal <= max, 0 < breakpoint < FULL_SCALE
    pub fn new(
        base_rate: u128,
        optimal_rate: u128,
        max_rate: u128,
        breakpoint: u128,
    ) -> Result<Self, SaleError> {
        if base_rate == 0 || base_rate > optimal_rate || optimal_rate > max_rate {
            return Err(SaleError::InvalidConfiguration);
        }
        if breakpoint == 0 || breakpoint >= FULL_SCALE {
            return Err(SaleError::InvalidConfiguration);
        }

        Ok(Self {
            base_rate,
            optimal_rate,
            max_rate,
            breakpoint,
        })
    }
}

/// Stateless price evaluator shared read-only by every sale using it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceModel {
    params: CurveParameters,
}

impl PriceModel {
    pub fn new(params: CurveParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CurveParameters {
        &self.params
    }

    /// Price for a sale with `remaining` of `capacity` units left
    ///
    /// Returns `starting_price` untouched when nothing has been sold.
    /// Division truncates, so the result never exceeds the real-valued curve.
    pub fn evaluate(
        &self,
        capacity: u64,
        remaining: u64,
        starting_price: u64,
    ) -> Result<u64, SaleError> {
        if capacity == 0 || starting_price == 0 || remaining > capacity {
            return Err(SaleError::InvalidInput);
        }
        if remaining == capacity {
            return Ok(starting_price);
        }

        let sold = (capacity - remaining) as u128;
        let fraction_sold = mul_div(sold, FULL_SCALE, capacity as u128)?;
        let multiplier = self.multiplier(fraction_sold)?;

        let premium = mul_div(starting_price as u128, multiplier, FULL_SCALE)?;
        to_u64(add_checked(starting_price as u128, premium)?)
    }

    /// Curve multiplier at a given fraction sold (FULL_SCALE based)
    pub fn multiplier(&self, fraction_sold: u128) -> Result<u128, SaleError> {
        if fraction_sold > FULL_SCALE {
            return Err(SaleError::InvalidInput);
        }
        if fraction_sold < self.params.breakpoint {
            self.multiplier_below(fraction_sold)
        } else {
            self.multiplier_above(fraction_sold)
        }
    }

    pub(crate) fn multiplier_below(&self, fraction_sold: u128) -> Result<u128, SaleError> {
        let p = &self.params;
        let ramp = mul_div(p.optimal_rate - p.base_rate, fraction_sold, p.breakpoint)?;
        add_checked(p.base_rate, ramp)
    }

    pub(crate) fn multiplier_above(&self, fraction_sold: u128) -> Result<u128, SaleError> {
        let p = &self.params;
        let excess = fraction_sold.saturating_sub(p.breakpoint);
        let ramp = mul_div(p.max_rate - p.optimal_rate, excess, FULL_SCALE - p.breakpoint)?;
        add_checked(p.optimal_rate, ramp)
    }

    /// Sample the curve at `steps + 1` evenly spaced sold levels
    ///
    /// Returns `(sold, price)` pairs from zero sold up to full sellout.
    pub fn price_schedule(
        &self,
        capacity: u64,
        starting_price: u64,
        steps: u64,
    ) -> Result<Vec<(u64, u64)>, SaleError> {
        if steps == 0 {
            return Err(SaleError::InvalidInput);
        }

        (0..=steps)
            .map(|i| {
                let sold = to_u64(mul_div(capacity as u128, i as u128, steps as u128)?)?;
                let price = self.evaluate(capacity, capacity - sold, starting_price)?;
                Ok((sold, price))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PCT: u128 = FULL_SCALE / 100;
    const STARTING_PRICE: u64 = 1_000_000;

    fn example_model() -> PriceModel {
        // base 1%, optimal 50%, max 200%, breakpoint 50%
        PriceModel::new(CurveParameters::new(PCT, 50 * PCT, 200 * PCT, 50 * PCT).unwrap())
    }

    #[test]
    fn test_nothing_sold_returns_starting_price() {
        let model = example_model();
        assert_eq!(model.evaluate(1000, 1000, STARTING_PRICE).unwrap(), STARTING_PRICE);
        assert_eq!(model.evaluate(1, 1, 7).unwrap(), 7);
    }

    #[test]
    fn test_breakpoint_and_sellout_scenario() {
        let model = example_model();

        // sold = 500 of 1000: multiplier = optimal (50%)
        assert_eq!(model.evaluate(1000, 500, STARTING_PRICE).unwrap(), 1_500_000);

        // sold = 1000 of 1000: multiplier = max (200%)
        assert_eq!(model.evaluate(1000, 0, STARTING_PRICE).unwrap(), 3 * STARTING_PRICE);
    }

    #[test]
    fn test_below_breakpoint_ramp() {
        let model = example_model();

        // 25% sold: base + (optimal - base) * 0.25 / 0.5 = 1% + 24.5% = 25.5%
        assert_eq!(model.evaluate(1000, 750, STARTING_PRICE).unwrap(), 1_255_000);

        // a single unit sold already charges at least the base rate
        let first = model.evaluate(1000, 999, STARTING_PRICE).unwrap();
        assert!(first >= STARTING_PRICE + STARTING_PRICE / 100);
    }

    #[test]
    fn test_above_breakpoint_ramp() {
        let model = example_model();

        // 75% sold: optimal + (max - optimal) * 0.25 / 0.5 = 50% + 75% = 125%
        assert_eq!(model.evaluate(1000, 250, STARTING_PRICE).unwrap(), 2_250_000);
    }

    #[test]
    fn test_continuity_at_breakpoint() {
        let model = example_model();
        let bp = model.params().breakpoint;

        let below = model.multiplier_below(bp).unwrap();
        let above = model.multiplier_above(bp).unwrap();
        assert!(below.abs_diff(above) <= 1, "below={} above={}", below, above);
    }

    #[test]
    fn test_invalid_inputs() {
        let model = example_model();
        assert_eq!(model.evaluate(0, 0, STARTING_PRICE), Err(SaleError::InvalidInput));
        assert_eq!(model.evaluate(10, 11, STARTING_PRICE), Err(SaleError::InvalidInput));
        assert_eq!(model.evaluate(10, 5, 0), Err(SaleError::InvalidInput));
        assert_eq!(model.multiplier(FULL_SCALE + 1), Err(SaleError::InvalidInput));
    }

    #[test]
    fn test_parameter_ordering() {
        assert_eq!(
            CurveParameters::new(0, 50 * PCT, 200 * PCT, 50 * PCT),
            Err(SaleError::InvalidConfiguration)
        );
        assert_eq!(
            CurveParameters::new(60 * PCT, 50 * PCT, 200 * PCT, 50 * PCT),
            Err(SaleError::InvalidConfiguration)
        );
        assert_eq!(
            CurveParameters::new(PCT, 50 * PCT, 40 * PCT, 50 * PCT),
            Err(SaleError::InvalidConfiguration)
        );
        assert_eq!(
            CurveParameters::new(PCT, 50 * PCT, 200 * PCT, 0),
            Err(SaleError::InvalidConfiguration)
        );
        assert_eq!(
            CurveParameters::new(PCT, 50 * PCT, 200 * PCT, FULL_SCALE),
            Err(SaleError::InvalidConfiguration)
        );

        // flat curve is allowed
        assert!(CurveParameters::new(PCT, PCT, PCT, 50 * PCT).is_ok());
    }

    #[test]
    fn test_price_overflow_is_reported() {
        let model = example_model();
        assert_eq!(model.evaluate(10, 0, u64::MAX), Err(SaleError::Overflow));
    }

    #[test]
    fn test_price_schedule() {
        let model = example_model();
        let schedule = model.price_schedule(1000, STARTING_PRICE, 4).unwrap();

        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule[0], (0, STARTING_PRICE));
        assert_eq!(schedule[2], (500, 1_500_000));
        assert_eq!(schedule[4], (1000, 3 * STARTING_PRICE));

        for pair in schedule.windows(2) {
            assert!(pair[0].1 <= pair[1].1, "schedule must be non-decreasing");
        }

        assert_eq!(model.price_schedule(1000, STARTING_PRICE, 0), Err(SaleError::InvalidInput));
    }
}
