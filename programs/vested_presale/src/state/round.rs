/**
 * Sale Round
 *
 * A time-boxed sale window with a fixed USD price per token.
 * Quote math converts a sale token amount into the SOL or USDT cost.
 */

use anchor_lang::prelude::*;

use crate::{
    PresaleError, MAX_SALE_TOKEN_AMOUNT, MIN_SALE_TOKEN_AMOUNT, PRICE_SCALE, SALE_TOKEN_BASE,
    USDT_BASE,
};

/// One sale round, stored in the config registry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Round {
    /// Caller-assigned id, non-zero, unique within the registry
    pub id: u64,

    /// Window start, Unix seconds (inclusive)
    pub start_time: i64,

    /// Window end, Unix seconds (exclusive)
    pub end_time: i64,

    /// USD per whole sale token, scaled by PRICE_SCALE
    pub price: u64,
}

impl Round {
    pub const SIZE: usize = 8 + // id
        8 + // start_time
        8 + // end_time
        8;  // price

    /// Gate for create and update arguments. Id and price must be
    /// non-zero; the window needs positive times with the end after
    /// the start.
    pub fn validate_fields(
        id: u64,
        start_time: i64,
        end_time: i64,
        price: u64,
    ) -> std::result::Result<(), PresaleError> {
        if id == 0 {
            return Err(PresaleError::InvalidRoundId);
        }
        if start_time <= 0 || end_time <= 0 || end_time <= start_time {
            return Err(PresaleError::InvalidTimePeriod);
        }
        if price == 0 {
            return Err(PresaleError::InvalidPrice);
        }
        Ok(())
    }

    /// Whether purchases are accepted at `now`
    pub fn is_open(&self, now: i64) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Lamports required to buy `sale_token_amount` raw units at this
    /// round's price, given a SOL/USD feed observation.
    ///
    /// cost = amount * price * 10^(-expo) / (PRICE_SCALE * feed_price),
    /// rounded up so the seller is never underpaid. The 1e9 sale token
    /// and lamport bases cancel. None on overflow or a non-positive feed.
    pub fn sol_cost(&self, sale_token_amount: u64, feed_price: i64, feed_expo: i32) -> Option<u64> {
        let feed_price = u128::try_from(feed_price).ok().filter(|p| *p > 0)?;
        let oracle_base = 10u128.checked_pow(feed_expo.unsigned_abs())?;

        let numerator = (sale_token_amount as u128)
            .checked_mul(self.price as u128)?
            .checked_mul(oracle_base)?;
        let denominator = (PRICE_SCALE as u128).checked_mul(feed_price)?;

        u64::try_from(numerator.div_ceil(denominator)).ok()
    }

    /// USDT raw units required to buy `sale_token_amount` raw units at
    /// this round's price. Rounded up, same direction as `sol_cost`.
    pub fn usdt_cost(&self, sale_token_amount: u64) -> Option<u64> {
        let numerator = (sale_token_amount as u128)
            .checked_mul(self.price as u128)?
            .checked_mul(USDT_BASE as u128)?;
        let denominator = (PRICE_SCALE as u128) * (SALE_TOKEN_BASE as u128);

        u64::try_from(numerator.div_ceil(denominator)).ok()
    }

    /// Purchase size gate, inclusive at both bounds
    pub fn check_purchase_amount(sale_token_amount: u64) -> std::result::Result<(), PresaleError> {
        if sale_token_amount < MIN_SALE_TOKEN_AMOUNT {
            return Err(PresaleError::TooLowBuyAmount);
        }
        if sale_token_amount > MAX_SALE_TOKEN_AMOUNT {
            return Err(PresaleError::TooHighBuyAmount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(price: u64) -> Round {
        Round {
            id: 1,
            start_time: 1_700_000_000,
            end_time: 1_700_000_060,
            price,
        }
    }

    #[test]
    fn sol_cost_at_listed_price() {
        // $0.02/token, SOL at $2000 (8-decimal feed), 5,000 tokens
        let r = round(200);
        let cost = r.sol_cost(5_000 * SALE_TOKEN_BASE, 200_000_000_000, -8);
        assert_eq!(cost, Some(50_000_000)); // 0.05 SOL
    }

    #[test]
    fn sol_cost_expo_zero() {
        // Same quote from a whole-dollar feed
        let r = round(200);
        let cost = r.sol_cost(5_000 * SALE_TOKEN_BASE, 2_000, 0);
        assert_eq!(cost, Some(50_000_000));
    }

    #[test]
    fn sol_cost_rounds_up() {
        // One raw unit prices far below one lamport; the buyer still pays 1
        let r = round(200);
        assert_eq!(r.sol_cost(1, 200_000_000_000, -8), Some(1));
    }

    #[test]
    fn sol_cost_rejects_bad_feed() {
        let r = round(200);
        assert_eq!(r.sol_cost(5_000 * SALE_TOKEN_BASE, 0, -8), None);
        assert_eq!(r.sol_cost(5_000 * SALE_TOKEN_BASE, -1, -8), None);
    }

    #[test]
    fn sol_cost_overflow_is_none() {
        let r = round(u64::MAX);
        assert_eq!(r.sol_cost(u64::MAX, 200_000_000_000, -8), None);
    }

    #[test]
    fn usdt_cost_at_listed_price() {
        // 5,000 tokens at $0.02 = 100 USDT
        let r = round(200);
        let cost = r.usdt_cost(5_000 * SALE_TOKEN_BASE);
        assert_eq!(cost, Some(100 * USDT_BASE));
    }

    #[test]
    fn usdt_cost_rounds_up() {
        let r = round(200);
        assert_eq!(r.usdt_cost(1), Some(1));
    }

    #[test]
    fn buy_window_is_half_open() {
        let r = round(200);
        assert!(!r.is_open(r.start_time - 1));
        assert!(r.is_open(r.start_time));
        assert!(r.is_open(r.end_time - 1));
        assert!(!r.is_open(r.end_time));
    }

    #[test]
    fn round_fields_must_be_well_formed() {
        assert!(Round::validate_fields(1, 100, 200, 200).is_ok());

        assert!(matches!(
            Round::validate_fields(0, 100, 200, 200),
            Err(PresaleError::InvalidRoundId)
        ));
        assert!(matches!(
            Round::validate_fields(1, 0, 200, 200),
            Err(PresaleError::InvalidTimePeriod)
        ));
        assert!(matches!(
            Round::validate_fields(1, -5, 200, 200),
            Err(PresaleError::InvalidTimePeriod)
        ));
        assert!(matches!(
            Round::validate_fields(1, 100, 0, 200),
            Err(PresaleError::InvalidTimePeriod)
        ));
        assert!(matches!(
            Round::validate_fields(1, 200, 100, 200),
            Err(PresaleError::InvalidTimePeriod)
        ));
        assert!(matches!(
            Round::validate_fields(1, 100, 100, 200),
            Err(PresaleError::InvalidTimePeriod)
        ));
        assert!(matches!(
            Round::validate_fields(1, 100, 200, 0),
            Err(PresaleError::InvalidPrice)
        ));
    }

    #[test]
    fn purchase_below_minimum_is_rejected() {
        // 4,999 whole tokens sits just under the 5,000 minimum
        assert!(matches!(
            Round::check_purchase_amount(4_999 * SALE_TOKEN_BASE),
            Err(PresaleError::TooLowBuyAmount)
        ));
        assert!(matches!(
            Round::check_purchase_amount(MIN_SALE_TOKEN_AMOUNT - 1),
            Err(PresaleError::TooLowBuyAmount)
        ));
    }

    #[test]
    fn purchase_bounds_are_inclusive() {
        assert!(Round::check_purchase_amount(MIN_SALE_TOKEN_AMOUNT).is_ok());
        assert!(Round::check_purchase_amount(MAX_SALE_TOKEN_AMOUNT).is_ok());
        assert!(matches!(
            Round::check_purchase_amount(MAX_SALE_TOKEN_AMOUNT + 1),
            Err(PresaleError::TooHighBuyAmount)
        ));
    }
}
