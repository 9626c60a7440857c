/**
 * SOL/USD Price Feed State
 *
 * Push-model feed: a designated authority posts observations, buys
 * validate them at read time. Round ids must strictly increase.
 */

use anchor_lang::prelude::*;

use crate::{PresaleError, MAX_PRICE_AGE_SECS, MIN_ORACLE_EXPO};

/// Latest posted SOL/USD observation
#[account]
pub struct PriceFeed {
    /// Only signer allowed to post
    pub authority: Pubkey,

    /// Price in 10^expo USD per SOL; must be positive
    pub price: i64,

    /// Decimal exponent of `price`, e.g. -8 for an 8-decimal feed
    pub expo: i32,

    /// Monotonically increasing observation id
    pub oracle_round_id: u64,

    /// When the observation was posted
    pub publish_time: i64,

    /// Bump seed for PDA
    pub bump: u8,
}

impl PriceFeed {
    pub const LEN: usize = 8 + // discriminator
        32 + // authority
        8 +  // price
        4 +  // expo
        8 +  // oracle_round_id
        8 +  // publish_time
        1;   // bump

    /// Whether a posted (price, expo) pair is acceptable
    pub fn valid_observation(price: i64, expo: i32) -> bool {
        price > 0 && expo <= 0 && expo >= MIN_ORACLE_EXPO
    }

    /// Whether the stored observation is recent enough to price a buy
    pub fn is_fresh(&self, now: i64) -> bool {
        now.saturating_sub(self.publish_time) <= MAX_PRICE_AGE_SECS
    }

    /// Store an observation; ids only move forward.
    /// Observation validity is the caller's to check.
    pub fn record(
        &mut self,
        price: i64,
        expo: i32,
        oracle_round_id: u64,
        now: i64,
    ) -> std::result::Result<(), PresaleError> {
        if oracle_round_id <= self.oracle_round_id {
            return Err(PresaleError::StalePrice);
        }
        self.price = price;
        self.expo = expo;
        self.oracle_round_id = oracle_round_id;
        self.publish_time = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(publish_time: i64) -> PriceFeed {
        PriceFeed {
            authority: Pubkey::new_unique(),
            price: 200_000_000_000,
            expo: -8,
            oracle_round_id: 10,
            publish_time,
            bump: 255,
        }
    }

    #[test]
    fn observation_bounds() {
        assert!(PriceFeed::valid_observation(1, 0));
        assert!(PriceFeed::valid_observation(200_000_000_000, -8));
        assert!(PriceFeed::valid_observation(1, MIN_ORACLE_EXPO));

        assert!(!PriceFeed::valid_observation(0, -8));
        assert!(!PriceFeed::valid_observation(-5, -8));
        assert!(!PriceFeed::valid_observation(1, 1));
        assert!(!PriceFeed::valid_observation(1, MIN_ORACLE_EXPO - 1));
    }

    #[test]
    fn freshness_window_is_inclusive() {
        let f = feed(1_000);
        assert!(f.is_fresh(1_000));
        assert!(f.is_fresh(1_000 + MAX_PRICE_AGE_SECS));
        assert!(!f.is_fresh(1_000 + MAX_PRICE_AGE_SECS + 1));
    }

    #[test]
    fn post_from_the_future_counts_as_fresh() {
        // publish_time ahead of the clock still reads as fresh
        let f = feed(2_000);
        assert!(f.is_fresh(1_999));
    }

    #[test]
    fn observation_ids_only_move_forward() {
        let mut f = feed(1_000); // stored id 10

        assert!(matches!(
            f.record(210_000_000_000, -8, 10, 1_050),
            Err(PresaleError::StalePrice)
        ));
        assert!(matches!(
            f.record(210_000_000_000, -8, 9, 1_050),
            Err(PresaleError::StalePrice)
        ));

        // a rejected post keeps the stored observation
        assert_eq!(f.price, 200_000_000_000);
        assert_eq!(f.oracle_round_id, 10);
        assert_eq!(f.publish_time, 1_000);

        assert!(f.record(210_000_000_000, -8, 11, 1_050).is_ok());
        assert_eq!(f.price, 210_000_000_000);
        assert_eq!(f.oracle_round_id, 11);
        assert_eq!(f.publish_time, 1_050);
    }
}
