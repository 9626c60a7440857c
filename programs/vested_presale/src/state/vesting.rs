/**
 * User Vesting State
 *
 * Per-buyer, per-round ledger of purchased sale tokens, released in
 * three equal steps after the round's start.
 */

use anchor_lang::prelude::*;

use crate::VESTING_SLOT_COUNT;

/// One scheduled release of purchased tokens
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VestingSlot {
    /// Unclaimed raw sale token units; zeroed when claimed
    pub amount: u64,

    /// Timestamp at which the slot matures (inclusive)
    pub release_time: i64,
}

impl VestingSlot {
    pub const SIZE: usize = 8 + // amount
        8;  // release_time
}

/// Vesting ledger account, one per (buyer, round)
/// Created on the buyer's first purchase in that round
#[account]
pub struct UserVesting {
    /// Buyer this ledger belongs to
    pub buyer: Pubkey,

    /// Round the purchases were made in
    pub round_id: u64,

    /// Release schedule; slot i matures at round start + (i+1) * duration
    pub slots: [VestingSlot; VESTING_SLOT_COUNT],

    /// Raw units purchased in this round (lifetime)
    pub total_purchased: u64,

    /// Raw units claimed from this round (lifetime)
    pub total_claimed: u64,

    /// Bump seed for PDA
    pub bump: u8,
}

impl UserVesting {
    pub const LEN: usize = 8 + // discriminator
        32 + // buyer
        8 +  // round_id
        VESTING_SLOT_COUNT * VestingSlot::SIZE + // slots
        8 +  // total_purchased
        8 +  // total_claimed
        1;   // bump

    /// Spread a purchase across the release slots.
    ///
    /// Each slot takes amount / 3; the division remainder goes to the
    /// final slot so the slot sum always equals the purchased amount.
    /// Release times derive from the round's start, never the purchase
    /// time, so repeat purchases only accumulate the amounts.
    /// None on arithmetic overflow, with the ledger left untouched.
    pub fn record_purchase(
        &mut self,
        amount: u64,
        round_start_time: i64,
        vesting_duration: i64,
    ) -> Option<()> {
        let slot_count = VESTING_SLOT_COUNT as u64;
        let part = amount / slot_count;
        let last_part = amount - part * (slot_count - 1);

        // stage the full update; nothing is assigned until every step clears
        let mut staged = [VestingSlot::default(); VESTING_SLOT_COUNT];
        for (i, (slot, stage)) in self.slots.iter().zip(staged.iter_mut()).enumerate() {
            let share = if i == VESTING_SLOT_COUNT - 1 { last_part } else { part };
            stage.amount = slot.amount.checked_add(share)?;
            stage.release_time = round_start_time
                .checked_add(vesting_duration.checked_mul(i as i64 + 1)?)?;
        }
        let total_purchased = self.total_purchased.checked_add(amount)?;

        self.slots = staged;
        self.total_purchased = total_purchased;
        Some(())
    }

    /// Unclaimed amount matured as of `now`. Pure query.
    pub fn claimable_amount(&self, now: i64) -> u64 {
        self.slots
            .iter()
            .filter(|slot| slot.release_time <= now)
            .map(|slot| slot.amount)
            .sum()
    }

    /// Zero every matured slot and return the total taken
    pub fn take_claimable(&mut self, now: i64) -> u64 {
        let mut total = 0u64;
        for slot in self.slots.iter_mut() {
            if slot.release_time <= now && slot.amount > 0 {
                total += slot.amount;
                slot.amount = 0;
            }
        }
        self.total_claimed += total;
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SALE_TOKEN_BASE;

    const START: i64 = 1_700_000_000;
    const DURATION: i64 = 2_592_000; // 30 days

    fn vesting() -> UserVesting {
        UserVesting {
            buyer: Pubkey::new_unique(),
            round_id: 1,
            slots: [VestingSlot::default(); VESTING_SLOT_COUNT],
            total_purchased: 0,
            total_claimed: 0,
            bump: 255,
        }
    }

    #[test]
    fn purchase_splits_with_remainder_on_last_slot() {
        let mut v = vesting();
        let amount = 5_000 * SALE_TOKEN_BASE;
        v.record_purchase(amount, START, DURATION).unwrap();

        assert_eq!(v.slots[0].amount, 1_666_666_666_666);
        assert_eq!(v.slots[1].amount, 1_666_666_666_666);
        assert_eq!(v.slots[2].amount, 1_666_666_666_668);
        assert_eq!(v.slots.iter().map(|s| s.amount).sum::<u64>(), amount);

        for (i, slot) in v.slots.iter().enumerate() {
            assert_eq!(slot.release_time, START + (i as i64 + 1) * DURATION);
        }
    }

    #[test]
    fn tiny_purchase_remainder() {
        let mut v = vesting();
        v.record_purchase(5, START, DURATION).unwrap();
        assert_eq!(v.slots[0].amount, 1);
        assert_eq!(v.slots[1].amount, 1);
        assert_eq!(v.slots[2].amount, 3);
    }

    #[test]
    fn repeat_purchases_accumulate_in_place() {
        let mut v = vesting();
        v.record_purchase(9_000, START, DURATION).unwrap();
        let times: Vec<i64> = v.slots.iter().map(|s| s.release_time).collect();

        v.record_purchase(6_000, START, DURATION).unwrap();
        assert_eq!(v.slots[0].amount, 5_000);
        assert_eq!(v.slots[1].amount, 5_000);
        assert_eq!(v.slots[2].amount, 5_000);
        assert_eq!(v.total_purchased, 15_000);

        // schedule depends only on the round, not on purchase time
        let after: Vec<i64> = v.slots.iter().map(|s| s.release_time).collect();
        assert_eq!(times, after);
    }

    #[test]
    fn claimable_grows_slot_by_slot() {
        let mut v = vesting();
        v.record_purchase(9_000, START, DURATION).unwrap();

        assert_eq!(v.claimable_amount(START), 0);
        assert_eq!(v.claimable_amount(START + DURATION - 1), 0);
        assert_eq!(v.claimable_amount(START + DURATION), 3_000);
        assert_eq!(v.claimable_amount(START + 2 * DURATION), 6_000);
        assert_eq!(v.claimable_amount(START + 3 * DURATION), 9_000);
        assert_eq!(v.claimable_amount(i64::MAX), 9_000);
    }

    #[test]
    fn claim_takes_matured_and_only_matured() {
        let mut v = vesting();
        v.record_purchase(9_000, START, DURATION).unwrap();

        // nothing matured yet
        assert_eq!(v.take_claimable(START + DURATION - 1), 0);

        let now = START + DURATION;
        let before = v.claimable_amount(now);
        let taken = v.take_claimable(now);
        assert_eq!(taken, 3_000);
        assert_eq!(v.claimable_amount(now), before - taken);

        // repeat claim at the same time is an empty take
        assert_eq!(v.take_claimable(now), 0);

        // the remaining slots still mature on schedule
        assert_eq!(v.take_claimable(START + 3 * DURATION), 6_000);
        assert_eq!(v.total_claimed, 9_000);
    }

    #[test]
    fn conservation_across_purchases_and_claims() {
        let mut v = vesting();
        v.record_purchase(10_001, START, DURATION).unwrap();
        v.record_purchase(4_999, START, DURATION).unwrap();

        let purchased = v.total_purchased;
        assert_eq!(purchased, 15_000);
        assert_eq!(v.slots.iter().map(|s| s.amount).sum::<u64>(), purchased);

        v.take_claimable(START + 2 * DURATION);
        let outstanding: u64 = v.slots.iter().map(|s| s.amount).sum();
        assert_eq!(outstanding + v.total_claimed, purchased);
    }

    #[test]
    fn overflow_reports_none() {
        let mut v = vesting();
        v.record_purchase(u64::MAX - 2, START, DURATION).unwrap();
        let slots_before = v.slots;

        assert!(v.record_purchase(u64::MAX, START, DURATION).is_none());
        assert_eq!(v.slots, slots_before);
        assert_eq!(v.total_purchased, u64::MAX - 2);
    }

    #[test]
    fn failed_purchase_leaves_the_ledger_untouched() {
        // overflow on the running total must not leak into the slots
        let mut v = vesting();
        v.total_purchased = u64::MAX;

        assert!(v.record_purchase(9_000, START, DURATION).is_none());
        assert_eq!(v.slots, [VestingSlot::default(); VESTING_SLOT_COUNT]);
        assert_eq!(v.total_purchased, u64::MAX);
    }
}
