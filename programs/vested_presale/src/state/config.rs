/**
 * Presale Config State
 *
 * Singleton account holding the role capabilities, treasury, round
 * registry, active round pointer, and the sale allocation budget.
 */

use anchor_lang::prelude::*;

use crate::state::Round;
use crate::{PresaleError, MAX_ROUNDS, MAX_ROUND_MANAGERS};

/// Presale configuration account
/// Every privileged mutation and every purchase goes through this PDA
#[account]
pub struct PresaleConfig {
    /// Admin: grants roles, pauses, sets treasury, moves vault funds
    pub admin: Pubkey,

    /// Destination for SOL and USDT payments
    pub treasury: Pubkey,

    /// Mint of the token being sold
    pub sale_token_mint: Pubkey,

    /// Mint accepted for stable payment
    pub usdt_mint: Pubkey,

    /// Spacing between vesting releases in seconds, fixed at init
    pub vesting_duration: i64,

    /// Round eligible for purchases; 0 = none
    pub active_round_id: u64,

    /// Sale token budget still available, raw units
    pub allocated_amount: u64,

    /// Purchases and claims halt while set
    pub paused: bool,

    /// Keys holding the round manager capability
    pub round_managers: Vec<Pubkey>,

    /// Registered rounds in insertion order; rounds are never removed
    pub rounds: Vec<Round>,

    /// Bump seed for PDA
    pub bump: u8,

    /// Bump seed for the sale vault PDA
    pub vault_bump: u8,
}

impl PresaleConfig {
    pub const LEN: usize = 8 + // discriminator
        32 + // admin
        32 + // treasury
        32 + // sale_token_mint
        32 + // usdt_mint
        8 +  // vesting_duration
        8 +  // active_round_id
        8 +  // allocated_amount
        1 +  // paused
        4 + MAX_ROUND_MANAGERS * 32 + // round_managers
        4 + MAX_ROUNDS * Round::SIZE + // rounds
        1 +  // bump
        1;   // vault_bump

    /// Check the round manager capability
    pub fn is_round_manager(&self, key: &Pubkey) -> bool {
        self.round_managers.contains(key)
    }

    /// Add a manager; returns false (unchanged) if already granted
    pub fn grant_round_manager(&mut self, manager: Pubkey) -> bool {
        if self.is_round_manager(&manager) {
            return false;
        }
        self.round_managers.push(manager);
        true
    }

    /// Remove a manager; returns false (unchanged) if not granted
    pub fn revoke_round_manager(&mut self, manager: &Pubkey) -> bool {
        match self.round_managers.iter().position(|m| m == manager) {
            Some(index) => {
                self.round_managers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn round(&self, round_id: u64) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }

    pub fn round_mut(&mut self, round_id: u64) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.id == round_id)
    }

    /// The round the active pointer names, if any
    pub fn active_round(&self) -> Option<&Round> {
        if self.active_round_id == 0 {
            return None;
        }
        self.round(self.active_round_id)
    }

    /// Insert a round, or overwrite the stored one with the same id.
    /// Returns true when the round was newly appended.
    /// Capacity and field invariants are the caller's to check.
    pub fn upsert_round(&mut self, round: Round) -> bool {
        match self.round_mut(round.id) {
            Some(existing) => {
                *existing = round;
                false
            }
            None => {
                self.rounds.push(round);
                true
            }
        }
    }

    /// Id of the most recently started round as of `now`: greatest
    /// `start_time <= now`, first in insertion order on ties.
    pub fn latest_started_round_id(&self, now: i64) -> Option<u64> {
        let mut best: Option<&Round> = None;
        for round in self.rounds.iter() {
            if round.start_time > now {
                continue;
            }
            match best {
                Some(b) if round.start_time <= b.start_time => {}
                _ => best = Some(round),
            }
        }
        best.map(|r| r.id)
    }

    /// Move the active pointer to the most recently started round.
    /// Returns the new id only when the pointer actually changed; a
    /// repeat call with unchanged rounds is a no-op.
    pub fn advance_active_round(&mut self, now: i64) -> Option<u64> {
        match self.latest_started_round_id(now) {
            Some(id) if id != self.active_round_id => {
                self.active_round_id = id;
                Some(id)
            }
            _ => None,
        }
    }

    /// Budget check and debit as one step; false leaves the budget
    /// untouched.
    pub fn debit_allocated(&mut self, amount: u64) -> bool {
        match self.allocated_amount.checked_sub(amount) {
            Some(remaining) => {
                self.allocated_amount = remaining;
                true
            }
            None => false,
        }
    }

    /// Pause transition; a repeat in either direction is an error
    pub fn set_paused(&mut self, paused: bool) -> std::result::Result<(), PresaleError> {
        if self.paused == paused {
            return Err(if paused {
                PresaleError::AlreadyPaused
            } else {
                PresaleError::AlreadyUnpaused
            });
        }
        self.paused = paused;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PresaleConfig {
        PresaleConfig {
            admin: Pubkey::new_unique(),
            treasury: Pubkey::new_unique(),
            sale_token_mint: Pubkey::new_unique(),
            usdt_mint: Pubkey::new_unique(),
            vesting_duration: 60,
            active_round_id: 0,
            allocated_amount: 0,
            paused: false,
            round_managers: Vec::new(),
            rounds: Vec::new(),
            bump: 255,
            vault_bump: 254,
        }
    }

    fn round(id: u64, start_time: i64) -> Round {
        Round {
            id,
            start_time,
            end_time: start_time + 60,
            price: 200,
        }
    }

    #[test]
    fn upsert_appends_then_overwrites() {
        let mut c = config();
        assert!(c.upsert_round(round(1, 100)));
        assert!(c.upsert_round(round(2, 200)));
        assert_eq!(c.rounds.len(), 2);

        // same id mutates in place, no duplicate, order kept
        let mut updated = round(1, 100);
        updated.price = 300;
        assert!(!c.upsert_round(updated));
        assert_eq!(c.rounds.len(), 2);
        assert_eq!(c.rounds[0].price, 300);
        assert_eq!(c.rounds[0].id, 1);
    }

    #[test]
    fn active_round_requires_valid_pointer() {
        let mut c = config();
        c.upsert_round(round(1, 100));

        assert!(c.active_round().is_none());

        c.active_round_id = 7; // dangling id
        assert!(c.active_round().is_none());

        c.active_round_id = 1;
        assert_eq!(c.active_round().unwrap().id, 1);
    }

    #[test]
    fn latest_started_picks_greatest_start_not_past_now() {
        let mut c = config();
        c.upsert_round(round(1, 100));
        c.upsert_round(round(2, 300));
        c.upsert_round(round(3, 200));

        assert_eq!(c.latest_started_round_id(50), None);
        assert_eq!(c.latest_started_round_id(100), Some(1));
        assert_eq!(c.latest_started_round_id(250), Some(3));
        assert_eq!(c.latest_started_round_id(300), Some(2));
        assert_eq!(c.latest_started_round_id(i64::MAX), Some(2));
    }

    #[test]
    fn latest_started_tie_keeps_insertion_order() {
        let mut c = config();
        c.upsert_round(round(5, 100));
        c.upsert_round(round(6, 100));
        assert_eq!(c.latest_started_round_id(150), Some(5));
    }

    #[test]
    fn advance_is_idempotent_until_rounds_change() {
        let mut c = config();
        assert_eq!(c.advance_active_round(100), None);

        c.upsert_round(round(1, 100));
        c.upsert_round(round(2, 200));

        assert_eq!(c.advance_active_round(250), Some(2));
        assert_eq!(c.active_round_id, 2);

        // same rounds, same pointer: the repeat call changes nothing
        assert_eq!(c.advance_active_round(250), None);
        assert_eq!(c.active_round_id, 2);

        c.upsert_round(round(3, 300));
        assert_eq!(c.advance_active_round(350), Some(3));
        assert_eq!(c.active_round_id, 3);
    }

    #[test]
    fn debit_is_all_or_nothing() {
        let mut c = config();
        c.allocated_amount = 1_000;

        assert!(c.debit_allocated(400));
        assert_eq!(c.allocated_amount, 600);

        assert!(!c.debit_allocated(601));
        assert_eq!(c.allocated_amount, 600);

        assert!(c.debit_allocated(600));
        assert_eq!(c.allocated_amount, 0);
    }

    #[test]
    fn grant_and_revoke_are_idempotent() {
        let mut c = config();
        let manager = Pubkey::new_unique();

        assert!(c.grant_round_manager(manager));
        assert!(!c.grant_round_manager(manager));
        assert_eq!(c.round_managers.len(), 1);
        assert!(c.is_round_manager(&manager));

        assert!(c.revoke_round_manager(&manager));
        assert!(!c.revoke_round_manager(&manager));
        assert!(!c.is_round_manager(&manager));
    }

    #[test]
    fn pause_transitions_reject_repeats() {
        let mut c = config();

        assert!(matches!(
            c.set_paused(false),
            Err(PresaleError::AlreadyUnpaused)
        ));
        assert!(!c.paused);

        assert!(c.set_paused(true).is_ok());
        assert!(c.paused);
        assert!(matches!(c.set_paused(true), Err(PresaleError::AlreadyPaused)));
        assert!(c.paused);

        assert!(c.set_paused(false).is_ok());
        assert!(!c.paused);
    }
}
