/**
 * Round Management Instructions
 *
 * Round creation and update, plus the setters for the active round
 * pointer and the allocation budget. All gated on the round manager
 * capability.
 */

use anchor_lang::prelude::*;

use crate::{
    state::{PresaleConfig, Round},
    PresaleError,
    ActiveRoundIdSet,
    AllocatedAmountSet,
    RoundCreated,
    RoundUpdated,
    CONFIG_SEED,
    MAX_ROUNDS,
};

// =============================================================================
// CREATE / UPDATE ROUND
// =============================================================================

#[derive(Accounts)]
pub struct CreateRound<'info> {
    #[account(
        constraint = config.is_round_manager(&manager.key()) @ PresaleError::UnauthorizedRoundManager
    )]
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PresaleConfig>,
}

pub fn create_round_handler(
    ctx: Context<CreateRound>,
    round_id: u64,
    start_time: i64,
    end_time: i64,
    price: u64,
) -> Result<()> {
    Round::validate_fields(round_id, start_time, end_time, price)?;

    let config = &mut ctx.accounts.config;
    require!(
        config.round(round_id).is_some() || config.rounds.len() < MAX_ROUNDS,
        PresaleError::TooManyRounds
    );

    let created = config.upsert_round(Round {
        id: round_id,
        start_time,
        end_time,
        price,
    });

    if created {
        emit!(RoundCreated {
            round_id,
            start_time,
            end_time,
            price,
        });
    } else {
        emit!(RoundUpdated {
            round_id,
            start_time,
            end_time,
            price,
        });
    }

    Ok(())
}

// =============================================================================
// SET ACTIVE ROUND
// =============================================================================

#[derive(Accounts)]
pub struct SetActiveRoundId<'info> {
    #[account(
        constraint = config.is_round_manager(&manager.key()) @ PresaleError::UnauthorizedRoundManager
    )]
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PresaleConfig>,
}

pub fn set_active_round_id_handler(ctx: Context<SetActiveRoundId>, round_id: u64) -> Result<()> {
    let config = &mut ctx.accounts.config;

    // the id may name a not-yet-created round; buys fail until it exists
    require!(
        round_id != 0 && round_id != config.active_round_id,
        PresaleError::InvalidActiveRoundId
    );

    config.active_round_id = round_id;

    emit!(ActiveRoundIdSet { round_id });

    Ok(())
}

// =============================================================================
// CHECK TO SET ACTIVE ROUND
// =============================================================================

#[derive(Accounts)]
pub struct CheckToSetActiveRoundId<'info> {
    #[account(
        constraint = config.is_round_manager(&manager.key()) @ PresaleError::UnauthorizedRoundManager
    )]
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PresaleConfig>,
}

/// Poll-style advance: pick the most recently started round, emit only
/// on an actual change
pub fn check_to_set_active_round_id_handler(ctx: Context<CheckToSetActiveRoundId>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    let now = Clock::get()?.unix_timestamp;

    match config.advance_active_round(now) {
        Some(round_id) => emit!(ActiveRoundIdSet { round_id }),
        None => msg!("Active round unchanged"),
    }

    Ok(())
}

// =============================================================================
// SET ALLOCATED AMOUNT
// =============================================================================

#[derive(Accounts)]
pub struct SetAllocatedAmount<'info> {
    #[account(
        constraint = config.is_round_manager(&manager.key()) @ PresaleError::UnauthorizedRoundManager
    )]
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PresaleConfig>,
}

pub fn set_allocated_amount_handler(ctx: Context<SetAllocatedAmount>, amount: u64) -> Result<()> {
    let config = &mut ctx.accounts.config;

    config.allocated_amount = amount;

    emit!(AllocatedAmountSet { amount });

    Ok(())
}
