/**
 * Administration Instructions
 *
 * Treasury rotation and round manager capability grants. The pause
 * switch halts purchases and claims.
 */

use anchor_lang::prelude::*;

use crate::{
    state::PresaleConfig,
    PresaleError,
    PresalePaused,
    PresaleUnpaused,
    RoundManagerGranted,
    RoundManagerRevoked,
    TreasurySet,
    CONFIG_SEED,
    MAX_ROUND_MANAGERS,
};

#[derive(Accounts)]
pub struct AdminConfig<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
        has_one = admin @ PresaleError::UnauthorizedAdmin,
    )]
    pub config: Account<'info, PresaleConfig>,
}

// =============================================================================
// TREASURY
// =============================================================================

pub fn set_treasury_handler(ctx: Context<AdminConfig>, new_treasury: Pubkey) -> Result<()> {
    require!(new_treasury != Pubkey::default(), PresaleError::ZeroTreasury);

    let config = &mut ctx.accounts.config;
    let old_treasury = config.treasury;

    config.treasury = new_treasury;

    emit!(TreasurySet {
        old_treasury,
        new_treasury,
    });

    Ok(())
}

// =============================================================================
// ROUND MANAGER GRANTS
// =============================================================================

/// Granting an existing manager is a silent no-op, matching revoke
pub fn grant_round_manager_handler(ctx: Context<AdminConfig>, manager: Pubkey) -> Result<()> {
    let config = &mut ctx.accounts.config;

    require!(
        config.is_round_manager(&manager) || config.round_managers.len() < MAX_ROUND_MANAGERS,
        PresaleError::TooManyRoundManagers
    );

    if config.grant_round_manager(manager) {
        emit!(RoundManagerGranted { manager });
    } else {
        msg!("Round manager already granted: {}", manager);
    }

    Ok(())
}

pub fn revoke_round_manager_handler(ctx: Context<AdminConfig>, manager: Pubkey) -> Result<()> {
    let config = &mut ctx.accounts.config;

    if config.revoke_round_manager(&manager) {
        emit!(RoundManagerRevoked { manager });
    } else {
        msg!("Round manager not granted: {}", manager);
    }

    Ok(())
}

// =============================================================================
// PAUSE / UNPAUSE
// =============================================================================

pub fn pause_handler(ctx: Context<AdminConfig>) -> Result<()> {
    ctx.accounts.config.set_paused(true)?;

    emit!(PresalePaused {
        admin: ctx.accounts.admin.key(),
    });

    Ok(())
}

pub fn unpause_handler(ctx: Context<AdminConfig>) -> Result<()> {
    ctx.accounts.config.set_paused(false)?;

    emit!(PresaleUnpaused {
        admin: ctx.accounts.admin.key(),
    });

    Ok(())
}
