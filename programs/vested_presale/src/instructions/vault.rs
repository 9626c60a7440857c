/**
 * Sale Token Vault Instructions
 *
 * Admin funding of the claim vault and recovery of unsold tokens.
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{transfer, Token, TokenAccount, Transfer};

use crate::{
    state::PresaleConfig,
    PresaleError,
    SaleTokensDeposited,
    SaleTokensWithdrawn,
    CONFIG_SEED,
    SALE_VAULT_SEED,
};

// =============================================================================
// DEPOSIT
// =============================================================================

#[derive(Accounts)]
pub struct DepositSaleTokens<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
        has_one = admin @ PresaleError::UnauthorizedAdmin,
    )]
    pub config: Account<'info, PresaleConfig>,

    #[account(
        mut,
        constraint = source_token_account.owner == admin.key(),
        constraint = source_token_account.mint == config.sale_token_mint,
    )]
    pub source_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [SALE_VAULT_SEED],
        bump = config.vault_bump,
    )]
    pub sale_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn deposit_sale_tokens_handler(ctx: Context<DepositSaleTokens>, amount: u64) -> Result<()> {
    require!(amount > 0, PresaleError::ZeroAmount);

    transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.source_token_account.to_account_info(),
                to: ctx.accounts.sale_vault.to_account_info(),
                authority: ctx.accounts.admin.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(SaleTokensDeposited {
        from: ctx.accounts.source_token_account.key(),
        amount,
    });

    Ok(())
}

// =============================================================================
// WITHDRAW
// =============================================================================

#[derive(Accounts)]
pub struct WithdrawSaleTokens<'info> {
    pub admin: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
        has_one = admin @ PresaleError::UnauthorizedAdmin,
    )]
    pub config: Account<'info, PresaleConfig>,

    #[account(
        mut,
        seeds = [SALE_VAULT_SEED],
        bump = config.vault_bump,
    )]
    pub sale_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = destination_token_account.mint == config.sale_token_mint,
    )]
    pub destination_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn withdraw_sale_tokens_handler(ctx: Context<WithdrawSaleTokens>, amount: u64) -> Result<()> {
    require!(amount > 0, PresaleError::ZeroAmount);

    let config = &ctx.accounts.config;
    let seeds = &[CONFIG_SEED, &[config.bump]];

    transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.sale_vault.to_account_info(),
                to: ctx.accounts.destination_token_account.to_account_info(),
                authority: config.to_account_info(),
            },
            &[seeds],
        ),
        amount,
    )?;

    emit!(SaleTokensWithdrawn {
        destination: ctx.accounts.destination_token_account.key(),
        amount,
    });

    Ok(())
}
