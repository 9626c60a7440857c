/**
 * Claim Instruction
 *
 * Pays out every matured vesting slot of one (buyer, round) ledger
 * from the sale vault.
 */

use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{transfer, Mint, Token, TokenAccount, Transfer};

use crate::{
    state::{PresaleConfig, UserVesting},
    Claimed,
    PresaleError,
    CONFIG_SEED,
    SALE_VAULT_SEED,
    VESTING_SEED,
};

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct Claim<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PresaleConfig>,

    #[account(
        mut,
        seeds = [VESTING_SEED, buyer.key().as_ref(), &round_id.to_le_bytes()],
        bump = user_vesting.bump,
        has_one = buyer,
    )]
    pub user_vesting: Account<'info, UserVesting>,

    #[account(
        mut,
        seeds = [SALE_VAULT_SEED],
        bump = config.vault_bump,
    )]
    pub sale_vault: Account<'info, TokenAccount>,

    #[account(address = config.sale_token_mint)]
    pub sale_token_mint: Account<'info, Mint>,

    /// Created on first claim if the buyer has no sale token account yet
    #[account(
        init_if_needed,
        payer = buyer,
        associated_token::mint = sale_token_mint,
        associated_token::authority = buyer,
    )]
    pub buyer_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn claim_handler(ctx: Context<Claim>, round_id: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let config = &ctx.accounts.config;

    require!(!config.paused, PresaleError::Paused);

    let vesting = &mut ctx.accounts.user_vesting;
    let amount = vesting.take_claimable(now);
    if amount == 0 {
        msg!("Nothing claimable for {} in round {}", vesting.buyer, round_id);
        return err!(PresaleError::ZeroClaimableAmount);
    }

    // vault is owned by the config PDA
    let seeds = &[CONFIG_SEED, &[config.bump]];

    transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.sale_vault.to_account_info(),
                to: ctx.accounts.buyer_token_account.to_account_info(),
                authority: config.to_account_info(),
            },
            &[seeds],
        ),
        amount,
    )?;

    emit!(Claimed {
        buyer: ctx.accounts.buyer.key(),
        round_id,
        amount,
    });

    Ok(())
}
