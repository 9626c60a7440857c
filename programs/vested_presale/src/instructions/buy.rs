/**
 * Purchase Instructions
 *
 * Converts a sale token amount into a SOL or USDT cost at the active
 * round's USD price, debits the allocation budget, pulls the payment
 * to the treasury, and schedules the vesting slots.
 */

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token::{transfer, Token, TokenAccount, Transfer};

use crate::{
    state::{PresaleConfig, PriceFeed, Round, UserVesting},
    BoughtWithSol,
    BoughtWithUsdt,
    PresaleError,
    CONFIG_SEED,
    PRICE_FEED_SEED,
    VESTING_SEED,
};

// =============================================================================
// BUY WITH SOL
// =============================================================================

#[derive(Accounts)]
pub struct BuyWithSol<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PresaleConfig>,

    #[account(
        seeds = [PRICE_FEED_SEED],
        bump = price_feed.bump,
    )]
    pub price_feed: Account<'info, PriceFeed>,

    /// CHECK: payment destination, held to the configured treasury key
    #[account(
        mut,
        constraint = treasury.key() == config.treasury @ PresaleError::InvalidTreasury,
    )]
    pub treasury: UncheckedAccount<'info>,

    /// Vesting ledger for (buyer, active round), created on first buy
    #[account(
        init_if_needed,
        payer = buyer,
        space = UserVesting::LEN,
        seeds = [VESTING_SEED, buyer.key().as_ref(), &config.active_round_id.to_le_bytes()],
        bump,
    )]
    pub user_vesting: Account<'info, UserVesting>,

    pub system_program: Program<'info, System>,
}

pub fn buy_with_sol_handler(
    ctx: Context<BuyWithSol>,
    sale_token_amount: u64,
    max_sol_cost: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let config = &mut ctx.accounts.config;

    require!(!config.paused, PresaleError::Paused);

    let round = *config.active_round().ok_or(PresaleError::RoundNotFound)?;

    if !round.is_open(now) {
        msg!(
            "Buy period violation: now={} start={} end={}",
            now,
            round.start_time,
            round.end_time
        );
        return err!(PresaleError::InvalidBuyPeriod);
    }

    Round::check_purchase_amount(sale_token_amount)?;

    let feed = &ctx.accounts.price_feed;
    require!(feed.price > 0, PresaleError::InvalidOraclePrice);
    require!(feed.is_fresh(now), PresaleError::StalePrice);

    let sol_cost = round
        .sol_cost(sale_token_amount, feed.price, feed.expo)
        .ok_or(PresaleError::MathOverflow)?;

    if sol_cost > max_sol_cost {
        msg!("Required {} lamports, max cost {}", sol_cost, max_sol_cost);
        return err!(PresaleError::InsufficientPayment);
    }

    // single check-and-debit against the budget
    require!(
        config.debit_allocated(sale_token_amount),
        PresaleError::InsufficientAllocatedAmount
    );

    // pull exactly the required lamports; the excess up to max_sol_cost
    // never leaves the buyer
    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.buyer.to_account_info(),
                to: ctx.accounts.treasury.to_account_info(),
            },
        ),
        sol_cost,
    )?;

    let vesting = &mut ctx.accounts.user_vesting;
    if vesting.buyer == Pubkey::default() {
        vesting.buyer = ctx.accounts.buyer.key();
        vesting.round_id = round.id;
        vesting.bump = ctx.bumps.user_vesting;
    }
    vesting
        .record_purchase(sale_token_amount, round.start_time, config.vesting_duration)
        .ok_or(PresaleError::MathOverflow)?;

    emit!(BoughtWithSol {
        buyer: ctx.accounts.buyer.key(),
        round_id: round.id,
        sale_token_amount,
        sol_cost,
    });

    Ok(())
}

// =============================================================================
// BUY WITH USDT
// =============================================================================

#[derive(Accounts)]
pub struct BuyWithUsdt<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PresaleConfig>,

    #[account(
        mut,
        constraint = buyer_usdt_account.owner == buyer.key(),
        constraint = buyer_usdt_account.mint == config.usdt_mint,
    )]
    pub buyer_usdt_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = treasury_usdt_account.owner == config.treasury @ PresaleError::InvalidTreasury,
        constraint = treasury_usdt_account.mint == config.usdt_mint,
    )]
    pub treasury_usdt_account: Account<'info, TokenAccount>,

    /// Vesting ledger for (buyer, active round), created on first buy
    #[account(
        init_if_needed,
        payer = buyer,
        space = UserVesting::LEN,
        seeds = [VESTING_SEED, buyer.key().as_ref(), &config.active_round_id.to_le_bytes()],
        bump,
    )]
    pub user_vesting: Account<'info, UserVesting>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn buy_with_usdt_handler(ctx: Context<BuyWithUsdt>, sale_token_amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let config = &mut ctx.accounts.config;

    require!(!config.paused, PresaleError::Paused);

    let round = *config.active_round().ok_or(PresaleError::RoundNotFound)?;

    if !round.is_open(now) {
        msg!(
            "Buy period violation: now={} start={} end={}",
            now,
            round.start_time,
            round.end_time
        );
        return err!(PresaleError::InvalidBuyPeriod);
    }

    Round::check_purchase_amount(sale_token_amount)?;

    let usdt_cost = round
        .usdt_cost(sale_token_amount)
        .ok_or(PresaleError::MathOverflow)?;

    require!(
        config.debit_allocated(sale_token_amount),
        PresaleError::InsufficientAllocatedAmount
    );

    // exact-amount pull, buyer signs
    transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.buyer_usdt_account.to_account_info(),
                to: ctx.accounts.treasury_usdt_account.to_account_info(),
                authority: ctx.accounts.buyer.to_account_info(),
            },
        ),
        usdt_cost,
    )?;

    let vesting = &mut ctx.accounts.user_vesting;
    if vesting.buyer == Pubkey::default() {
        vesting.buyer = ctx.accounts.buyer.key();
        vesting.round_id = round.id;
        vesting.bump = ctx.bumps.user_vesting;
    }
    vesting
        .record_purchase(sale_token_amount, round.start_time, config.vesting_duration)
        .ok_or(PresaleError::MathOverflow)?;

    emit!(BoughtWithUsdt {
        buyer: ctx.accounts.buyer.key(),
        round_id: round.id,
        sale_token_amount,
        usdt_cost,
    });

    Ok(())
}
