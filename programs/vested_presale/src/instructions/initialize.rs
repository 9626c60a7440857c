/**
 * Initialize Instruction
 *
 * Creates the presale config plus the SOL/USD price feed and the
 * sale token vault. Called once by the deployer, who becomes admin.
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    state::{PresaleConfig, PriceFeed},
    PresaleError,
    PresaleInitialized,
    CONFIG_SEED,
    PRICE_FEED_SEED,
    SALE_VAULT_SEED,
};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    pub sale_token_mint: Account<'info, Mint>,

    pub usdt_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = admin,
        space = PresaleConfig::LEN,
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, PresaleConfig>,

    #[account(
        init,
        payer = admin,
        space = PriceFeed::LEN,
        seeds = [PRICE_FEED_SEED],
        bump,
    )]
    pub price_feed: Account<'info, PriceFeed>,

    #[account(
        init,
        payer = admin,
        seeds = [SALE_VAULT_SEED],
        bump,
        token::mint = sale_token_mint,
        token::authority = config,
    )]
    pub sale_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<Initialize>,
    treasury: Pubkey,
    price_authority: Pubkey,
    vesting_duration: i64,
) -> Result<()> {
    // Every constructor reference must be set
    require!(
        ctx.accounts.sale_token_mint.key() != Pubkey::default(),
        PresaleError::ZeroSaleToken
    );
    require!(
        ctx.accounts.usdt_mint.key() != Pubkey::default(),
        PresaleError::ZeroUsdtToken
    );
    require!(price_authority != Pubkey::default(), PresaleError::ZeroPriceAuthority);
    require!(treasury != Pubkey::default(), PresaleError::ZeroTreasury);
    require!(vesting_duration > 0, PresaleError::ZeroVestingDuration);

    let config = &mut ctx.accounts.config;

    config.admin = ctx.accounts.admin.key();
    config.treasury = treasury;
    config.sale_token_mint = ctx.accounts.sale_token_mint.key();
    config.usdt_mint = ctx.accounts.usdt_mint.key();
    config.vesting_duration = vesting_duration;
    config.active_round_id = 0;
    config.allocated_amount = 0;
    config.paused = false;
    // the deployer starts with the round manager capability as well
    config.round_managers = vec![config.admin];
    config.rounds = Vec::new();
    config.bump = ctx.bumps.config;
    config.vault_bump = ctx.bumps.sale_vault;

    let feed = &mut ctx.accounts.price_feed;

    feed.authority = price_authority;
    feed.price = 0;
    feed.expo = 0;
    feed.oracle_round_id = 0;
    feed.publish_time = 0;
    feed.bump = ctx.bumps.price_feed;

    emit!(PresaleInitialized {
        admin: config.admin,
        sale_token_mint: config.sale_token_mint,
        usdt_mint: config.usdt_mint,
        treasury,
        price_authority,
        vesting_duration,
    });

    Ok(())
}
