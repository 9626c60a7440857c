/**
 * Price Feed Instructions
 *
 * Authority-signed SOL/USD observations consumed by SOL purchases.
 */

use anchor_lang::prelude::*;

use crate::{
    state::PriceFeed,
    PresaleError,
    SolUsdPricePosted,
    PRICE_FEED_SEED,
};

#[derive(Accounts)]
pub struct PostSolUsdPrice<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [PRICE_FEED_SEED],
        bump = price_feed.bump,
        has_one = authority @ PresaleError::UnauthorizedPriceAuthority,
    )]
    pub price_feed: Account<'info, PriceFeed>,
}

pub fn post_sol_usd_price_handler(
    ctx: Context<PostSolUsdPrice>,
    price: i64,
    expo: i32,
    oracle_round_id: u64,
) -> Result<()> {
    let feed = &mut ctx.accounts.price_feed;
    let now = Clock::get()?.unix_timestamp;

    if !PriceFeed::valid_observation(price, expo) {
        msg!("Rejected observation: price={} expo={}", price, expo);
        return err!(PresaleError::InvalidOraclePrice);
    }

    feed.record(price, expo, oracle_round_id, now)?;

    emit!(SolUsdPricePosted {
        price,
        expo,
        oracle_round_id,
        publish_time: now,
    });

    Ok(())
}
