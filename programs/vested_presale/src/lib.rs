/**
 * Vested Presale
 *
 * Fixed-price token presale: scheduled sale rounds paid in SOL or USDT,
 * with purchases vesting across three stepped release slots.
 *
 * License: BUSL-1.1
 */

use anchor_lang::prelude::*;

pub mod state;
pub mod instructions;

use state::*;
use instructions::*;

declare_id!("H24NyMwG6MaDCrJDnG6Y2N6dD6ova1gsyAszveVSTgMH");

// =============================================================================
// SEEDS
// =============================================================================

pub const CONFIG_SEED: &[u8] = b"config";
pub const SALE_VAULT_SEED: &[u8] = b"sale_vault";
pub const PRICE_FEED_SEED: &[u8] = b"price_feed";
pub const VESTING_SEED: &[u8] = b"vesting";

// =============================================================================
// CONSTANTS
// =============================================================================

/// Round price fixed point: USD per whole sale token, scaled by 1e4
/// (price = 200 means $0.02 per token)
pub const PRICE_SCALE: u64 = 10_000;

/// Sale token decimals
pub const SALE_TOKEN_DECIMALS: u8 = 9;

/// Raw units per whole sale token
pub const SALE_TOKEN_BASE: u64 = 1_000_000_000;

/// Raw units per whole USDT (6 decimals)
pub const USDT_BASE: u64 = 1_000_000;

/// Number of vesting releases per purchase
pub const VESTING_SLOT_COUNT: usize = 3;

/// Minimum purchase: 5,000 whole sale tokens
pub const MIN_SALE_TOKEN_AMOUNT: u64 = 5_000 * SALE_TOKEN_BASE;

/// Maximum purchase: 50,000 whole sale tokens
pub const MAX_SALE_TOKEN_AMOUNT: u64 = 50_000 * SALE_TOKEN_BASE;

/// Posted SOL/USD prices older than this are rejected at buy time
pub const MAX_PRICE_AGE_SECS: i64 = 120;

/// Most negative exponent accepted from the price feed
pub const MIN_ORACLE_EXPO: i32 = -12;

/// Round registry capacity (config account space is allocated once)
pub const MAX_ROUNDS: usize = 32;

/// Round manager capability list capacity
pub const MAX_ROUND_MANAGERS: usize = 8;

// =============================================================================
// PROGRAM
// =============================================================================

#[program]
pub mod vested_presale {
    use super::*;

    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Initialize the presale config plus the price feed and sale vault
    /// Called once; the signer becomes admin and the first round manager
    pub fn initialize(
        ctx: Context<Initialize>,
        treasury: Pubkey,
        price_authority: Pubkey,
        vesting_duration: i64,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, treasury, price_authority, vesting_duration)
    }

    // =========================================================================
    // ROUND MANAGEMENT
    // =========================================================================

    /// Create a round, or update it in place when the id already exists
    pub fn create_round(
        ctx: Context<CreateRound>,
        round_id: u64,
        start_time: i64,
        end_time: i64,
        price: u64,
    ) -> Result<()> {
        instructions::rounds::create_round_handler(ctx, round_id, start_time, end_time, price)
    }

    /// Point the presale at a round explicitly
    pub fn set_active_round_id(ctx: Context<SetActiveRoundId>, round_id: u64) -> Result<()> {
        instructions::rounds::set_active_round_id_handler(ctx, round_id)
    }

    /// Advance the active round to the most recently started one
    /// No-op when nothing has started or the pointer already matches
    pub fn check_to_set_active_round_id(ctx: Context<CheckToSetActiveRoundId>) -> Result<()> {
        instructions::rounds::check_to_set_active_round_id_handler(ctx)
    }

    /// Set the sale token budget available for purchase
    pub fn set_allocated_amount(ctx: Context<SetAllocatedAmount>, amount: u64) -> Result<()> {
        instructions::rounds::set_allocated_amount_handler(ctx, amount)
    }

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================

    /// Change the treasury that receives payments
    pub fn set_treasury(ctx: Context<AdminConfig>, new_treasury: Pubkey) -> Result<()> {
        instructions::admin::set_treasury_handler(ctx, new_treasury)
    }

    /// Grant the round manager capability (no-op if already granted)
    pub fn grant_round_manager(ctx: Context<AdminConfig>, manager: Pubkey) -> Result<()> {
        instructions::admin::grant_round_manager_handler(ctx, manager)
    }

    /// Revoke the round manager capability (no-op if not granted)
    pub fn revoke_round_manager(ctx: Context<AdminConfig>, manager: Pubkey) -> Result<()> {
        instructions::admin::revoke_round_manager_handler(ctx, manager)
    }

    /// Halt purchases and claims
    pub fn pause(ctx: Context<AdminConfig>) -> Result<()> {
        instructions::admin::pause_handler(ctx)
    }

    /// Resume purchases and claims
    pub fn unpause(ctx: Context<AdminConfig>) -> Result<()> {
        instructions::admin::unpause_handler(ctx)
    }

    // =========================================================================
    // PRICE FEED
    // =========================================================================

    /// Post a SOL/USD price observation
    /// Feed authority only; round ids must strictly increase
    pub fn post_sol_usd_price(
        ctx: Context<PostSolUsdPrice>,
        price: i64,
        expo: i32,
        oracle_round_id: u64,
    ) -> Result<()> {
        instructions::oracle::post_sol_usd_price_handler(ctx, price, expo, oracle_round_id)
    }

    // =========================================================================
    // PURCHASE
    // =========================================================================

    /// Buy sale tokens with SOL at the active round's USD price
    /// Pulls exactly the required lamports, bounded by `max_sol_cost`
    pub fn buy_with_sol(
        ctx: Context<BuyWithSol>,
        sale_token_amount: u64,
        max_sol_cost: u64,
    ) -> Result<()> {
        instructions::buy::buy_with_sol_handler(ctx, sale_token_amount, max_sol_cost)
    }

    /// Buy sale tokens with USDT at the active round's USD price
    pub fn buy_with_usdt(ctx: Context<BuyWithUsdt>, sale_token_amount: u64) -> Result<()> {
        instructions::buy::buy_with_usdt_handler(ctx, sale_token_amount)
    }

    // =========================================================================
    // CLAIM
    // =========================================================================

    /// Claim all matured vesting slots for one round
    pub fn claim(ctx: Context<Claim>, round_id: u64) -> Result<()> {
        instructions::claim::claim_handler(ctx, round_id)
    }

    // =========================================================================
    // SALE TOKEN VAULT
    // =========================================================================

    /// Fund the sale token vault that claims draw from
    pub fn deposit_sale_tokens(ctx: Context<DepositSaleTokens>, amount: u64) -> Result<()> {
        instructions::vault::deposit_sale_tokens_handler(ctx, amount)
    }

    /// Recover unsold tokens from the vault
    pub fn withdraw_sale_tokens(ctx: Context<WithdrawSaleTokens>, amount: u64) -> Result<()> {
        instructions::vault::withdraw_sale_tokens_handler(ctx, amount)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[error_code]
pub enum PresaleError {
    #[msg("Sale token mint must not be the default address")]
    ZeroSaleToken,

    #[msg("USDT mint must not be the default address")]
    ZeroUsdtToken,

    #[msg("Price feed authority must not be the default address")]
    ZeroPriceAuthority,

    #[msg("Treasury must not be the default address")]
    ZeroTreasury,

    #[msg("Vesting duration must be positive")]
    ZeroVestingDuration,

    #[msg("Round id must be non-zero")]
    InvalidRoundId,

    #[msg("Round times must be positive with end after start")]
    InvalidTimePeriod,

    #[msg("Round price must be non-zero")]
    InvalidPrice,

    #[msg("Round registry is full")]
    TooManyRounds,

    #[msg("No round for the requested id")]
    RoundNotFound,

    #[msg("Active round id is zero or already set")]
    InvalidActiveRoundId,

    #[msg("Presale is paused")]
    Paused,

    #[msg("Presale is already paused")]
    AlreadyPaused,

    #[msg("Presale is not paused")]
    AlreadyUnpaused,

    #[msg("Current time is outside the active round's buy window")]
    InvalidBuyPeriod,

    #[msg("Purchase amount is below the minimum")]
    TooLowBuyAmount,

    #[msg("Purchase amount is above the maximum")]
    TooHighBuyAmount,

    #[msg("Required payment exceeds the declared maximum cost")]
    InsufficientPayment,

    #[msg("Purchase exceeds the remaining allocation budget")]
    InsufficientAllocatedAmount,

    #[msg("Posted price must be positive with exponent in range")]
    InvalidOraclePrice,

    #[msg("Price feed is stale")]
    StalePrice,

    #[msg("No vesting slots have matured")]
    ZeroClaimableAmount,

    #[msg("Caller is not the admin")]
    UnauthorizedAdmin,

    #[msg("Caller is not a round manager")]
    UnauthorizedRoundManager,

    #[msg("Caller is not the price feed authority")]
    UnauthorizedPriceAuthority,

    #[msg("Round manager list is full")]
    TooManyRoundManagers,

    #[msg("Treasury account does not match config")]
    InvalidTreasury,

    #[msg("Amount must be non-zero")]
    ZeroAmount,

    #[msg("Math overflow")]
    MathOverflow,
}

// =============================================================================
// EVENTS
// =============================================================================

#[event]
pub struct PresaleInitialized {
    pub admin: Pubkey,
    pub sale_token_mint: Pubkey,
    pub usdt_mint: Pubkey,
    pub treasury: Pubkey,
    pub price_authority: Pubkey,
    pub vesting_duration: i64,
}

#[event]
pub struct RoundCreated {
    pub round_id: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub price: u64,
}

#[event]
pub struct RoundUpdated {
    pub round_id: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub price: u64,
}

#[event]
pub struct ActiveRoundIdSet {
    pub round_id: u64,
}

#[event]
pub struct AllocatedAmountSet {
    pub amount: u64,
}

#[event]
pub struct TreasurySet {
    pub old_treasury: Pubkey,
    pub new_treasury: Pubkey,
}

#[event]
pub struct RoundManagerGranted {
    pub manager: Pubkey,
}

#[event]
pub struct RoundManagerRevoked {
    pub manager: Pubkey,
}

#[event]
pub struct PresalePaused {
    pub admin: Pubkey,
}

#[event]
pub struct PresaleUnpaused {
    pub admin: Pubkey,
}

#[event]
pub struct SolUsdPricePosted {
    pub price: i64,
    pub expo: i32,
    pub oracle_round_id: u64,
    pub publish_time: i64,
}

#[event]
pub struct BoughtWithSol {
    pub buyer: Pubkey,
    pub round_id: u64,
    pub sale_token_amount: u64,
    pub sol_cost: u64,
}

#[event]
pub struct BoughtWithUsdt {
    pub buyer: Pubkey,
    pub round_id: u64,
    pub sale_token_amount: u64,
    pub usdt_cost: u64,
}

#[event]
pub struct Claimed {
    pub buyer: Pubkey,
    pub round_id: u64,
    pub amount: u64,
}

#[event]
pub struct SaleTokensDeposited {
    pub from: Pubkey,
    pub amount: u64,
}

#[event]
pub struct SaleTokensWithdrawn {
    pub destination: Pubkey,
    pub amount: u64,
}
