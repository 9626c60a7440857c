/**
 * State Accounts for the Vested Presale
 */

pub mod config;
pub mod price_feed;
pub mod round;
pub mod vesting;

pub use config::*;
pub use price_feed::*;
pub use round::*;
pub use vesting::*;
