/**
 * Instructions for the Vested Presale
 */

pub mod initialize;
pub mod rounds;
pub mod admin;
pub mod oracle;
pub mod buy;
pub mod claim;
pub mod vault;

pub use initialize::*;
pub use rounds::*;
pub use admin::*;
pub use oracle::*;
pub use buy::*;
pub use claim::*;
pub use vault::*;
