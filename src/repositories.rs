pub mod affiliates;
pub mod balances;
pub mod cdn;
pub mod conversions;
pub mod email;
pub mod mlm;
pub mod notifications;
pub mod offers;
pub mod payouts;
pub mod risk;
pub mod tokens;
pub mod tracking;
