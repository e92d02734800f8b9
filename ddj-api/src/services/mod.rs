//! The transactional pipelines that stitch `ddj-core`'s pure logic to the
//! `PostgreSQL` store: signup, bet placement, settlement, gift-code
//! redemption, and the admin operations.

pub mod admin_service;
pub mod bet_service;
pub mod redeem_service;
pub mod settlement_service;
pub mod signup_service;
