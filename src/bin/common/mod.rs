pub mod export;
pub mod helpers;
