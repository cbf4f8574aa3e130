pub mod delivery;
pub mod registration;
