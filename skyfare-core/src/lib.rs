pub mod offers;
pub mod orders;
pub mod passenger;
pub mod payment;
pub mod phone;
pub mod platform;
