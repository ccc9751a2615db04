pub mod amenities;
pub mod auth;
pub mod bookings;
pub mod listings;
pub mod proxy;
pub mod reviews;
pub mod settings;
pub mod upload;
pub mod users;
