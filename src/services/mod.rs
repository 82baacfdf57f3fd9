pub mod bookings;
pub mod earnings;
pub mod notifications;
