//! Domain model of the booking marketplace.

pub mod booking;
pub mod complaint;
pub mod property;
pub mod review;
pub mod room;
pub mod user;

pub use self::{
    booking::Booking, complaint::Complaint, property::Property, review::Review,
    room::Room, user::User,
};
