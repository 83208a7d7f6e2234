//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing an entity payment.
#[derive(Clone, Copy, Debug)]
pub struct Payment;

/// Marker type describing an entity resolution.
#[derive(Clone, Copy, Debug)]
pub struct Resolution;
