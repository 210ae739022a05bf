//! Order domain: lifecycle state machine and money arithmetic
//!
//! Everything here is pure. The server owns persistence and applies
//! [`status::decide`] results inside a transaction.

pub mod money;
pub mod status;

pub use money::{DeliveryPolicy, Totals};
pub use status::{
    Actor, OrderAction, OrderError, OrderState, OrderStatus, PaymentMethod, PaymentStatus,
    Transition, decide,
};
