//! Order lifecycle state machine
//!
//! ```text
//! pending → confirmed → preparing → out_for_delivery → delivered
//!    └──────────┴───────────┴──────────────┴──────────→ cancelled
//! ```
//!
//! `confirmed → out_for_delivery` is legal: riders may pick up confirmed
//! orders before they reach preparing.
//!
//! [`decide`] is pure. It takes the order's current state, who is acting
//! and what they want, and returns the [`Transition`] to persist. The
//! server applies it inside one transaction together with the audit row.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AppError, ErrorCode};
use crate::models::Role;

/// Order status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Preparing)
                | (Confirmed, OutForDelivery)
                | (Confirmed, Cancelled)
                | (Preparing, OutForDelivery)
                | (Preparing, Cancelled)
                | (OutForDelivery, Delivered)
                | (OutForDelivery, Cancelled)
        )
    }

    /// Statuses a rider can pick up from
    pub fn is_pickable(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Preparing)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    /// Cash on delivery
    #[default]
    Cod,
    Card,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// Something an actor wants to do to an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    /// Admin moves the order to another status
    UpdateStatus(OrderStatus),
    /// Admin sets or clears the rider (target already checked to be a rider)
    AssignRider(Option<i64>),
    /// Rider takes a confirmed/preparing order out for delivery
    PickUp,
    /// Rider hands the order over
    Deliver,
}

impl OrderAction {
    pub fn name(&self) -> &'static str {
        match self {
            OrderAction::UpdateStatus(_) => "update_status",
            OrderAction::AssignRider(_) => "assign_rider",
            OrderAction::PickUp => "pick_up",
            OrderAction::Deliver => "deliver",
        }
    }
}

/// Who is acting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

/// The parts of an order the state machine looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderState {
    pub status: OrderStatus,
    pub rider_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

/// Outcome of a legal action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub rider_id: Option<i64>,
    pub payment_status: PaymentStatus,
    /// Stamp `delivered_at`
    pub mark_delivered: bool,
    /// Put the order's quantities back on the shelf
    pub restore_stock: bool,
}

impl Transition {
    pub fn status_changed(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(i64),
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order is already {0}")]
    Finalized(OrderStatus),
    #[error("{role} cannot {action} orders")]
    NotPermitted { role: Role, action: &'static str },
    #[error("Order is not assigned to this rider")]
    NotAssignedToRider,
    #[error("Order is already assigned to another rider")]
    AlreadyAssigned,
    #[error("Order version mismatch: expected {expected}, found {actual}")]
    VersionConflict { expected: i64, actual: i64 },
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::NotFound(id) => AppError::order_not_found(id),
            OrderError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            OrderError::Finalized(status) => {
                AppError::with_message(ErrorCode::OrderFinalized, message)
                    .with_detail("status", status.as_str())
            }
            OrderError::NotPermitted { .. } => {
                AppError::with_message(ErrorCode::PermissionDenied, message)
            }
            OrderError::NotAssignedToRider => AppError::new(ErrorCode::OrderNotAssignedToRider),
            OrderError::AlreadyAssigned => AppError::new(ErrorCode::OrderAlreadyAssigned),
            OrderError::VersionConflict { expected, actual } => {
                AppError::with_message(ErrorCode::OrderVersionConflict, message)
                    .with_detail("expected_version", expected)
                    .with_detail("current_version", actual)
            }
        }
    }
}

/// Decide what `action` by `actor` does to an order in `state`
pub fn decide(
    state: &OrderState,
    actor: &Actor,
    action: OrderAction,
) -> Result<Transition, OrderError> {
    let from = state.status;
    let unchanged = Transition {
        from,
        to: from,
        rider_id: state.rider_id,
        payment_status: state.payment_status,
        mark_delivered: false,
        restore_stock: false,
    };

    let not_permitted = || OrderError::NotPermitted {
        role: actor.role,
        action: action.name(),
    };

    match (actor.role, action) {
        (Role::Admin, OrderAction::UpdateStatus(to)) => {
            if from.is_terminal() {
                return Err(OrderError::Finalized(from));
            }
            if !from.can_transition_to(to) {
                return Err(OrderError::InvalidTransition { from, to });
            }
            Ok(arrive(unchanged, state, to))
        }
        (Role::Admin, OrderAction::AssignRider(rider_id)) => {
            if from.is_terminal() {
                return Err(OrderError::Finalized(from));
            }
            let to = if rider_id.is_some() && from == OrderStatus::Preparing {
                OrderStatus::OutForDelivery
            } else {
                from
            };
            Ok(Transition {
                to,
                rider_id,
                ..unchanged
            })
        }
        (Role::Rider, OrderAction::PickUp) => {
            if from.is_terminal() {
                return Err(OrderError::Finalized(from));
            }
            if !from.is_pickable() {
                return Err(OrderError::InvalidTransition {
                    from,
                    to: OrderStatus::OutForDelivery,
                });
            }
            if state.rider_id.is_some_and(|id| id != actor.id) {
                return Err(OrderError::AlreadyAssigned);
            }
            Ok(Transition {
                to: OrderStatus::OutForDelivery,
                rider_id: Some(actor.id),
                ..unchanged
            })
        }
        (Role::Rider, OrderAction::Deliver) => {
            if from.is_terminal() {
                return Err(OrderError::Finalized(from));
            }
            if state.rider_id != Some(actor.id) {
                return Err(OrderError::NotAssignedToRider);
            }
            if !from.can_transition_to(OrderStatus::Delivered) {
                return Err(OrderError::InvalidTransition {
                    from,
                    to: OrderStatus::Delivered,
                });
            }
            Ok(arrive(unchanged, state, OrderStatus::Delivered))
        }
        _ => Err(not_permitted()),
    }
}

/// Side effects of landing on `to`
fn arrive(base: Transition, state: &OrderState, to: OrderStatus) -> Transition {
    let delivered = to == OrderStatus::Delivered;
    let payment_status = if delivered && state.payment_method == PaymentMethod::Cod {
        PaymentStatus::Paid
    } else {
        state.payment_status
    };
    Transition {
        to,
        payment_status,
        mark_delivered: delivered,
        restore_stock: to == OrderStatus::Cancelled,
        ..base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Actor = Actor {
        id: 1,
        role: Role::Admin,
    };
    const RIDER: Actor = Actor {
        id: 7,
        role: Role::Rider,
    };
    const OTHER_RIDER: Actor = Actor {
        id: 8,
        role: Role::Rider,
    };
    const CUSTOMER: Actor = Actor {
        id: 3,
        role: Role::Customer,
    };

    fn state(status: OrderStatus, rider_id: Option<i64>) -> OrderState {
        OrderState {
            status,
            rider_id,
            payment_method: PaymentMethod::Cod,
            payment_status: PaymentStatus::Pending,
        }
    }

    #[test]
    fn transition_table() {
        use OrderStatus::*;
        let allowed = [
            (Pending, Confirmed),
            (Pending, Cancelled),
            (Confirmed, Preparing),
            (Confirmed, OutForDelivery),
            (Confirmed, Cancelled),
            (Preparing, OutForDelivery),
            (Preparing, Cancelled),
            (OutForDelivery, Delivered),
            (OutForDelivery, Cancelled),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(status.is_terminal());
            for to in OrderStatus::ALL {
                let err = decide(&state(status, None), &ADMIN, OrderAction::UpdateStatus(to))
                    .unwrap_err();
                assert_eq!(err, OrderError::Finalized(status));
            }
        }
    }

    #[test]
    fn admin_skipping_steps_is_rejected() {
        let err = decide(
            &state(OrderStatus::Pending, None),
            &ADMIN,
            OrderAction::UpdateStatus(OrderStatus::Delivered),
        )
        .unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered
            }
        );
    }

    #[test]
    fn admin_cancel_restores_stock() {
        let t = decide(
            &state(OrderStatus::Preparing, None),
            &ADMIN,
            OrderAction::UpdateStatus(OrderStatus::Cancelled),
        )
        .unwrap();
        assert_eq!(t.to, OrderStatus::Cancelled);
        assert!(t.restore_stock);
        assert!(!t.mark_delivered);
        assert_eq!(t.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn assigning_rider_to_preparing_promotes() {
        let t = decide(
            &state(OrderStatus::Preparing, None),
            &ADMIN,
            OrderAction::AssignRider(Some(7)),
        )
        .unwrap();
        assert_eq!(t.to, OrderStatus::OutForDelivery);
        assert_eq!(t.rider_id, Some(7));
        assert!(t.status_changed());

        let t = decide(
            &state(OrderStatus::Confirmed, None),
            &ADMIN,
            OrderAction::AssignRider(Some(7)),
        )
        .unwrap();
        assert_eq!(t.to, OrderStatus::Confirmed);
        assert!(!t.status_changed());

        let t = decide(
            &state(OrderStatus::Preparing, Some(7)),
            &ADMIN,
            OrderAction::AssignRider(None),
        )
        .unwrap();
        assert_eq!(t.to, OrderStatus::Preparing);
        assert_eq!(t.rider_id, None);
    }

    #[test]
    fn cannot_assign_rider_to_finished_order() {
        let err = decide(
            &state(OrderStatus::Delivered, Some(7)),
            &ADMIN,
            OrderAction::AssignRider(Some(8)),
        )
        .unwrap_err();
        assert_eq!(err, OrderError::Finalized(OrderStatus::Delivered));
    }

    #[test]
    fn rider_pickup_rules() {
        let t = decide(
            &state(OrderStatus::Confirmed, None),
            &RIDER,
            OrderAction::PickUp,
        )
        .unwrap();
        assert_eq!(t.to, OrderStatus::OutForDelivery);
        assert_eq!(t.rider_id, Some(RIDER.id));

        assert!(decide(
            &state(OrderStatus::Preparing, Some(RIDER.id)),
            &RIDER,
            OrderAction::PickUp
        )
        .is_ok());

        assert_eq!(
            decide(
                &state(OrderStatus::Preparing, Some(RIDER.id)),
                &OTHER_RIDER,
                OrderAction::PickUp
            ),
            Err(OrderError::AlreadyAssigned)
        );

        assert!(matches!(
            decide(&state(OrderStatus::Pending, None), &RIDER, OrderAction::PickUp),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn rider_deliver_marks_cod_paid() {
        let t = decide(
            &state(OrderStatus::OutForDelivery, Some(RIDER.id)),
            &RIDER,
            OrderAction::Deliver,
        )
        .unwrap();
        assert_eq!(t.to, OrderStatus::Delivered);
        assert!(t.mark_delivered);
        assert_eq!(t.payment_status, PaymentStatus::Paid);

        let mut card = state(OrderStatus::OutForDelivery, Some(RIDER.id));
        card.payment_method = PaymentMethod::Card;
        let t = decide(&card, &RIDER, OrderAction::Deliver).unwrap();
        assert_eq!(t.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn rider_cannot_deliver_someone_elses_order() {
        assert_eq!(
            decide(
                &state(OrderStatus::OutForDelivery, Some(RIDER.id)),
                &OTHER_RIDER,
                OrderAction::Deliver
            ),
            Err(OrderError::NotAssignedToRider)
        );
        assert!(matches!(
            decide(
                &state(OrderStatus::Confirmed, Some(RIDER.id)),
                &RIDER,
                OrderAction::Deliver
            ),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn role_gates() {
        let s = state(OrderStatus::Pending, None);
        for action in [
            OrderAction::UpdateStatus(OrderStatus::Confirmed),
            OrderAction::AssignRider(Some(7)),
            OrderAction::PickUp,
            OrderAction::Deliver,
        ] {
            assert!(matches!(
                decide(&s, &CUSTOMER, action),
                Err(OrderError::NotPermitted { .. })
            ));
        }
        assert!(matches!(
            decide(&s, &RIDER, OrderAction::UpdateStatus(OrderStatus::Confirmed)),
            Err(OrderError::NotPermitted { .. })
        ));
        assert!(matches!(
            decide(&s, &ADMIN, OrderAction::PickUp),
            Err(OrderError::NotPermitted { .. })
        ));
    }

    #[test]
    fn errors_map_to_order_codes() {
        let app: AppError = OrderError::VersionConflict {
            expected: 2,
            actual: 3,
        }
        .into();
        assert_eq!(app.code, ErrorCode::OrderVersionConflict);

        let app: AppError = OrderError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Delivered,
        }
        .into();
        assert_eq!(app.code, ErrorCode::InvalidStatusTransition);
        assert_eq!(app.message, "Cannot move order from pending to delivered");
    }

    #[test]
    fn status_parse_roundtrip() {
        for s in OrderStatus::ALL {
            assert_eq!(s.as_str().parse::<OrderStatus>().unwrap(), s);
        }
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"out_for_delivery\""
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
