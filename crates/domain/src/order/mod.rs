//! Order aggregate and related types.

mod aggregate;
mod intake;
mod service;
mod state;
mod value_objects;

pub use aggregate::{Order, OrderHeader};
pub use intake::{OrderIntake, OrderLine};
pub use service::{OrderService, TransitionResult};
pub use state::OrderStatus;
pub use value_objects::{ItemType, Money, MoneyError, OrderItem};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Client and vehicle must both be set.
    #[error("Client ID is required")]
    ClientIdRequired,

    #[error("Vehicle ID is required")]
    VehicleIdRequired,

    /// Order is not in a status that allows the action.
    #[error(
        "Invalid state transition: cannot {action} from {current} status (requires {})",
        join_statuses(.required)
    )]
    InvalidStateTransition {
        current: OrderStatus,
        action: &'static str,
        required: &'static [OrderStatus],
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i64 },

    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] MoneyError),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Unknown item type: {0}")]
    UnknownItemType(String),

    /// An order line points at a catalog entry that does not exist.
    #[error("{item_type} not found: {ref_id}")]
    UnknownReference { item_type: ItemType, ref_id: uuid::Uuid },
}

impl OrderError {
    /// Returns true for input errors (as opposed to lifecycle conflicts).
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, OrderError::InvalidStateTransition { .. })
    }
}

fn join_statuses(statuses: &[OrderStatus]) -> String {
    statuses
        .iter()
        .map(OrderStatus::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message_names_required_statuses() {
        let err = OrderError::InvalidStateTransition {
            current: OrderStatus::Completed,
            action: "approve",
            required: &[OrderStatus::Received, OrderStatus::AwaitingApproval],
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition: cannot approve from Completed status \
             (requires Received or Awaiting approval)"
        );
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_input_errors_are_invalid_arguments() {
        assert!(OrderError::ClientIdRequired.is_invalid_argument());
        assert!(OrderError::InvalidQuantity { quantity: 0 }.is_invalid_argument());
        assert!(OrderError::UnknownStatus("Lost".into()).is_invalid_argument());
    }
}
