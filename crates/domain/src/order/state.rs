//! Order status machine.

use serde::{Deserialize, Serialize};

/// The status of a service order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Received ──► In diagnosis ──► Awaiting approval ──► In execution ──► Completed ──► Delivered
///    ▲  │                          │                      ▲
///    │  └──────────────────────────┼──────────────────────┘ (direct approval)
///    └─────────────────────────────┘ (budget rejected)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Vehicle checked in, waiting for triage.
    #[default]
    #[serde(rename = "Received")]
    Received,

    /// A mechanic is diagnosing the vehicle.
    #[serde(rename = "In diagnosis")]
    InDiagnosis,

    /// Budget sent to the client, waiting for a decision.
    #[serde(rename = "Awaiting approval")]
    AwaitingApproval,

    /// Work approved and in progress; parts have been taken from stock.
    #[serde(rename = "In execution")]
    InExecution,

    /// Work finished, vehicle ready for pickup.
    #[serde(rename = "Completed")]
    Completed,

    /// Vehicle handed back to the client (terminal state).
    #[serde(rename = "Delivered")]
    Delivered,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Received,
        OrderStatus::InDiagnosis,
        OrderStatus::AwaitingApproval,
        OrderStatus::InExecution,
        OrderStatus::Completed,
        OrderStatus::Delivered,
    ];

    /// Returns true if diagnosis can start in this status.
    pub fn can_start_diagnosis(&self) -> bool {
        matches!(self, OrderStatus::Received)
    }

    /// Returns true if a budget can be sent in this status.
    pub fn can_send_budget(&self) -> bool {
        matches!(self, OrderStatus::InDiagnosis)
    }

    /// Returns true if the order can be approved in this status.
    ///
    /// Approval is allowed straight from `Received` for walk-in jobs that
    /// skip the budget step.
    pub fn can_approve(&self) -> bool {
        matches!(self, OrderStatus::Received | OrderStatus::AwaitingApproval)
    }

    /// Returns true if the budget can be rejected in this status.
    pub fn can_reject_budget(&self) -> bool {
        matches!(self, OrderStatus::AwaitingApproval)
    }

    /// Returns true if the order can be finished in this status.
    pub fn can_finish(&self) -> bool {
        matches!(self, OrderStatus::InExecution)
    }

    /// Returns true if the order can be delivered in this status.
    pub fn can_deliver(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }

    /// Returns true for statuses that still need shop attention.
    pub fn is_active(&self) -> bool {
        !matches!(self, OrderStatus::Completed | OrderStatus::Delivered)
    }

    /// Sort priority for the active-order board; lower comes first.
    ///
    /// Returns `None` for statuses that are not listed as active.
    pub fn active_priority(&self) -> Option<u8> {
        match self {
            OrderStatus::InExecution => Some(1),
            OrderStatus::AwaitingApproval => Some(2),
            OrderStatus::InDiagnosis => Some(3),
            OrderStatus::Received => Some(4),
            OrderStatus::Completed | OrderStatus::Delivered => None,
        }
    }

    /// Returns the status name as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Received",
            OrderStatus::InDiagnosis => "In diagnosis",
            OrderStatus::AwaitingApproval => "Awaiting approval",
            OrderStatus::InExecution => "In execution",
            OrderStatus::Completed => "Completed",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = super::OrderError;

    /// Accepts the display name (`"In diagnosis"`) or the variant name
    /// (`"InDiagnosis"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s || format!("{status:?}") == s)
            .ok_or_else(|| super::OrderError::UnknownStatus(s.to_string()))
    }
}
