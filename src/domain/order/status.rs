//! Order status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an order.
///
/// Every order starts `Pending`. Both `Paid` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created at checkout, awaiting payment.
    Pending,

    /// Payment reconciled; items granted.
    Paid,

    /// Canceled by the user, by the provider (session expired), or after a
    /// failed checkout session request.
    Canceled,
}

impl OrderStatus {
    /// Stable string form used in storage and APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!((self, target), (Pending, Paid) | (Pending, Canceled))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Pending => vec![Paid, Canceled],
            Paid | Canceled => vec![],
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "canceled" => Ok(OrderStatus::Canceled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pending_can_transition_to_paid() {
        assert_eq!(
            OrderStatus::Pending.transition_to(OrderStatus::Paid),
            Ok(OrderStatus::Paid)
        );
    }

    #[test]
    fn pending_can_transition_to_canceled() {
        assert_eq!(
            OrderStatus::Pending.transition_to(OrderStatus::Canceled),
            Ok(OrderStatus::Canceled)
        );
    }

    #[test]
    fn paid_cannot_be_canceled() {
        assert!(OrderStatus::Paid.transition_to(OrderStatus::Canceled).is_err());
    }

    #[test]
    fn canceled_cannot_be_paid() {
        assert!(OrderStatus::Canceled.transition_to(OrderStatus::Paid).is_err());
    }

    #[test]
    fn pending_cannot_transition_to_itself() {
        assert!(!OrderStatus::Pending.can_transition_to(&OrderStatus::Pending));
    }

    #[test]
    fn paid_and_canceled_are_terminal() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn parses_storage_strings() {
        for status in [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Canceled] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Canceled).unwrap();
        assert_eq!(json, "\"canceled\"");
    }

    fn status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::Pending),
            Just(OrderStatus::Paid),
            Just(OrderStatus::Canceled),
        ]
    }

    proptest! {
        #[test]
        fn once_terminal_every_further_transition_fails(
            attempts in prop::collection::vec(status_strategy(), 1..12)
        ) {
            let mut current = OrderStatus::Pending;
            let mut changes = 0;
            for target in attempts {
                match current.transition_to(target) {
                    Ok(next) => {
                        prop_assert!(!current.is_terminal());
                        current = next;
                        changes += 1;
                    }
                    Err(_) => prop_assert!(!current.can_transition_to(&target)),
                }
            }
            prop_assert!(changes <= 1, "an order changes status at most once");
        }
    }
}
