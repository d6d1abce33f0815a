use core::str::FromStr;

use serde::{Deserialize, Serialize};

use pasar_core::DomainError;

/// Order status lifecycle.
///
/// The set is closed: caller-supplied strings outside it are rejected rather
/// than written through, so the stored column can never drift into free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
}

/// How a requested status maps onto the stored order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Overwrite the row's status in place.
    Set(OrderStatus),
    /// Remove the row: the terminal state keeps no record.
    Remove,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// `delivered` is terminal: the transition collapses into removal of the
    /// order record. Every other status is written in place.
    pub fn transition(self) -> Transition {
        match self {
            OrderStatus::Delivered => Transition::Remove,
            other => Transition::Set(other),
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(DomainError::validation(format!(
                "unknown order status '{other}' (expected one of: pending, processing, shipped, delivered)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn every_status_parses_from_its_own_string() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        for raw in ["cancelled", "DELIVERED", "done", ""] {
            assert!(raw.parse::<OrderStatus>().is_err(), "accepted '{raw}'");
        }
    }

    #[test]
    fn delivered_is_the_only_removal() {
        assert_eq!(OrderStatus::Delivered.transition(), Transition::Remove);
        for status in [OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Shipped] {
            assert_eq!(status.transition(), Transition::Set(status));
        }
    }

    proptest! {
        #[test]
        fn parser_accepts_nothing_outside_the_closed_set(raw in "\\PC*") {
            let known = OrderStatus::ALL.iter().any(|s| s.as_str() == raw);
            prop_assert_eq!(raw.parse::<OrderStatus>().is_ok(), known);
        }
    }
}
