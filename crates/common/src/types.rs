use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw integer value.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_type! {
    /// Unique identifier for a parent profile.
    ///
    /// Wraps the sequential integer assigned by the store to prevent
    /// mixing up parent ids with other integer-based identifiers.
    ParentId
}

id_type! {
    /// Unique identifier for an invoice.
    InvoiceId
}

id_type! {
    /// Unique identifier for a payment method.
    PaymentMethodId
}

id_type! {
    /// Unique identifier for an audit log entry.
    LogEntryId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_id_preserves_value() {
        let id = ParentId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn payment_method_id_serializes_transparently() {
        let id = PaymentMethodId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let deserialized: PaymentMethodId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn ids_order_by_value() {
        assert!(InvoiceId::new(1) < InvoiceId::new(2));
        assert_eq!(
            [PaymentMethodId::new(3), PaymentMethodId::new(1)]
                .iter()
                .max(),
            Some(&PaymentMethodId::new(3))
        );
    }

    #[test]
    fn id_display_matches_value() {
        assert_eq!(ParentId::new(9).to_string(), "9");
        assert_eq!(LogEntryId::new(12).to_string(), "12");
    }
}
