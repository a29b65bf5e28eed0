//! Request inputs for order operations.
//!
//! Both structs deserialize the wire-format (camelCase) request bodies.
//! `UpdateOrder` enumerates only updatable fields; the derived total and
//! the identity/timestamp fields cannot be supplied by callers.

use record_store::OrderStatus;
use serde::Deserialize;

use crate::DomainError;

/// Fields for creating an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub shipping_address: Option<String>,
}

impl CreateOrder {
    /// Checks the creation invariants: non-empty names, a plausible email,
    /// quantity ≥ 1, a finite non-negative unit price.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.customer_name.trim().is_empty() {
            return Err(DomainError::Validation(
                "customerName must not be empty".to_string(),
            ));
        }
        if self.product_name.trim().is_empty() {
            return Err(DomainError::Validation(
                "productName must not be empty".to_string(),
            ));
        }
        validate_email(&self.customer_email)?;
        validate_quantity(self.quantity)?;
        validate_unit_price(self.unit_price)
    }
}

/// Partial update for an order; only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub shipping_address: Option<String>,
}

impl UpdateOrder {
    /// Checks the supplied fields against the same invariants as creation.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.customer_name
            && name.trim().is_empty()
        {
            return Err(DomainError::Validation(
                "customerName must not be empty".to_string(),
            ));
        }
        if let Some(name) = &self.product_name
            && name.trim().is_empty()
        {
            return Err(DomainError::Validation(
                "productName must not be empty".to_string(),
            ));
        }
        if let Some(email) = &self.customer_email {
            validate_email(email)?;
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(unit_price) = self.unit_price {
            validate_unit_price(unit_price)?;
        }
        Ok(())
    }

    /// Returns true if the update changes the derived total.
    pub fn affects_total(&self) -> bool {
        self.quantity.is_some() || self.unit_price.is_some()
    }
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, host)| !local.is_empty() && host.contains('.') && !host.starts_with('.'));
    if valid {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "customerEmail {email:?} is not a valid email address"
        )))
    }
}

fn validate_quantity(quantity: u32) -> Result<(), DomainError> {
    if quantity >= 1 {
        Ok(())
    } else {
        Err(DomainError::Validation(
            "quantity must be at least 1".to_string(),
        ))
    }
}

fn validate_unit_price(unit_price: f64) -> Result<(), DomainError> {
    if unit_price.is_finite() && unit_price >= 0.0 {
        Ok(())
    } else {
        Err(DomainError::Validation(
            "unitPrice must be a non-negative number".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateOrder {
        CreateOrder {
            customer_name: "John Doe".to_string(),
            customer_email: "john@x.com".to_string(),
            product_name: "Wheelchair".to_string(),
            quantity: 2,
            unit_price: 100.0,
            status: None,
            shipping_address: None,
        }
    }

    #[test]
    fn create_accepts_valid_input() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn create_rejects_zero_quantity() {
        let input = CreateOrder {
            quantity: 0,
            ..valid_create()
        };
        assert!(matches!(
            input.validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn create_rejects_negative_unit_price() {
        let input = CreateOrder {
            unit_price: -1.0,
            ..valid_create()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_rejects_bad_email() {
        for email in ["", "john", "@x.com", "john@"] {
            let input = CreateOrder {
                customer_email: email.to_string(),
                ..valid_create()
            };
            assert!(input.validate().is_err(), "{email:?} should be rejected");
        }
    }

    #[test]
    fn update_validates_only_supplied_fields() {
        let patch = UpdateOrder {
            shipping_address: Some("123 Main St".to_string()),
            ..UpdateOrder::default()
        };
        assert!(patch.validate().is_ok());

        let patch = UpdateOrder {
            quantity: Some(0),
            ..UpdateOrder::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn affects_total_tracks_pricing_fields() {
        assert!(!UpdateOrder::default().affects_total());
        assert!(
            UpdateOrder {
                quantity: Some(3),
                ..UpdateOrder::default()
            }
            .affects_total()
        );
        assert!(
            UpdateOrder {
                unit_price: Some(9.5),
                ..UpdateOrder::default()
            }
            .affects_total()
        );
    }

    #[test]
    fn deserializes_camel_case_bodies() {
        let input: CreateOrder = serde_json::from_str(
            r#"{"customerName":"John Doe","customerEmail":"john@x.com","productName":"Wheelchair","quantity":2,"unitPrice":100.0}"#,
        )
        .unwrap();
        assert_eq!(input.customer_name, "John Doe");
        assert_eq!(input.quantity, 2);
        assert!(input.status.is_none());
    }
}
