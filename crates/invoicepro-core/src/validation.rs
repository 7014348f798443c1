//! Caller-side form rules.
//!
//! The UI runs these before calling `save`; the repositories never do, so a
//! record that fails them can still be stored.

use crate::draft::{NewClient, NewInvoice, NewPayment, NewProduct};
use crate::error::{ValidationError, ValidationResult};

fn require(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> ValidationResult {
    if value.is_nan() || value <= 0.0 {
        return Err(ValidationError::must_be_positive(field));
    }
    Ok(())
}

/// Loose `local@domain.tld` check: one `@`, no whitespace, a dot in the
/// domain part with something on both sides.
pub fn validate_email(email: &str) -> ValidationResult {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    let (local, domain) = email.split_once('@').ok_or_else(|| invalid("missing @"))?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid("expected local@domain"));
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid("domain must contain a dot")),
    }
}

pub fn validate_client(client: &NewClient) -> ValidationResult {
    require("name", &client.name)?;
    require("email", &client.email)?;
    validate_email(&client.email)
}

pub fn validate_product(product: &NewProduct) -> ValidationResult {
    require("name", &product.name)?;
    require("unit", &product.unit)?;
    require("category", &product.category)?;
    positive("rate", product.rate)?;
    if !(0.0..=100.0).contains(&product.tax_rate) {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

pub fn validate_invoice(invoice: &NewInvoice) -> ValidationResult {
    require("number", &invoice.number)?;
    require("clientId", &invoice.client_id)?;
    if invoice.items.is_empty() {
        return Err(ValidationError::required("items"));
    }
    for (index, item) in invoice.items.iter().enumerate() {
        require(&format!("items[{index}].description"), &item.description)?;
        positive(&format!("items[{index}].quantity"), item.quantity)?;
        positive(&format!("items[{index}].rate"), item.rate)?;
    }
    Ok(())
}

pub fn validate_payment(payment: &NewPayment) -> ValidationResult {
    require("invoiceId", &payment.invoice_id)?;
    positive("amount", payment.amount)
}
