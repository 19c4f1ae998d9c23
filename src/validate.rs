//! Field validation for the checkout and payment forms. Failures are
//! recovered locally and shown inline per field; they never propagate.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::dto::checkout::{PaymentForm, ShippingForm};
use crate::models::{PaymentDetails, ShippingDetails};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid email pattern")
});

// Card numbers are entered grouped 4-4-4-4.
static CARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4} \d{4} \d{4} \d{4}$").expect("valid card pattern"));

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("valid expiry pattern"));

static CVV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("valid cvv pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

fn required(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    message: &str,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError {
            field,
            message: message.to_string(),
        });
    }
    trimmed.to_string()
}

pub fn validate_shipping(form: &ShippingForm) -> Result<ShippingDetails, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = required(&mut errors, "name", &form.name, "Name is required");
    let email = required(&mut errors, "email", &form.email, "Email is required");
    if !email.is_empty() && !EMAIL_RE.is_match(&email) {
        errors.push(FieldError {
            field: "email",
            message: "Invalid email address".to_string(),
        });
    }
    let phone = required(&mut errors, "phone", &form.phone, "Phone is required");
    let address = required(&mut errors, "address", &form.address, "Address is required");
    let city = required(&mut errors, "city", &form.city, "City is required");
    let state = required(&mut errors, "state", &form.state, "State is required");
    let zip_code = required(&mut errors, "zipCode", &form.zip_code, "ZIP code is required");
    let country = required(&mut errors, "country", &form.country, "Country is required");

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ShippingDetails {
        name,
        email,
        phone,
        address,
        city,
        state,
        zip_code,
        country,
    })
}

pub fn validate_payment(form: &PaymentForm) -> Result<PaymentDetails, Vec<FieldError>> {
    let mut errors = Vec::new();

    let method = required(
        &mut errors,
        "paymentMethod",
        &form.payment_method,
        "Payment method is required",
    );
    let card_number = required(
        &mut errors,
        "cardNumber",
        &form.card_number,
        "Card number is required",
    );
    if !card_number.is_empty() && !CARD_RE.is_match(&card_number) {
        errors.push(FieldError {
            field: "cardNumber",
            message: "Please enter a valid card number".to_string(),
        });
    }
    let expiry_date = required(
        &mut errors,
        "expiryDate",
        &form.expiry_date,
        "Expiry date is required",
    );
    if !expiry_date.is_empty() && !EXPIRY_RE.is_match(&expiry_date) {
        errors.push(FieldError {
            field: "expiryDate",
            message: "Please enter in MM/YY format".to_string(),
        });
    }
    let cvv = required(&mut errors, "cvv", &form.cvv, "CVV is required");
    if !cvv.is_empty() && !CVV_RE.is_match(&cvv) {
        errors.push(FieldError {
            field: "cvv",
            message: "Please enter a valid CVV".to_string(),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(PaymentDetails {
        method,
        card_number,
        expiry_date,
        cvv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping_form() -> ShippingForm {
        ShippingForm {
            name: "Pat Shopper".into(),
            email: "pat@example.com".into(),
            phone: "555-0101".into(),
            address: "1 Brine Way".into(),
            city: "Portland".into(),
            state: "OR".into(),
            zip_code: "97201".into(),
            country: "US".into(),
        }
    }

    fn payment_form() -> PaymentForm {
        PaymentForm {
            payment_method: "credit_card".into(),
            card_number: "4242 4242 4242 4242".into(),
            expiry_date: "12/29".into(),
            cvv: "123".into(),
        }
    }

    #[test]
    fn complete_shipping_form_passes() {
        assert!(validate_shipping(&shipping_form()).is_ok());
    }

    #[test]
    fn bad_email_is_flagged_on_the_email_field() {
        let mut form = shipping_form();
        form.email = "not-an-address".into();
        let errors = validate_shipping(&form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[0].message, "Invalid email address");
    }

    #[test]
    fn every_missing_shipping_field_is_reported() {
        let errors = validate_shipping(&ShippingForm::default()).unwrap_err();
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn card_number_must_be_grouped() {
        let mut form = payment_form();
        form.card_number = "4242424242424242".into();
        let errors = validate_payment(&form).unwrap_err();
        assert_eq!(errors[0].field, "cardNumber");
    }

    #[test]
    fn expiry_month_must_be_real() {
        let mut form = payment_form();
        form.expiry_date = "13/29".into();
        assert!(validate_payment(&form).is_err());
        form.expiry_date = "09/29".into();
        assert!(validate_payment(&form).is_ok());
    }

    #[test]
    fn cvv_accepts_three_or_four_digits() {
        let mut form = payment_form();
        form.cvv = "1234".into();
        assert!(validate_payment(&form).is_ok());
        form.cvv = "12".into();
        assert!(validate_payment(&form).is_err());
    }
}
