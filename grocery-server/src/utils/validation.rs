//! Input validation helpers
//!
//! Text length limits and checks shared by the handlers. SQLite TEXT has no
//! length enforcement of its own.

use shared::error::{AppError, ErrorCode};
use shared::models::{AddressInput, BannerCreate, BannerUpdate, CustomerContact};

use crate::auth::MIN_PASSWORD_LEN;

// ── Text length limits ──────────────────────────────────────────────

/// Names: product, category, banner title, person
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions, order notes, status notes
pub const MAX_NOTE_LEN: usize = 1000;

/// Phone numbers, units, weights, colours, labels
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// RFC 5321
pub const MAX_EMAIL_LEN: usize = 254;

/// Before hashing
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MAX_URL_LEN: usize = 2048;

/// Street, building, landmark
pub const MAX_ADDRESS_LEN: usize = 500;

/// Upper bound on one order line
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Upper bound on lines per order
pub const MAX_ORDER_LINES: usize = 100;

// ── Generic checks ──────────────────────────────────────────────────

/// Required string: non-blank and within the limit
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Optional string: within the limit if present
pub fn validate_optional_text(value: Option<&str>, field: &str, max_len: usize) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Loose shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation("Invalid email address").with_detail("field", "email"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    validate_optional_text(Some(password), "password", MAX_PASSWORD_LEN)
}

/// Non-negative price; a sale price must not exceed the regular price
pub fn validate_price(price: f64, sale_price: Option<f64>) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::with_message(ErrorCode::InvalidPrice, "Price must not be negative")
            .with_detail("field", "price"));
    }
    if let Some(sale) = sale_price
        && (!sale.is_finite() || sale < 0.0 || sale > price)
    {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            "Sale price must be between 0 and the regular price",
        )
        .with_detail("field", "sale_price"));
    }
    Ok(())
}

pub fn validate_stock(stock: i64) -> Result<(), AppError> {
    if stock < 0 {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "Stock must not be negative")
            .with_detail("field", "stock_quantity"));
    }
    Ok(())
}

// ── Payload checks ──────────────────────────────────────────────────

pub fn validate_address(input: &AddressInput) -> Result<(), AppError> {
    validate_required_text(&input.label, "label", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&input.street, "street", MAX_ADDRESS_LEN)?;
    validate_required_text(&input.area, "area", MAX_NAME_LEN)?;
    validate_required_text(&input.city, "city", MAX_NAME_LEN)?;
    validate_required_text(&input.emirate, "emirate", MAX_NAME_LEN)?;
    validate_optional_text(input.building.as_deref(), "building", MAX_ADDRESS_LEN)?;
    validate_optional_text(input.apartment.as_deref(), "apartment", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(input.landmark.as_deref(), "landmark", MAX_ADDRESS_LEN)?;
    Ok(())
}

pub fn validate_contact(contact: &CustomerContact) -> Result<(), AppError> {
    validate_required_text(&contact.full_name, "full_name", MAX_NAME_LEN)?;
    validate_required_text(&contact.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    if let Some(email) = contact.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }
    Ok(())
}

fn validate_opacity(opacity: Option<i32>) -> Result<(), AppError> {
    if let Some(o) = opacity
        && !(0..=100).contains(&o)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Overlay opacity must be between 0 and 100",
        )
        .with_detail("field", "overlay_opacity"));
    }
    Ok(())
}

pub fn validate_banner_create(input: &BannerCreate) -> Result<(), AppError> {
    validate_required_text(&input.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&input.image_url, "image_url", MAX_URL_LEN)?;
    validate_optional_text(input.subtitle.as_deref(), "subtitle", MAX_NAME_LEN)?;
    validate_optional_text(input.description.as_deref(), "description", MAX_NOTE_LEN)?;
    validate_optional_text(input.button_text.as_deref(), "button_text", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(input.button_link.as_deref(), "button_link", MAX_URL_LEN)?;
    validate_optional_text(input.text_color.as_deref(), "text_color", MAX_SHORT_TEXT_LEN)?;
    validate_opacity(input.overlay_opacity)
}

pub fn validate_banner_update(input: &BannerUpdate) -> Result<(), AppError> {
    if let Some(title) = &input.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    if let Some(url) = &input.image_url {
        validate_required_text(url, "image_url", MAX_URL_LEN)?;
    }
    validate_optional_text(input.subtitle.as_deref(), "subtitle", MAX_NAME_LEN)?;
    validate_optional_text(input.description.as_deref(), "description", MAX_NOTE_LEN)?;
    validate_optional_text(input.button_text.as_deref(), "button_text", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(input.button_link.as_deref(), "button_link", MAX_URL_LEN)?;
    validate_optional_text(input.text_color.as_deref(), "text_color", MAX_SHORT_TEXT_LEN)?;
    validate_opacity(input.overlay_opacity)
}
