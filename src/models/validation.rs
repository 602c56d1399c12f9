use rust_decimal::Decimal;

use super::{NewButcherItem, NewGroceryItem, ValidationError, ValidationResult};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

/// Validation constants
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
pub const MIN_PRICE: Decimal = Decimal::ZERO;
pub const MAX_PRICE: Decimal = Decimal::from_parts(9999999, 0, 0, false, 2); // 99999.99
pub const MAX_PRICE_SCALE: u32 = 2;

impl Validate for NewButcherItem {
    fn validate(&self) -> ValidationResult<()> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        validate_price("price_per_kg", &self.price_per_kg)?;
        Ok(())
    }
}

impl Validate for NewGroceryItem {
    fn validate(&self) -> ValidationResult<()> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        validate_price("price", &self.price)?;
        Ok(())
    }
}

/// Validate a catalog item title
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "title".to_string(),
        });
    }

    let length = trimmed.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max_length: MAX_TITLE_LENGTH,
            actual_length: length,
        });
    }

    Ok(())
}

/// Validate a catalog item description; empty is allowed
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let length = description.trim().chars().count();
    if length > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max_length: MAX_DESCRIPTION_LENGTH,
            actual_length: length,
        });
    }

    Ok(())
}

/// Validate a catalog price: non-negative, at most cents precision
pub fn validate_price(field: &str, price: &Decimal) -> ValidationResult<()> {
    if *price < MIN_PRICE || *price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: MIN_PRICE.to_string(),
            max: MAX_PRICE.to_string(),
            value: price.to_string(),
        });
    }

    if price.normalize().scale() > MAX_PRICE_SCALE {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            expected: format!("at most {} decimal places", MAX_PRICE_SCALE),
        });
    }

    Ok(())
}
