use crate::error::ProductServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProduct {
    pub name: String,
    pub price: i32,
    pub stock: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProduct {
    pub id: i32,
    pub name: String,
    pub price: i32,
    pub stock: i32,
}

impl CreateProduct {
    pub fn validate(&self) -> Result<(), ProductServiceError> {
        validate_fields(&self.name, self.price, self.stock)
    }
}

impl UpdateProduct {
    pub fn validate(&self) -> Result<(), ProductServiceError> {
        if self.id <= 0 {
            return Err(ProductServiceError::Validation("product id is required".into()));
        }
        validate_fields(&self.name, self.price, self.stock)
    }
}

fn validate_fields(name: &str, price: i32, stock: i32) -> Result<(), ProductServiceError> {
    if name.trim().is_empty() {
        return Err(ProductServiceError::Validation("product name is required".into()));
    }
    if price < 0 {
        return Err(ProductServiceError::Validation(
            "product price cannot be negative".into(),
        ));
    }
    if stock < 0 {
        return Err(ProductServiceError::NegativeStock);
    }
    Ok(())
}
