use crate::error::OrderServiceError;

/// One requested line of a new order. Any client-supplied price is dropped;
/// the product's current price is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub user_id: i32,
    pub items: Vec<OrderLine>,
}

/// A line of an order update. `order_item_id == 0` adds a new line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateLine {
    pub order_item_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

impl UpdateLine {
    pub fn is_new(&self) -> bool {
        self.order_item_id == 0
    }

    pub fn as_line(&self) -> OrderLine {
        OrderLine {
            product_id: self.product_id,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOrder {
    pub order_id: i32,
    pub user_id: i32,
    pub items: Vec<UpdateLine>,
}

/// Row written for each placed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: i32,
}

impl CreateOrder {
    pub fn validate(&self) -> Result<(), OrderServiceError> {
        validate_user(self.user_id)?;
        if self.items.is_empty() {
            return Err(OrderServiceError::Validation(
                "order must contain at least one item".into(),
            ));
        }
        self.items.iter().try_for_each(validate_line)
    }
}

impl UpdateOrder {
    pub fn validate(&self) -> Result<(), OrderServiceError> {
        if self.order_id <= 0 {
            return Err(OrderServiceError::Validation("order id is required".into()));
        }
        validate_user(self.user_id)?;
        if self.items.is_empty() {
            return Err(OrderServiceError::Validation(
                "order must contain at least one item".into(),
            ));
        }
        for line in &self.items {
            if line.order_item_id < 0 {
                return Err(OrderServiceError::Validation("order item id is invalid".into()));
            }
            validate_line(&line.as_line())?;
        }
        Ok(())
    }
}

fn validate_user(user_id: i32) -> Result<(), OrderServiceError> {
    if user_id <= 0 {
        return Err(OrderServiceError::Validation("user id is required".into()));
    }
    Ok(())
}

fn validate_line(line: &OrderLine) -> Result<(), OrderServiceError> {
    if line.product_id <= 0 {
        return Err(OrderServiceError::Validation("product id is required".into()));
    }
    if line.quantity <= 0 {
        return Err(OrderServiceError::Validation(
            "quantity must be greater than zero".into(),
        ));
    }
    Ok(())
}
