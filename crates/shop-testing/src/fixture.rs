//! Entity fixtures with a fixed clock.

use chrono::{DateTime, TimeZone, Utc};

use shop_domain::order::{Order, OrderItem};
use shop_domain::product::Product;
use shop_domain::role::{Role, UserRole};
use shop_domain::user::User;

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn user(id: i32, email: &str) -> User {
    User {
        id,
        firstname: "Test".into(),
        lastname: format!("User{id}"),
        email: email.into(),
        is_verified: false,
        created_at: epoch(),
        updated_at: epoch(),
        deleted_at: None,
    }
}

pub fn role(id: i32, name: &str) -> Role {
    Role {
        id,
        name: name.into(),
        created_at: epoch(),
        updated_at: epoch(),
        deleted_at: None,
    }
}

pub fn user_role(id: i32, user_id: i32, role_id: i32) -> UserRole {
    UserRole {
        id,
        user_id,
        role_id,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub fn product(id: i32, name: &str, price: i32, stock: i32) -> Product {
    Product {
        id,
        name: name.into(),
        price,
        stock,
        created_at: epoch(),
        updated_at: epoch(),
        deleted_at: None,
    }
}

pub fn order(id: i32, user_id: i32, total_price: i64) -> Order {
    Order {
        id,
        user_id,
        total_price,
        created_at: epoch(),
        updated_at: epoch(),
        deleted_at: None,
    }
}

pub fn order_item(id: i32, order_id: i32, product_id: i32, quantity: i32, price: i32) -> OrderItem {
    OrderItem {
        id,
        order_id,
        product_id,
        quantity,
        price,
        created_at: epoch(),
        updated_at: epoch(),
        deleted_at: None,
    }
}

/// Mark a fixture as trashed.
pub fn trashed<T: Trashable>(mut row: T) -> T {
    row.set_deleted_at(Some(epoch()));
    row
}

pub trait Trashable {
    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>);
}

macro_rules! impl_trashable {
    ($($ty:ty),*) => {
        $(impl Trashable for $ty {
            fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>) {
                self.deleted_at = at;
            }
        })*
    };
}

impl_trashable!(User, Role, Product, Order, OrderItem);
