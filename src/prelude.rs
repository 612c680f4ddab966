//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{Cart, CartChange, CartId, CartLine, generate_cart_id},
    ids::{ResourceId, UserId},
    orders::{OrderError, OrderId, OrderRecord, ProductSnapshot},
    pricing::{PricingError, line_extension, to_money, total_price},
    products::{Catalog, PriceIndex, Product, ProductId},
    session::{ParseRoleError, Role, Session},
};
