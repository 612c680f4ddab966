//! Storefront
//!
//! The storefront cart core: catalog pricing, the per-user cart aggregate and
//! the order records produced at checkout. Everything here is synchronous and
//! free of I/O; persistence lives in `storefront-app`.

pub mod carts;
pub mod ids;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod session;
