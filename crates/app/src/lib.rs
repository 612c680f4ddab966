//! Storefront services: the remote resource store, the catalog, carts,
//! order history and checkout services over it, the local cart mirror, and
//! the cart session that ties them together.

pub mod context;
pub mod domain;
pub mod mirror;
pub mod session;
pub mod store;

#[cfg(test)]
mod test;
