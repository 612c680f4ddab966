//! Local cart mirror.
//!
//! An advisory, per-user copy of the cart kept on the local machine so a new
//! session can show the last known cart before the store answers. The store is
//! the source of truth once it has accepted the cart; until then the mirror
//! also records that the copy is unsynced. Callers log mirror failures and
//! carry on.
//!
//! Mirrors do blocking file I/O and are called from async session methods.
//! The documents are small and the callers are single-user CLI sessions.

use mockall::automock;
use serde::{Deserialize, Serialize};
use storefront::{carts::Cart, ids::UserId, orders::OrderRecord};
use thiserror::Error;

mod file;

pub use file::FileCartMirror;

/// Errors raised by a cart mirror.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The mirror could not be read or written.
    #[error("mirror i/o error")]
    Io(#[from] std::io::Error),

    /// A mirrored document could not be encoded or decoded.
    #[error("invalid mirror data")]
    Json(#[from] serde_json::Error),
}

/// A checkout that has not finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCheckout {
    /// Order prepared for the cart
    pub order: OrderRecord,

    /// Whether the order is known to be in the history. When set, only the
    /// cart clear remains.
    pub recorded: bool,
}

/// Local cart mirror seam.
#[automock]
pub trait CartMirror: Send + Sync {
    /// The mirrored cart for the user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror exists but cannot be read.
    fn load(&self, user: UserId) -> Result<Option<Cart>, MirrorError>;

    /// Mirror the cart, replacing any earlier copy for its user.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be written.
    fn store(&self, cart: &Cart) -> Result<(), MirrorError>;

    /// Whether the user's mirrored cart holds changes the store has not
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker exists but cannot be read.
    fn load_unsynced(&self, user: UserId) -> Result<bool, MirrorError>;

    /// Record whether the user's mirrored cart holds changes the store has not
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be written or removed.
    fn store_unsynced(&self, user: UserId, unsynced: bool) -> Result<(), MirrorError>;

    /// The user's unfinished checkout, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read.
    fn load_pending(&self, user: UserId) -> Result<Option<PendingCheckout>, MirrorError>;

    /// Remember an unfinished checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn store_pending(&self, pending: &PendingCheckout) -> Result<(), MirrorError>;

    /// Forget the user's unfinished checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing record cannot be removed.
    fn discard_pending(&self, user: UserId) -> Result<(), MirrorError>;
}
