//! File-backed cart mirror.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use storefront::{carts::Cart, ids::UserId};
use tracing::{debug, warn};

use super::{CartMirror, MirrorError, PendingCheckout};

/// Mirror keeping one JSON document per user in a directory.
#[derive(Debug, Clone)]
pub struct FileCartMirror {
    dir: PathBuf,
}

impl FileCartMirror {
    /// Mirror into `dir`, which is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the mirrored documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn cart_path(&self, user: UserId) -> PathBuf {
        self.dir.join(format!("cart_{user}.json"))
    }

    fn unsynced_path(&self, user: UserId) -> PathBuf {
        self.dir.join(format!("cart_{user}.unsynced.json"))
    }

    fn pending_path(&self, user: UserId) -> PathBuf {
        self.dir.join(format!("pending_checkout_{user}.json"))
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, MirrorError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Write through a sibling temporary file so readers never see a torn
    /// document.
    fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), MirrorError> {
        fs::create_dir_all(&self.dir)?;

        let staging = path.with_extension("json.tmp");

        fs::write(&staging, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&staging, path)?;

        debug!(path = %path.display(), "mirrored document");

        Ok(())
    }

    fn remove(path: &Path) -> Result<(), MirrorError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

impl CartMirror for FileCartMirror {
    fn load(&self, user: UserId) -> Result<Option<Cart>, MirrorError> {
        let Some(cart) = Self::read::<Cart>(&self.cart_path(user))? else {
            return Ok(None);
        };

        if cart.user_id() != user {
            warn!(%user, owner = %cart.user_id(), "ignoring mirrored cart of another user");

            return Ok(None);
        }

        Ok(Some(cart))
    }

    fn store(&self, cart: &Cart) -> Result<(), MirrorError> {
        self.write(&self.cart_path(cart.user_id()), cart)
    }

    fn load_unsynced(&self, user: UserId) -> Result<bool, MirrorError> {
        Ok(Self::read::<bool>(&self.unsynced_path(user))?.unwrap_or(false))
    }

    fn store_unsynced(&self, user: UserId, unsynced: bool) -> Result<(), MirrorError> {
        if unsynced {
            self.write(&self.unsynced_path(user), &true)
        } else {
            Self::remove(&self.unsynced_path(user))
        }
    }

    fn load_pending(&self, user: UserId) -> Result<Option<PendingCheckout>, MirrorError> {
        let Some(pending) = Self::read::<PendingCheckout>(&self.pending_path(user))? else {
            return Ok(None);
        };

        if pending.order.user_id != user {
            warn!(%user, owner = %pending.order.user_id, "ignoring pending checkout of another user");

            return Ok(None);
        }

        Ok(Some(pending))
    }

    fn store_pending(&self, pending: &PendingCheckout) -> Result<(), MirrorError> {
        self.write(&self.pending_path(pending.order.user_id), pending)
    }

    fn discard_pending(&self, user: UserId) -> Result<(), MirrorError> {
        Self::remove(&self.pending_path(user))
    }
}
