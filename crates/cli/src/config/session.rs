//! Session Config

use clap::Args;
use storefront::{
    ids::UserId,
    session::{Role, Session},
};

/// Signed-in user, as handed over by the identity provider.
#[derive(Debug, Args)]
pub struct SessionConfig {
    /// Id of the signed-in user
    #[arg(long, env = "STOREFRONT_USER_ID")]
    pub user_id: u64,

    /// Role of the signed-in user (user, manager, admin)
    #[arg(long, env = "STOREFRONT_ROLE", default_value_t = Role::User)]
    pub role: Role,
}

impl SessionConfig {
    /// The session to act as.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(UserId::new(self.user_id), self.role)
    }
}
