mod idp_client;
mod token_manager;

pub use idp_client::{IdpClient, IdpUserResponse};
pub use token_manager::IdpTokenManager;
