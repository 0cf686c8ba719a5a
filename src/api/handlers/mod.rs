//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod events;
pub mod health;
pub mod redirection;
pub mod redirects;
pub mod session;

pub use events::events_handler;
pub use health::health_handler;
pub use redirection::{browse_redirections_handler, redirection_handler};
pub use redirects::{
    create_redirect_handler, delete_redirect_handler, get_redirect_handler,
    list_redirects_handler, reset_clicks_handler, update_redirect_handler,
};
pub use session::{session_handler, sign_out_handler};
