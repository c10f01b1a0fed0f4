//! Client for the Polar AccessLink API.
//!
//! ```no_run
//! use polar_accesslink::{Config, PolarClient};
//!
//! # async fn example() -> polar_accesslink::Result<()> {
//! let mut client = PolarClient::new(Config::new("client-id", "client-secret"))?;
//!
//! // Send the user to the consent page, then redeem the code it returns.
//! let url = client.authorization_url("some-state");
//! # let _ = url;
//! let token = client.authorization_access_token("code-from-callback").await?;
//! client.set_bearer(token.value.clone());
//! client.set_user_id(token.user_id);
//!
//! client.register_user().await?;
//! for night in client.last_sleeps().await? {
//!     println!("{:?}: {}", night.date, night.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod exercise;
pub mod recharge;
pub mod server;
pub mod sleep;
pub mod state_store;
pub mod transport;
pub mod types;
pub mod user;

pub use auth::generate_state;
pub use client::PolarClient;
pub use config::Config;
pub use error::{Error, Result};
pub use transport::{HttpTransport, ResponseBody, Transport, TransportResponse};
pub use types::{AccessToken, Exercise, HeartRate, Recharge, RequestParams, Sleep, User};
