pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod id;
pub mod logging;
pub mod model;
pub mod session;
pub mod tracker;
pub mod view;

pub use api::ApiClient;
pub use auth::AuthClient;
pub use cart::CartClient;
pub use catalog::CatalogLoader;
pub use config::ClientConfig;
pub use error::{HttpFailure, SessionError, StoreClientError, ValidationError};
pub use forms::{LoginForm, ProductDraft, ProductForm, RegistrationForm};
pub use id::{CartItemId, ProductId, RecordId, UserId};
pub use model::{CartItem, Product, User, cart_total};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use view::{AuthMode, Dashboard, Storefront, ViewState};
