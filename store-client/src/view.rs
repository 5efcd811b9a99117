use derive_more::Display;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::api::ApiClient;
use crate::auth::AuthClient;
use crate::cart::CartClient;
use crate::catalog::CatalogLoader;
use crate::config::ClientConfig;
use crate::error::StoreClientError;
use crate::forms::{LoginForm, ProductForm, RegistrationForm};
use crate::id::{CartItemId, ProductId};
use crate::model::{CartItem, Product, User, cart_total};
use crate::session::{FileSessionStore, Session, SessionStore};
use crate::tracker::{RequestTracker, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AuthMode {
    #[display("login")]
    Login,
    #[display("register")]
    Register,
}

/// What the user sees. Errors are overlays on `Unauthenticated` and `Ready`,
/// never a state of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Unauthenticated {
        mode: AuthMode,
        error: Option<String>,
    },
    Loading,
    Ready(Dashboard),
}

impl ViewState {
    fn signed_out(error: Option<String>) -> Self {
        ViewState::Unauthenticated {
            mode: AuthMode::Login,
            error,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Unauthenticated { error, .. } => error.as_deref(),
            ViewState::Ready(dashboard) => dashboard.error.as_deref(),
            ViewState::Loading => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub user: User,
    pub products: Vec<Product>,
    pub cart: Vec<CartItem>,
    pub error: Option<String>,
}

impl Dashboard {
    pub fn total(&self) -> Decimal {
        cart_total(&self.cart)
    }

    /// Cart items whose product is missing from the latest catalog.
    pub fn stale_cart_items(&self) -> Vec<&CartItem> {
        self.cart
            .iter()
            .filter(|item| !self.products.iter().any(|p| p.id == item.product.id))
            .collect()
    }
}

/// Drives the storefront: session, catalog and cart behind one state machine.
///
/// Every mutation is followed by a full re-fetch of the collection it
/// touched. Nothing is retried. Loads and refreshes run one at a time, so a
/// refresh issued during a load waits for it; logout never waits.
pub struct Storefront<S: SessionStore> {
    store: S,
    auth: AuthClient,
    catalog: CatalogLoader,
    cart: CartClient,
    session: RwLock<Session>,
    state: RwLock<ViewState>,
    requests: RequestTracker,
    fetching: Mutex<()>,
}

impl Storefront<FileSessionStore> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, StoreClientError> {
        let api = ApiClient::new(&config.api_url, config.timeout)?;
        Ok(Self::new(api, FileSessionStore::new(config.session_file.clone())))
    }
}

impl<S: SessionStore> Storefront<S> {
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            store,
            auth: AuthClient::new(api.clone()),
            catalog: CatalogLoader::new(api.clone()),
            cart: CartClient::new(api),
            session: RwLock::new(Session::anonymous()),
            state: RwLock::new(ViewState::signed_out(None)),
            requests: RequestTracker::new(),
            fetching: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> ViewState {
        self.state.read().await.clone()
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Restores the stored session and, if there is one, loads everything.
    #[instrument(skip(self))]
    pub async fn start(&self) -> ViewState {
        let user = self.store.load();
        let signed_in = user.is_some();
        *self.session.write().await = Session::from(user);

        if signed_in {
            self.reload().await
        } else {
            self.set_state(ViewState::signed_out(None)).await;
            self.state().await
        }
    }

    /// Fetches catalog and cart concurrently and rebuilds the dashboard.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> ViewState {
        let _fetching = self.fetching.lock().await;
        let session = self.session().await;
        let Some(user) = session.user().cloned() else {
            self.set_state(ViewState::signed_out(None)).await;
            return self.state().await;
        };

        self.set_state(ViewState::Loading).await;
        let catalog_ticket = self.requests.begin(Resource::Catalog);
        let cart_ticket = self.requests.begin(Resource::Cart);

        let (products, cart) = tokio::join!(self.catalog.list(), self.cart.fetch(&session));

        if !self.requests.is_current(catalog_ticket) || !self.requests.is_current(cart_ticket) {
            debug!("discarding superseded load");
            return self.state().await;
        }

        let auth_failure = [products.as_ref().err(), cart.as_ref().err()]
            .into_iter()
            .flatten()
            .find(|err| err.is_auth_failure())
            .map(ToString::to_string);
        if let Some(message) = auth_failure {
            warn!(error = %message, "session rejected while loading, signing out");
            if let Err(err) = self.store.clear() {
                error!(error = %err, "cannot clear stored session");
            }
            self.end_session(Some(message)).await;
            return self.state().await;
        }

        let error = products
            .as_ref()
            .err()
            .or(cart.as_ref().err())
            .map(ToString::to_string);
        if let Some(message) = &error {
            warn!(error = %message, "storefront loaded partially");
        }

        let dashboard = Dashboard {
            user,
            products: products.unwrap_or_default(),
            cart: cart.unwrap_or_default(),
            error,
        };
        for item in dashboard.stale_cart_items() {
            warn!(item_id = %item.id, product_id = %item.product.id, "cart item not in catalog");
        }
        self.set_state(ViewState::Ready(dashboard)).await;
        self.state().await
    }

    pub async fn switch_mode(&self, mode: AuthMode) {
        let mut state = self.state.write().await;
        if let ViewState::Unauthenticated { .. } = *state {
            *state = ViewState::Unauthenticated { mode, error: None };
        }
    }

    pub async fn dismiss_error(&self) {
        match &mut *self.state.write().await {
            ViewState::Unauthenticated { error, .. } => *error = None,
            ViewState::Ready(dashboard) => dashboard.error = None,
            ViewState::Loading => {}
        }
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> Result<(), StoreClientError> {
        let result = async {
            form.validate()?;
            let user = self.auth.login(form.email.trim(), &form.password).await?;
            self.store.save(&user)?;
            Ok::<_, StoreClientError>(user)
        }
        .await;

        let user = self.auth_outcome(AuthMode::Login, result).await?;
        self.enter(user).await;
        Ok(())
    }

    /// Mismatched passwords are rejected here; no request is sent.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<(), StoreClientError> {
        let result = async {
            form.validate()?;
            let user = self
                .auth
                .register(form.name.trim(), form.email.trim(), &form.password)
                .await?;
            self.store.save(&user)?;
            Ok::<_, StoreClientError>(user)
        }
        .await;

        let user = self.auth_outcome(AuthMode::Register, result).await?;
        self.enter(user).await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), StoreClientError> {
        self.store.clear()?;
        self.end_session(None).await;
        info!("logged out");
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), StoreClientError> {
        let session = self.session().await;
        if let Err(err) = self.cart.add(&session, product_id, quantity).await {
            return self.action_failed(err).await;
        }
        self.refresh_cart().await
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_from_cart(&self, item_id: &CartItemId) -> Result<(), StoreClientError> {
        let session = self.session().await;
        if let Err(err) = self.cart.remove(&session, item_id).await {
            return self.action_failed(err).await;
        }
        self.refresh_cart().await
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn register_product(&self, form: &ProductForm) -> Result<Product, StoreClientError> {
        let result = async {
            self.session().await.user_id()?;
            let draft = form.validate()?;
            Ok::<_, StoreClientError>(self.catalog.create(&draft).await?)
        }
        .await;

        let product = match result {
            Ok(product) => product,
            Err(err) => return self.action_failed(err).await,
        };
        self.refresh_catalog().await?;
        Ok(product)
    }

    pub async fn refresh_catalog(&self) -> Result<(), StoreClientError> {
        let _fetching = self.fetching.lock().await;
        let ticket = self.requests.begin(Resource::Catalog);
        let result = self.catalog.list().await;
        if !self.requests.is_current(ticket) {
            debug!("discarding superseded catalog response");
            return Ok(());
        }

        match result {
            Ok(products) => {
                self.update_dashboard(|dashboard| dashboard.products = products)
                    .await;
                Ok(())
            }
            Err(err) => self.action_failed(err).await,
        }
    }

    pub async fn refresh_cart(&self) -> Result<(), StoreClientError> {
        let _fetching = self.fetching.lock().await;
        let session = self.session().await;
        let ticket = self.requests.begin(Resource::Cart);
        let result = self.cart.fetch(&session).await;
        if !self.requests.is_current(ticket) {
            debug!("discarding superseded cart response");
            return Ok(());
        }

        match result {
            Ok(items) => {
                self.update_dashboard(|dashboard| dashboard.cart = items).await;
                Ok(())
            }
            Err(err) => self.action_failed(err).await,
        }
    }

    async fn enter(&self, user: User) {
        *self.session.write().await = Session::authenticated(user);
        self.reload().await;
    }

    /// Failed login or registration: stay signed out, show why.
    async fn auth_outcome<T>(
        &self,
        mode: AuthMode,
        result: Result<T, StoreClientError>,
    ) -> Result<T, StoreClientError> {
        if let Err(err) = &result {
            warn!(error = %err, %mode, "authentication failed");
            self.set_state(ViewState::Unauthenticated {
                mode,
                error: Some(err.to_string()),
            })
            .await;
        }
        result
    }

    async fn end_session(&self, error: Option<String>) {
        self.requests.invalidate_all();
        *self.session.write().await = Session::anonymous();
        self.set_state(ViewState::signed_out(error)).await;
    }

    /// Logs the failure and shows it inline; the state is otherwise kept.
    async fn action_failed<T>(&self, err: StoreClientError) -> Result<T, StoreClientError> {
        warn!(error = %err, "action failed");
        let message = err.to_string();
        self.update_dashboard(|dashboard| dashboard.error = Some(message))
            .await;
        Err(err)
    }

    async fn update_dashboard(&self, apply: impl FnOnce(&mut Dashboard)) {
        if let ViewState::Ready(dashboard) = &mut *self.state.write().await {
            apply(dashboard);
        }
    }

    async fn set_state(&self, state: ViewState) {
        *self.state.write().await = state;
    }
}
