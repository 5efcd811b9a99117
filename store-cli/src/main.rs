mod render;

use std::path::PathBuf;

use clap::Parser;
use store_client::logging::init_logging;
use store_client::{
    AuthMode, ClientConfig, Dashboard, LoginForm, ProductForm, RecordId, RegistrationForm,
    StoreClientError, Storefront, ViewState,
};

#[derive(Parser, Debug)]
#[clap(about = "Storefront client: catalog, cart and account")]
struct Cli {
    /// API base URL, including the `/api` prefix
    #[clap(short, long)]
    server: Option<String>,

    /// Where the logged-in user is remembered
    #[clap(long)]
    session_file: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Register {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        confirm_password: String,
    },
    Logout,
    /// Catalog, cart and total
    Show,
    Products,
    AddProduct {
        #[clap(long)]
        name: String,
        #[clap(long)]
        price: String,
        #[clap(long)]
        image_url: String,
        #[clap(long)]
        description: String,
    },
    Cart,
    AddToCart {
        product_id: String,
        #[clap(long, default_value_t = 1)]
        quantity: u32,
    },
    RemoveFromCart {
        item_id: String,
    },
}

impl Command {
    fn loads_dashboard(&self) -> bool {
        !matches!(
            self,
            Command::Login { .. } | Command::Register { .. } | Command::Logout
        )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Cli::parse();

    // 1. Конфигурация: окружение, затем флаги
    let mut config = ClientConfig::from_env()?;
    if let Some(server) = args.server {
        config.api_url = server;
    }
    if let Some(path) = args.session_file {
        config.session_file = path;
    }
    tracing::debug!(api_url = %config.api_url, session_file = %config.session_file.display(), "configuration loaded");

    let storefront = Storefront::from_config(&config)?;

    // 2. Вход и выход не загружают витрину
    let state = if args.command.loads_dashboard() {
        storefront.start().await
    } else {
        storefront.state().await
    };

    // 3. Выполняем команду
    match args.command {
        Command::Login { email, password } => {
            storefront.login(&LoginForm { email, password }).await?;
            println!("Successfully logged in!");
            render::state(&storefront.state().await);
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            storefront.switch_mode(AuthMode::Register).await;
            storefront
                .register(&RegistrationForm {
                    name,
                    email,
                    password,
                    confirm_password,
                })
                .await?;
            println!("Successfully registered!");
            render::state(&storefront.state().await);
        }
        Command::Logout => {
            storefront.logout().await?;
            println!("Logged out.");
        }
        Command::Show => render::state(&state),
        Command::Products => {
            let dashboard = ready(state)?;
            render::products(&dashboard.products);
            render::error(&dashboard);
        }
        Command::AddProduct {
            name,
            price,
            image_url,
            description,
        } => {
            ready(state)?;
            let product = storefront
                .register_product(&ProductForm {
                    name,
                    price,
                    image_url,
                    description,
                })
                .await?;
            println!("Product created! ID: {}", product.id);
        }
        Command::Cart => {
            let dashboard = ready(state)?;
            render::cart(&dashboard);
            render::error(&dashboard);
        }
        Command::AddToCart {
            product_id,
            quantity,
        } => {
            ready(state)?;
            storefront
                .add_to_cart(&RecordId::from(product_id), quantity)
                .await?;
            println!("Added to cart.");
            render::cart(&ready(storefront.state().await)?);
        }
        Command::RemoveFromCart { item_id } => {
            ready(state)?;
            storefront.remove_from_cart(&RecordId::from(item_id)).await?;
            println!("Removed from cart.");
            render::cart(&ready(storefront.state().await)?);
        }
    }

    Ok(())
}

fn ready(state: ViewState) -> Result<Dashboard, StoreClientError> {
    match state {
        ViewState::Ready(dashboard) => Ok(dashboard),
        other => {
            render::state(&other);
            Err(StoreClientError::Unauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_commands_skip_the_dashboard_load() {
        let login = Cli::parse_from(["store", "login", "--email", "a@b.c", "--password", "x"]);
        assert!(!login.command.loads_dashboard());
        assert!(!Cli::parse_from(["store", "logout"]).command.loads_dashboard());
        assert!(Cli::parse_from(["store", "show"]).command.loads_dashboard());
        assert!(Cli::parse_from(["store", "add-to-cart", "p-1"]).command.loads_dashboard());
    }
}
