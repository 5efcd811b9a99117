use store_client::{AuthMode, CartItem, Dashboard, Product, ViewState};

pub fn state(state: &ViewState) {
    match state {
        ViewState::Unauthenticated { mode, error } => {
            match mode {
                AuthMode::Login => println!("Not logged in. Use `login` or `register`."),
                AuthMode::Register => println!("Create an account with `register`."),
            }
            if let Some(error) = error {
                eprintln!("Error: {error}");
            }
        }
        ViewState::Loading => println!("Loading..."),
        ViewState::Ready(dashboard) => self::dashboard(dashboard),
    }
}

pub fn dashboard(dashboard: &Dashboard) {
    println!("Logged in as {}", dashboard.user);
    println!();
    products(&dashboard.products);
    println!();
    cart(dashboard);
    error(dashboard);
}

pub fn products(products: &[Product]) {
    println!("Products ({})", products.len());
    if products.is_empty() {
        println!("  No products yet.");
    }
    for product in products {
        println!("- {product}");
        if !product.description.is_empty() {
            println!("    {}", product.description);
        }
    }
}

pub fn cart(dashboard: &Dashboard) {
    println!("Cart ({})", dashboard.cart.len());
    if dashboard.cart.is_empty() {
        println!("  Your cart is empty.");
    }
    for item in &dashboard.cart {
        cart_item(item);
    }
    for item in dashboard.stale_cart_items() {
        eprintln!(
            "Warning: item {} refers to product {} which is no longer listed",
            item.id, item.product.id
        );
    }
    println!("Total: R$ {:.2}", dashboard.total());
}

pub fn error(dashboard: &Dashboard) {
    if let Some(error) = &dashboard.error {
        eprintln!("Error: {error}");
    }
}

fn cart_item(item: &CartItem) {
    let added = item
        .created_at
        .map(|at| format!(" (added {})", at.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    println!(
        "- [{}] {} x{} = R$ {:.2}{}",
        item.id,
        item.product.name,
        item.quantity,
        item.subtotal(),
        added
    );
}
