//! Account and session commands.

use clementine_client::state::Storefront;
use clementine_core::{Credentials, Email, NewUser, Price, UserPatch};

/// Register a new account.
pub async fn register(
    store: &Storefront,
    name: String,
    email: &str,
    password: String,
    address: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let new_user = NewUser {
        name,
        email: Email::parse(email)?,
        password,
        address,
    };
    store.auth().register(&new_user).await?;
    println!("Account created. Log in with `clem account login`.");
    Ok(())
}

/// Log in and print the profile.
pub async fn login(
    store: &Storefront,
    email: &str,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = Credentials {
        email: Email::parse(email)?,
        password,
    };
    let user = store.auth().login(&credentials).await?;
    println!("Logged in as {} <{}>.", user.name, user.email);
    Ok(())
}

/// Log out.
pub async fn logout(store: &Storefront) {
    store.auth().logout().await;
    println!("Logged out.");
}

/// Print the logged-in profile and order stats.
pub async fn me(store: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    let user = store.auth().current_user().await?;
    println!("{} <{}>", user.name, user.email);
    println!("{}", user.address);

    let stats = store.client().user_order_stats(user.id).await?;
    println!(
        "{} order(s), {} spent",
        stats.total_orders,
        Price::new(stats.total_spent)
    );
    Ok(())
}

/// Update the logged-in profile.
pub async fn update(
    store: &Storefront,
    name: Option<String>,
    email: Option<&str>,
    address: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let patch = UserPatch {
        name,
        email: email.map(Email::parse).transpose()?,
        address,
        password: None,
    };
    let user = store.auth().update_profile(&patch).await?;
    println!("Profile updated: {} <{}>.", user.name, user.email);
    Ok(())
}
