//! Sign-in commands. The token is kept in the configured token file.

use std::io::{self, BufRead, Write};

use megacart_core::Email;
use megacart_storefront::api::Registration;
use megacart_storefront::{Result, StorefrontConfig};
use secrecy::SecretString;

use crate::render;

/// Use the given password, or read one line from stdin.
fn password_or_prompt(password: Option<String>) -> io::Result<SecretString> {
    if let Some(password) = password {
        return Ok(SecretString::from(password));
    }

    let mut stderr = io::stderr();
    write!(stderr, "Password: ")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n'])))
}

/// Sign in and save the token.
///
/// # Errors
///
/// Returns [`megacart_storefront::StorefrontError::Auth`] if the backend
/// refuses, or `Io` if the password prompt cannot be read.
#[allow(clippy::print_stdout)]
pub async fn login(
    config: &StorefrontConfig,
    email: &Email,
    password: Option<String>,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let user = super::session(config).login(email, &password).await?;
    println!("Signed in as {}", render::user(&user));
    Ok(())
}

/// Create an account, signing in if the backend hands back a token.
///
/// # Errors
///
/// Returns [`megacart_storefront::StorefrontError::Auth`] if the backend
/// refuses, or `Io` if the password prompt cannot be read.
#[allow(clippy::print_stdout)]
pub async fn register(
    config: &StorefrontConfig,
    name: String,
    email: Email,
    password: Option<String>,
) -> Result<()> {
    let registration = Registration {
        name,
        email,
        password: password_or_prompt(password)?,
    };

    let mut session = super::session(config);
    let user = session.register(&registration).await?;
    if session.is_authenticated() {
        println!("Account created. Signed in as {}", render::user(&user));
    } else {
        println!("Account created for {}. Please log in.", user.email);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn logout(config: &StorefrontConfig) {
    super::session(config).logout();
    println!("Signed out");
}

/// Verify the saved token and show who it belongs to.
#[allow(clippy::print_stdout)]
pub async fn whoami(config: &StorefrontConfig) {
    let mut session = super::session(config);
    session.restore().await;
    match session.user() {
        Some(user) => println!("{}", render::user(user)),
        None => println!("Not signed in"),
    }
}
