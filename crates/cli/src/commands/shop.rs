//! Interactive browse-and-cart session.
//!
//! Reads one command per line from stdin and drives a [`Storefront`]. The
//! cart lives only as long as the session.

use std::str::FromStr;

use megacart_core::ProductId;
use megacart_storefront::{DataSource, Storefront, StorefrontConfig};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

const HELP: &str = "\
Commands:
  list                     show products matching the filter
  search [term]            filter by name (no term clears)
  category <name>          filter by category (\"All\" clears)
  price <min|-> <max|->    filter by price range
  categories               list categories
  add <id> [qty]           add a product to the cart
  remove <id>              remove a product from the cart
  qty <id> <n>             set a quantity (0 removes)
  cart                     show the cart
  clear                    empty the cart
  reload                   fetch the catalog again
  status                   show backend connectivity
  help                     show this message
  quit                     leave";

/// Errors parsing a shop command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a number: {0}")]
    InvalidNumber(String),
}

/// One line of shop input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopCommand {
    List,
    Search(String),
    Category(String),
    Price(Option<Decimal>, Option<Decimal>),
    Categories,
    Add(ProductId, u32),
    Remove(ProductId),
    Quantity(ProductId, i64),
    Cart,
    Clear,
    Reload,
    Status,
    Help,
    Quit,
}

fn parse_number<T: FromStr>(raw: &str) -> Result<T, ParseError> {
    raw.parse()
        .map_err(|_| ParseError::InvalidNumber(raw.to_string()))
}

fn parse_bound(raw: &str) -> Result<Option<Decimal>, ParseError> {
    if raw == "-" {
        Ok(None)
    } else {
        parse_number(raw).map(Some)
    }
}

impl FromStr for ShopCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match (verb.to_lowercase().as_str(), args.as_slice()) {
            ("list" | "ls", []) => Self::List,
            ("search", _) => Self::Search(rest.to_string()),
            ("category", [_, ..]) => Self::Category(rest.to_string()),
            ("category", []) => return Err(ParseError::Usage("category <name>")),
            ("price", [min, max]) => Self::Price(parse_bound(min)?, parse_bound(max)?),
            ("price", _) => return Err(ParseError::Usage("price <min|-> <max|->")),
            ("categories", []) => Self::Categories,
            ("add", [id]) => Self::Add(parse_number(id)?, 1),
            ("add", [id, quantity]) => Self::Add(parse_number(id)?, parse_number(quantity)?),
            ("add", _) => return Err(ParseError::Usage("add <id> [qty]")),
            ("remove" | "rm", [id]) => Self::Remove(parse_number(id)?),
            ("remove" | "rm", _) => return Err(ParseError::Usage("remove <id>")),
            ("qty", [id, quantity]) => Self::Quantity(parse_number(id)?, parse_number(quantity)?),
            ("qty", _) => return Err(ParseError::Usage("qty <id> <n>")),
            ("cart", []) => Self::Cart,
            ("clear", []) => Self::Clear,
            ("reload", []) => Self::Reload,
            ("status", []) => Self::Status,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit" | "q", []) => Self::Quit,
            (other, _) => return Err(ParseError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

/// Apply one command. Returns the text to show, or `None` to quit.
async fn apply(storefront: &mut Storefront, command: ShopCommand) -> Option<String> {
    let output = match command {
        ShopCommand::List => render::product_table(&storefront.visible_products()),
        ShopCommand::Search(term) => {
            storefront.set_search_term(term);
            render::product_table(&storefront.visible_products())
        }
        ShopCommand::Category(category) => {
            storefront.select_category(category);
            render::product_table(&storefront.visible_products())
        }
        ShopCommand::Price(min, max) => {
            storefront.set_price_range(min, max);
            render::product_table(&storefront.visible_products())
        }
        ShopCommand::Categories => storefront.categories().join("\n"),
        ShopCommand::Add(id, quantity) => match storefront.add_to_cart(id, quantity) {
            Ok(()) => render::cart_summary(storefront.cart()),
            Err(e) => e.user_message(),
        },
        ShopCommand::Remove(id) => {
            storefront.remove_from_cart(id);
            render::cart_summary(storefront.cart())
        }
        ShopCommand::Quantity(id, quantity) => {
            storefront.update_quantity(id, quantity);
            render::cart_summary(storefront.cart())
        }
        ShopCommand::Cart => render::cart_summary(storefront.cart()),
        ShopCommand::Clear => {
            storefront.clear_cart();
            render::cart_summary(storefront.cart())
        }
        ShopCommand::Reload => {
            storefront.reload().await;
            loaded_banner(storefront)
        }
        ShopCommand::Status => render::connectivity(storefront.connectivity()).to_string(),
        ShopCommand::Help => HELP.to_string(),
        ShopCommand::Quit => return None,
    };
    Some(output)
}

fn loaded_banner(storefront: &Storefront) -> String {
    let mut banner = format!(
        "{} products, {}",
        storefront.products().len(),
        render::connectivity(storefront.connectivity())
    );
    if storefront.data_source() == DataSource::Fallback {
        banner.push('\n');
        banner.push_str(render::OFFLINE_NOTICE);
    }
    banner
}

/// Run the shop loop until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
#[allow(clippy::print_stdout)]
pub async fn run(config: &StorefrontConfig) -> megacart_storefront::Result<()> {
    let mut session = super::session(config);
    let mut storefront = Storefront::new(super::catalog_service(config));

    let ((), state) = tokio::join!(storefront.load(), session.restore());
    tracing::debug!(state = ?state, "Session restored");

    if let Some(user) = session.user() {
        println!("Welcome back, {}", render::user(user));
    }
    println!("{}", loaded_banner(&storefront));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ShopCommand>() {
            Ok(command) => match apply(&mut storefront, command).await {
                Some(output) => println!("{output}"),
                None => break,
            },
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<ShopCommand, ParseError> {
        line.parse()
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!(parse("list").unwrap(), ShopCommand::List);
        assert_eq!(
            parse("search  wireless head ").unwrap(),
            ShopCommand::Search("wireless head".to_string())
        );
        assert_eq!(parse("search").unwrap(), ShopCommand::Search(String::new()));
        assert_eq!(
            parse("category Home Decor").unwrap(),
            ShopCommand::Category("Home Decor".to_string())
        );
        assert_eq!(
            parse("price 100 -").unwrap(),
            ShopCommand::Price(Some(Decimal::from(100)), None)
        );
    }

    #[test]
    fn test_parse_cart_commands() {
        assert_eq!(
            parse("add 3").unwrap(),
            ShopCommand::Add(ProductId::new(3), 1)
        );
        assert_eq!(
            parse("ADD 3 4").unwrap(),
            ShopCommand::Add(ProductId::new(3), 4)
        );
        assert_eq!(
            parse("qty 3 -1").unwrap(),
            ShopCommand::Quantity(ProductId::new(3), -1)
        );
        assert_eq!(parse("rm 7").unwrap(), ShopCommand::Remove(ProductId::new(7)));
        assert_eq!(parse("quit").unwrap(), ShopCommand::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse("dance").unwrap_err(),
            ParseError::UnknownCommand("dance".to_string())
        );
        assert_eq!(parse("add").unwrap_err(), ParseError::Usage("add <id> [qty]"));
        assert_eq!(
            parse("add three").unwrap_err(),
            ParseError::InvalidNumber("three".to_string())
        );
        // Negative additions are not a thing
        assert_eq!(
            parse("add 3 -2").unwrap_err(),
            ParseError::InvalidNumber("-2".to_string())
        );
        assert_eq!(parse("category").unwrap_err(), ParseError::Usage("category <name>"));
    }
}
