//! Button actions and their callback-data encoding.
//!
//! Callback data is a short ASCII string (Bot API limit: 64 bytes), e.g. `platform:Xbox`
//! or `admin:remove:gp-1m`. `Display` produces it, `FromStr` parses it back.

use crate::domain::entities::Platform;
use crate::domain::errors::InputError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Menu,
    BuyCoins,
    BuyGames,
    BuySubscriptions,
    Platform(Platform),
    Item(String),
    Confirm,
    Cancel,
    Admin(AdminAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    /// Re-show the admin menu.
    Menu,
    ShowRates,
    SetRate,
    Rate(Platform),
    Catalog,
    AddItem,
    RemoveItem(String),
    Export,
    Orders,
    Back,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Menu => f.write_str("menu"),
            Action::BuyCoins => f.write_str("buy:coins"),
            Action::BuyGames => f.write_str("buy:games"),
            Action::BuySubscriptions => f.write_str("buy:subscriptions"),
            Action::Platform(p) => write!(f, "platform:{}", p),
            Action::Item(id) => write!(f, "item:{}", id),
            Action::Confirm => f.write_str("confirm"),
            Action::Cancel => f.write_str("cancel"),
            Action::Admin(a) => write!(f, "admin:{}", a),
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminAction::Menu => f.write_str("menu"),
            AdminAction::ShowRates => f.write_str("rates"),
            AdminAction::SetRate => f.write_str("set_rate"),
            AdminAction::Rate(p) => write!(f, "rate:{}", p),
            AdminAction::Catalog => f.write_str("catalog"),
            AdminAction::AddItem => f.write_str("add_item"),
            AdminAction::RemoveItem(id) => write!(f, "remove:{}", id),
            AdminAction::Export => f.write_str("export"),
            AdminAction::Orders => f.write_str("orders"),
            AdminAction::Back => f.write_str("back"),
        }
    }
}

impl FromStr for Action {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || InputError::UnknownAction(s.to_string());
        let action = match s.split_once(':') {
            None => match s {
                "menu" => Action::Menu,
                "confirm" => Action::Confirm,
                "cancel" => Action::Cancel,
                _ => return Err(unknown()),
            },
            Some(("buy", "coins")) => Action::BuyCoins,
            Some(("buy", "games")) => Action::BuyGames,
            Some(("buy", "subscriptions")) => Action::BuySubscriptions,
            Some(("platform", p)) => Action::Platform(p.parse()?),
            Some(("item", id)) if !id.is_empty() => Action::Item(id.to_string()),
            Some(("admin", rest)) => Action::Admin(rest.parse().map_err(|e| match e {
                InputError::UnknownPlatform(_) => e,
                _ => unknown(),
            })?),
            Some(_) => return Err(unknown()),
        };
        Ok(action)
    }
}

impl FromStr for AdminAction {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || InputError::UnknownAction(s.to_string());
        let action = match s.split_once(':') {
            None => match s {
                "menu" => AdminAction::Menu,
                "rates" => AdminAction::ShowRates,
                "set_rate" => AdminAction::SetRate,
                "catalog" => AdminAction::Catalog,
                "add_item" => AdminAction::AddItem,
                "export" => AdminAction::Export,
                "orders" => AdminAction::Orders,
                "back" => AdminAction::Back,
                _ => return Err(unknown()),
            },
            Some(("rate", p)) => AdminAction::Rate(p.parse()?),
            Some(("remove", id)) if !id.is_empty() => AdminAction::RemoveItem(id.to_string()),
            Some(_) => return Err(unknown()),
        };
        Ok(action)
    }
}
