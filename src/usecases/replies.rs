//! Reply texts and keyboards shown by the conversation and the admin panel.

use crate::domain::{
    Action, AdminAction, Button, CatalogItem, Keyboard, Order, OutboundMessage, Platform,
    PriceEntry,
};

pub const WELCOME: &str = "Welcome to the store! What would you like to buy?";
pub const CHOOSE: &str = "What would you like to buy?";
pub const CHOOSE_PLATFORM: &str = "Choose your platform:";
pub const CANCELLED: &str = "Cancelled.";
pub const NOTHING_TO_CONFIRM: &str = "There is nothing to confirm.";
pub const NOTHING_AVAILABLE: &str = "Nothing is available in this category right now.";
pub const ITEM_GONE: &str = "This item is no longer available.";
pub const STALE_BUTTON: &str = "This button is no longer active.";
pub const USE_BUTTONS: &str = "Please use the menu buttons. Send /start to open the menu.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /start to open the menu.";
pub const BAD_QUANTITY: &str =
    "Please send the number of coins as a positive whole number, e.g. 5000000.";
pub const ORDER_NOT_RECORDED: &str =
    "Sorry, the order could not be recorded. Please press Confirm to try again.";

pub const NOT_AUTHORIZED: &str = "You are not authorized to use the admin panel.";
pub const ADMIN_MENU: &str = "Admin panel:";
pub const ADMIN_CHOOSE_PLATFORM: &str = "Which platform's rate do you want to change?";
pub const USE_ADMIN_BUTTONS: &str = "Please use the admin panel buttons.";
pub const ADD_ITEM_PROMPT: &str = "Send the item as JSON, for example:\n\
{\"id\": \"fc25\", \"name\": \"EA SPORTS FC 25\", \"category\": \"game\", \"price\": 4999, \"platform\": \"PlayStation\"}\n\
\"platform\" is optional; an existing item with the same id is replaced.";

pub fn main_menu(chat_id: i64, text: &str) -> OutboundMessage {
    OutboundMessage::text(chat_id, text).with_keyboard(main_menu_keyboard())
}

pub fn main_menu_keyboard() -> Keyboard {
    Keyboard::column([
        Button::new("Coins", &Action::BuyCoins),
        Button::new("Games", &Action::BuyGames),
        Button::new("Subscriptions", &Action::BuySubscriptions),
    ])
}

pub fn platform_keyboard() -> Keyboard {
    Keyboard::column(
        Platform::ALL
            .iter()
            .map(|&p| Button::new(p.as_str(), &Action::Platform(p))),
    )
    .row(vec![back_to_menu()])
}

pub fn confirm_keyboard() -> Keyboard {
    Keyboard::default().row(vec![
        Button::new("Confirm", &Action::Confirm),
        Button::new("Cancel", &Action::Cancel),
    ])
}

pub fn catalog_keyboard(items: &[CatalogItem]) -> Keyboard {
    Keyboard::column(
        items
            .iter()
            .map(|item| Button::new(item.label(), &Action::Item(item.id.clone()))),
    )
    .row(vec![back_to_menu()])
}

fn back_to_menu() -> Button {
    Button::new("Back to menu", &Action::Menu)
}

pub fn quantity_prompt(platform: Platform) -> String {
    format!(
        "{}: how many coins do you want? Send a whole number, e.g. 5000000.",
        platform
    )
}

pub fn no_rate(platform: Platform) -> String {
    format!("Sorry, there is no price for {} coins right now.", platform)
}

pub fn coin_summary(order: &Order) -> String {
    let platform = order.platform.map(|p| p.as_str()).unwrap_or("-");
    let rate = order.rate.map(|r| r.to_string()).unwrap_or_default();
    format!(
        "Your order:\nPlatform: {}\nQuantity: {} coins\nRate: {} per 1,000,000 coins\nTotal: {}\n\nConfirm the order?",
        platform, order.quantity, rate, order.total
    )
}

pub fn item_summary(order: &Order) -> String {
    let mut text = format!("Your order:\n{}", order.item);
    if let Some(p) = order.platform {
        text.push_str(&format!(" ({})", p));
    }
    text.push_str(&format!("\nTotal: {}\n\nConfirm the order?", order.total));
    text
}

pub fn order_accepted(order: &Order) -> String {
    format!(
        "Order #{} accepted. An administrator will contact you shortly.",
        order.id.unwrap_or_default()
    )
}

/// Order summary sent to administrators.
pub fn admin_order_summary(order: &Order) -> String {
    let username = order
        .username
        .as_deref()
        .map(|u| format!("@{}", u))
        .unwrap_or_else(|| "-".into());
    let mut text = format!(
        "New order #{}\nKind: {}\nItem: {}\n",
        order.id.unwrap_or_default(),
        order.kind.as_str(),
        order.item
    );
    if let Some(p) = order.platform {
        text.push_str(&format!("Platform: {}\n", p));
    }
    text.push_str(&format!(
        "Quantity: {}\nTotal: {}\nUser: {} (id {})",
        order.quantity, order.total, username, order.user_id
    ));
    text
}

pub fn admin_menu(chat_id: i64, text: &str) -> OutboundMessage {
    OutboundMessage::text(chat_id, text).with_keyboard(admin_menu_keyboard())
}

pub fn admin_menu_keyboard() -> Keyboard {
    Keyboard::column([
        Button::new("Show rates", &Action::Admin(AdminAction::ShowRates)),
        Button::new("Set rate", &Action::Admin(AdminAction::SetRate)),
        Button::new("Catalog", &Action::Admin(AdminAction::Catalog)),
        Button::new("Export now", &Action::Admin(AdminAction::Export)),
        Button::new("Recent orders", &Action::Admin(AdminAction::Orders)),
        Button::new("Back", &Action::Admin(AdminAction::Back)),
    ])
}

pub fn admin_platform_keyboard() -> Keyboard {
    Keyboard::column(
        Platform::ALL
            .iter()
            .map(|&p| Button::new(p.as_str(), &Action::Admin(AdminAction::Rate(p)))),
    )
    .row(vec![admin_back()])
}

pub fn admin_catalog_keyboard(items: &[CatalogItem]) -> Keyboard {
    Keyboard::column(items.iter().map(|item| {
        Button::new(
            format!("Remove {}", item.name),
            &Action::Admin(AdminAction::RemoveItem(item.id.clone())),
        )
    }))
    .row(vec![Button::new(
        "Add / replace item",
        &Action::Admin(AdminAction::AddItem),
    )])
    .row(vec![admin_back()])
}

/// Back to the admin menu (not out of the panel).
fn admin_back() -> Button {
    Button::new("Admin menu", &Action::Admin(AdminAction::Menu))
}

pub fn rates_text(rates: &[PriceEntry]) -> String {
    let mut text = String::from("Current rates (per 1,000,000 coins):");
    for entry in rates {
        text.push_str(&format!("\n{}: {}", entry.platform, entry.rate));
    }
    text
}

pub fn catalog_text(items: &[CatalogItem]) -> String {
    if items.is_empty() {
        return "The catalog is empty.".into();
    }
    let mut text = String::from("Catalog:");
    for item in items {
        text.push_str(&format!("\n[{}] {} ({})", item.id, item.label(), item.category));
    }
    text
}

pub fn rate_prompt(platform: Platform, current: Option<String>) -> String {
    let current = current.unwrap_or_else(|| "not set".into());
    format!(
        "Send the new {} rate per 1,000,000 coins (current: {}). Up to two decimals, e.g. 150 or 99.50.",
        platform, current
    )
}

pub fn orders_text(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders yet.".into();
    }
    let mut text = String::from("Recent orders:");
    for order in orders {
        text.push_str(&format!(
            "\n#{} {} {} | {} | total {} | user {}",
            order.id.unwrap_or_default(),
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.kind.as_str(),
            order.item,
            order.total,
            order.user_id
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Rate, UserRef};
    use chrono::Utc;

    #[test]
    fn test_main_menu_labels() {
        assert_eq!(
            main_menu_keyboard().labels(),
            vec!["Coins", "Games", "Subscriptions"]
        );
    }

    #[test]
    fn test_admin_summary_fields() {
        let user = UserRef {
            id: 456,
            username: Some("gamer".into()),
        };
        let mut order = Order::coins(
            &user,
            Platform::Xbox,
            5_000_000,
            Rate::from_units(100).unwrap(),
            500,
        )
        .confirmed(Utc::now());
        order.id = Some(7);
        let text = admin_order_summary(&order);
        assert!(text.contains("#7"));
        assert!(text.contains("Platform: Xbox"));
        assert!(text.contains("Quantity: 5000000"));
        assert!(text.contains("Total: 500"));
        assert!(text.contains("@gamer (id 456)"));
    }

    #[test]
    fn test_callback_data_fits_telegram_limit() {
        let item = CatalogItem {
            id: "x".repeat(crate::domain::entities::MAX_ITEM_ID_LEN),
            name: "Long".into(),
            category: crate::domain::Category::Game,
            price: 1,
            platform: None,
        };
        let items = [item];
        for kb in [catalog_keyboard(&items), admin_catalog_keyboard(&items)] {
            assert!(kb.buttons().all(|b| b.data.len() <= 64));
        }
    }
}
