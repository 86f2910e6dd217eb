//! Admin panel: rates, catalog, export and recent orders.
//!
//! Every entry point checks `AdministratorSet::is_admin` first. A refusal changes
//! nothing and is logged at debug only.

use crate::domain::{
    AdminAction, AdminState, AdministratorSet, CatalogItem, InputError, OutboundMessage, Platform,
    Rate, Session, SessionState, UserRef,
};
use crate::ports::{CatalogStorePort, OrderLogPort, PriceStorePort};
use crate::usecases::ExportService;
use crate::usecases::replies;
use std::sync::Arc;
use tracing::{debug, info, warn};

const RECENT_ORDERS_LIMIT: u32 = 10;

pub struct AdminPanel {
    admins: AdministratorSet,
    prices: Arc<dyn PriceStorePort>,
    catalog: Arc<dyn CatalogStorePort>,
    orders: Arc<dyn OrderLogPort>,
    exporter: Arc<ExportService>,
}

impl AdminPanel {
    pub fn new(
        admins: AdministratorSet,
        prices: Arc<dyn PriceStorePort>,
        catalog: Arc<dyn CatalogStorePort>,
        orders: Arc<dyn OrderLogPort>,
        exporter: Arc<ExportService>,
    ) -> Self {
        Self {
            admins,
            prices,
            catalog,
            orders,
            exporter,
        }
    }

    fn authorize(&self, user: &UserRef) -> bool {
        let allowed = self.admins.is_admin(user.id);
        if !allowed {
            debug!(user_id = user.id, "admin access refused");
        }
        allowed
    }

    /// `/admin`
    pub fn open(&self, user: &UserRef, chat_id: i64, session: &mut Session) -> Vec<OutboundMessage> {
        if !self.authorize(user) {
            return vec![OutboundMessage::text(chat_id, replies::NOT_AUTHORIZED)];
        }
        session.state = SessionState::Admin(AdminState::Menu);
        vec![replies::admin_menu(chat_id, replies::ADMIN_MENU)]
    }

    /// Platform choice again, after a rate button named no known platform.
    pub fn reprompt_platform(&self, user: &UserRef, chat_id: i64) -> Vec<OutboundMessage> {
        if !self.authorize(user) {
            return vec![OutboundMessage::text(chat_id, replies::NOT_AUTHORIZED)];
        }
        vec![
            OutboundMessage::text(chat_id, replies::ADMIN_CHOOSE_PLATFORM)
                .with_keyboard(replies::admin_platform_keyboard()),
        ]
    }

    /// Admin button press.
    pub async fn handle_action(
        &self,
        user: &UserRef,
        chat_id: i64,
        action: AdminAction,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        if !self.authorize(user) {
            return vec![OutboundMessage::text(chat_id, replies::NOT_AUTHORIZED)];
        }

        let reply = match action {
            AdminAction::Menu => {
                session.state = SessionState::Admin(AdminState::Menu);
                replies::admin_menu(chat_id, replies::ADMIN_MENU)
            }
            AdminAction::ShowRates => {
                session.state = SessionState::Admin(AdminState::Menu);
                let rates = self.prices.rates().await;
                replies::admin_menu(chat_id, &replies::rates_text(&rates))
            }
            AdminAction::SetRate => {
                session.state = SessionState::Admin(AdminState::ChoosePlatform);
                OutboundMessage::text(chat_id, replies::ADMIN_CHOOSE_PLATFORM)
                    .with_keyboard(replies::admin_platform_keyboard())
            }
            AdminAction::Rate(platform) => {
                session.state = SessionState::Admin(AdminState::AwaitRate { platform });
                let current = self.prices.get_rate(platform).await.map(|r| r.to_string());
                OutboundMessage::text(chat_id, replies::rate_prompt(platform, current))
            }
            AdminAction::Catalog => {
                session.state = SessionState::Admin(AdminState::Catalog);
                self.catalog_view(chat_id, None).await
            }
            AdminAction::AddItem => {
                session.state = SessionState::Admin(AdminState::AwaitItem);
                OutboundMessage::text(chat_id, replies::ADD_ITEM_PROMPT)
            }
            AdminAction::RemoveItem(id) => {
                session.state = SessionState::Admin(AdminState::Catalog);
                let note = match self.catalog.remove_item(&id).await {
                    Ok(true) => {
                        info!(user_id = user.id, %id, "catalog item removed by admin");
                        format!("Removed item {}.", id)
                    }
                    Ok(false) => format!("No item with id {}.", id),
                    Err(e) => {
                        warn!(user_id = user.id, %id, error = %e, "catalog remove failed");
                        format!("Could not remove {}: {}", id, e)
                    }
                };
                self.catalog_view(chat_id, Some(note)).await
            }
            AdminAction::Export => {
                session.state = SessionState::Admin(AdminState::Menu);
                let text = match self.exporter.export_now().await {
                    Ok(report) => format!(
                        "Exported {} orders to {}",
                        report.rows,
                        report.path.display()
                    ),
                    Err(e) => {
                        warn!(user_id = user.id, error = %e, "manual export failed");
                        format!("Export failed: {}", e)
                    }
                };
                replies::admin_menu(chat_id, &text)
            }
            AdminAction::Orders => {
                session.state = SessionState::Admin(AdminState::Menu);
                let text = match self.orders.recent(RECENT_ORDERS_LIMIT).await {
                    Ok(orders) => replies::orders_text(&orders),
                    Err(e) => {
                        warn!(error = %e, "reading recent orders failed");
                        format!("Could not read orders: {}", e)
                    }
                };
                replies::admin_menu(chat_id, &text)
            }
            AdminAction::Back => {
                session.state = SessionState::Menu;
                replies::main_menu(chat_id, replies::CHOOSE)
            }
        };
        vec![reply]
    }

    /// Text while the session is in an admin state.
    pub async fn handle_text(
        &self,
        user: &UserRef,
        chat_id: i64,
        text: &str,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        if !self.authorize(user) {
            session.reset();
            return vec![OutboundMessage::text(chat_id, replies::NOT_AUTHORIZED)];
        }
        let SessionState::Admin(state) = session.state.clone() else {
            return vec![OutboundMessage::text(chat_id, replies::USE_ADMIN_BUTTONS)];
        };

        match state {
            AdminState::AwaitRate { platform } => {
                self.submit_rate(user, chat_id, platform, text, session).await
            }
            AdminState::AwaitItem => self.submit_item(user, chat_id, text, session).await,
            AdminState::Menu | AdminState::ChoosePlatform | AdminState::Catalog => {
                vec![OutboundMessage::text(chat_id, replies::USE_ADMIN_BUTTONS)]
            }
        }
    }

    async fn submit_rate(
        &self,
        user: &UserRef,
        chat_id: i64,
        platform: Platform,
        text: &str,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        let rate: Rate = match text.parse() {
            Ok(rate) => rate,
            Err(e) => {
                return vec![OutboundMessage::text(
                    chat_id,
                    format!(
                        "Invalid rate ({}). Send a positive number with up to two decimals, e.g. 150 or 99.50.",
                        e
                    ),
                )];
            }
        };

        session.state = SessionState::Admin(AdminState::Menu);
        let text = match self.prices.set_rate(platform, rate).await {
            Ok(()) => {
                info!(user_id = user.id, %platform, %rate, "rate changed by admin");
                format!("Rate for {} set to {} per 1,000,000 coins.", platform, rate)
            }
            Err(e) => {
                warn!(user_id = user.id, %platform, error = %e, "saving rate failed");
                format!(
                    "Could not save the rate: {}. The previous rate is still in effect.",
                    e
                )
            }
        };
        vec![replies::admin_menu(chat_id, &text)]
    }

    async fn submit_item(
        &self,
        user: &UserRef,
        chat_id: i64,
        text: &str,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        let item = match parse_item(text) {
            Ok(item) => item,
            Err(e) => {
                return vec![OutboundMessage::text(
                    chat_id,
                    format!("{}\n\n{}", e, replies::ADD_ITEM_PROMPT),
                )];
            }
        };

        session.state = SessionState::Admin(AdminState::Catalog);
        let note = match self.catalog.upsert_item(item.clone()).await {
            Ok(()) => {
                info!(user_id = user.id, id = %item.id, "catalog item saved by admin");
                format!("Saved {}.", item.label())
            }
            Err(e) => {
                warn!(user_id = user.id, id = %item.id, error = %e, "saving catalog item failed");
                format!("Could not save the item: {}", e)
            }
        };
        vec![self.catalog_view(chat_id, Some(note)).await]
    }

    async fn catalog_view(&self, chat_id: i64, note: Option<String>) -> OutboundMessage {
        let items = self.catalog.items().await;
        let mut text = replies::catalog_text(&items);
        if let Some(note) = note {
            text = format!("{}\n\n{}", note, text);
        }
        OutboundMessage::text(chat_id, text).with_keyboard(replies::admin_catalog_keyboard(&items))
    }
}

/// Parse and validate an admin-submitted catalog item.
fn parse_item(text: &str) -> Result<CatalogItem, InputError> {
    let mut item: CatalogItem = serde_json::from_str(text.trim())
        .map_err(|e| InputError::InvalidItem(format!("not a valid item JSON: {}", e)))?;
    item.id = item.id.trim().to_string();
    item.name = item.name.trim().to_string();
    item.validate()?;
    Ok(item)
}
