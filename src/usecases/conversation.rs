//! Conversation engine: the per-user menu state machine.
//!
//! One inbound event in, zero or more replies out. The engine never talks to the
//! transport directly; the caller delivers the returned messages. Order
//! notifications go through the NotificationDispatcher.

use crate::domain::{
    Action, AdminState, CatalogItem, Category, EventKind, InboundEvent, InputError, Order,
    OutboundMessage, Platform, Session, SessionState, UserRef, coin_total, parse_quantity,
};
use crate::ports::{CatalogStorePort, OrderLogPort, PriceStorePort};
use crate::usecases::replies;
use crate::usecases::{AdminPanel, NotificationDispatcher, SessionRegistry};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ConversationEngine {
    sessions: SessionRegistry,
    prices: Arc<dyn PriceStorePort>,
    catalog: Arc<dyn CatalogStorePort>,
    orders: Arc<dyn OrderLogPort>,
    notifier: Arc<NotificationDispatcher>,
    admin: AdminPanel,
}

impl ConversationEngine {
    pub fn new(
        sessions: SessionRegistry,
        prices: Arc<dyn PriceStorePort>,
        catalog: Arc<dyn CatalogStorePort>,
        orders: Arc<dyn OrderLogPort>,
        notifier: Arc<NotificationDispatcher>,
        admin: AdminPanel,
    ) -> Self {
        Self {
            sessions,
            prices,
            catalog,
            orders,
            notifier,
            admin,
        }
    }

    pub async fn handle(&self, event: InboundEvent) -> Vec<OutboundMessage> {
        self.handle_at(event, Utc::now()).await
    }

    /// Process one event as if it arrived at `now`.
    pub async fn handle_at(&self, event: InboundEvent, now: DateTime<Utc>) -> Vec<OutboundMessage> {
        let entry = self.sessions.session(event.user.id, now).await;
        let mut session = entry.lock().await;

        if session.is_expired(now, self.sessions.idle_timeout()) {
            info!(user_id = event.user.id, state = ?session.state, "session expired, reset to idle");
            session.reset();
        }
        session.touch(now);

        let chat_id = event.chat_id;
        match &event.kind {
            EventKind::Text(text) => match event.command() {
                Some(command) => self.on_command(&event.user, chat_id, command, &mut session),
                None => self.on_text(&event.user, chat_id, text, &mut session).await,
            },
            EventKind::Button { data, .. } => match data.parse::<Action>() {
                Ok(action) => {
                    self.on_action(&event.user, chat_id, action, now, &mut session)
                        .await
                }
                Err(InputError::UnknownPlatform(name)) => {
                    self.on_unknown_platform(&event.user, chat_id, &name, &mut session)
                }
                Err(e) => {
                    debug!(user_id = event.user.id, error = %e, "unknown button");
                    self.stale(chat_id, &mut session)
                }
            },
        }
    }

    fn on_command(
        &self,
        user: &UserRef,
        chat_id: i64,
        command: &str,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        match command {
            "start" => {
                session.reset();
                session.state = SessionState::Menu;
                vec![replies::main_menu(chat_id, replies::WELCOME)]
            }
            "cancel" => {
                session.reset();
                session.state = SessionState::Menu;
                vec![
                    OutboundMessage::text(chat_id, replies::CANCELLED),
                    replies::main_menu(chat_id, replies::CHOOSE),
                ]
            }
            "admin" => self.admin.open(user, chat_id, session),
            _ => vec![OutboundMessage::text(chat_id, replies::UNKNOWN_COMMAND)],
        }
    }

    async fn on_text(
        &self,
        user: &UserRef,
        chat_id: i64,
        text: &str,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        match session.state.clone() {
            SessionState::QuantityEntry { platform } => {
                self.on_quantity(user, chat_id, platform, text, session).await
            }
            SessionState::Admin(_) => self.admin.handle_text(user, chat_id, text, session).await,
            _ => vec![OutboundMessage::text(chat_id, replies::USE_BUTTONS)],
        }
    }

    async fn on_quantity(
        &self,
        user: &UserRef,
        chat_id: i64,
        platform: Platform,
        text: &str,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        let quantity = match parse_quantity(text) {
            Ok(q) => q,
            Err(e) => {
                debug!(user_id = user.id, error = %e, "rejected quantity");
                return vec![OutboundMessage::text(chat_id, replies::BAD_QUANTITY)];
            }
        };

        let Some(rate) = self.prices.get_rate(platform).await else {
            warn!(%platform, "no rate configured");
            session.reset();
            return vec![replies::main_menu(chat_id, &replies::no_rate(platform))];
        };
        let Some(total) = coin_total(quantity, rate) else {
            return vec![OutboundMessage::text(chat_id, replies::BAD_QUANTITY)];
        };

        let order = Order::coins(user, platform, quantity, rate, total);
        let summary = replies::coin_summary(&order);
        session.state = SessionState::PriceConfirm { order };
        vec![OutboundMessage::text(chat_id, summary).with_keyboard(replies::confirm_keyboard())]
    }

    async fn on_action(
        &self,
        user: &UserRef,
        chat_id: i64,
        action: Action,
        now: DateTime<Utc>,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        match action {
            Action::Menu => {
                session.reset();
                session.state = SessionState::Menu;
                vec![replies::main_menu(chat_id, replies::CHOOSE)]
            }
            Action::BuyCoins => {
                session.state = SessionState::PlatformSelect;
                vec![
                    OutboundMessage::text(chat_id, replies::CHOOSE_PLATFORM)
                        .with_keyboard(replies::platform_keyboard()),
                ]
            }
            Action::BuyGames => self.browse(chat_id, Category::Game, session).await,
            Action::BuySubscriptions => self.browse(chat_id, Category::Subscription, session).await,
            Action::Platform(platform) => {
                if session.state != SessionState::PlatformSelect {
                    return self.stale(chat_id, session);
                }
                session.state = SessionState::QuantityEntry { platform };
                vec![OutboundMessage::text(chat_id, replies::quantity_prompt(platform))]
            }
            Action::Item(id) => self.choose_item(user, chat_id, &id, session).await,
            Action::Confirm => self.confirm(chat_id, now, session).await,
            Action::Cancel => {
                session.reset();
                vec![
                    OutboundMessage::text(chat_id, replies::CANCELLED),
                    replies::main_menu(chat_id, replies::CHOOSE),
                ]
            }
            Action::Admin(admin_action) => {
                self.admin
                    .handle_action(user, chat_id, admin_action, session)
                    .await
            }
        }
    }

    async fn browse(
        &self,
        chat_id: i64,
        category: Category,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        let items: Vec<CatalogItem> = self
            .catalog
            .items()
            .await
            .into_iter()
            .filter(|item| item.category == category)
            .collect();
        if items.is_empty() {
            session.state = SessionState::Menu;
            return vec![replies::main_menu(chat_id, replies::NOTHING_AVAILABLE)];
        }
        session.state = match category {
            Category::Game => SessionState::GameBrowse,
            Category::Subscription => SessionState::SubscriptionBrowse,
        };
        let title = match category {
            Category::Game => "Games:",
            Category::Subscription => "Subscriptions:",
        };
        vec![OutboundMessage::text(chat_id, title).with_keyboard(replies::catalog_keyboard(&items))]
    }

    async fn choose_item(
        &self,
        user: &UserRef,
        chat_id: i64,
        id: &str,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        let browsing = match session.state {
            SessionState::GameBrowse => Category::Game,
            SessionState::SubscriptionBrowse => Category::Subscription,
            _ => return self.stale(chat_id, session),
        };
        let Some(item) = self
            .catalog
            .item(id)
            .await
            .filter(|item| item.category == browsing)
        else {
            session.state = SessionState::Menu;
            return vec![replies::main_menu(chat_id, replies::ITEM_GONE)];
        };

        let order = Order::catalog(user, &item);
        let summary = replies::item_summary(&order);
        session.state = SessionState::ItemConfirm { order };
        vec![OutboundMessage::text(chat_id, summary).with_keyboard(replies::confirm_keyboard())]
    }

    async fn confirm(
        &self,
        chat_id: i64,
        now: DateTime<Utc>,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        let Some(pending) = session.pending_order() else {
            session.state = SessionState::Menu;
            return vec![replies::main_menu(chat_id, replies::NOTHING_TO_CONFIRM)];
        };

        let order = pending.confirmed(now);
        let stored = match self.orders.append(&order).await {
            Ok(stored) => stored,
            Err(e) => {
                // Keep the pending order so the user can press Confirm again.
                warn!(user_id = order.user_id, error = %e, "order append failed");
                return vec![
                    OutboundMessage::text(chat_id, replies::ORDER_NOT_RECORDED)
                        .with_keyboard(replies::confirm_keyboard()),
                ];
            }
        };

        session.reset();
        self.notifier.notify(&stored).await;
        vec![replies::main_menu(chat_id, &replies::order_accepted(&stored))]
    }

    /// A button from an old message that does not fit the current state.
    /// A platform button naming no known platform. Re-prompts while a platform is being
    /// chosen; anywhere else it is treated as a stale button.
    fn on_unknown_platform(
        &self,
        user: &UserRef,
        chat_id: i64,
        name: &str,
        session: &mut Session,
    ) -> Vec<OutboundMessage> {
        debug!(user_id = user.id, platform = name, state = ?session.state, "unknown platform");
        match session.state {
            SessionState::PlatformSelect => vec![
                OutboundMessage::text(chat_id, replies::CHOOSE_PLATFORM)
                    .with_keyboard(replies::platform_keyboard()),
            ],
            SessionState::Admin(AdminState::ChoosePlatform) => {
                self.admin.reprompt_platform(user, chat_id)
            }
            _ => self.stale(chat_id, session),
        }
    }

    fn stale(&self, chat_id: i64, session: &mut Session) -> Vec<OutboundMessage> {
        session.state = SessionState::Menu;
        vec![replies::main_menu(chat_id, replies::STALE_BUTTON)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::JsonStore;
    use crate::domain::{AdministratorSet, Rate};
    use crate::ports::MessengerPort;
    use crate::usecases::ExportService;
    use crate::usecases::testing::{InMemoryOrderLog, RecordingMessenger};
    use chrono::{Duration, FixedOffset};
    use tempfile::TempDir;

    const ADMIN: i64 = 1000;
    const BUYER: i64 = 456;

    struct Harness {
        _dir: TempDir,
        store: Arc<JsonStore>,
        orders: Arc<InMemoryOrderLog>,
        messenger: Arc<RecordingMessenger>,
        engine: ConversationEngine,
    }

    async fn harness_with(admins: &[i64], failing: &[i64], rate: u64) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(
            dir.path().join("store.json"),
            Rate::from_units(rate).unwrap(),
        ));
        store.load().await;
        let orders = Arc::new(InMemoryOrderLog::default());
        let messenger = Arc::new(RecordingMessenger::failing_for(failing.iter().copied()));
        let admin_set = AdministratorSet::new(admins.iter().copied());

        let messenger_port: Arc<dyn MessengerPort> = messenger.clone();
        let notifier = Arc::new(NotificationDispatcher::new(
            messenger_port,
            admin_set.clone(),
        ));
        let exporter = Arc::new(ExportService::new(
            orders.clone(),
            dir.path().join("exports"),
            FixedOffset::east_opt(3 * 3600).unwrap(),
        ));
        let admin = AdminPanel::new(
            admin_set,
            store.clone(),
            store.clone(),
            orders.clone(),
            exporter,
        );
        let engine = ConversationEngine::new(
            SessionRegistry::new(Duration::minutes(30)),
            store.clone(),
            store.clone(),
            orders.clone(),
            notifier,
            admin,
        );
        Harness {
            _dir: dir,
            store,
            orders,
            messenger,
            engine,
        }
    }

    async fn harness() -> Harness {
        harness_with(&[ADMIN], &[], 100).await
    }

    fn user(id: i64) -> UserRef {
        UserRef {
            id,
            username: Some(format!("user{}", id)),
        }
    }

    async fn text(h: &Harness, id: i64, text: &str) -> Vec<OutboundMessage> {
        h.engine.handle(InboundEvent::text(user(id), id, text)).await
    }

    async fn press(h: &Harness, id: i64, action: Action) -> Vec<OutboundMessage> {
        h.engine
            .handle(InboundEvent::button(user(id), id, action.to_string()))
            .await
    }

    async fn state(h: &Harness, id: i64) -> SessionState {
        let entry = h.engine.sessions.session(id, Utc::now()).await;
        entry.lock().await.state.clone()
    }

    fn last(replies: &[OutboundMessage]) -> &OutboundMessage {
        replies.last().unwrap()
    }

    fn labels(msg: &OutboundMessage) -> Vec<&str> {
        msg.keyboard.as_ref().map(|k| k.labels()).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_coin_purchase_scenario() {
        let h = harness().await;

        let r = text(&h, BUYER, "/start").await;
        assert_eq!(labels(last(&r)), vec!["Coins", "Games", "Subscriptions"]);
        assert_eq!(state(&h, BUYER).await, SessionState::Menu);

        let r = press(&h, BUYER, Action::BuyCoins).await;
        assert_eq!(
            labels(last(&r)),
            vec!["Xbox", "PlayStation", "PC", "Back to menu"]
        );

        let r = press(&h, BUYER, Action::Platform(Platform::Xbox)).await;
        assert!(last(&r).text.contains("how many coins"));
        assert_eq!(
            state(&h, BUYER).await,
            SessionState::QuantityEntry {
                platform: Platform::Xbox
            }
        );

        let r = text(&h, BUYER, "5000000").await;
        assert!(last(&r).text.contains("Total: 500"));
        assert_eq!(labels(last(&r)), vec!["Confirm", "Cancel"]);

        let r = press(&h, BUYER, Action::Confirm).await;
        assert!(last(&r).text.contains("Order #1 accepted"));
        assert_eq!(state(&h, BUYER).await, SessionState::Idle);

        let orders = h.orders.all().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].total, 500);
        assert_eq!(orders[0].quantity, 5_000_000);

        let to_admin = h.messenger.sent_to(ADMIN).await;
        assert_eq!(to_admin.len(), 1);
        assert!(to_admin[0].text.contains("Platform: Xbox"));
        assert!(to_admin[0].text.contains("Quantity: 5000000"));
        assert!(to_admin[0].text.contains("Total: 500"));
    }

    #[tokio::test]
    async fn test_invalid_quantity_keeps_state() {
        let h = harness().await;
        text(&h, BUYER, "/start").await;
        press(&h, BUYER, Action::BuyCoins).await;
        press(&h, BUYER, Action::Platform(Platform::Pc)).await;

        for bad in [
            "abc",
            "-5",
            "0",
            "1.5",
            "99999999999999999999999",
            "10000000000000000000",
        ] {
            let r = text(&h, BUYER, bad).await;
            assert_eq!(last(&r).text, replies::BAD_QUANTITY);
            assert_eq!(
                state(&h, BUYER).await,
                SessionState::QuantityEntry {
                    platform: Platform::Pc
                }
            );
        }
        assert!(h.orders.all().await.unwrap().is_empty());

        let r = text(&h, BUYER, "  1000000 ").await;
        assert!(last(&r).text.contains("Total: 100"));
    }

    #[tokio::test]
    async fn test_unknown_platform_button_reprompts() {
        let h = harness().await;
        text(&h, BUYER, "/start").await;
        press(&h, BUYER, Action::BuyCoins).await;

        let r = h
            .engine
            .handle(InboundEvent::button(user(BUYER), BUYER, "platform:Switch"))
            .await;
        assert_eq!(last(&r).text, replies::CHOOSE_PLATFORM);
        assert_eq!(
            labels(last(&r)),
            vec!["Xbox", "PlayStation", "PC", "Back to menu"]
        );
        assert_eq!(state(&h, BUYER).await, SessionState::PlatformSelect);

        let r = press(&h, BUYER, Action::Platform(Platform::Pc)).await;
        assert!(last(&r).text.contains("how many coins"));

        // outside platform selection the same data is a stale button
        let r = h
            .engine
            .handle(InboundEvent::button(user(BUYER), BUYER, "platform:Switch"))
            .await;
        assert_eq!(last(&r).text, replies::STALE_BUTTON);
        assert_eq!(state(&h, BUYER).await, SessionState::Menu);
    }

    #[tokio::test]
    async fn test_unknown_admin_rate_platform_reprompts() {
        let h = harness().await;
        text(&h, ADMIN, "/admin").await;
        press(&h, ADMIN, Action::Admin(crate::domain::AdminAction::SetRate)).await;

        let r = h
            .engine
            .handle(InboundEvent::button(user(ADMIN), ADMIN, "admin:rate:Switch"))
            .await;
        assert_eq!(last(&r).text, replies::ADMIN_CHOOSE_PLATFORM);
        assert_eq!(
            state(&h, ADMIN).await,
            SessionState::Admin(AdminState::ChoosePlatform)
        );
    }

    #[tokio::test]
    async fn test_totals_round_half_up() {
        let h = harness().await;
        h.store
            .set_rate(Platform::Xbox, "99.99".parse().unwrap())
            .await
            .unwrap();
        press(&h, BUYER, Action::BuyCoins).await;
        press(&h, BUYER, Action::Platform(Platform::Xbox)).await;
        // 1,500,000 * 99.99 / 1,000,000 = 149.985 -> 150
        let r = text(&h, BUYER, "1500000").await;
        assert!(last(&r).text.contains("Total: 150"));
    }

    #[tokio::test]
    async fn test_admin_sets_rate_used_by_new_orders() {
        let h = harness().await;

        let r = text(&h, ADMIN, "/admin").await;
        assert!(labels(last(&r)).contains(&"Set rate"));
        press(&h, ADMIN, Action::Admin(crate::domain::AdminAction::SetRate)).await;
        press(
            &h,
            ADMIN,
            Action::Admin(crate::domain::AdminAction::Rate(Platform::Xbox)),
        )
        .await;

        let r = text(&h, ADMIN, "abc").await;
        assert!(last(&r).text.starts_with("Invalid rate"));
        let r = text(&h, ADMIN, "150").await;
        assert!(last(&r).text.contains("set to 150"));
        assert_eq!(h.store.get_rate(Platform::Xbox).await, Rate::from_units(150));

        // survives a reload of the data file
        let reloaded = JsonStore::new(h.store.path(), Rate::from_units(1).unwrap());
        reloaded.load().await;
        assert_eq!(reloaded.get_rate(Platform::Xbox).await, Rate::from_units(150));

        press(&h, BUYER, Action::BuyCoins).await;
        press(&h, BUYER, Action::Platform(Platform::Xbox)).await;
        let r = text(&h, BUYER, "1000000").await;
        assert!(last(&r).text.contains("Total: 150"));
    }

    #[tokio::test]
    async fn test_non_admin_is_refused() {
        let h = harness().await;

        let r = text(&h, BUYER, "/admin").await;
        assert_eq!(last(&r).text, replies::NOT_AUTHORIZED);
        assert_eq!(state(&h, BUYER).await, SessionState::Idle);

        let r = press(
            &h,
            BUYER,
            Action::Admin(crate::domain::AdminAction::RemoveItem("fc25".into())),
        )
        .await;
        assert_eq!(last(&r).text, replies::NOT_AUTHORIZED);
        assert!(h.store.item("fc25").await.is_some());

        press(
            &h,
            BUYER,
            Action::Admin(crate::domain::AdminAction::Rate(Platform::Xbox)),
        )
        .await;
        assert_eq!(state(&h, BUYER).await, SessionState::Idle);
        assert_eq!(h.store.get_rate(Platform::Xbox).await, Rate::from_units(100));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_affect_buyer() {
        let h = harness_with(&[ADMIN, 2000], &[ADMIN], 100).await;
        press(&h, BUYER, Action::BuyCoins).await;
        press(&h, BUYER, Action::Platform(Platform::PlayStation)).await;
        text(&h, BUYER, "2000000").await;

        let r = press(&h, BUYER, Action::Confirm).await;
        assert!(last(&r).text.contains("accepted"));
        // one attempt per admin, including the failing one
        let attempts = h.messenger.attempted_chats().await;
        assert_eq!(attempts.iter().filter(|&&c| c == ADMIN).count(), 1);
        assert_eq!(attempts.iter().filter(|&&c| c == 2000).count(), 1);
    }

    #[tokio::test]
    async fn test_failed_append_keeps_confirmation_state() {
        let h = harness().await;
        press(&h, BUYER, Action::BuyCoins).await;
        press(&h, BUYER, Action::Platform(Platform::Xbox)).await;
        text(&h, BUYER, "1000000").await;

        h.orders.set_failing(true);
        let r = press(&h, BUYER, Action::Confirm).await;
        assert_eq!(last(&r).text, replies::ORDER_NOT_RECORDED);
        assert!(matches!(
            state(&h, BUYER).await,
            SessionState::PriceConfirm { .. }
        ));
        assert!(h.messenger.sent_to(ADMIN).await.is_empty());

        h.orders.set_failing(false);
        let r = press(&h, BUYER, Action::Confirm).await;
        assert!(last(&r).text.contains("accepted"));
        assert_eq!(h.messenger.sent_to(ADMIN).await.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_purchase_and_cancel() {
        let h = harness().await;

        let r = press(&h, BUYER, Action::BuyGames).await;
        assert_eq!(state(&h, BUYER).await, SessionState::GameBrowse);
        let first = last(&r)
            .keyboard
            .as_ref()
            .unwrap()
            .buttons()
            .next()
            .unwrap()
            .data
            .clone();
        let action: Action = first.parse().unwrap();

        let r = press(&h, BUYER, action).await;
        assert_eq!(labels(last(&r)), vec!["Confirm", "Cancel"]);
        assert!(matches!(
            state(&h, BUYER).await,
            SessionState::ItemConfirm { .. }
        ));

        let r = press(&h, BUYER, Action::Cancel).await;
        assert_eq!(r[0].text, replies::CANCELLED);
        assert_eq!(state(&h, BUYER).await, SessionState::Idle);
        assert!(h.orders.all().await.unwrap().is_empty());

        let r = press(&h, BUYER, Action::Confirm).await;
        assert_eq!(last(&r).text, replies::NOTHING_TO_CONFIRM);
        assert!(h.orders.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_category_returns_to_menu() {
        let h = harness().await;
        for item in h.store.items().await {
            h.store.remove_item(&item.id).await.unwrap();
        }
        let r = press(&h, BUYER, Action::BuySubscriptions).await;
        assert_eq!(last(&r).text, replies::NOTHING_AVAILABLE);
        assert_eq!(state(&h, BUYER).await, SessionState::Menu);
    }

    #[tokio::test]
    async fn test_free_text_outside_entry_states_gets_hint() {
        let h = harness().await;
        text(&h, BUYER, "/start").await;
        let r = text(&h, BUYER, "hello").await;
        assert_eq!(last(&r).text, replies::USE_BUTTONS);
        assert_eq!(state(&h, BUYER).await, SessionState::Menu);
    }

    #[tokio::test]
    async fn test_idle_session_is_reset() {
        let h = harness().await;
        let start = Utc::now();
        h.engine
            .handle_at(
                InboundEvent::button(user(BUYER), BUYER, Action::BuyCoins.to_string()),
                start,
            )
            .await;
        h.engine
            .handle_at(
                InboundEvent::button(
                    user(BUYER),
                    BUYER,
                    Action::Platform(Platform::Xbox).to_string(),
                ),
                start,
            )
            .await;

        // An hour later the quantity is no longer expected.
        let r = h
            .engine
            .handle_at(
                InboundEvent::text(user(BUYER), BUYER, "1000000"),
                start + Duration::hours(1),
            )
            .await;
        assert_eq!(last(&r).text, replies::USE_BUTTONS);
        assert!(h.orders.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_adds_and_removes_item() {
        let h = harness().await;
        text(&h, ADMIN, "/admin").await;
        press(&h, ADMIN, Action::Admin(crate::domain::AdminAction::Catalog)).await;
        press(&h, ADMIN, Action::Admin(crate::domain::AdminAction::AddItem)).await;

        let r = text(&h, ADMIN, r#"{"id": "x", "name": "X", "price": 0}"#).await;
        assert!(last(&r).text.contains("Send the item as JSON"));
        assert!(h.store.item("x").await.is_none());

        let r = text(
            &h,
            ADMIN,
            r#"{"id": "elden", "name": "Elden Ring", "category": "game", "price": 3999}"#,
        )
        .await;
        assert!(last(&r).text.starts_with("Saved Elden Ring"));
        assert_eq!(h.store.item("elden").await.unwrap().price, 3999);

        let r = press(
            &h,
            ADMIN,
            Action::Admin(crate::domain::AdminAction::RemoveItem("elden".into())),
        )
        .await;
        assert!(last(&r).text.starts_with("Removed item elden"));
        assert!(h.store.item("elden").await.is_none());
    }

    #[tokio::test]
    async fn test_admin_export_and_recent_orders() {
        let h = harness().await;
        press(&h, BUYER, Action::BuyCoins).await;
        press(&h, BUYER, Action::Platform(Platform::Xbox)).await;
        text(&h, BUYER, "1000000").await;
        press(&h, BUYER, Action::Confirm).await;

        text(&h, ADMIN, "/admin").await;
        let r = press(&h, ADMIN, Action::Admin(crate::domain::AdminAction::Export)).await;
        assert!(last(&r).text.starts_with("Exported 1 orders to"));

        let r = press(&h, ADMIN, Action::Admin(crate::domain::AdminAction::Orders)).await;
        assert!(last(&r).text.contains("#1"));

        let r = press(&h, ADMIN, Action::Admin(crate::domain::AdminAction::Back)).await;
        assert_eq!(labels(last(&r)), vec!["Coins", "Games", "Subscriptions"]);
        assert_eq!(state(&h, ADMIN).await, SessionState::Menu);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let h = harness().await;
        press(&h, BUYER, Action::BuyCoins).await;
        press(&h, BUYER, Action::Platform(Platform::Xbox)).await;
        text(&h, 789, "/start").await;
        assert_eq!(state(&h, 789).await, SessionState::Menu);
        assert_eq!(
            state(&h, BUYER).await,
            SessionState::QuantityEntry {
                platform: Platform::Xbox
            }
        );
    }
}
