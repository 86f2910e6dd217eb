//! Domain entities. Pure data structures for the storefront.
//!
//! No Telegram/IO types here; adapters map Bot API payloads into these.

use crate::domain::errors::InputError;
use crate::domain::pricing::MAX_AMOUNT;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Gaming platform a coin order or catalog item is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Xbox,
    PlayStation,
    #[serde(rename = "PC")]
    Pc,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Xbox, Platform::PlayStation, Platform::Pc];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Xbox => "Xbox",
            Platform::PlayStation => "PlayStation",
            Platform::Pc => "PC",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xbox" => Ok(Platform::Xbox),
            "playstation" | "ps" => Ok(Platform::PlayStation),
            "pc" => Ok(Platform::Pc),
            _ => Err(InputError::UnknownPlatform(s.to_string())),
        }
    }
}

/// Price of 1,000,000 coins in whole currency units, with two decimal places.
///
/// Stored as hundredths so totals can be rounded exactly. Always positive and at most
/// [`Rate::MAX_HUNDREDTHS`], which keeps every rate exact as a JSON number.
/// Serialized as a plain JSON number (e.g. `100` or `99.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate {
    hundredths: u64,
}

impl Rate {
    /// 10000 per 1,000,000 coins, used when nothing is configured.
    pub const DEFAULT: Rate = Rate {
        hundredths: 1_000_000,
    };

    /// 10^15 hundredths. Below 2^51, so a fractional rate survives an `f64` round trip.
    pub const MAX_HUNDREDTHS: u64 = 1_000_000_000_000_000;

    /// Returns `None` for zero or above [`Rate::MAX_HUNDREDTHS`].
    pub fn from_hundredths(hundredths: u64) -> Option<Self> {
        (1..=Self::MAX_HUNDREDTHS)
            .contains(&hundredths)
            .then_some(Self { hundredths })
    }

    /// Whole currency units. Returns `None` for zero or when out of range.
    pub fn from_units(units: u64) -> Option<Self> {
        units.checked_mul(100).and_then(Self::from_hundredths)
    }

    pub fn hundredths(self) -> u64 {
        self.hundredths
    }

    fn checked(hundredths: u64) -> Result<Self, InputError> {
        if hundredths == 0 {
            return Err(InputError::NotPositive);
        }
        Self::from_hundredths(hundredths).ok_or(InputError::TooLarge)
    }
}

impl TryFrom<f64> for Rate {
    type Error = InputError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(InputError::NotANumber);
        }
        let scaled = (value * 100.0).round();
        if scaled < 1.0 {
            return Err(InputError::NotPositive);
        }
        if scaled > Self::MAX_HUNDREDTHS as f64 {
            return Err(InputError::TooLarge);
        }
        Self::checked(scaled as u64)
    }
}

impl From<Rate> for f64 {
    fn from(rate: Rate) -> Self {
        rate.hundredths as f64 / 100.0
    }
}

/// Whole rates are written as JSON integers; others as the nearest `f64`.
impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.hundredths % 100 == 0 {
            serializer.serialize_u64(self.hundredths / 100)
        } else {
            serializer.serialize_f64(f64::from(*self))
        }
    }
}

/// Accepts integers exactly, floats rounded to hundredths, and decimal strings.
impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RateVisitor;

        impl<'de> de::Visitor<'de> for RateVisitor {
            type Value = Rate;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a positive rate with at most two decimal places")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Rate, E> {
                v.checked_mul(100)
                    .ok_or(InputError::TooLarge)
                    .and_then(Rate::checked)
                    .map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Rate, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::custom(InputError::NotPositive)),
                }
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Rate, E> {
                Rate::try_from(v).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Rate, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(RateVisitor)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.hundredths / 100;
        let cents = self.hundredths % 100;
        if cents == 0 {
            write!(f, "{}", units)
        } else {
            write!(f, "{}.{:02}", units, cents)
        }
    }
}

/// Parses admin input such as `150`, `99.5` or `99,50`.
impl FromStr for Rate {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(',', ".");
        let (int_part, frac_part) = match normalized.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (normalized.as_str(), None),
        };
        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) {
            return Err(InputError::NotANumber);
        }
        let frac_hundredths = match frac_part {
            None => 0,
            Some(f) if !all_digits(f) => return Err(InputError::NotANumber),
            Some(f) if f.len() > 2 => return Err(InputError::TooManyDecimals),
            Some(f) if f.len() == 1 => f.parse::<u64>().map_err(|_| InputError::NotANumber)? * 10,
            Some(f) => f.parse::<u64>().map_err(|_| InputError::NotANumber)?,
        };
        let units: u64 = int_part.parse().map_err(|_| InputError::TooLarge)?;
        let hundredths = units
            .checked_mul(100)
            .and_then(|h| h.checked_add(frac_hundredths))
            .ok_or(InputError::TooLarge)?;
        Rate::checked(hundredths)
    }
}

/// Current rate for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceEntry {
    pub platform: Platform,
    pub rate: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Game,
    Subscription,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Game => f.write_str("game"),
            Category::Subscription => f.write_str("subscription"),
        }
    }
}

/// A game or subscription offered outside the coin-rate mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Short key used in button callback data.
    pub id: String,
    pub name: String,
    pub category: Category,
    /// Whole currency units.
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

/// Telegram limits callback data to 64 bytes; `item:` and `admin:remove:` prefixes eat into that.
pub const MAX_ITEM_ID_LEN: usize = 40;

impl CatalogItem {
    /// Checks the invariants an item must satisfy before it is stored.
    pub fn validate(&self) -> Result<(), InputError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(InputError::InvalidItem("id must not be empty".into()));
        }
        if id.len() > MAX_ITEM_ID_LEN || id.contains(char::is_whitespace) {
            return Err(InputError::InvalidItem(format!(
                "id must be at most {} characters without spaces",
                MAX_ITEM_ID_LEN
            )));
        }
        if self.name.trim().is_empty() {
            return Err(InputError::InvalidItem("name must not be empty".into()));
        }
        if self.price == 0 {
            return Err(InputError::InvalidItem("price must be greater than zero".into()));
        }
        if self.price > MAX_AMOUNT {
            return Err(InputError::InvalidItem("price is too large".into()));
        }
        Ok(())
    }

    /// Button/list label, e.g. `EA FC 25 (PlayStation) - 4999`.
    pub fn label(&self) -> String {
        match self.platform {
            Some(p) => format!("{} ({}) - {}", self.name, p, self.price),
            None => format!("{} - {}", self.name, self.price),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Coins,
    Game,
    Subscription,
}

impl OrderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::Coins => "coins",
            OrderKind::Game => "game",
            OrderKind::Subscription => "subscription",
        }
    }
}

impl From<Category> for OrderKind {
    fn from(category: Category) -> Self {
        match category {
            Category::Game => OrderKind::Game,
            Category::Subscription => OrderKind::Subscription,
        }
    }
}

impl FromStr for OrderKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coins" => Ok(OrderKind::Coins),
            "game" => Ok(OrderKind::Game),
            "subscription" => Ok(OrderKind::Subscription),
            other => Err(InputError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            other => Err(InputError::UnknownAction(other.to_string())),
        }
    }
}

/// An order. Built as `Pending` at the confirmation step and held in the session;
/// once confirmed it is appended to the order log and gets an `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<i64>,
    pub user_id: i64,
    pub username: Option<String>,
    pub kind: OrderKind,
    /// Human-readable description, e.g. `5000000 coins` or a catalog item name.
    pub item: String,
    pub platform: Option<Platform>,
    pub quantity: u64,
    /// Rate used for coin orders.
    pub rate: Option<Rate>,
    /// Whole currency units.
    pub total: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Pending coin order.
    pub fn coins(user: &UserRef, platform: Platform, quantity: u64, rate: Rate, total: u64) -> Self {
        Self {
            id: None,
            user_id: user.id,
            username: user.username.clone(),
            kind: OrderKind::Coins,
            item: format!("{} coins", quantity),
            platform: Some(platform),
            quantity,
            rate: Some(rate),
            total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Pending order for a single catalog item.
    pub fn catalog(user: &UserRef, item: &CatalogItem) -> Self {
        Self {
            id: None,
            user_id: user.id,
            username: user.username.clone(),
            kind: item.category.into(),
            item: item.name.clone(),
            platform: item.platform,
            quantity: 1,
            rate: None,
            total: item.price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Copy of this order marked confirmed at `at`.
    pub fn confirmed(&self, at: DateTime<Utc>) -> Self {
        Self {
            status: OrderStatus::Confirmed,
            created_at: at,
            ..self.clone()
        }
    }
}

/// The sender of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub username: Option<String>,
}

/// Fixed set of privileged user ids, loaded once from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdministratorSet {
    ids: BTreeSet<i64>,
}

impl AdministratorSet {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_parse_whole_and_decimal() {
        assert_eq!("150".parse::<Rate>().unwrap().hundredths(), 15_000);
        assert_eq!("99.5".parse::<Rate>().unwrap().hundredths(), 9_950);
        assert_eq!(" 99,05 ".parse::<Rate>().unwrap().hundredths(), 9_905);
    }

    #[test]
    fn test_rate_parse_rejects_bad_input() {
        assert_eq!("abc".parse::<Rate>(), Err(InputError::NotANumber));
        assert_eq!("-5".parse::<Rate>(), Err(InputError::NotANumber));
        assert_eq!("0".parse::<Rate>(), Err(InputError::NotPositive));
        assert_eq!("0.00".parse::<Rate>(), Err(InputError::NotPositive));
        assert_eq!("1.234".parse::<Rate>(), Err(InputError::TooManyDecimals));
        assert_eq!("1.".parse::<Rate>(), Err(InputError::NotANumber));
        assert_eq!("".parse::<Rate>(), Err(InputError::NotANumber));
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::from_units(100).unwrap().to_string(), "100");
        assert_eq!(Rate::from_hundredths(9_950).unwrap().to_string(), "99.50");
    }

    #[test]
    fn test_rate_json_roundtrip_as_number() {
        let rate = Rate::from_hundredths(12_345).unwrap();
        let json = serde_json::to_string(&rate).unwrap();
        assert_eq!(json, "123.45");
        let back: Rate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rate);
        assert!(serde_json::from_str::<Rate>("0").is_err());
        assert!(serde_json::from_str::<Rate>("-3").is_err());

        let whole = Rate::from_units(150).unwrap();
        assert_eq!(serde_json::to_string(&whole).unwrap(), "150");
        assert_eq!(serde_json::from_str::<Rate>("150").unwrap(), whole);
        assert_eq!(serde_json::from_str::<Rate>("\"99,50\"").unwrap().hundredths(), 9_950);
    }

    #[test]
    fn test_rate_json_is_exact_at_the_upper_bound() {
        for hundredths in [
            Rate::MAX_HUNDREDTHS,
            Rate::MAX_HUNDREDTHS - 1,
            Rate::MAX_HUNDREDTHS - 99,
            987_654_321_012_345,
        ] {
            let rate = Rate::from_hundredths(hundredths).unwrap();
            let json = serde_json::to_string(&rate).unwrap();
            let back: Rate = serde_json::from_str(&json).unwrap();
            assert_eq!(back, rate, "hundredths {}", hundredths);
        }
        assert_eq!(Rate::from_hundredths(Rate::MAX_HUNDREDTHS + 1), None);
        assert_eq!(
            "10000000000000.01".parse::<Rate>(),
            Err(InputError::TooLarge)
        );
        assert!(serde_json::from_str::<Rate>("10000000000001").is_err());
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("xbox".parse::<Platform>().unwrap(), Platform::Xbox);
        assert_eq!("PC".parse::<Platform>().unwrap(), Platform::Pc);
        assert!("Switch".parse::<Platform>().is_err());
        assert_eq!(serde_json::to_string(&Platform::Pc).unwrap(), "\"PC\"");
    }

    #[test]
    fn test_catalog_item_validate() {
        let mut item = CatalogItem {
            id: "gp-ultimate-1m".into(),
            name: "Game Pass Ultimate, 1 month".into(),
            category: Category::Subscription,
            price: 1500,
            platform: Some(Platform::Xbox),
        };
        assert!(item.validate().is_ok());
        item.price = 0;
        assert!(item.validate().is_err());
        item.price = MAX_AMOUNT + 1;
        assert!(item.validate().is_err());
        item.price = 10;
        item.id = "has space".into();
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_administrator_set() {
        let admins = AdministratorSet::new([1, 2, 2]);
        assert_eq!(admins.len(), 2);
        assert!(admins.is_admin(1));
        assert!(!admins.is_admin(3));
    }
}
