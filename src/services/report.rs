// src/services/report.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::{
        dashboard::{InventoryPage, ReportSummary},
        product::Product,
    },
};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
pub const DEFAULT_TOP_PRICED_LIMIT: usize = 5;
const UNKNOWN_COLLECTION: &str = "Unknown";

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Soma os termos, falhando com `MetricOverflow` quando um termo ou o total
/// acumulado sai da faixa do `Decimal`.
fn checked_sum<I>(metric: &'static str, terms: I) -> Result<Decimal, AppError>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    terms
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, term| term.and_then(|t| acc.checked_add(t)))
        .ok_or(AppError::MetricOverflow(metric))
}

fn mean(sum: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    money(sum / Decimal::from(count))
}

// ---
// MÉTRICAS sobre a tabela carregada. Números ausentes contam como zero.
// ---

pub fn total_inventory(products: &[Product]) -> i64 {
    products.iter().map(Product::inventory_or_zero).sum()
}

pub fn average_price(products: &[Product]) -> Result<Decimal, AppError> {
    let sum = checked_sum("average_price", products.iter().map(|p| Some(p.price)))?;
    Ok(mean(sum, products.len()))
}

pub fn visible_count(products: &[Product]) -> usize {
    products.iter().filter(|p| p.is_visible()).count()
}

pub fn products_per_collection(products: &[Product]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for p in products {
        let collection = p.collection.as_deref().unwrap_or(UNKNOWN_COLLECTION);
        *counts.entry(collection.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Soma de `inventory x cost`.
pub fn total_stock_value(products: &[Product]) -> Result<Decimal, AppError> {
    let sum = checked_sum(
        "total_stock_value",
        products
            .iter()
            .map(|p| Decimal::from(p.inventory_or_zero()).checked_mul(p.cost_or_zero())),
    )?;
    Ok(money(sum))
}

pub fn low_stock(products: &[Product], threshold: i64) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.inventory_or_zero() < threshold)
        .cloned()
        .collect()
}

pub fn discounted(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.discount_or_zero() > Decimal::ZERO)
        .cloned()
        .collect()
}

/// Mais caros primeiro; empates mantêm a ordem da tabela.
pub fn top_priced(products: &[Product], limit: usize) -> Vec<Product> {
    let mut sorted = products.to_vec();
    sorted.sort_by(|a, b| b.price.cmp(&a.price));
    sorted.truncate(limit);
    sorted
}

pub fn out_of_stock(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.inventory_or_zero() == 0)
        .cloned()
        .collect()
}

pub fn below_reorder_point(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.inventory_or_zero() < p.reorder_point_or_zero())
        .cloned()
        .collect()
}

/// Soma de `max(0, price - cost) x inventory`.
pub fn potential_profit(products: &[Product]) -> Result<Decimal, AppError> {
    let sum = checked_sum(
        "potential_profit",
        products.iter().map(|p| {
            p.margin()?
                .max(Decimal::ZERO)
                .checked_mul(Decimal::from(p.inventory_or_zero()))
        }),
    )?;
    Ok(money(sum))
}

pub fn non_profitable(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.price <= p.cost_or_zero())
        .cloned()
        .collect()
}

pub fn average_profit_per_product(products: &[Product]) -> Result<Decimal, AppError> {
    let sum = checked_sum("average_profit_per_product", products.iter().map(Product::margin))?;
    Ok(mean(sum, products.len()))
}

/// Aceita RFC 3339, `YYYY-MM-DD[ T]HH:MM:SS`, `YYYY-MM-DD` e `MM/DD/YYYY`.
/// Datas sem fuso são lidas como UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// `agora - days`. Intervalos que o chrono não representa viram `InvalidDate`.
pub fn days_ago(days: i64) -> Result<DateTime<Utc>, AppError> {
    TimeDelta::try_days(days)
        .and_then(|span| Utc::now().checked_sub_signed(span))
        .ok_or_else(|| AppError::InvalidDate(format!("{days} days ago")))
}

/// Linhas cujo `quantity_as_of_date` é estritamente anterior a `cutoff`.
/// Linhas sem data legível ficam de fora.
pub fn stale_stock(products: &[Product], cutoff: DateTime<Utc>) -> Vec<Product> {
    products
        .iter()
        .filter(|p| {
            p.quantity_as_of_date
                .as_deref()
                .and_then(parse_date)
                .is_some_and(|as_of| as_of < cutoff)
        })
        .cloned()
        .collect()
}

pub fn summarize(products: &[Product]) -> Result<ReportSummary, AppError> {
    Ok(ReportSummary {
        product_count: products.len(),
        total_inventory: total_inventory(products),
        average_price: average_price(products)?,
        visible_products: visible_count(products),
        total_stock_value: total_stock_value(products)?,
        discounted_products: discounted(products).len(),
        below_reorder_point: below_reorder_point(products).len(),
        out_of_stock: out_of_stock(products).len(),
        potential_profit: potential_profit(products)?,
        average_profit_per_product: average_profit_per_product(products)?,
        non_profitable_products: non_profitable(products).len(),
        products_per_collection: products_per_collection(products),
    })
}

// ---
// SERVIÇO: cada chamada recarrega a tabela, nada fica em cache.
// ---

#[derive(Clone)]
pub struct ReportService {
    product_repo: ProductRepository,
}

impl ReportService {
    pub fn new(product_repo: ProductRepository) -> Self {
        Self { product_repo }
    }

    pub async fn products(&self) -> Result<Vec<Product>, AppError> {
        self.product_repo.find_all().await
    }

    pub async fn total_inventory(&self) -> Result<i64, AppError> {
        Ok(total_inventory(&self.products().await?))
    }

    pub async fn average_price(&self) -> Result<Decimal, AppError> {
        average_price(&self.products().await?)
    }

    pub async fn visible_count(&self) -> Result<usize, AppError> {
        Ok(visible_count(&self.products().await?))
    }

    pub async fn products_per_collection(&self) -> Result<BTreeMap<String, usize>, AppError> {
        Ok(products_per_collection(&self.products().await?))
    }

    pub async fn total_stock_value(&self) -> Result<Decimal, AppError> {
        total_stock_value(&self.products().await?)
    }

    pub async fn low_stock(&self, threshold: i64) -> Result<Vec<Product>, AppError> {
        Ok(low_stock(&self.products().await?, threshold))
    }

    pub async fn discounted(&self) -> Result<Vec<Product>, AppError> {
        Ok(discounted(&self.products().await?))
    }

    pub async fn top_priced(&self, limit: usize) -> Result<Vec<Product>, AppError> {
        Ok(top_priced(&self.products().await?, limit))
    }

    pub async fn out_of_stock(&self) -> Result<Vec<Product>, AppError> {
        Ok(out_of_stock(&self.products().await?))
    }

    pub async fn below_reorder_point(&self) -> Result<Vec<Product>, AppError> {
        Ok(below_reorder_point(&self.products().await?))
    }

    pub async fn potential_profit(&self) -> Result<Decimal, AppError> {
        potential_profit(&self.products().await?)
    }

    pub async fn non_profitable(&self) -> Result<Vec<Product>, AppError> {
        Ok(non_profitable(&self.products().await?))
    }

    pub async fn average_profit_per_product(&self) -> Result<Decimal, AppError> {
        average_profit_per_product(&self.products().await?)
    }

    pub async fn stale_stock(&self, cutoff: DateTime<Utc>) -> Result<Vec<Product>, AppError> {
        Ok(stale_stock(&self.products().await?, cutoff))
    }

    /// Todas as métricas escalares a partir de uma única carga.
    pub async fn summary(&self) -> Result<ReportSummary, AppError> {
        summarize(&self.products().await?)
    }

    pub async fn inventory_page(&self) -> Result<InventoryPage, AppError> {
        let products = self.products().await?;
        Ok(InventoryPage {
            below_reorder_point: below_reorder_point(&products),
            out_of_stock: out_of_stock(&products),
            products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product(handle: &str, price: &str, cost: Option<&str>, inventory: Option<i32>) -> Product {
        Product {
            handle_id: handle.to_string(),
            name: handle.to_string(),
            price: dec(price),
            cost: cost.map(dec),
            inventory,
            visible: 1,
            ..Default::default()
        }
    }

    #[test]
    fn potential_profit_ignores_losses() {
        let products = vec![
            product("a", "10", Some("12"), Some(3)),
            product("b", "20", Some("5"), Some(2)),
        ];
        assert_eq!(potential_profit(&products).unwrap(), dec("30"));
    }

    #[test]
    fn total_inventory_is_the_sum_of_rows() {
        let products = vec![
            product("a", "1", None, Some(4)),
            product("b", "1", None, None),
            product("c", "1", None, Some(11)),
        ];
        let expected: i64 = products.iter().map(|p| i64::from(p.inventory.unwrap_or(0))).sum();
        assert_eq!(total_inventory(&products), expected);
        assert_eq!(total_inventory(&[]), 0);
    }

    #[test]
    fn averages_are_rounded_and_safe_on_empty_tables() {
        let products = vec![
            product("a", "10", Some("4"), Some(1)),
            product("b", "5.01", Some("6"), Some(1)),
            product("c", "1", None, Some(1)),
        ];
        assert_eq!(average_price(&products).unwrap(), dec("5.34"));
        // (6 - 0.99 + 1) / 3 = 2.0033..
        assert_eq!(average_profit_per_product(&products).unwrap(), dec("2.00"));
        assert_eq!(average_price(&[]).unwrap(), Decimal::ZERO);
        assert_eq!(average_profit_per_product(&[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn stock_value_multiplies_inventory_by_cost() {
        let products = vec![
            product("a", "10", Some("2.5"), Some(4)),
            product("b", "10", None, Some(100)),
        ];
        assert_eq!(total_stock_value(&products).unwrap(), dec("10.00"));
    }

    #[test]
    fn filters_pick_the_right_rows() {
        let mut discounted_item = product("d", "9", Some("1"), Some(0));
        discounted_item.discount_value = Some(dec("10"));
        let mut reorder = product("r", "9", Some("1"), Some(2));
        reorder.reorder_point = Some(5);
        reorder.visible = 0;
        let loss = product("l", "3", Some("3"), Some(8));

        let products = vec![discounted_item, reorder, loss];

        let handles = |rows: Vec<Product>| rows.into_iter().map(|p| p.handle_id).collect::<Vec<_>>();
        assert_eq!(handles(discounted(&products)), vec!["d"]);
        assert_eq!(handles(below_reorder_point(&products)), vec!["r"]);
        assert_eq!(handles(out_of_stock(&products)), vec!["d"]);
        assert_eq!(handles(non_profitable(&products)), vec!["l"]);
        assert_eq!(handles(low_stock(&products, DEFAULT_LOW_STOCK_THRESHOLD)), vec!["d", "r"]);
        assert_eq!(visible_count(&products), 2);
    }

    #[test]
    fn top_priced_sorts_descending_and_limits() {
        let products = vec![
            product("cheap", "1", None, None),
            product("mid", "5", None, None),
            product("high", "9", None, None),
        ];
        let top: Vec<String> = top_priced(&products, 2).into_iter().map(|p| p.handle_id).collect();
        assert_eq!(top, vec!["high", "mid"]);
    }

    #[test]
    fn collections_group_missing_as_unknown() {
        let mut a = product("a", "1", None, None);
        a.collection = Some("Coffee".into());
        let b = product("b", "1", None, None);
        let mut c = product("c", "1", None, None);
        c.collection = Some("Coffee".into());

        let counts = products_per_collection(&[a, b, c]);
        assert_eq!(counts.get("Coffee"), Some(&2));
        assert_eq!(counts.get("Unknown"), Some(&1));
    }

    #[test]
    fn stale_stock_uses_strictly_earlier_parsable_dates() {
        let dated = |handle: &str, date: Option<&str>| {
            let mut p = product(handle, "1", None, Some(1));
            p.quantity_as_of_date = date.map(str::to_string);
            p
        };
        let products = vec![
            dated("old", Some("2024-01-15")),
            dated("edge", Some("2024-02-01T00:00:00Z")),
            dated("new", Some("03/10/2024")),
            dated("garbage", Some("last week")),
            dated("none", None),
        ];
        let cutoff = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let stale: Vec<String> = stale_stock(&products, cutoff).into_iter().map(|p| p.handle_id).collect();
        assert_eq!(stale, vec!["old"]);
    }

    #[test]
    fn parse_date_accepts_common_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-03-10"), Some(expected));
        assert_eq!(parse_date("03/10/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-10T00:00:00"), Some(expected));
        assert_eq!(parse_date("2024-03-10T01:00:00+01:00"), Some(expected));
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn summary_matches_individual_metrics() {
        let products = vec![
            product("a", "10", Some("12"), Some(3)),
            product("b", "20", Some("5"), Some(2)),
        ];
        let summary = summarize(&products).unwrap();
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.total_inventory, 5);
        assert_eq!(summary.potential_profit, dec("30"));
        assert_eq!(summary.non_profitable_products, 1);
        assert_eq!(summary.average_price, dec("15"));
    }

    #[test]
    fn days_ago_rejects_unrepresentable_spans() {
        let cutoff = days_ago(90).unwrap();
        let expected = Utc::now() - TimeDelta::days(90);
        assert!((expected - cutoff).num_seconds().abs() < 5);

        assert!(matches!(days_ago(i64::MAX), Err(AppError::InvalidDate(_))));
        assert!(matches!(days_ago(i64::MIN), Err(AppError::InvalidDate(_))));
        // Cabe num TimeDelta mas cai antes do menor DateTime.
        assert!(matches!(days_ago(1_000_000_000), Err(AppError::InvalidDate(_))));
    }

    #[test]
    fn extreme_values_report_overflow_instead_of_panicking() {
        let huge = |handle: &str| {
            let mut p = product(handle, "0", None, Some(2));
            p.price = Decimal::MAX;
            p.cost = Some(Decimal::MIN);
            p
        };
        let products = vec![huge("a"), huge("b")];

        assert!(matches!(average_price(&products), Err(AppError::MetricOverflow("average_price"))));
        assert!(matches!(potential_profit(&products), Err(AppError::MetricOverflow(_))));
        assert!(matches!(average_profit_per_product(&products), Err(AppError::MetricOverflow(_))));
        assert!(matches!(total_stock_value(&products), Err(AppError::MetricOverflow(_))));
        assert!(summarize(&products).is_err());

        // Os filtros continuam funcionando sobre as mesmas linhas.
        assert_eq!(non_profitable(&products).len(), 0);
        assert_eq!(top_priced(&products, 1).len(), 1);
    }
}
