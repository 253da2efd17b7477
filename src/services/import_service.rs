// src/services/import_service.rs

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::{collections::HashMap, io::Read, path::Path, str::FromStr};

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::product::{ImportSummary, NewProduct},
};

/// Linhas por comando INSERT.
pub const IMPORT_BATCH_SIZE: usize = 10;

/// Valor usado quando a linha do export não tem product id.
const UNKNOWN_PRODUCT_ID: &str = "UNKNOWN";

// ---
// BUSCA DE COLUNAS
// ---

/// Nome do cabeçalho -> índice da coluna. Alguns exports têm erros de digitação
/// nos cabeçalhos, então a maioria das buscas aceita uma lista de apelidos.
struct Columns {
    index: HashMap<String, usize>,
    product_id: Option<usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_string(), i))
            .collect();

        // O export do catálogo chama esta coluna de `product_<uuid>`.
        let product_id = index.get("productId").copied().or_else(|| {
            headers
                .iter()
                .position(|h| h.starts_with("product_"))
        });

        Self { index, product_id }
    }
}

struct Row<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Valor cru do primeiro apelido presente no cabeçalho, células vazias incluídas.
    fn raw(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases
            .iter()
            .find_map(|name| self.columns.index.get(*name))
            .and_then(|&i| self.record.get(i))
    }

    /// Texto não vazio ou `None`.
    fn text(&self, aliases: &[&str]) -> Option<String> {
        self.raw(aliases)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn flag(&self, aliases: &[&str], truthy: &str) -> i32 {
        i32::from(self.raw(aliases) == Some(truthy))
    }
}

// ---
// CONVERSÕES
// ---

/// Maior prefixo `[+-]digitos[.digitos]`, como um parse de float tolerante.
fn numeric_prefix(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > end + 1 || end > digits_start {
            end = frac_end;
        }
    }
    &raw[..end]
}

/// `None` para entrada ausente ou malformada.
pub fn parse_decimal(raw: Option<&str>) -> Option<Decimal> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .or_else(|| {
            let prefix = numeric_prefix(raw).trim_end_matches('.');
            Decimal::from_str(prefix).ok()
        })
}

/// Parte inteira do número inicial; a parte fracionária é truncada.
pub fn parse_int(raw: Option<&str>) -> Option<i32> {
    let raw = raw?.trim();
    let prefix = numeric_prefix(raw);
    let whole = prefix.split('.').next().unwrap_or_default();
    whole.parse::<i32>().ok()
}

// ---
// MAPEAMENTO
// ---

fn map_row(row: &Row<'_>, line: u64, company: &str) -> Result<NewProduct, AppError> {
    let handle_id = row.text(&["handleId"]).ok_or_else(|| AppError::InvalidCsvRow {
        line,
        reason: "missing handleId".to_string(),
    })?;

    let product_id = row
        .columns
        .product_id
        .and_then(|i| row.record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_PRODUCT_ID)
        .to_string();

    Ok(NewProduct {
        handle_id,
        product_id,
        field_type: row.raw(&["fieldType"]).unwrap_or_default().to_string(),
        name: row.raw(&["name"]).unwrap_or_default().to_string(),
        description: Some(row.raw(&["description"]).unwrap_or_default().to_string()),
        product_image_url: row.text(&["productImageUrl"]),
        collection: row.text(&["collection"]),
        sku: row.text(&["sku"]),
        ribbon: row.text(&["ribbon"]),
        price: parse_decimal(row.raw(&["price"])).unwrap_or(Decimal::ZERO),
        surcharge: parse_decimal(row.raw(&["surcharge"])),
        visible: row.flag(&["visible"], "true"),
        discount_mode: row.text(&["discountMode"]),
        discount_value: Some(parse_decimal(row.raw(&["discountValue"])).unwrap_or(Decimal::ZERO)),
        inventory: Some(parse_int(row.raw(&["inventory"])).unwrap_or(0)),
        weight: parse_decimal(row.raw(&["weight"])),
        cost: Some(parse_decimal(row.raw(&["cost"])).unwrap_or(Decimal::ZERO)),
        product_type: row.text(&["type"]),
        tax_on_sale: row.text(&["taxOnSale"]),
        price_include_tax: Some(row.flag(&["Price/RateIncludeTax", "priceIncludeTax"], "yes")),
        income_account: row.text(&["incomeAccount"]),
        tax_on_purchase: row.text(&["taxOnPurchase"]),
        purchase_cost_include_tax: Some(
            row.flag(&["purchaseCOstIncludeTax", "purchaseCostIncludeTax"], "yes"),
        ),
        expense_account: row.text(&["xxpenseAccount", "expenseAccount"]),
        reorder_point: Some(parse_int(row.raw(&["reorderPoint"])).unwrap_or(0)),
        quantity_as_of_date: row.text(&["quantityAs-ofDate", "quantityAsOfDate"]),
        associated_company: company.to_string(),
    })
}

/// Lê um export do catálogo (cabeçalho na primeira linha) e marca cada linha com `company`.
pub fn parse_products<R: Read>(reader: R, company: &str) -> Result<Vec<NewProduct>, AppError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::new(csv_reader.headers()?);

    let mut products = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row = Row { columns: &columns, record: &record };
        products.push(map_row(&row, line, company)?);
    }

    Ok(products)
}

pub async fn read_products_csv(path: &Path, company: &str) -> Result<Vec<NewProduct>, AppError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| AppError::ImportFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_products(bytes.as_slice(), company)
}

/// Divide as linhas em lotes de INSERT de no máximo `IMPORT_BATCH_SIZE`, na ordem do arquivo.
pub fn import_batches(products: &[NewProduct]) -> std::slice::Chunks<'_, NewProduct> {
    products.chunks(IMPORT_BATCH_SIZE)
}

// ---
// SERVIÇO
// ---

#[derive(Clone)]
pub struct ImportService {
    pool: PgPool,
    product_repo: ProductRepository,
}

impl ImportService {
    pub fn new(pool: PgPool, product_repo: ProductRepository) -> Self {
        Self { pool, product_repo }
    }

    /// Lê, mapeia e insere um export do catálogo para `company`.
    pub async fn import_csv(&self, path: &Path, company: &str) -> Result<ImportSummary, AppError> {
        let products = read_products_csv(path, company).await?;
        tracing::info!(
            "📦 Parsed {} products from {} for '{}'",
            products.len(),
            path.display(),
            company
        );
        self.insert_products(&products, company).await
    }

    /// Insere em lotes de `IMPORT_BATCH_SIZE`, tudo numa única transação:
    /// ou todas as linhas entram ou nenhuma entra.
    pub async fn insert_products(
        &self,
        products: &[NewProduct],
        company: &str,
    ) -> Result<ImportSummary, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut rows_inserted = 0;
        let mut batches = 0;
        for (i, batch) in import_batches(products).enumerate() {
            // Descartar `tx` no caminho de erro desfaz tudo.
            let written = self
                .product_repo
                .insert_batch(&mut *tx, batch)
                .await
                .inspect_err(|e| tracing::error!("🔥 Import batch {} failed, rolling back: {}", i + 1, e))?;
            rows_inserted += written as usize;
            batches += 1;
        }

        tx.commit().await?;
        tracing::info!("✅ {} products inserted for '{}' in {} batches", rows_inserted, company, batches);

        Ok(ImportSummary { company: company.to_string(), rows_inserted, batches })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    const HEADER: &str = "handleId,fieldType,name,description,product_1cc4562a-88ec-2eef-f3f5-d92ce751eac7,collection,price,surcharge,visible,discountValue,inventory,weight,cost,type,Price/RateIncludeTax,purchaseCOstIncludeTax,xxpenseAccount,reorderPoint,quantityAs-ofDate";

    fn parse(body: &str) -> Result<Vec<NewProduct>, AppError> {
        let csv = format!("{HEADER}\n{body}");
        parse_products(csv.as_bytes(), "A&Co")
    }

    #[test]
    fn maps_a_full_row() {
        let products = parse(
            "p1,Product,Beans,\"Dark, oily\", abc-1 ,Coffee,12.50,1.5,true,2,7,0.25,8.10,physical,yes,no,Supplies,5,2024-03-01\n",
        )
        .unwrap();

        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.handle_id, "p1");
        assert_eq!(p.product_id, "abc-1");
        assert_eq!(p.description.as_deref(), Some("Dark, oily"));
        assert_eq!(p.price, dec("12.50"));
        assert_eq!(p.surcharge, Some(dec("1.5")));
        assert_eq!(p.visible, 1);
        assert_eq!(p.inventory, Some(7));
        assert_eq!(p.cost, Some(dec("8.10")));
        assert_eq!(p.product_type.as_deref(), Some("physical"));
        assert_eq!(p.price_include_tax, Some(1));
        assert_eq!(p.purchase_cost_include_tax, Some(0));
        assert_eq!(p.expense_account.as_deref(), Some("Supplies"));
        assert_eq!(p.reorder_point, Some(5));
        assert_eq!(p.quantity_as_of_date.as_deref(), Some("2024-03-01"));
        assert_eq!(p.associated_company, "A&Co");
    }

    #[test]
    fn visible_is_one_only_for_literal_true() {
        let products = parse(
            "a,,x,,,,1,,true,,,,,,,,,,\nb,,y,,,,1,,TRUE,,,,,,,,,,\nc,,z,,,,1,,yes,,,,,,,,,,\nd,,w,,,,1,,,,,,,,,,,,\n",
        )
        .unwrap();
        let visible: Vec<i32> = products.iter().map(|p| p.visible).collect();
        assert_eq!(visible, vec![1, 0, 0, 0]);
    }

    #[test]
    fn missing_numbers_default_and_optional_ones_stay_null() {
        let products = parse("p1,,Name,,,,,,false,,,,,,,,,,\n").unwrap();
        let p = &products[0];
        assert_eq!(p.price, Decimal::ZERO);
        assert_eq!(p.cost, Some(Decimal::ZERO));
        assert_eq!(p.discount_value, Some(Decimal::ZERO));
        assert_eq!(p.inventory, Some(0));
        assert_eq!(p.reorder_point, Some(0));
        assert_eq!(p.surcharge, None);
        assert_eq!(p.weight, None);
        assert_eq!(p.product_id, UNKNOWN_PRODUCT_ID);
        assert_eq!(p.description.as_deref(), Some(""));
    }

    #[test]
    fn malformed_numbers_are_normalized_not_rejected() {
        let products = parse("p1,,Name,,,,12abc,n/a,false,,3.9,heavy,x,,,,,two,\n").unwrap();
        let p = &products[0];
        assert_eq!(p.price, dec("12"));
        assert_eq!(p.surcharge, None);
        assert_eq!(p.inventory, Some(3));
        assert_eq!(p.weight, None);
        assert_eq!(p.cost, Some(Decimal::ZERO));
        assert_eq!(p.reorder_point, Some(0));
    }

    #[test]
    fn row_without_handle_is_rejected_with_its_line() {
        let err = parse("p1,,Ok,,,,1,,true,,,,,,,,,,\n,,Broken,,,,1,,true,,,,,,,,,,\n").unwrap_err();
        assert!(matches!(err, AppError::InvalidCsvRow { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let err = parse("p1,too,few\n").unwrap_err();
        assert!(matches!(err, AppError::CsvError(_)));
    }

    #[test]
    fn corrected_header_spellings_are_accepted() {
        let csv = "handleId,productId,name,price,purchaseCostIncludeTax,expenseAccount,quantityAsOfDate\nh,pid,N,3,yes,Ops,2023-12-31\n";
        let products = parse_products(csv.as_bytes(), "B").unwrap();
        let p = &products[0];
        assert_eq!(p.product_id, "pid");
        assert_eq!(p.purchase_cost_include_tax, Some(1));
        assert_eq!(p.expense_account.as_deref(), Some("Ops"));
        assert_eq!(p.quantity_as_of_date.as_deref(), Some("2023-12-31"));
        assert_eq!(p.associated_company, "B");
    }

    #[test]
    fn lenient_number_parsing() {
        assert_eq!(parse_decimal(Some(" 4.20 ")), Some(dec("4.20")));
        assert_eq!(parse_decimal(Some("-3")), Some(dec("-3")));
        assert_eq!(parse_decimal(Some("7.5kg")), Some(dec("7.5")));
        assert_eq!(parse_decimal(Some("abc")), None);
        assert_eq!(parse_decimal(None), None);
        assert_eq!(parse_int(Some("12.99")), Some(12));
        assert_eq!(parse_int(Some("-4")), Some(-4));
        assert_eq!(parse_int(Some("")), None);
    }

    #[test]
    fn rows_are_split_into_batches_of_ten_in_file_order() {
        let body: String = (1..=23).map(|i| format!("h{i},,N{i},,,,1,,true,,,,,,,,,,\n")).collect();
        let products = parse(&body).unwrap();

        let sizes: Vec<usize> = import_batches(&products).map(<[NewProduct]>::len).collect();
        assert_eq!(sizes, vec![10, 10, 3]);

        let second = import_batches(&products).nth(1).unwrap();
        assert_eq!(second[0].handle_id, "h11");
        assert_eq!(second[9].handle_id, "h20");

        assert_eq!(import_batches(&products[..10]).count(), 1);
        assert_eq!(import_batches(&[]).count(), 0);
    }

    #[tokio::test]
    async fn reads_products_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "p1,,Beans,,,,10,,true,,3,,12,,,,,,").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "p2,,Mugs,,,,20,,true,,2,,5,,,,,,").unwrap();

        let products = read_products_csv(file.path(), "A&Co").await.unwrap();

        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| p.associated_company == "A&Co"));
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = read_products_csv(Path::new("/definitely/not/here.csv"), "A&Co")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ImportFile { .. }));
    }
}
