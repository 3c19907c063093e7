/// Spreadsheet row normalization for product bulk import
/// Maps arbitrary column headers onto canonical product fields and cleans values

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use crate::models::bulk_import::RawRow;
use crate::utils::slugify;

pub const DEFAULT_ZODIAC_SIGN: &str = "Aries";

// ============================================================================
// Canonical fields & header aliases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    Price,
    CategoryName,
    SubCategoryName,
    ZodiacSign,
    IsBestseller,
    Stock,
    Description,
    Tags,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 9] = [
        CanonicalField::Name,
        CanonicalField::Price,
        CanonicalField::CategoryName,
        CanonicalField::SubCategoryName,
        CanonicalField::ZodiacSign,
        CanonicalField::IsBestseller,
        CanonicalField::Stock,
        CanonicalField::Description,
        CanonicalField::Tags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Name => "name",
            CanonicalField::Price => "price",
            CanonicalField::CategoryName => "category_name",
            CanonicalField::SubCategoryName => "sub_category_name",
            CanonicalField::ZodiacSign => "zodiac_sign",
            CanonicalField::IsBestseller => "is_bestseller",
            CanonicalField::Stock => "stock",
            CanonicalField::Description => "description",
            CanonicalField::Tags => "tags",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized header token -> canonical field
static HEADER_ALIASES: Lazy<HashMap<&'static str, CanonicalField>> = Lazy::new(|| {
    use CanonicalField::*;

    let table: &[(&[&str], CanonicalField)] = &[
        (
            &["name", "product", "products", "product_name", "title", "product_title", "item", "item_name"],
            Name,
        ),
        (
            &["price", "mrp", "amount", "selling_price", "sale_price", "price_(inr)", "price_(₹)", "rate", "cost"],
            Price,
        ),
        (
            &["category", "categories", "category_name", "product_category", "main_category"],
            CategoryName,
        ),
        (
            &["sub_category", "subcategory", "sub-category", "sub_categories", "subcategories", "sub_category_name"],
            SubCategoryName,
        ),
        (&["zodiac", "zodiac_sign", "sign", "rashi", "sun_sign"], ZodiacSign),
        (&["bestseller", "best_seller", "is_bestseller", "is_best_seller"], IsBestseller),
        (&["stock", "qty", "quantity", "inventory", "stock_quantity", "stock_qty"], Stock),
        (&["description", "desc", "details", "product_description"], Description),
        (&["tags", "tag", "keywords"], Tags),
    ];

    table
        .iter()
        .flat_map(|(aliases, field)| aliases.iter().map(move |alias| (*alias, *field)))
        .collect()
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NAME_FALLBACK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)products?|name").unwrap());
static PRICE_FALLBACK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)price|mrp|amount").unwrap());

/// Separators splitting "Category > Sub-category", in priority order
const CATEGORY_SEPARATORS: [char; 3] = ['>', '/', '|'];

// ============================================================================
// Normalized row
// ============================================================================

/// Row keyed by canonical field names; headers without an alias keep their
/// normalized token (e.g. `slug`, `category_id`, `image_url`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRow {
    values: BTreeMap<String, String>,
}

impl NormalizedRow {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value of a canonical field, empty when absent
    pub fn field(&self, field: CanonicalField) -> &str {
        self.get(field.as_str()).unwrap_or("")
    }

    /// Non-blank, trimmed value for `key`
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    fn insert(&mut self, key: String, value: &str) {
        // A blank cell never replaces a populated one
        if value.trim().is_empty() && self.non_blank(&key).is_some() {
            return;
        }
        self.values.insert(key, value.to_string());
    }

    fn set_field(&mut self, field: CanonicalField, value: String) {
        self.values.insert(field.as_str().to_string(), value);
    }
}

// ============================================================================
// Prepared rows
// ============================================================================

/// Where a row's category assignment comes from
#[derive(Debug, Clone, PartialEq)]
pub enum CategorySource {
    /// No category information in the row
    Unassigned,
    /// Numeric ids supplied directly; no lookup or creation
    Explicit {
        category_id: i64,
        sub_category_id: Option<i64>,
    },
    /// Names to resolve (and create when missing)
    Named {
        category: String,
        sub_category: Option<String>,
    },
}

/// A validated row, ready for slug check, category resolution and insert
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Decimal,
    pub slug: String,
    pub description: String,
    pub zodiac_sign: String,
    pub image_url: String,
    pub is_bestseller: bool,
    pub tags: Vec<String>,
    pub stock: i32,
    pub category: CategorySource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Every cell blank; skipped without a result entry
    Blank,
    /// Failed validation; carries the diagnostic for failedList
    Invalid(String),
    Valid(ProductDraft),
}

// ============================================================================
// Row Normalizer Service
// ============================================================================

pub struct RowNormalizerService;

impl RowNormalizerService {
    /// Normalize, clean and validate one raw row. Touches no storage.
    pub fn prepare(raw: &RawRow) -> RowOutcome {
        if raw.is_blank() {
            return RowOutcome::Blank;
        }

        let row = Self::normalize(raw);

        let attempted_name = row.field(CanonicalField::Name).trim().to_string();
        let attempted_price = row.field(CanonicalField::Price).trim().to_string();

        let name = attempted_name.clone();
        let price = Self::clean_price(&attempted_price);

        let price = match (name.is_empty(), price) {
            (false, Some(price)) => price,
            (false, None) if Self::price_out_of_range(&attempted_price) => {
                return RowOutcome::Invalid(format!(
                    "Price out of range (price: {:?}). Prices must stay below {}",
                    attempted_price,
                    Decimal::MAX
                ));
            }
            (name_missing, price) => {
                let mut missing = Vec::new();
                if name_missing {
                    missing.push(CanonicalField::Name.as_str());
                }
                if price.is_none() {
                    missing.push(CanonicalField::Price.as_str());
                }

                return RowOutcome::Invalid(format!(
                    "Missing required field(s): {} (name: {:?}, price: {:?}). Columns found: {}",
                    missing.join(", "),
                    attempted_name,
                    attempted_price,
                    raw.headers().collect::<Vec<_>>().join(", ")
                ));
            }
        };

        let slug = row
            .non_blank("slug")
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&name));

        RowOutcome::Valid(ProductDraft {
            slug,
            price,
            description: row.non_blank(CanonicalField::Description.as_str()).unwrap_or("").to_string(),
            zodiac_sign: row
                .non_blank(CanonicalField::ZodiacSign.as_str())
                .unwrap_or(DEFAULT_ZODIAC_SIGN)
                .to_string(),
            image_url: row.non_blank("image_url").unwrap_or("").to_string(),
            is_bestseller: Self::parse_bool(row.field(CanonicalField::IsBestseller)),
            tags: Self::parse_tags(row.field(CanonicalField::Tags)),
            stock: Self::parse_stock(row.field(CanonicalField::Stock)),
            category: Self::category_source(&row),
            name,
        })
    }

    /// Header aliasing plus fallback detection for `name` and `price`
    pub fn normalize(raw: &RawRow) -> NormalizedRow {
        let mut row = NormalizedRow::default();

        for (header, value) in raw.iter() {
            let key = Self::normalize_header(header);
            let key = match HEADER_ALIASES.get(key.as_str()) {
                Some(field) => field.as_str().to_string(),
                None => key,
            };
            row.insert(key, value);
        }

        for (field, pattern) in [
            (CanonicalField::Name, &*NAME_FALLBACK),
            (CanonicalField::Price, &*PRICE_FALLBACK),
        ] {
            if row.non_blank(field.as_str()).is_some() {
                continue;
            }
            if let Some(value) = Self::fallback_value(raw, pattern, field) {
                row.set_field(field, value.to_string());
            }
        }

        row
    }

    /// Strip BOM, trim, lowercase, collapse whitespace runs to `_`
    pub fn normalize_header(header: &str) -> String {
        let lowered = header.trim_start_matches('\u{feff}').trim().to_lowercase();
        WHITESPACE_RUN.replace_all(&lowered, "_").into_owned()
    }

    pub fn alias_for(header: &str) -> Option<CanonicalField> {
        HEADER_ALIASES.get(Self::normalize_header(header).as_str()).copied()
    }

    /// First non-blank column whose header matches `pattern` and does not
    /// already belong to a different canonical field
    fn fallback_value<'a>(raw: &'a RawRow, pattern: &Regex, target: CanonicalField) -> Option<&'a str> {
        raw.iter()
            .find(|(header, value)| {
                !value.trim().is_empty()
                    && pattern.is_match(header)
                    && Self::alias_for(header).map_or(true, |field| field == target)
            })
            .map(|(_, value)| value)
    }

    /// Keep digits and dots, reject empty/zero, parse the leading number.
    /// Returns the normalized positive price or `None` when invalid.
    pub fn clean_price(raw: &str) -> Option<Decimal> {
        let digits: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        if digits.is_empty() || digits == "0" || digits == "0.00" {
            return None;
        }

        let number = Self::leading_number(&digits)?;
        let price = Decimal::from_str(&number).ok()?;

        if price <= Decimal::ZERO {
            return None;
        }

        Some(price.normalize())
    }

    /// True when the cell holds a number too large for `Decimal`
    /// (about 28 significant digits).
    pub fn price_out_of_range(raw: &str) -> bool {
        let digits: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        Self::leading_number(&digits)
            .map_or(false, |number| Decimal::from_str(&number).is_err())
    }

    /// Longest `digits[.digits]` prefix of a string made of digits and dots
    fn leading_number(digits: &str) -> Option<String> {
        let mut seen_dot = false;
        let mut end = 0;

        for (idx, c) in digits.char_indices() {
            if c == '.' {
                if seen_dot {
                    break;
                }
                seen_dot = true;
            }
            end = idx + c.len_utf8();
        }

        let number = digits[..end].trim_end_matches('.');
        if !number.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }

        if number.starts_with('.') {
            Some(format!("0{}", number))
        } else {
            Some(number.to_string())
        }
    }

    /// `true` (any case) or `1`
    pub fn parse_bool(raw: &str) -> bool {
        let value = raw.trim();
        value.eq_ignore_ascii_case("true") || value == "1"
    }

    /// Comma separated, trimmed, empty segments dropped
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Leading integer of the trimmed value, 0 when there is none
    pub fn parse_stock(raw: &str) -> i32 {
        let value = raw.trim();
        let (sign, rest) = match value.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, value.strip_prefix('+').unwrap_or(value)),
        };

        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse::<i32>().map(|n| sign * n).unwrap_or(0)
    }

    /// Split "Category > Sub" on the highest-priority separator present
    pub fn split_category_path(raw: &str) -> (String, Option<String>) {
        let trimmed = raw.trim();

        for separator in CATEGORY_SEPARATORS {
            if let Some((category, sub_category)) = trimmed.split_once(separator) {
                let sub_category = sub_category.trim();
                return (
                    category.trim().to_string(),
                    (!sub_category.is_empty()).then(|| sub_category.to_string()),
                );
            }
        }

        (trimmed.to_string(), None)
    }

    fn parse_id(row: &NormalizedRow, key: &str) -> Option<i64> {
        row.non_blank(key).and_then(|v| v.parse::<i64>().ok())
    }

    fn category_source(row: &NormalizedRow) -> CategorySource {
        if let Some(category_id) = Self::parse_id(row, "category_id") {
            return CategorySource::Explicit {
                category_id,
                sub_category_id: Self::parse_id(row, "sub_category_id"),
            };
        }

        let Some(raw_category) = row.non_blank(CanonicalField::CategoryName.as_str()) else {
            return CategorySource::Unassigned;
        };

        let (category, path_sub_category) = Self::split_category_path(raw_category);
        if category.is_empty() {
            return CategorySource::Unassigned;
        }

        let sub_category = path_sub_category.or_else(|| {
            row.non_blank(CanonicalField::SubCategoryName.as_str())
                .map(str::to_string)
        });

        CategorySource::Named { category, sub_category }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid(raw: RawRow) -> ProductDraft {
        match RowNormalizerService::prepare(&raw) {
            RowOutcome::Valid(draft) => draft,
            other => panic!("expected valid row, got {:?}", other),
        }
    }

    fn invalid(raw: RawRow) -> String {
        match RowNormalizerService::prepare(&raw) {
            RowOutcome::Invalid(message) => message,
            other => panic!("expected invalid row, got {:?}", other),
        }
    }

    #[test]
    fn test_header_normalization() {
        assert_eq!(RowNormalizerService::normalize_header("\u{feff}Product Name"), "product_name");
        assert_eq!(RowNormalizerService::normalize_header("  Sub   Category "), "sub_category");
        assert_eq!(RowNormalizerService::normalize_header("Price\t(INR)"), "price_(inr)");
    }

    #[test]
    fn test_every_canonical_field_has_its_own_name_as_alias() {
        for field in CanonicalField::ALL {
            assert_eq!(RowNormalizerService::alias_for(field.as_str()), Some(field));
        }
    }

    #[test]
    fn test_products_and_rupee_price() {
        let draft = valid(RawRow::from_pairs([("Products", "Widget"), ("Price", "₹1,999.00")]));
        assert_eq!(draft.name, "Widget");
        assert_eq!(draft.price, dec!(1999));
        assert_eq!(draft.price.to_string(), "1999");
        assert_eq!(draft.slug, "widget");
    }

    #[test]
    fn test_defaults_applied() {
        let draft = valid(RawRow::from_pairs([("Name", "Widget"), ("Price", "10")]));
        assert_eq!(draft.zodiac_sign, "Aries");
        assert_eq!(draft.description, "");
        assert_eq!(draft.image_url, "");
        assert_eq!(draft.stock, 0);
        assert!(!draft.is_bestseller);
        assert!(draft.tags.is_empty());
        assert_eq!(draft.category, CategorySource::Unassigned);
    }

    #[test]
    fn test_zero_price_is_missing() {
        let message = invalid(RawRow::from_pairs([("Name", "Widget"), ("Price", "0")]));
        assert!(message.contains("price"));
        assert!(!message.contains("field(s): name"));
    }

    #[test]
    fn test_empty_price_is_missing() {
        let message = invalid(RawRow::from_pairs([("Name", "Widget"), ("Price", "")]));
        assert!(message.starts_with("Missing required field(s): price"));
        assert!(message.contains("Columns found: Name, Price"));
    }

    #[test]
    fn test_missing_name_and_price_both_named() {
        let message = invalid(RawRow::from_pairs([("Colour", "Red"), ("Weight", "12g")]));
        assert!(message.starts_with("Missing required field(s): name, price"));
        assert!(message.contains("Colour, Weight"));
    }

    #[test]
    fn test_blank_row_skipped() {
        let outcome = RowNormalizerService::prepare(&RawRow::from_pairs([("Name", " "), ("Price", "")]));
        assert_eq!(outcome, RowOutcome::Blank);
    }

    #[test]
    fn test_price_cleaning() {
        assert_eq!(RowNormalizerService::clean_price("₹ 450.50/-"), Some(dec!(450.5)));
        assert_eq!(RowNormalizerService::clean_price("0.00"), None);
        assert_eq!(RowNormalizerService::clean_price("0.000"), None);
        assert_eq!(RowNormalizerService::clean_price("free"), None);
        assert_eq!(RowNormalizerService::clean_price("."), None);
        assert_eq!(RowNormalizerService::clean_price(".5"), Some(dec!(0.5)));
        // Only the leading number counts once a second dot appears
        assert_eq!(RowNormalizerService::clean_price("1.2.3"), Some(dec!(1.2)));
    }

    #[test]
    fn test_oversized_price_is_out_of_range() {
        let huge = "99999999999999999999999999999999";
        assert_eq!(RowNormalizerService::clean_price(huge), None);
        assert!(RowNormalizerService::price_out_of_range(huge));
        assert!(!RowNormalizerService::price_out_of_range("450.50"));
        assert!(!RowNormalizerService::price_out_of_range("free"));

        let message = invalid(RawRow::from_pairs([("Name", "Meteorite"), ("Price", huge)]));
        assert!(message.starts_with("Price out of range (price: \"99999999999999999999999999999999\")"));
        assert!(!message.contains("Missing required"));

        // Without a name the row still reports the missing fields
        let message = invalid(RawRow::from_pairs([("Name", ""), ("Price", huge)]));
        assert!(message.starts_with("Missing required field(s): name, price"));
    }

    #[test]
    fn test_fallback_finds_unaliased_headers() {
        let draft = valid(RawRow::from_pairs([
            ("Product Title (EN)", "Tiger Eye Bracelet"),
            ("Net Amount Payable", "799"),
        ]));
        assert_eq!(draft.name, "Tiger Eye Bracelet");
        assert_eq!(draft.price, dec!(799));
    }

    #[test]
    fn test_fallback_ignores_headers_of_other_fields() {
        // "Category Name" matches /name/ but belongs to category_name
        let message = invalid(RawRow::from_pairs([("Category Name", "Crystals"), ("Price", "100")]));
        assert!(message.starts_with("Missing required field(s): name "));
    }

    #[test]
    fn test_blank_duplicate_does_not_overwrite() {
        let draft = valid(RawRow::from_pairs([
            ("Name", "Amethyst Pendant"),
            ("Product", ""),
            ("Price", "300"),
        ]));
        assert_eq!(draft.name, "Amethyst Pendant");
    }

    #[test]
    fn test_bestseller_coercion() {
        for truthy in ["TRUE", "true", "True", "1", " 1 "] {
            assert!(RowNormalizerService::parse_bool(truthy), "{truthy}");
        }
        for falsy in ["FALSE", "false", "", "0", "yes", "2"] {
            assert!(!RowNormalizerService::parse_bool(falsy), "{falsy}");
        }
    }

    #[test]
    fn test_tags_parsing() {
        assert_eq!(
            RowNormalizerService::parse_tags(" healing, ,gift ,rose quartz,"),
            vec!["healing", "gift", "rose quartz"]
        );
        assert!(RowNormalizerService::parse_tags("").is_empty());
    }

    #[test]
    fn test_stock_parsing() {
        assert_eq!(RowNormalizerService::parse_stock("25"), 25);
        assert_eq!(RowNormalizerService::parse_stock(" 12.7 "), 12);
        assert_eq!(RowNormalizerService::parse_stock("40 pcs"), 40);
        assert_eq!(RowNormalizerService::parse_stock("n/a"), 0);
        assert_eq!(RowNormalizerService::parse_stock(""), 0);
    }

    #[test]
    fn test_category_separator_priority() {
        assert_eq!(
            RowNormalizerService::split_category_path(" Crystals > Rings "),
            ("Crystals".to_string(), Some("Rings".to_string()))
        );
        // '>' wins over '/' even when '/' comes first
        assert_eq!(
            RowNormalizerService::split_category_path("Gold/Silver > Rings"),
            ("Gold/Silver".to_string(), Some("Rings".to_string()))
        );
        // split on the first occurrence only
        assert_eq!(
            RowNormalizerService::split_category_path("Crystals | Rings | Large"),
            ("Crystals".to_string(), Some("Rings | Large".to_string()))
        );
        assert_eq!(
            RowNormalizerService::split_category_path("Bracelets"),
            ("Bracelets".to_string(), None)
        );
    }

    #[test]
    fn test_named_category_from_path() {
        let draft = valid(RawRow::from_pairs([
            ("Products", "Moonstone Ring"),
            ("Price", "1200"),
            ("Categories", "Crystals > Rings"),
        ]));
        assert_eq!(
            draft.category,
            CategorySource::Named {
                category: "Crystals".to_string(),
                sub_category: Some("Rings".to_string()),
            }
        );
    }

    #[test]
    fn test_sub_category_column_used_without_separator() {
        let draft = valid(RawRow::from_pairs([
            ("Name", "Moonstone Ring"),
            ("Price", "1200"),
            ("Category", "Crystals"),
            ("Sub Category", "Rings"),
        ]));
        assert_eq!(
            draft.category,
            CategorySource::Named {
                category: "Crystals".to_string(),
                sub_category: Some("Rings".to_string()),
            }
        );
    }

    #[test]
    fn test_explicit_category_id_wins() {
        let draft = valid(RawRow::from_pairs([
            ("Name", "Moonstone Ring"),
            ("Price", "1200"),
            ("Category ID", "4"),
            ("Category", "Crystals > Rings"),
        ]));
        assert_eq!(
            draft.category,
            CategorySource::Explicit { category_id: 4, sub_category_id: None }
        );
    }

    #[test]
    fn test_explicit_slug_column() {
        let draft = valid(RawRow::from_pairs([
            ("Name", "Moonstone Ring"),
            ("Price", "1200"),
            ("Slug", " moonstone-ring-classic "),
        ]));
        assert_eq!(draft.slug, "moonstone-ring-classic");
    }

    #[test]
    fn test_optional_fields_mapped() {
        let draft = valid(RawRow::from_pairs([
            ("\u{feff}Product Name", "Citrine Tree"),
            ("MRP", "2,499"),
            ("Zodiac", "Leo"),
            ("Best Seller", "TRUE"),
            ("Qty", "8"),
            ("Description", "Money tree"),
            ("Tags", "wealth, decor"),
            ("Image URL", "/uploads/citrine.jpg"),
        ]));
        assert_eq!(draft.name, "Citrine Tree");
        assert_eq!(draft.price, dec!(2499));
        assert_eq!(draft.zodiac_sign, "Leo");
        assert!(draft.is_bestseller);
        assert_eq!(draft.stock, 8);
        assert_eq!(draft.description, "Money tree");
        assert_eq!(draft.tags, vec!["wealth", "decor"]);
        assert_eq!(draft.image_url, "/uploads/citrine.jpg");
    }
}
