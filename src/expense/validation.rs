//! Parsing and validation of expense input, shared by the HTML forms and the JSON API
//! so that both accept and reject exactly the same values.

use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    expense::{ExpenseChanges, NewExpense},
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

pub(crate) const MISSING_FIELDS_ERROR_MSG: &str = "Missing required fields";

/// Parse an ISO calendar date such as `2024-01-15`.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT)
        .map_err(|_| Error::Validation(format!("Invalid date \"{text}\", expected YYYY-MM-DD.")))
}

/// Format `date` the same way [parse_date] reads it.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|error| {
        tracing::error!("Could not format date {date}: {error}");
        date.to_string()
    })
}

/// Check that `price` is a finite, non-negative amount.
pub fn validate_price(price: f64) -> Result<f64, Error> {
    if !price.is_finite() {
        return Err(Error::Validation(format!("Invalid price \"{price}\".")));
    }

    if price < 0.0 {
        return Err(Error::Validation("Price cannot be negative.".to_owned()));
    }

    Ok(price)
}

/// Parse a price such as `12.5` from text.
pub fn parse_price(text: &str) -> Result<f64, Error> {
    let price = text
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Validation(format!("Invalid price \"{text}\".")))?;

    validate_price(price)
}

/// The category to store: `custom` if it has any text in it, otherwise `selected`.
pub fn resolve_category(selected: &str, custom: Option<&str>) -> String {
    match custom.map(str::trim) {
        Some(custom) if !custom.is_empty() => custom.to_owned(),
        _ => selected.trim().to_owned(),
    }
}

fn require_text(field: &str, value: &str) -> Result<String, Error> {
    let value = value.trim();

    if value.is_empty() {
        return Err(Error::Validation(format!("{field} cannot be empty.")));
    }

    Ok(value.to_owned())
}

/// The raw data entered by the user in the expense form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub custom_category: String,
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub price: String,
}

impl TryFrom<&ExpenseForm> for NewExpense {
    type Error = Error;

    fn try_from(form: &ExpenseForm) -> Result<Self, Self::Error> {
        let category = resolve_category(&form.category, Some(&form.custom_category));

        Ok(NewExpense {
            date: parse_date(&form.date)?,
            category: require_text("Category", &category)?,
            item: require_text("Item", &form.item)?,
            price: parse_price(&form.price)?,
        })
    }
}

/// A price in a JSON body, either as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    fn parse(&self) -> Result<f64, Error> {
        match self {
            PriceInput::Number(price) => validate_price(*price),
            PriceInput::Text(text) => parse_price(text),
        }
    }
}

/// The JSON body for creating an expense. Every field except `custom_category` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewExpenseRequest {
    pub date: Option<String>,
    pub category: Option<String>,
    pub custom_category: Option<String>,
    pub item: Option<String>,
    pub price: Option<PriceInput>,
}

impl TryFrom<NewExpenseRequest> for NewExpense {
    type Error = Error;

    fn try_from(request: NewExpenseRequest) -> Result<Self, Self::Error> {
        let (Some(date), Some(category), Some(item), Some(price)) =
            (request.date, request.category, request.item, request.price)
        else {
            return Err(Error::Validation(MISSING_FIELDS_ERROR_MSG.to_owned()));
        };

        let category = resolve_category(&category, request.custom_category.as_deref());

        Ok(NewExpense {
            date: parse_date(&date)?,
            category: require_text("Category", &category)?,
            item: require_text("Item", &item)?,
            price: price.parse()?,
        })
    }
}

/// The JSON body for updating an expense. Only the fields that are present are changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpensePatch {
    pub date: Option<String>,
    pub category: Option<String>,
    pub custom_category: Option<String>,
    pub item: Option<String>,
    pub price: Option<PriceInput>,
}

impl TryFrom<ExpensePatch> for ExpenseChanges {
    type Error = Error;

    fn try_from(patch: ExpensePatch) -> Result<Self, Self::Error> {
        let category = match (patch.category, patch.custom_category) {
            (None, None) => None,
            (selected, custom) => {
                let category =
                    resolve_category(selected.as_deref().unwrap_or_default(), custom.as_deref());
                // A blank custom category on its own does not change anything.
                if category.is_empty() && selected.is_none() {
                    None
                } else {
                    Some(require_text("Category", &category)?)
                }
            }
        };

        Ok(ExpenseChanges {
            date: patch.date.as_deref().map(parse_date).transpose()?,
            category,
            item: patch
                .item
                .as_deref()
                .map(|item| require_text("Item", item))
                .transpose()?,
            price: patch.price.as_ref().map(PriceInput::parse).transpose()?,
        })
    }
}
