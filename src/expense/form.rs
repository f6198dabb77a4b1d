//! The form shared by the new expense and edit expense pages.

use maud::{Markup, html};

use crate::{
    expense::{Expense, ExpenseForm, format_date},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, form_error, text_input,
    },
};

/// The categories offered in the category drop-down.
pub(crate) const CATEGORIES: [&str; 7] = [
    "Food",
    "Transport",
    "Entertainment",
    "Shopping",
    "Bills",
    "Health",
    "Other",
];

impl From<&Expense> for ExpenseForm {
    fn from(expense: &Expense) -> Self {
        // Categories that are not in the drop-down go in the custom category box.
        let (category, custom_category) = if CATEGORIES.contains(&expense.category.as_str()) {
            (expense.category.clone(), String::new())
        } else {
            ("Other".to_owned(), expense.category.clone())
        };

        Self {
            date: format_date(expense.date),
            category,
            custom_category,
            item: expense.item.clone(),
            price: expense.price.to_string(),
        }
    }
}

fn category_inputs(selected_category: &str, custom_category: &str) -> Markup {
    html! {
        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE) required
            {
                @for category in CATEGORIES {
                    option value=(category) selected[category == selected_category] { (category) }
                }
            }
        }

        div
        {
            label for="custom_category" class=(FORM_LABEL_STYLE) { "Custom category (optional)" }

            input
                type="text"
                name="custom_category"
                id="custom_category"
                placeholder="Overrides the category above"
                class=(FORM_TEXT_INPUT_STYLE)
                value=(custom_category);
        }
    }
}

/// An expense form that posts to `action`, pre-filled with `values`.
pub(crate) fn expense_form(
    action: &str,
    values: &ExpenseForm,
    submit_label: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form method="post" action=(action) class="w-full space-y-4 md:space-y-6"
        {
            (text_input("Date", "date", "date", &values.date))
            (category_inputs(&values.category, &values.custom_category))
            (text_input("Item", "item", "text", &values.item))

            div
            {
                label for="price" class=(FORM_LABEL_STYLE) { "Price" }

                input
                    type="number"
                    name="price"
                    id="price"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(values.price);
            }

            (form_error(error_message))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                (submit_label)
            }
        }
    }
}
