//! The page showing a single expense.

use axum::{
    Extension,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    auth::SessionContext,
    endpoints::{self, format_endpoint},
    expense::{
        Expense, ExpenseId, ExpenseState, format_date, get_owned_expense, page_error_response,
        parse_expense_id,
    },
    flash::{Flash, take_flash},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, FORM_CONTAINER_STYLE, LINK_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
};

fn detail_row(label: &str, id: &str, value: Markup) -> Markup {
    html! {
        div class="flex justify-between py-2 border-b border-gray-200 dark:border-gray-700"
        {
            dt class="font-medium" { (label) }
            dd id=(id) { (value) }
        }
    }
}

fn expense_view(display_name: &str, expense: &Expense, flash: Option<&Flash>) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSE_VIEW, display_name).into_html();
    let edit_url = format_endpoint(endpoints::EDIT_EXPENSE, expense.id);
    let delete_url = format_endpoint(endpoints::DELETE_EXPENSE, expense.id);
    let created_at = expense.created_at.date();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold my-4" { (expense.item) }

            dl class="w-full"
            {
                (detail_row("Date", "date", html! { (format_date(expense.date)) }))
                (detail_row("Category", "category", html! {
                    span class=(CATEGORY_BADGE_STYLE) { (expense.category) }
                }))
                (detail_row("Item", "item", html! { (expense.item) }))
                (detail_row("Price", "price", html! { (format_currency(expense.price)) }))
                (detail_row("Recorded", "created-at", html! { (format_date(created_at)) }))
            }

            div class="flex gap-6 mt-6"
            {
                a href=(endpoints::ROOT) class=(LINK_STYLE) { "Back" }
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                form method="post" action=(delete_url)
                    onsubmit="return confirm('Delete this expense?');"
                {
                    button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                }
            }
        }
    };

    base("Expense", flash, &content)
}

/// Renders a single expense owned by the logged in user.
pub async fn get_expense_page(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
    jar: PrivateCookieJar,
) -> Response {
    let expense_id = match parse_expense_id(expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return page_error_response(error, jar),
    };

    let expense = match state
        .with_connection(|connection| get_owned_expense(expense_id, session.account_id, connection))
    {
        Ok(expense) => expense,
        Err(error) => return page_error_response(error, jar),
    };

    let (jar, flash) = take_flash(jar);

    (
        jar,
        expense_view(&session.display_name, &expense, flash.as_ref()),
    )
        .into_response()
}
