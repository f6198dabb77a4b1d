//! The home page: every expense the user has recorded and their total.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    auth::SessionContext,
    endpoints::{self, format_endpoint},
    expense::{Expense, ExpenseState, format_date, list_expenses, total_price},
    flash::{Flash, take_flash},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
};

fn expense_row(expense: &Expense) -> Markup {
    let view_url = format_endpoint(endpoints::EXPENSE_VIEW, expense.id);
    let edit_url = format_endpoint(endpoints::EDIT_EXPENSE, expense.id);
    let delete_url = format_endpoint(endpoints::DELETE_EXPENSE, expense.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
        {
            td class=(TABLE_CELL_STYLE) { (format_date(expense.date)) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (expense.category) }
            }
            td class=(TABLE_CELL_STYLE) { (expense.item) }
            td class={ (TABLE_CELL_STYLE) " text-right" } { (format_currency(expense.price)) }
            td class={ (TABLE_CELL_STYLE) " flex gap-4" }
            {
                a href=(view_url) class=(LINK_STYLE) { "View" }
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                form method="post" action=(delete_url)
                    onsubmit="return confirm('Delete this expense?');"
                {
                    button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                }
            }
        }
    }
}

fn expenses_view(display_name: &str, expenses: &[Expense], flash: Option<&Flash>) -> Markup {
    let nav_bar = NavBar::new(endpoints::ROOT, display_name).into_html();
    let total = total_price(expenses);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl"
            {
                div class="flex justify-between items-center mb-4"
                {
                    h1 class="text-2xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_EXPENSE) class=(LINK_STYLE) { "Add expense" }
                }

                @if expenses.is_empty() {
                    p id="no-expenses" class="text-gray-500 dark:text-gray-400"
                    {
                        "No expenses yet. "
                        a href=(endpoints::NEW_EXPENSE) class=(LINK_STYLE) { "Record your first one." }
                    }
                } @else {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Item" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Price" }
                                th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                            }
                        }

                        tbody
                        {
                            @for expense in expenses {
                                (expense_row(expense))
                            }
                        }

                        tfoot
                        {
                            tr class="font-semibold text-gray-900 dark:text-white"
                            {
                                th scope="row" colspan="3" class=(TABLE_CELL_STYLE) { "Total" }
                                td id="total" class={ (TABLE_CELL_STYLE) " text-right" } { (format_currency(total)) }
                                td {}
                            }
                        }
                    }
                }
            }
        }
    };

    base("Expenses", flash, &content)
}

/// Renders the expense list for the logged in user.
pub async fn get_expenses_page(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    jar: PrivateCookieJar,
) -> Response {
    let expenses =
        match state.with_connection(|connection| list_expenses(session.account_id, connection)) {
            Ok(expenses) => expenses,
            Err(error) => return error.into_response(),
        };

    let (jar, flash) = take_flash(jar);

    (
        jar,
        expenses_view(&session.display_name, &expenses, flash.as_ref()),
    )
        .into_response()
}
