//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{
        AuthState, api_auth_guard, auth_guard, get_log_in_page, get_log_out, get_register_page,
        post_log_in, post_register,
    },
    endpoints,
    expense::{
        create_expense_api, create_expense_endpoint, delete_expense_api, delete_expense_endpoint,
        edit_expense_endpoint, get_create_expense_page, get_edit_expense_page, get_expense_api,
        get_expense_page, get_expenses_page, list_expenses_api, update_expense_api,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState::from_ref(&state);

    let unprotected_routes = Router::new()
        .route(
            endpoints::REGISTER,
            get(get_register_page).post(post_register),
        )
        .route(endpoints::LOG_IN, get(get_log_in_page).post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out));

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_expenses_page))
        .route(
            endpoints::NEW_EXPENSE,
            get(get_create_expense_page).post(create_expense_endpoint),
        )
        .route(endpoints::EXPENSE_VIEW, get(get_expense_page))
        .route(
            endpoints::EDIT_EXPENSE,
            get(get_edit_expense_page).post(edit_expense_endpoint),
        )
        .route(endpoints::DELETE_EXPENSE, post(delete_expense_endpoint))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_guard,
        ));

    let api_routes = Router::new()
        .route(
            endpoints::EXPENSES_API,
            get(list_expenses_api).post(create_expense_api),
        )
        .route(
            endpoints::EXPENSE_API,
            get(get_expense_api)
                .put(update_expense_api)
                .delete(delete_expense_api),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, api_auth_guard));

    protected_routes
        .merge(api_routes)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        auth::COOKIE_SESSION,
        build_router,
        endpoints::{self, format_endpoint},
        test_utils::get_test_app_state,
    };

    fn get_test_server() -> TestServer {
        let app = build_router(get_test_app_state());

        TestServer::try_new(app).expect("Could not create test server.")
    }

    async fn register_and_log_in(
        server: &TestServer,
        display_name: &str,
        handle: &str,
    ) -> Cookie<'static> {
        server
            .post(endpoints::REGISTER)
            .form(&[
                ("username", display_name),
                ("account", handle),
                ("password", "hunter2"),
            ])
            .await
            .assert_status_see_other();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[("account", handle), ("password", "hunter2")])
            .await;
        response.assert_status_see_other();

        response.cookie(COOKIE_SESSION)
    }

    fn lunch() -> Value {
        json!({
            "date": "2024-01-15",
            "category": "Food",
            "item": "Lunch",
            "price": 12.5,
        })
    }

    #[tokio::test]
    async fn pages_require_log_in() {
        let server = get_test_server();

        for path in [endpoints::ROOT, endpoints::NEW_EXPENSE, "/expense/1"] {
            let response = server.get(path).await;

            response.assert_status_see_other();
            let location = response.header("location");
            let location = location.to_str().unwrap();
            assert!(
                location.starts_with(endpoints::LOG_IN),
                "want redirect to log-in page for {path}, got {location}"
            );
        }
    }

    #[tokio::test]
    async fn api_requires_log_in() {
        let server = get_test_server();

        let response = server.get(endpoints::EXPENSES_API).await;

        response.assert_status_unauthorized();
        response.assert_json(&json!({ "error": "Please log in first." }));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/definitely/not/a/page")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn log_in_then_view_expense_list() {
        let server = get_test_server();
        let session = register_and_log_in(&server, "Alice", "alice").await;

        let response = server.get(endpoints::ROOT).add_cookie(session).await;

        response.assert_status_ok();
        assert!(response.text().contains("Alice"));
    }

    #[tokio::test]
    async fn html_create_then_api_list() {
        let server = get_test_server();
        let session = register_and_log_in(&server, "Alice", "alice").await;

        server
            .post(endpoints::NEW_EXPENSE)
            .add_cookie(session.clone())
            .form(&[
                ("date", "2024-01-15"),
                ("category", "Other"),
                ("custom_category", "Pets"),
                ("item", "Dog food"),
                ("price", "42.10"),
            ])
            .await
            .assert_status_see_other();

        let response = server
            .get(endpoints::EXPENSES_API)
            .add_cookie(session)
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        let expenses = body.as_array().expect("want a JSON array");
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0]["category"], "Pets");
        assert_eq!(expenses[0]["item"], "Dog food");
        assert_eq!(expenses[0]["price"], 42.1);
    }

    #[tokio::test]
    async fn api_crud_flow() {
        let server = get_test_server();
        let session = register_and_log_in(&server, "Alice", "alice").await;

        let response = server
            .post(endpoints::EXPENSES_API)
            .add_cookie(session.clone())
            .json(&lunch())
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["id"].as_i64().unwrap();
        let expense_url = format_endpoint(endpoints::EXPENSE_API, id);

        let response = server
            .put(&expense_url)
            .add_cookie(session.clone())
            .json(&json!({ "price": "15" }))
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["price"], 15.0);
        assert_eq!(body["item"], "Lunch");

        let response = server
            .delete(&expense_url)
            .add_cookie(session.clone())
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Expense deleted successfully" }));

        server
            .get(&expense_url)
            .add_cookie(session)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn api_rejects_invalid_input() {
        let server = get_test_server();
        let session = register_and_log_in(&server, "Alice", "alice").await;

        let response = server
            .post(endpoints::EXPENSES_API)
            .add_cookie(session.clone())
            .json(&json!({ "date": "2024-01-15", "item": "Lunch" }))
            .await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Missing required fields" }));

        let response = server
            .post(endpoints::EXPENSES_API)
            .add_cookie(session.clone())
            .json(&json!({
                "date": "2024-01-15",
                "category": "Food",
                "item": "Lunch",
                "price": "abc",
            }))
            .await;
        response.assert_status_bad_request();

        let response = server
            .post(endpoints::EXPENSES_API)
            .add_cookie(session)
            .text("{not json")
            .content_type("application/json")
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn accounts_cannot_touch_each_others_expenses() {
        let server = get_test_server();
        let alice = register_and_log_in(&server, "Alice", "alice").await;
        let bob = register_and_log_in(&server, "Bob", "bob").await;

        let response = server
            .post(endpoints::EXPENSES_API)
            .add_cookie(alice.clone())
            .json(&lunch())
            .await;
        let id = response.json::<Value>()["id"].as_i64().unwrap();
        let expense_url = format_endpoint(endpoints::EXPENSE_API, id);

        let response = server.get(&expense_url).add_cookie(bob.clone()).await;
        response.assert_status_forbidden();
        response.assert_json(&json!({ "error": "Unauthorized" }));

        server
            .delete(&expense_url)
            .add_cookie(bob.clone())
            .await
            .assert_status_forbidden();

        let response = server
            .get(&format_endpoint(endpoints::EXPENSE_VIEW, id))
            .add_cookie(bob.clone())
            .await;
        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::ROOT);

        let response = server.get(endpoints::EXPENSES_API).add_cookie(bob).await;
        response.assert_json(&json!([]));

        server
            .get(&expense_url)
            .add_cookie(alice)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn log_out_ends_session() {
        let server = get_test_server();
        let session = register_and_log_in(&server, "Alice", "alice").await;

        let response = server
            .get(endpoints::LOG_OUT)
            .add_cookie(session.clone())
            .await;
        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);

        server
            .get(endpoints::EXPENSES_API)
            .add_cookie(session)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn padded_account_can_log_in_after_registering() {
        let server = get_test_server();
        let session = register_and_log_in(&server, "Alice", " alice ").await;

        server
            .get(endpoints::EXPENSES_API)
            .add_cookie(session)
            .await
            .assert_status_ok();

        server
            .post(endpoints::LOG_IN)
            .form(&[("account", "alice"), ("password", "hunter2")])
            .await
            .assert_status_see_other();
    }

    #[tokio::test]
    async fn invalid_expense_id_is_json_not_found() {
        let server = get_test_server();
        let session = register_and_log_in(&server, "Alice", "alice").await;

        for path in ["/api/expenses/abc", "/api/expenses/99999999999999999999"] {
            let response = server.get(path).add_cookie(session.clone()).await;

            response.assert_status_not_found();
            response.assert_json(&json!({ "error": "the requested resource could not be found" }));
        }

        let response = server
            .put("/api/expenses/abc")
            .add_cookie(session.clone())
            .json(&json!({ "price": 1 }))
            .await;
        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "the requested resource could not be found" }));

        server
            .delete("/api/expenses/abc")
            .add_cookie(session)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn invalid_expense_id_is_not_found_page() {
        let server = get_test_server();
        let session = register_and_log_in(&server, "Alice", "alice").await;

        for path in ["/expense/abc", "/expense/abc/edit"] {
            let response = server.get(path).add_cookie(session.clone()).await;

            response.assert_status_not_found();
            let content_type = response.header("content-type");
            assert!(
                content_type.to_str().unwrap().starts_with("text/html"),
                "want an HTML 404 page for {path}, got {content_type:?}"
            );
        }

        server
            .post("/expense/abc/delete")
            .add_cookie(session)
            .await
            .assert_status_not_found();
    }
}
