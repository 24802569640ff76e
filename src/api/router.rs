//! HTTP router.
//!
//! Three route groups with distinct gates:
//! 1. Public (index, login, logout)
//! 2. Staff (dashboard, patients, appointments, medical records) behind
//!    `require_session`
//! 3. Admin (user management) behind `require_admin`

use axum::routing::get;
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the full application router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer). Endpoint handlers use `State<ApiContext>` (provided via
/// `with_state`).
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn hospital_router(ctx: ApiContext) -> Router {
    // Public routes: no session required
    let public = Router::new()
        .route("/", get(endpoints::dashboard::index))
        .route(
            "/login",
            get(endpoints::auth::login_form).post(endpoints::auth::login),
        )
        .route("/logout", get(endpoints::auth::logout))
        .with_state(ctx.clone())
        .route_layer(axum::Extension(ctx.clone()));

    // Staff routes: any signed-in user
    let staff = Router::new()
        .route("/dashboard", get(endpoints::dashboard::dashboard))
        .route(
            "/register_patient",
            get(endpoints::patients::register_form).post(endpoints::patients::register),
        )
        .route("/view_patients", get(endpoints::patients::list))
        .route(
            "/update_patient/:id",
            get(endpoints::patients::update_form).post(endpoints::patients::update),
        )
        .route("/delete_patient/:id", get(endpoints::patients::delete))
        .route(
            "/book_appointment",
            get(endpoints::appointments::book_form).post(endpoints::appointments::book),
        )
        .route("/view_appointments", get(endpoints::appointments::list))
        .route(
            "/update_appointment/:id",
            get(endpoints::appointments::update_form).post(endpoints::appointments::update),
        )
        .route(
            "/delete_appointment/:id",
            get(endpoints::appointments::delete),
        )
        .route("/medical_records", get(endpoints::records::list))
        .route(
            "/add_medical_record",
            get(endpoints::records::add_form).post(endpoints::records::create),
        )
        .route("/view_medical_record/:id", get(endpoints::records::view))
        .route(
            "/edit_medical_record/:id",
            get(endpoints::records::edit_form).post(endpoints::records::update),
        )
        .route(
            "/delete_medical_record/:id",
            get(endpoints::records::delete),
        )
        .route("/patient_history/:id", get(endpoints::records::history))
        .with_state(ctx.clone())
        .route_layer(axum::middleware::from_fn(
            middleware::session_gate::require_session,
        ))
        // Extension must be outermost so the gate can extract ApiContext.
        // route_layer keeps the gates off the fallback: unknown routes
        // stay a plain 404 instead of bouncing to /login.
        .route_layer(axum::Extension(ctx.clone()));

    // Admin routes: user management
    let admin = Router::new()
        .route("/users", get(endpoints::users::list))
        .route(
            "/add_user",
            get(endpoints::users::add_form).post(endpoints::users::create),
        )
        .route(
            "/edit_user/:id",
            get(endpoints::users::edit_form).post(endpoints::users::update),
        )
        .route("/delete_user/:id", get(endpoints::users::delete))
        .with_state(ctx.clone())
        .route_layer(axum::middleware::from_fn(
            middleware::session_gate::require_admin,
        ))
        .route_layer(axum::Extension(ctx));

    Router::new().merge(public).merge(staff).merge(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::db;
    use crate::models::Role;
    use crate::session::Session;

    /// Temp-file database with schema but no seeded admin (seeding hashes a
    /// password, which is slow in debug builds). Tests that need accounts
    /// insert them directly.
    fn test_ctx() -> (ApiContext, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hospital.db");
        let conn = db::open_connection(&path).unwrap();
        db::run_migrations(&conn).unwrap();
        drop(conn);
        (ApiContext::new(path), tmp)
    }

    /// Open a session directly in the store, skipping the login handler.
    fn open_session(ctx: &ApiContext, username: &str, role: Role) -> String {
        ctx.sessions.lock().unwrap().create(Session {
            user_id: 1,
            username: username.to_string(),
            role,
            full_name: "Test User".to_string(),
        })
    }

    fn get_request(uri: &str, sid: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(sid) = sid {
            builder = builder.header(COOKIE, format!("sid={sid}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, sid: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(sid) = sid {
            builder = builder.header(COOKIE, format!("sid={sid}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn location(response: &axum::http::Response<Body>) -> &str {
        response.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn unauthenticated_requests_bounce_to_login() {
        let (ctx, _tmp) = test_ctx();

        for uri in [
            "/dashboard",
            "/view_patients",
            "/book_appointment",
            "/medical_records",
            "/patient_history/1",
        ] {
            let app = hospital_router(ctx.clone());
            let response = app.oneshot(get_request(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/login", "{uri}");
        }
    }

    #[tokio::test]
    async fn stale_session_token_bounces_to_login() {
        let (ctx, _tmp) = test_ctx();
        let app = hospital_router(ctx);

        let response = app
            .oneshot(get_request("/dashboard", Some("no-such-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn non_admin_cannot_reach_user_management() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "drgray", Role::Doctor);

        for uri in ["/users", "/add_user", "/edit_user/1", "/delete_user/1"] {
            let app = hospital_router(ctx.clone());
            let response = app.oneshot(get_request(uri, Some(&sid))).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/dashboard", "{uri}");
        }
    }

    #[tokio::test]
    async fn admin_reaches_user_management() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "admin", Role::Admin);
        let app = hospital_router(ctx);

        let response = app.oneshot(get_request("/users", Some(&sid))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert!(json["users"].is_array());
    }

    #[tokio::test]
    async fn login_flow_sets_session_cookie() {
        let (ctx, _tmp) = test_ctx();

        // Seed an account through the real hasher
        let conn = ctx.open_db().unwrap();
        crate::db::repository::user::insert_user(
            &conn,
            &crate::db::repository::user::UserFields {
                username: "reception",
                role: Role::Receptionist,
                full_name: "Front Desk",
                email: "desk@hospital.com",
            },
            &crate::auth::hash_password("letmein"),
        )
        .unwrap();

        let app = hospital_router(ctx.clone());
        let response = app
            .oneshot(post_form(
                "/login",
                None,
                "username=reception&password=letmein",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");

        let sid = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| v.strip_prefix("sid="))
            .map(|v| v.split(';').next().unwrap().to_string())
            .expect("session cookie");

        // The cookie resolves to a live session
        let app = hospital_router(ctx);
        let response = app
            .oneshot(get_request("/dashboard", Some(&sid)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_credentials_bounce_back_to_login() {
        let (ctx, _tmp) = test_ctx();
        let app = hospital_router(ctx.clone());

        let response = app
            .oneshot(post_form("/login", None, "username=ghost&password=nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        assert!(ctx.sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn logout_invalidates_the_session() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "drgray", Role::Doctor);

        let app = hospital_router(ctx.clone());
        let response = app
            .oneshot(get_request("/logout", Some(&sid)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        // The old cookie no longer grants access
        let app = hospital_router(ctx);
        let response = app
            .oneshot(get_request("/dashboard", Some(&sid)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn book_appointment_then_list_shows_it() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "reception", Role::Receptionist);

        let app = hospital_router(ctx.clone());
        let response = app
            .oneshot(post_form(
                "/book_appointment",
                Some(&sid),
                "patient_name=Dana+Reed&doctor_name=Dr.+Gray&date=2026-09-01&time=10:30",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/view_appointments");

        let app = hospital_router(ctx);
        let response = app
            .oneshot(get_request("/view_appointments", Some(&sid)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let appointments = json["appointments"].as_array().unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0]["patient_name"], "Dana Reed");
        assert_eq!(appointments[0]["time"], "10:30");
    }

    #[tokio::test]
    async fn register_patient_then_search_finds_them() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "reception", Role::Receptionist);

        let app = hospital_router(ctx.clone());
        let response = app
            .oneshot(post_form(
                "/register_patient",
                Some(&sid),
                "name=Dana+Reed&age=42&gender=Female&address=12+Elm+St&phone=555-0101",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/view_patients");

        let app = hospital_router(ctx.clone());
        let response = app
            .oneshot(get_request("/view_patients?search=dana", Some(&sid)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["patients"].as_array().unwrap().len(), 1);
        assert_eq!(json["search"], "dana");

        let app = hospital_router(ctx);
        let response = app
            .oneshot(get_request("/view_patients?search=nobody", Some(&sid)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert!(json["patients"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_numeric_age_is_rejected_at_extraction() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "reception", Role::Receptionist);
        let app = hospital_router(ctx);

        let response = app
            .oneshot(post_form(
                "/register_patient",
                Some(&sid),
                "name=Dana&age=forty&gender=F&address=x&phone=y",
            ))
            .await
            .unwrap();
        // Form extraction failure, never reaches the handler
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn updating_missing_patient_bounces_with_notice() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "reception", Role::Receptionist);
        let app = hospital_router(ctx);

        let response = app
            .oneshot(post_form(
                "/update_patient/99",
                Some(&sid),
                "name=Dana&age=42&gender=F&address=x&phone=y",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/view_patients");

        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("notice="))
            .expect("notice cookie");
        assert!(cookie.starts_with("notice=error."));
    }

    #[tokio::test]
    async fn duplicate_username_reports_conflict_notice() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "admin", Role::Admin);

        let form = "username=drgray&password=pw&role=doctor&full_name=Dr.+Gray&email=g@h.com";
        let app = hospital_router(ctx.clone());
        let response = app
            .oneshot(post_form("/add_user", Some(&sid), form))
            .await
            .unwrap();
        assert_eq!(location(&response), "/users");

        let app = hospital_router(ctx);
        let response = app
            .oneshot(post_form("/add_user", Some(&sid), form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/add_user");
    }

    #[tokio::test]
    async fn flash_notice_travels_across_the_redirect() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "reception", Role::Receptionist);

        let app = hospital_router(ctx.clone());
        let response = app
            .oneshot(post_form(
                "/register_patient",
                Some(&sid),
                "name=Dana&age=42&gender=F&address=x&phone=555",
            ))
            .await
            .unwrap();

        let notice_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| v.strip_prefix("notice="))
            .map(|v| v.split(';').next().unwrap().to_string())
            .expect("notice cookie");

        // Follow the redirect, presenting both cookies
        let app = hospital_router(ctx);
        let request = Request::builder()
            .method("GET")
            .uri("/view_patients")
            .header(COOKIE, format!("sid={sid}; notice={notice_cookie}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The page clears the cookie it consumed
        let cleared = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with("notice=") && v.contains("Max-Age=0"));
        assert!(cleared);

        let json = response_json(response).await;
        assert_eq!(json["notice"]["severity"], "success");
        assert_eq!(json["notice"]["message"], "Patient registered successfully!");
    }

    #[tokio::test]
    async fn index_redirects_signed_in_users_to_dashboard() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "drgray", Role::Doctor);

        let app = hospital_router(ctx.clone());
        let response = app.oneshot(get_request("/", Some(&sid))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");

        // Anonymous visitors get the index page
        let app = hospital_router(ctx);
        let response = app.oneshot(get_request("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn dashboard_reports_counts() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "drgray", Role::Doctor);

        let conn = ctx.open_db().unwrap();
        crate::db::repository::patient::insert_patient(
            &conn,
            &crate::db::repository::patient::PatientFields {
                name: "Dana",
                age: 42,
                gender: "F",
                address: "x",
                phone: "555",
            },
        )
        .unwrap();
        drop(conn);

        let app = hospital_router(ctx);
        let response = app
            .oneshot(get_request("/dashboard", Some(&sid)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["stats"]["total_patients"], 1);
        assert_eq!(json["stats"]["total_appointments"], 0);
        assert_eq!(json["stats"]["total_doctors"], 3);
        assert_eq!(json["user"]["username"], "drgray");
    }

    #[tokio::test]
    async fn medical_record_flow_create_view_history() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "drgray", Role::Doctor);

        let conn = ctx.open_db().unwrap();
        let pid = crate::db::repository::patient::insert_patient(
            &conn,
            &crate::db::repository::patient::PatientFields {
                name: "Dana Reed",
                age: 42,
                gender: "F",
                address: "x",
                phone: "555",
            },
        )
        .unwrap();
        drop(conn);

        let app = hospital_router(ctx.clone());
        let body = format!(
            "patient_id={pid}&doctor_name=Dr.+Gray&diagnosis=Flu&treatment=Rest\
             &prescription=Fluids&notes=&visit_date=2026-08-20"
        );
        let response = app
            .oneshot(post_form("/add_medical_record", Some(&sid), &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/medical_records");

        let app = hospital_router(ctx.clone());
        let response = app
            .oneshot(get_request("/medical_records", Some(&sid)))
            .await
            .unwrap();
        let json = response_json(response).await;
        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["patient_name"], "Dana Reed");
        let rid = records[0]["id"].as_i64().unwrap();

        let app = hospital_router(ctx.clone());
        let response = app
            .oneshot(get_request(
                &format!("/view_medical_record/{rid}"),
                Some(&sid),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = hospital_router(ctx);
        let response = app
            .oneshot(get_request(&format!("/patient_history/{pid}"), Some(&sid)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["patient"]["name"], "Dana Reed");
        assert_eq!(json["records"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn history_for_missing_patient_bounces_to_registry() {
        let (ctx, _tmp) = test_ctx();
        let sid = open_session(&ctx, "drgray", Role::Doctor);
        let app = hospital_router(ctx);

        let response = app
            .oneshot(get_request("/patient_history/404", Some(&sid)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/view_patients");
    }

    #[tokio::test]
    async fn unknown_route_is_plain_404() {
        let (ctx, _tmp) = test_ctx();
        let app = hospital_router(ctx);

        let response = app
            .oneshot(get_request("/no_such_page", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
