#![allow(dead_code)]

use notices::models::{
    notice, notice_setting, Notice, NoticeModel, NoticeSetting, NoticeSettingModel,
};
use reqwest::{redirect::Policy, Client, Response};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Statement,
};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Once, OnceLock,
};

static INIT: Once = Once::new();
static MIGRATED: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();
static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub const TEST_PASSWORD: &str = "test_password_123";

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        let config = notices::config::jwt::JwtConfig::from_env().unwrap();
        let _ = notices::utils::jwt::init_jwt_config(config);
    });
}

/// Names unique across tests in this run and across runs against the same database.
pub fn unique(prefix: &str) -> String {
    static RUN_ID: OnceLock<i64> = OnceLock::new();
    let run = RUN_ID.get_or_init(|| chrono::Utc::now().timestamp_millis() % 1_000_000_000);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}_{run}_{n}")
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    /// Does not follow redirects, so mutation responses can be asserted.
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }

    pub fn root_url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    MIGRATED
        .get_or_init(|| async {
            notices::migration::Migrator::up(&db, None)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    let feed_config = notices::config::feed::FeedConfig {
        base_url: "http://notices.test".to_string(),
        max_items: 20,
    };

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(notices::routes::create_routes())
        .layer(axum::middleware::from_fn(
            notices::middleware::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(feed_config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build HTTP client");

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client,
    }
}

pub struct TestUser {
    pub id: i32,
    pub username: String,
    pub token: String,
}

/// Register a user through the API.
pub async fn create_test_user(app: &TestApp, prefix: &str) -> TestUser {
    let username = unique(prefix);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@test.com", username),
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse register response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!(
            "Failed to register user '{}': status={}, body={}",
            username, status, body
        );
    }

    TestUser {
        id: body["data"]["user_id"].as_i64().expect("missing user_id") as i32,
        username,
        token: body["data"]["token"]
            .as_str()
            .expect("missing token")
            .to_string(),
    }
}

pub async fn make_superuser(db: &DatabaseConnection, user_id: i32) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE users SET is_superuser = TRUE WHERE id = $1",
        vec![user_id.into()],
    ))
    .await
    .expect("Failed to make user superuser");
}

/// Create a notice type directly; returns `(id, label)`.
pub async fn create_notice_type(app: &TestApp, default_level: i32) -> (i32, String) {
    let label = unique("type");
    let created = notices::services::notice_type::NoticeTypeService::new(app.db.clone())
        .create(&label, "Test notice", "created by tests", default_level)
        .await
        .expect("Failed to create notice type");
    (created.id, label)
}

pub async fn create_notice(
    app: &TestApp,
    user_id: i32,
    notice_type_id: i32,
    message: &str,
) -> i32 {
    let model = notice::ActiveModel {
        user_id: sea_orm::ActiveValue::Set(user_id),
        notice_type_id: sea_orm::ActiveValue::Set(notice_type_id),
        message: sea_orm::ActiveValue::Set(message.to_string()),
        added: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
        unseen: sea_orm::ActiveValue::Set(true),
        archived: sea_orm::ActiveValue::Set(false),
        on_site: sea_orm::ActiveValue::Set(true),
        ..Default::default()
    };
    model
        .insert(&app.db)
        .await
        .expect("Failed to create notice")
        .id
}

pub async fn find_notice(app: &TestApp, id: i32) -> Option<NoticeModel> {
    Notice::find_by_id(id)
        .one(&app.db)
        .await
        .expect("Failed to load notice")
}

pub async fn settings_for(app: &TestApp, user_id: i32) -> Vec<NoticeSettingModel> {
    NoticeSetting::find()
        .filter(notice_setting::Column::UserId.eq(user_id))
        .all(&app.db)
        .await
        .expect("Failed to load settings")
}

pub fn location(resp: &Response) -> &str {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
