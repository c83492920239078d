//! ISF Playground - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use rand::Rng;
use sqlx::types::Json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use isf_playground_backend::models::role::{Action, PermissionEntry};
use isf_playground_backend::services::auth_service::AuthService;
use isf_playground_backend::{api, db, Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "isf_playground_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting ISF Playground backend");

    // Connect to database
    let db_pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // Seed built-in roles and the first admin account
    seed_default_roles(&db_pool).await?;
    provision_admin_user(&db_pool).await?;

    let state = Arc::new(api::AppState::new(config.clone(), db_pool)?);

    let app = api::routes::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|e| isf_playground_backend::AppError::Config(format!("Invalid bind address: {}", e)))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Insert the built-in roles if they are missing. Existing roles are never
/// overwritten, so operator customizations survive restarts.
async fn seed_default_roles(db: &sqlx::PgPool) -> Result<()> {
    let all = vec![Action::Create, Action::Read, Action::Update, Action::Delete];
    let admin_permissions = vec![
        PermissionEntry {
            module: "Purchase and Repair".to_string(),
            actions: all.clone(),
        },
        PermissionEntry {
            module: "Role Management".to_string(),
            actions: all,
        },
    ];
    let coach_permissions = vec![PermissionEntry {
        module: "Purchase and Repair".to_string(),
        actions: vec![Action::Read],
    }];

    for (name, permissions) in [("admin", admin_permissions), ("coach", coach_permissions)] {
        let result = sqlx::query(
            "INSERT INTO roles (name, permissions) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(Json(permissions))
        .execute(db)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(role = name, "Seeded built-in role");
        }
    }

    Ok(())
}

/// Provision the initial admin user on first boot.
///
/// Uses `ADMIN_PASSWORD` when set; otherwise generates a random password and
/// logs it once so the operator can complete the first login.
async fn provision_admin_user(db: &sqlx::PgPool) -> Result<()> {
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    if user_count > 0 {
        return Ok(());
    }

    let (password, generated) = match std::env::var("ADMIN_PASSWORD") {
        Ok(p) if !p.is_empty() => (p, false),
        _ => {
            const CHARSET: &[u8] =
                b"abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789!@#$%&*";
            let mut rng = rand::rng();
            let p: String = (0..20)
                .map(|_| {
                    let idx = rng.random_range(0..CHARSET.len());
                    CHARSET[idx] as char
                })
                .collect();
            (p, true)
        }
    };

    let password_hash = AuthService::hash_password(&password)?;

    sqlx::query(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ('Administrator', 'admin@localhost', $1, 'admin')
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(&password_hash)
    .execute(db)
    .await?;

    if generated {
        tracing::info!(
            "\n\
            ===========================================================\n\
            \n\
              Initial admin user created.\n\
            \n\
              Email:     admin@localhost\n\
              Password:  {}\n\
            \n\
              Change this password after the first login.\n\
            \n\
            ===========================================================",
            password
        );
    } else {
        tracing::info!("Admin user created with password from ADMIN_PASSWORD env var");
    }

    Ok(())
}
