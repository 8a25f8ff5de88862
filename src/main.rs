mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth;
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::checkout::{routes as checkout_routes, CheckoutService};
use crate::features::covers::{routes as covers_routes, CoverService, GenerationService};
use crate::features::pdfs::{routes as pdfs_routes, PdfService};
use crate::features::prompts::{routes as prompts_routes, PromptService};
use crate::features::tags::{routes as tags_routes, TagService};
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::generation::{ImageGenerator, ReplicateClient};
use crate::modules::llm::{ChatCompletionsClient, PromptOptimizer};
use crate::modules::payments::{PaymentGateway, StripeClient};
use crate::modules::storage::{MinIOClient, ObjectStorage};
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::Router;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(fmt_layer)
        .init();
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized (issuer: {})", config.auth.issuer);

    // External clients
    let minio_client = MinIOClient::new(config.minio.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?;
    tracing::info!("Object storage ready (bucket: {})", minio_client.bucket_name());
    let storage: Arc<dyn ObjectStorage> = Arc::new(minio_client);

    let generator: Arc<dyn ImageGenerator> = Arc::new(
        ReplicateClient::new(config.generation.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize image generator: {}", e))?,
    );
    tracing::info!("Image generator initialized (model: {})", config.generation.model);

    let optimizer: Arc<dyn PromptOptimizer> = Arc::new(
        ChatCompletionsClient::new(config.llm.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize LLM client: {}", e))?,
    );
    tracing::info!("Prompt optimizer initialized (model: {})", config.llm.model);

    let gateway: Arc<dyn PaymentGateway> = Arc::new(
        StripeClient::new(config.payment.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize payment gateway: {}", e))?,
    );
    tracing::info!("Payment gateway initialized");

    // Services
    let user_service = Arc::new(UserService::new(pool.clone(), config.credits.clone()));
    let category_service = Arc::new(CategoryService::new(pool.clone()));
    let cover_service = Arc::new(CoverService::new(pool.clone()));
    let tag_service = Arc::new(TagService::new(pool.clone(), Arc::clone(&cover_service)));
    let generation_service = Arc::new(GenerationService::new(
        Arc::clone(&user_service),
        Arc::clone(&cover_service),
        Arc::clone(&category_service),
        Arc::clone(&tag_service),
        generator,
        Arc::clone(&storage),
    ));
    let pdf_service = Arc::new(PdfService::new(
        pool.clone(),
        Arc::clone(&cover_service),
        storage,
    ));
    let prompt_service = Arc::new(PromptService::new(optimizer));
    let checkout_service = Arc::new(CheckoutService::new(
        pool.clone(),
        Arc::clone(&user_service),
        gateway,
    ));
    tracing::info!("Services initialized");

    // Swagger
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn_with_state(
                Arc::new(credentials),
                middleware::basic_auth_middleware,
            ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(covers_routes::protected_routes(
            Arc::clone(&cover_service),
            generation_service,
        ))
        .merge(users_routes::routes(
            Arc::clone(&user_service),
            Arc::clone(&cover_service),
        ))
        .merge(pdfs_routes::protected_routes(Arc::clone(&pdf_service)))
        .merge(checkout_routes::routes(checkout_service))
        .merge(categories_routes::admin_routes(Arc::clone(&category_service)))
        .merge(tags_routes::admin_routes(Arc::clone(&tag_service)))
        .merge(covers_routes::admin_routes(Arc::clone(&cover_service)))
        .route_layer(from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Public routes; a valid token still identifies the viewer
    let public_routes = Router::new()
        .merge(categories_routes::routes(category_service))
        .merge(covers_routes::routes(cover_service))
        .merge(tags_routes::routes(tag_service))
        .merge(pdfs_routes::routes(pdf_service))
        .merge(prompts_routes::routes(prompt_service))
        .route_layer(from_fn_with_state(
            jwt_validator,
            middleware::optional_auth_middleware,
        ));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
