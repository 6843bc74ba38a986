//! ServerBuilder for fluent API to build HTTP servers

use super::registry::{ListingEndpoint, ListingRegistry};
use super::router::{build_listing_routes, health_routes};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for creating HTTP servers exposing registered listings
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .register(Listing::new(orders_schema, InMemoryStore::<Order>::new()))
///     .build();
/// ```
pub struct ServerBuilder {
    registry: ListingRegistry,
    custom_routes: Vec<Router>,
    cors: Option<CorsLayer>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            registry: ListingRegistry::new(),
            custom_routes: Vec::new(),
            cors: None,
        }
    }

    /// Register a listing under its collection name
    pub fn register(self, listing: impl ListingEndpoint + 'static) -> Self {
        self.register_arc(Arc::new(listing))
    }

    /// Register an already shared listing
    pub fn register_arc(mut self, listing: Arc<dyn ListingEndpoint>) -> Self {
        tracing::debug!(collection = %listing.name(), "registering listing");
        self.registry.register(listing);
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for routes that are not listing queries, such as
    /// authentication endpoints or row detail pages.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{Router, routing::get};
    ///
    /// let extra = Router::new().route("/orders/{id}", get(get_order));
    ///
    /// ServerBuilder::new()
    ///     .register(orders)
    ///     .with_custom_routes(extra)
    ///     .build();
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Apply a CORS policy to every route
    pub fn with_cors(mut self, cors: CorsLayer) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Registered collection names, sorted
    pub fn collections(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Build the final router
    ///
    /// Custom routes must not overlap the listing routes; axum panics on
    /// overlapping merges.
    pub fn build(self) -> Router {
        if self.registry.is_empty() {
            tracing::warn!("building a server without any registered listing");
        }

        let mut app = health_routes();
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }
        app = app.merge(build_listing_routes(Arc::new(self.registry)));

        let app = app.layer(TraceLayer::new_for_http());
        match self.cors {
            Some(cors) => app.layer(cors),
            None => app,
        }
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .register(orders)
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
