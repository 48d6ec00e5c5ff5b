mod config;
mod context;
pub mod files;

pub use config::*;
pub use context::*;

use std::sync::Arc;

use crate::reload::{ReloadChannel, ws_handler};
use crate::server::files::serve_static_handler;
use axum::Router;
use axum::routing::get;
use kiln_shared::KilnResult;
use tokio::net::TcpListener;

/// Path of the reload socket endpoint.
pub const RELOAD_PATH: &str = "/__ws";

pub struct Server {
    pub ctx: Arc<Context>,
    reload: Arc<ReloadChannel>,
}

impl Server {
    pub fn new(ctx: Arc<Context>, reload: Arc<ReloadChannel>) -> Self {
        Self { ctx, reload }
    }

    #[inline(always)]
    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    #[inline(always)]
    pub fn reload(&self) -> &Arc<ReloadChannel> {
        &self.reload
    }

    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route(RELOAD_PATH, get(ws_handler))
            .fallback(serve_static_handler)
            .with_state(self)
    }

    pub async fn serve(self) -> KilnResult {
        let tcp = TcpListener::bind(self.ctx.address()).await?;
        let app = Arc::new(self).router();

        axum::serve(tcp, app).await.map_err(Into::into)
    }
}
