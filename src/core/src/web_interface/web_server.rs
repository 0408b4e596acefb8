use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use warp::Filter;

use super::routes::{
    correlation_route, select_route, services_route, tags_route, zoom_route, ApiContext,
};
use crate::error_handling::types::WebError;

/// Web server for the correlation JSON API
pub struct WebServer {
    ctx: Arc<ApiContext>,
}

impl WebServer {
    pub fn new(ctx: ApiContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Serves the API on `0.0.0.0:port` until the task is dropped.
    pub async fn start(&self, port: u16) -> Result<(), WebError> {
        if port == 0 {
            return Err(WebError::InvalidRequest(
                "refusing to serve on port 0".to_string(),
            ));
        }

        // Zoom and select are matched before the plain view route.
        let routes = zoom_route()
            .or(select_route(self.ctx.clone()))
            .or(correlation_route(self.ctx.clone()))
            .or(services_route(self.ctx.clone()))
            .or(tags_route(self.ctx.clone()))
            .with(warp::log("corrie::web"));

        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        info!("Web interface listening on http://{}", addr);
        warp::serve(routes).run(addr).await;

        Ok(())
    }
}
