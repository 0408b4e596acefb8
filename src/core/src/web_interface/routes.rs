use std::sync::Arc;

use log::{debug, error, warn};
use serde::Serialize;
use warp::{http::StatusCode, reply, Filter, Rejection, Reply};

use super::types::{ApiError, CorrelationResponse, LocationResponse};
use crate::aggregation::Correlator;
use crate::error_handling::types::{QueryError, WebError};
use crate::filter_state::codec::query_value;
use crate::filter_state::{decode, encode};
use crate::flow::Service;
use crate::flow_store::FlowStore;
use crate::interaction::{zoom_state, ChartEvent, InteractionMapper};
use crate::navigation::{Location, CORRELATION_PATH};
use crate::view::ViewSettings;

/// Dependencies shared by every route. Requests are stateless: each one
/// decodes its own filter from the query string.
pub struct ApiContext {
    store: Arc<dyn FlowStore>,
    services: Vec<Service>,
    settings: ViewSettings,
    correlator: Correlator,
}

impl ApiContext {
    pub fn new(store: Arc<dyn FlowStore>, services: Vec<Service>, settings: ViewSettings) -> Self {
        let correlator = Correlator::new(settings.bucketing.clone());
        Self {
            store,
            services,
            settings,
            correlator,
        }
    }

    async fn known_services(&self) -> Result<Vec<Service>, QueryError> {
        if !self.services.is_empty() {
            return Ok(self.services.clone());
        }
        self.store.services().await
    }
}

/// Serializes a handler result, mapping errors to their status code.
pub fn into_reply<T: Serialize>(result: Result<T, WebError>) -> reply::Response {
    match result {
        Ok(body) => reply::with_status(reply::json(&body), StatusCode::OK).into_response(),
        Err(e) => {
            let status = match e {
                WebError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                WebError::NotFound(_) => StatusCode::NOT_FOUND,
                WebError::Query(_) => StatusCode::BAD_GATEWAY,
            };
            if status == StatusCode::BAD_GATEWAY {
                error!("{}", e);
            } else {
                debug!("Rejected request: {}", e);
            }
            reply::with_status(
                reply::json(&ApiError {
                    message: e.to_string(),
                }),
                status,
            )
            .into_response()
        }
    }
}

pub async fn list_services(ctx: &ApiContext) -> Result<Vec<Service>, WebError> {
    Ok(ctx.known_services().await?)
}

pub async fn list_tags(ctx: &ApiContext) -> Result<Vec<String>, WebError> {
    Ok(ctx.store.tags().await?)
}

/// Decodes the filter, queries the store and aggregates for its mode.
pub async fn correlate(ctx: &ApiContext, raw_query: &str) -> Result<CorrelationResponse, WebError> {
    let filter = decode(raw_query);
    let services = ctx.known_services().await.unwrap_or_else(|e| {
        warn!("Could not load services, service filter disabled: {}", e);
        Vec::new()
    });
    let query = filter.to_query(&services, ctx.settings.tag_match);
    let flows = ctx.store.query(&query).await?;
    let correlation = ctx.correlator.correlate(&flows, filter.mode());
    Ok(CorrelationResponse {
        filter,
        query,
        correlation,
    })
}

/// Location of the flow behind point `index` of the correlation.
pub async fn select(
    ctx: &ApiContext,
    index: usize,
    raw_query: &str,
) -> Result<LocationResponse, WebError> {
    let response = correlate(ctx, raw_query).await?;
    InteractionMapper::default()
        .map(
            &ChartEvent::PointSelected(index),
            &response.correlation,
            &response.filter,
        )
        .map(|request| LocationResponse::from(request.location()))
        .ok_or_else(|| WebError::NotFound(format!("no selectable flow at index {}", index)))
}

fn bound(raw_query: &str, key: &str) -> Result<f64, WebError> {
    let value = query_value(raw_query, key)
        .ok_or_else(|| WebError::InvalidRequest(format!("missing {}", key)))?;
    value
        .parse::<f64>()
        .map_err(|e| WebError::InvalidRequest(format!("{} = {:?}: {}", key, value, e)))
}

/// Location of the view narrowed to `[min, max]`.
pub fn zoom(raw_query: &str) -> Result<LocationResponse, WebError> {
    let min = bound(raw_query, "min")?;
    let max = bound(raw_query, "max")?;
    let next = zoom_state(min, max, &decode(raw_query))
        .ok_or_else(|| WebError::InvalidRequest("zoom bounds must be finite".to_string()))?;
    Ok(LocationResponse::from(Location::new(
        CORRELATION_PATH,
        encode(&next),
    )))
}

/// GET /services
pub fn services_route(
    ctx: Arc<ApiContext>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("services")
        .and(warp::get())
        .and_then(move || {
            let ctx = ctx.clone();
            async move { Ok::<_, Rejection>(into_reply(list_services(&ctx).await)) }
        })
}

/// GET /tags
pub fn tags_route(
    ctx: Arc<ApiContext>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("tags")
        .and(warp::get())
        .and_then(move || {
            let ctx = ctx.clone();
            async move { Ok::<_, Rejection>(into_reply(list_tags(&ctx).await)) }
        })
}

/// GET /corrie?<filter>
pub fn correlation_route(
    ctx: Arc<ApiContext>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("corrie")
        .and(warp::get())
        .and(warp::query::raw().or(warp::any().map(String::new)).unify())
        .and_then(move |query: String| {
            let ctx = ctx.clone();
            async move { Ok::<_, Rejection>(into_reply(correlate(&ctx, &query).await)) }
        })
}

/// GET /corrie/select/:index?<filter>
pub fn select_route(
    ctx: Arc<ApiContext>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("corrie" / "select" / usize)
        .and(warp::get())
        .and(warp::query::raw().or(warp::any().map(String::new)).unify())
        .and_then(move |index: usize, query: String| {
            let ctx = ctx.clone();
            async move { Ok::<_, Rejection>(into_reply(select(&ctx, index, &query).await)) }
        })
}

/// GET /corrie/zoom?min=&max=&<filter>
pub fn zoom_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("corrie" / "zoom")
        .and(warp::get())
        .and(warp::query::raw().or(warp::any().map(String::new)).unify())
        .and_then(|query: String| async move { Ok::<_, Rejection>(into_reply(zoom(&query))) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_state::{CorrelationMode, FlowQuery, TimeRange};
    use crate::flow::types::fixtures::{flow, tagged};
    use crate::flow::Flow;
    use crate::flow_store::MemoryFlowStore;
    use async_trait::async_trait;
    use std::net::{IpAddr, Ipv4Addr};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn trademark() -> Service {
        Service {
            name: "Trademark".to_string(),
            ip: IpAddr::V4(Ipv4Addr::new(10, 60, 4, 1)),
            port: 5000,
        }
    }

    fn context(services: Vec<Service>) -> ApiContext {
        let store = MemoryFlowStore::new(
            vec![
                flow("a", 1000),
                tagged("b", 2000, &["flag-out"]),
                flow("c", 3000),
            ],
            vec![trademark()],
        );
        ApiContext::new(Arc::new(store), services, ViewSettings::default())
    }

    struct DownStore;

    #[async_trait]
    impl FlowStore for DownStore {
        async fn query(&self, _query: &FlowQuery) -> Result<Vec<Flow>, QueryError> {
            Err(QueryError::Timeout)
        }

        async fn tags(&self) -> Result<Vec<String>, QueryError> {
            Err(QueryError::Timeout)
        }

        async fn services(&self) -> Result<Vec<Service>, QueryError> {
            Err(QueryError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_correlate() {
        init();
        let ctx = context(vec![trademark()]);

        let response = correlate(&ctx, "service=Trademark&correlation=packets")
            .await
            .unwrap();

        assert_eq!(response.filter.mode(), CorrelationMode::Packets);
        assert_eq!(response.query.dst_port, Some(5000));
        assert_eq!(response.correlation.mode, CorrelationMode::Packets);
        assert_eq!(response.correlation.flow_ids.len(), 3);
        assert_eq!(response.correlation.point_count(), 3);
    }

    #[tokio::test]
    async fn test_services_fall_back_to_store() {
        init();
        let ctx = context(Vec::new());
        assert_eq!(list_services(&ctx).await.unwrap(), vec![trademark()]);
        assert_eq!(list_tags(&ctx).await.unwrap(), vec!["flag-out".to_string()]);
    }

    #[tokio::test]
    async fn test_select() {
        init();
        let ctx = context(Vec::new());
        let query = "from=0&to=5000&correlation=time";

        let response = select(&ctx, 1, query).await.unwrap();
        assert_eq!(response.path, "/flow/b");
        assert_eq!(response.query, encode(&decode(query)));
        assert_eq!(response.location, format!("/flow/b?{}", response.query));

        assert!(matches!(
            select(&ctx, 3, query).await,
            Err(WebError::NotFound(_))
        ));
        assert!(matches!(
            select(&ctx, 0, "correlation=tags").await,
            Err(WebError::NotFound(_))
        ));
    }

    #[test]
    fn test_zoom() {
        let response = zoom("min=1000.5&max=2000.2&correlation=packets").unwrap();
        let next = decode(&response.query);

        assert_eq!(response.path, CORRELATION_PATH);
        assert_eq!(next.time_range(), TimeRange::between(1000, 2001));
        assert_eq!(next.mode(), CorrelationMode::Packets);
    }

    #[test]
    fn test_zoom_rejects_bad_bounds() {
        assert!(matches!(zoom("max=10"), Err(WebError::InvalidRequest(_))));
        assert!(matches!(
            zoom("min=abc&max=10"),
            Err(WebError::InvalidRequest(_))
        ));
        assert!(matches!(
            zoom("min=NaN&max=10"),
            Err(WebError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_bad_gateway() {
        init();
        let ctx = ApiContext::new(Arc::new(DownStore), Vec::new(), ViewSettings::default());

        let result = correlate(&ctx, "").await;
        assert!(matches!(result, Err(WebError::Query(QueryError::Timeout))));
        assert_eq!(into_reply(result).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_into_reply_status() {
        assert_eq!(into_reply(Ok(vec![1, 2])).status(), StatusCode::OK);
        assert_eq!(
            into_reply::<()>(Err(WebError::InvalidRequest("x".to_string()))).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            into_reply::<()>(Err(WebError::NotFound("x".to_string()))).status(),
            StatusCode::NOT_FOUND
        );
    }
}
