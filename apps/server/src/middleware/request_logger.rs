//! Request logging middleware.
//!
//! One line when a request arrives and one when it completes, under target
//! `api`. GitHub webhook deliveries are tagged with their delivery id so a
//! log line can be matched to the delivery in GitHub's webhook UI.

use std::future::{Ready, ready};
use std::time::{Duration, Instant};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::config::{DELIVERY_HEADER, EVENT_HEADER};

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

/// Request logger middleware service.
pub struct RequestLoggerMiddleware<S> {
    service: S,
}

/// What gets logged about a request, captured before it is handed on.
struct RequestLine {
    method: String,
    path: String,
    /// `event/delivery-id` for GitHub webhooks, `-` otherwise.
    delivery: String,
}

impl RequestLine {
    fn capture(req: &ServiceRequest) -> Self {
        let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());

        let delivery = match (header(EVENT_HEADER), header(DELIVERY_HEADER)) {
            (Some(event), Some(id)) => format!("{}/{}", event, id),
            (None, Some(id)) => id.to_string(),
            _ => "-".to_string(),
        };

        Self {
            method: req.method().to_string(),
            path: req.path().to_string(),
            delivery,
        }
    }

    fn started(&self, remote_addr: &str) {
        info!(
            target: "api",
            method = %self.method,
            path = %self.path,
            remote_addr = %remote_addr,
            delivery = %self.delivery,
            "→ {} {}",
            self.method,
            self.path
        );
    }

    fn finished(&self, status: StatusCode, elapsed: Duration) {
        let status_code = status.as_u16();
        let duration_ms = elapsed.as_millis();

        if status.is_server_error() {
            error!(
                target: "api",
                method = %self.method,
                path = %self.path,
                status = status_code,
                duration_ms,
                delivery = %self.delivery,
                "← {} {} failed",
                self.method,
                self.path
            );
        } else if status.is_client_error() {
            warn!(
                target: "api",
                method = %self.method,
                path = %self.path,
                status = status_code,
                duration_ms,
                delivery = %self.delivery,
                "← {} {} rejected",
                self.method,
                self.path
            );
        } else {
            info!(
                target: "api",
                method = %self.method,
                path = %self.path,
                status = status_code,
                duration_ms,
                "← {} {}",
                self.method,
                self.path
            );
        }
    }
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let line = RequestLine::capture(&req);
        line.started(req.connection_info().realip_remote_addr().unwrap_or("unknown"));

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            line.finished(res.status(), start.elapsed());
            Ok(res)
        })
    }
}
