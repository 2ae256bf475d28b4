//! Mock flint check service for exercising the HTTP check client.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::{App, HttpResponse, HttpServer, post, web};
use serde::Deserialize;

/// Check request as the mock service received it.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceivedCheck {
    pub repo: String,
    pub sha: String,
    pub date: String,
}

/// Shared mock state.
#[derive(Default)]
pub struct MockFlintState {
    pub received: Vec<ReceivedCheck>,
}

/// Mock flint service running on an ephemeral port.
///
/// Commits whose sha starts with `bad` get one warning, `broken` answers 500,
/// everything else passes.
pub struct MockFlintService {
    pub check_url: String,
    pub state: Arc<Mutex<MockFlintState>>,
}

impl MockFlintService {
    /// Start the mock service.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockFlintState::default()));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let check_url = format!("http://127.0.0.1:{}/check", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(check_endpoint)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Fire and forget; the server lives for the process lifetime
        tokio::spawn(server);

        MockFlintService { check_url, state }
    }

    pub fn received(&self) -> Vec<ReceivedCheck> {
        self.state.lock().unwrap().received.clone()
    }
}

#[post("/check")]
async fn check_endpoint(
    state: web::Data<Arc<Mutex<MockFlintState>>>,
    body: web::Json<ReceivedCheck>,
) -> HttpResponse {
    let check = body.into_inner();
    state.lock().unwrap().received.push(check.clone());

    if check.sha.starts_with("broken") {
        return HttpResponse::InternalServerError().body("flint crashed");
    }

    let warnings: Vec<String> = if check.sha.starts_with("bad") {
        vec![format!("{}: unused import", check.repo)]
    } else {
        vec![]
    };

    HttpResponse::Ok().json(serde_json::json!({ "warnings": warnings }))
}
