//! HTTP panel server.

use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::{LightPatch, PanelState};

#[derive(Debug, thiserror::Error)]
pub enum DebugServerError {
    #[error("Failed to bind to port {port}: {error}")]
    BindError { port: u16, error: String },
    #[error("Failed to spawn panel thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Panel state lock poisoned")]
    StatePoisoned,
    #[error("Failed to write response: {0}")]
    Respond(#[source] std::io::Error),
}

/// HTTP server for the light panel.
/// Runs on a background thread so requests never block a frame.
pub struct DebugServer {
    port: u16,
    actual_port: Option<u16>,
    server: Option<Arc<Server>>,
    handle: Option<JoinHandle<()>>,
    patches: Sender<LightPatch>,
}

#[derive(Deserialize)]
struct Command {
    command: String,
}

#[derive(Serialize)]
struct CommandResponse {
    executed: bool,
    command: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: f64,
}

#[derive(Serialize)]
struct PatchResponse {
    accepted: bool,
    light: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type HttpResponse = Response<Cursor<Vec<u8>>>;

impl DebugServer {
    pub fn new(port: u16, patches: Sender<LightPatch>) -> Self {
        Self {
            port,
            actual_port: None,
            server: None,
            handle: None,
            patches,
        }
    }

    pub fn start(&mut self, state: Arc<Mutex<PanelState>>) -> Result<(), DebugServerError> {
        let server = Server::http(format!("127.0.0.1:{}", self.port)).map_err(|e| {
            DebugServerError::BindError {
                port: self.port,
                error: e.to_string(),
            }
        })?;
        let server = Arc::new(server);

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.port);
        self.actual_port = Some(actual_port);

        let worker_server = Arc::clone(&server);
        let patches = self.patches.clone();
        let handle = thread::Builder::new()
            .name("solar-debug".to_string())
            .spawn(move || Self::run_server(&worker_server, &state, &patches))
            .map_err(DebugServerError::Spawn)?;

        self.server = Some(server);
        self.handle = Some(handle);
        Ok(())
    }

    /// Unblock the accept loop and wait for the thread to finish.
    pub fn stop(&mut self) {
        if let Some(server) = self.server.take() {
            server.unblock();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.port)
    }

    fn run_server(server: &Server, state: &Mutex<PanelState>, patches: &Sender<LightPatch>) {
        for request in server.incoming_requests() {
            if let Err(e) = Self::handle_request(request, state, patches) {
                tracing::warn!("Debug panel request failed: {e}");
            }
        }
        tracing::debug!("Debug panel stopped");
    }

    fn handle_request(
        mut request: Request,
        state: &Mutex<PanelState>,
        patches: &Sender<LightPatch>,
    ) -> Result<(), DebugServerError> {
        let path = request.url().split('?').next().unwrap_or_default().to_string();
        let method = request.method().clone();

        let response = match (&method, path.as_str()) {
            (Method::Get, "/health") => {
                let state = state.lock().map_err(|_| DebugServerError::StatePoisoned)?;
                json_response(
                    200,
                    &HealthResponse {
                        status: "ok",
                        uptime_seconds: state.uptime_seconds,
                    },
                )
            }
            (Method::Get, "/metrics") => {
                let state = state.lock().map_err(|_| DebugServerError::StatePoisoned)?;
                json_response(200, &*state)
            }
            (Method::Get, "/lights") => {
                let state = state.lock().map_err(|_| DebugServerError::StatePoisoned)?;
                json_response(200, &state.lights)
            }
            (Method::Post, "/command") => match read_json::<Command>(&mut request) {
                Ok(command) => {
                    let executed = command.command == "quit";
                    if executed {
                        state
                            .lock()
                            .map_err(|_| DebugServerError::StatePoisoned)?
                            .quit_requested = true;
                        tracing::info!("Quit requested from debug panel");
                    }
                    json_response(
                        200,
                        &CommandResponse {
                            executed,
                            command: command.command,
                        },
                    )
                }
                Err(message) => error_response(400, message),
            },
            (Method::Post, route) if route.starts_with("/lights/") => {
                Self::patch_light(&mut request, &route["/lights/".len()..], state, patches)?
            }
            _ => Response::from_string("Not Found").with_status_code(404),
        };

        request.respond(response).map_err(DebugServerError::Respond)
    }

    fn patch_light(
        request: &mut Request,
        index: &str,
        state: &Mutex<PanelState>,
        patches: &Sender<LightPatch>,
    ) -> Result<HttpResponse, DebugServerError> {
        let light_count = state
            .lock()
            .map_err(|_| DebugServerError::StatePoisoned)?
            .lights
            .len();
        let Some(light) = index.parse::<usize>().ok().filter(|&i| i < light_count) else {
            return Ok(error_response(404, format!("no light at index {index}")));
        };

        let mut patch = match read_json::<LightPatch>(request) {
            Ok(patch) => patch,
            Err(message) => return Ok(error_response(400, message)),
        };
        patch.light = light;

        if patches.send(patch).is_err() {
            return Ok(error_response(503, "viewer is shutting down".to_string()));
        }
        Ok(json_response(
            200,
            &PatchResponse {
                accepted: true,
                light,
            },
        ))
    }
}

impl Drop for DebugServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(request: &mut Request) -> Result<T, String> {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .map_err(|e| e.to_string())?;
    serde_json::from_str(&body).map_err(|e| e.to_string())
}

fn json_response<T: Serialize + ?Sized>(status: u16, body: &T) -> HttpResponse {
    match serde_json::to_string(body) {
        Ok(json) => with_json_header(Response::from_string(json).with_status_code(status)),
        Err(e) => Response::from_string(e.to_string()).with_status_code(500),
    }
}

fn error_response(status: u16, error: String) -> HttpResponse {
    json_response(status, &ErrorResponse { error })
}

fn with_json_header(response: HttpResponse) -> HttpResponse {
    match Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
