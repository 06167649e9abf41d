//! Remote injection endpoint (feature `server`).
//!
//! Spec §1 places the particular RPC serialization out of scope and §9 asks
//! only that the transport stay pluggable; the original uses Python's
//! `xmlrpc.server.SimpleXMLRPCServer` on a background thread. This crate's
//! equivalent is a minimal line-delimited JSON-over-TCP server, run on a
//! plain `std::thread::spawn`'d thread rather than an async runtime, to
//! match the teacher's zero-async-runtime style. A request is
//! `{"port": "...", "values": [...], "e": ...}`; the response is
//! `{"ok": true/false}`.
//!
//! No mutex is provided around the wrapped coordinator beyond what callers
//! supply via the `Arc<Mutex<_>>` they hand to [`serve`] — per spec §4.5,
//! the simulation must be paused or the embedder must otherwise prevent
//! interference between RPC dispatch and driver stepping.

use crate::sim::coordinator::Coordinator;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

#[derive(Debug, Deserialize)]
struct InjectRequest {
    port: String,
    values: Vec<serde_json::Value>,
    e: f64,
}

#[derive(Debug, Serialize)]
struct InjectResponse {
    ok: bool,
}

/// Starts the RPC endpoint on a background thread and returns its join
/// handle. `legacy_compat` is forwarded to every
/// [`Coordinator::inject_named`] call (spec §9's preserved quirks).
pub fn serve(
    host: &str,
    port: u16,
    coordinator: Arc<Mutex<Coordinator>>,
    legacy_compat: bool,
) -> std::io::Result<JoinHandle<()>> {
    let listener = TcpListener::bind((host, port))?;
    debug!("xdevs rpc server listening on {host}:{port}");
    Ok(std::thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let coordinator = coordinator.clone();
                    std::thread::spawn(move || handle_connection(stream, coordinator, legacy_compat));
                }
                Err(e) => error!("rpc accept error: {e}"),
            }
        }
    }))
}

fn handle_connection(stream: TcpStream, coordinator: Arc<Mutex<Coordinator>>, legacy_compat: bool) {
    let peer = stream.peer_addr().ok();
    let reader = match stream.try_clone() {
        Ok(s) => BufReader::new(s),
        Err(e) => {
            error!("rpc failed to clone stream for {peer:?}: {e}");
            return;
        }
    };
    let mut writer = stream;
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("rpc read error from {peer:?}: {e}");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<InjectRequest>(&line) {
            Ok(req) => {
                let mut coord = coordinator.lock().expect("coordinator mutex poisoned");
                match coord.inject_named(&req.port, req.values, req.e, legacy_compat) {
                    Ok(ok) => InjectResponse { ok },
                    Err(e) => {
                        error!("rpc inject error: {e}");
                        InjectResponse { ok: false }
                    }
                }
            }
            Err(e) => {
                error!("rpc malformed request from {peer:?}: {e}");
                InjectResponse { ok: false }
            }
        };
        let body = match serde_json::to_string(&response) {
            Ok(b) => b,
            Err(e) => {
                error!("rpc failed to encode response: {e}");
                return;
            }
        };
        if writeln!(writer, "{body}").is_err() {
            return;
        }
    }
}
