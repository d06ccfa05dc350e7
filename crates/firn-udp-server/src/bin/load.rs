//! Load driver for the firn UDP id service.
//!
//! Hammers a running server with get-id requests from N concurrent
//! client tasks and prints per-interval success/failure tallies, in
//! aggregate and per task. Packet loss surfaces in the error column via
//! a receive timeout rather than wedging a task.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::BytesMut;
use clap::Parser;
use firn_udp_core::{MAX_DATAGRAM, Request, Response};
use tokio::net::UdpSocket;
use tokio::time::timeout;

// Using mimalloc for better performance under contention, especially in
// musl environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// A datagram unanswered for this long counts as an error.
const RECV_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Parser, Debug, Clone)]
#[command(
    name = "firn-udp-load",
    version,
    about = "Measure how many ids/second a firn UDP server can serve"
)]
struct CliArgs {
    /// Address of the server to drive.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("127.0.0.1:9999"))]
    addr: String,

    /// Number of concurrent client tasks. Defaults to the number of
    /// logical CPUs.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Seconds between tally reports.
    #[arg(long, default_value_t = 1)]
    report_seconds: u64,
}

#[derive(Default)]
struct TaskCounts {
    ok: AtomicU64,
    error: AtomicU64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    firn_udp_server::telemetry::init_tracing();

    let concurrency = args.concurrency.unwrap_or_else(num_cpus::get);
    let counts: Vec<Arc<TaskCounts>> = (0..concurrency)
        .map(|_| Arc::new(TaskCounts::default()))
        .collect();

    for task_counts in &counts {
        tokio::spawn(request_loop(args.addr.clone(), Arc::clone(task_counts)));
    }
    let reporter = tokio::spawn(report_loop(counts, args.report_seconds));

    tokio::signal::ctrl_c().await?;
    reporter.abort();
    Ok(())
}

/// Requests ids as fast as possible, forever, tallying outcomes.
async fn request_loop(addr: String, counts: Arc<TaskCounts>) {
    let socket = match connect(&addr).await {
        Ok(socket) => socket,
        Err(e) => {
            tracing::error!("client socket setup for {addr} failed: {e}");
            return;
        }
    };

    let mut request = BytesMut::new();
    Request::GetId.encode(&mut request);
    let request = request.freeze();

    let mut buf = [0u8; MAX_DATAGRAM];
    loop {
        if socket.send(&request).await.is_err() {
            counts.error.fetch_add(1, Ordering::Relaxed);
            continue;
        }

        let response = match timeout(RECV_TIMEOUT, socket.recv(&mut buf)).await {
            Ok(Ok(len)) => Response::decode(&buf[..len]).ok(),
            // Timed out or failed to receive: the request is lost.
            Ok(Err(_)) | Err(_) => None,
        };
        match response {
            Some(Response::Id(_)) => counts.ok.fetch_add(1, Ordering::Relaxed),
            _ => counts.error.fetch_add(1, Ordering::Relaxed),
        };
    }
}

async fn connect(addr: &str) -> std::io::Result<UdpSocket> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(addr).await?;
    Ok(socket)
}

/// Prints aggregate and per-task tallies once per interval, resetting
/// the counters each time.
async fn report_loop(counts: Vec<Arc<TaskCounts>>, report_seconds: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(report_seconds.max(1)));
    // The first tick completes immediately; skip it so the first report
    // covers a full interval.
    interval.tick().await;

    loop {
        interval.tick().await;
        let ok: Vec<u64> = counts.iter().map(|c| c.ok.swap(0, Ordering::Relaxed)).collect();
        let error: Vec<u64> = counts
            .iter()
            .map(|c| c.error.swap(0, Ordering::Relaxed))
            .collect();
        println!(
            "ok: {}, error: {}; ok: {:?}, error: {:?}",
            ok.iter().sum::<u64>(),
            error.iter().sum::<u64>(),
            ok,
            error
        );
    }
}
