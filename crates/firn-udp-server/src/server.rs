use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use firn::NodeConfig;
use firn_udp_core::{Clock, Generator, MAX_DATAGRAM, OK_RESPONSE_LEN, Request, Response};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// The UDP id service: one bound socket shared by N worker tasks.
///
/// Each worker exclusively owns a [`Generator`] pinned to subnode
/// `worker index` of `workers` under the configured node id. The
/// subnode stride keeps the workers' ids collision-free with no shared
/// state, so the tasks run completely independently; the kernel spreads
/// incoming datagrams across whichever workers are parked in
/// `recv_from`.
pub struct Server {
    socket: Arc<UdpSocket>,
    config: ServerConfig,
}

impl Server {
    /// Binds the service socket.
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(&config.addr).await?);
        Ok(Self { socket, config })
    }

    /// Returns the bound address (useful when binding to port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serves requests until `shutdown` is cancelled.
    ///
    /// Generator construction happens here, after bind: a configuration
    /// the id layout cannot represent fails the whole service rather
    /// than a single worker.
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let workers = self.config.workers;
        let mut handles = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let generator = Generator::with_config(
                NodeConfig::new(self.config.node_id).subnode(worker_id as u64, workers as u64),
                Clock::default(),
            )?;
            handles.push(tokio::spawn(worker_loop(
                worker_id,
                Arc::clone(&self.socket),
                generator,
                shutdown.clone(),
            )));
        }

        for handle in handles {
            handle.await?;
        }

        tracing::info!("all workers stopped");
        Ok(())
    }
}

/// Serves requests on the shared socket until shutdown.
///
/// Per request: receive, decode, generate, respond. Undecodable
/// requests and generation failures are both answered with the failure
/// frame; no error detail crosses the wire.
async fn worker_loop(
    worker_id: usize,
    socket: Arc<UdpSocket>,
    mut generator: Generator,
    shutdown: CancellationToken,
) {
    tracing::trace!("worker {worker_id} started");

    let mut buf = [0u8; MAX_DATAGRAM];
    let mut out = BytesMut::with_capacity(OK_RESPONSE_LEN);

    loop {
        let (len, peer) = tokio::select! {
            received = socket.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    tracing::error!("worker {worker_id} recv failed: {e}");
                    continue;
                }
            },
            () = shutdown.cancelled() => break,
        };

        let response = match Request::decode(&buf[..len]) {
            Ok(Request::GetId) => match generator.get_id() {
                Ok(id) => Response::Id(id),
                Err(e) => {
                    tracing::trace!("worker {worker_id} generation failed: {e}");
                    Response::Failure
                }
            },
            Err(e) => {
                tracing::trace!("worker {worker_id} bad request from {peer}: {e}");
                Response::Failure
            }
        };

        out.clear();
        response.encode(&mut out);
        if let Err(e) = socket.send_to(&out, peer).await {
            tracing::error!("worker {worker_id} send to {peer} failed: {e}");
        }
    }

    tracing::trace!("worker {worker_id} stopped");
}
