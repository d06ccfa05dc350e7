use anyhow::bail;
use clap::Parser;
use firn::GlobalId;
use firn_udp_core::WireId;

/// Runtime configuration for the `firn-udp-server` binary.
///
/// All values are parsed from CLI arguments or environment variables.
/// The node id has no default on purpose: it is the one piece of
/// identity that must be assigned externally and must never collide
/// between live nodes.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "firn-udp-server",
    version,
    about = "A UDP request/response service issuing globally-unique ids"
)]
pub struct CliArgs {
    /// Address to bind the UDP socket on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("127.0.0.1:9999"))]
    pub addr: String,

    /// Node id encoded into every issued id.
    ///
    /// Must be unique among simultaneously running nodes and stable for
    /// the lifetime of this process.
    ///
    /// Environment variable: `NODE_ID`
    #[arg(long, env = "NODE_ID")]
    pub node_id: u64,

    /// Number of worker tasks serving requests concurrently.
    ///
    /// Each worker owns a generator pinned to a distinct subnode, so
    /// the workers share the node's per-second id budget rather than
    /// multiplying it. Defaults to the number of logical CPUs.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS")]
    pub workers: Option<usize>,
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub node_id: u64,
    pub workers: usize,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let workers = args.workers.unwrap_or_else(num_cpus::get);
        if workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        if args.node_id > WireId::max_node_id() {
            bail!(
                "NODE_ID ({}) exceeds the id layout's node id space (max = {})",
                args.node_id,
                WireId::max_node_id()
            );
        }

        Ok(Self {
            addr: args.addr,
            node_id: args.node_id,
            workers,
        })
    }
}
