use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument};

use crate::commands::{self, executable::Executable};
use crate::config::Config;
use crate::connection::Connection;
use crate::replication::Replication;
use crate::store::Store;
use crate::Error;

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let replication = Replication::new(config.role());

    info!(
        "Server listening on {} as {}",
        listener.local_addr()?,
        replication.role
    );

    serve(listener, replication).await
}

/// Accepts connections forever, each one handled by its own task with its own store.
///
/// There is no bound on the number of connections served at once, and a connection is never
/// timed out.
pub async fn serve(listener: TcpListener, replication: Replication) -> Result<(), Error> {
    loop {
        let (socket, client_address) = listener.accept().await?;
        let replication = replication.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, replication).await {
                error!("Connection error: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, replication),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    replication: Replication,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, client_address);
    let mut store = Store::new();

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    while let Some(frame) = conn.read_frame().await? {
        info!("Received frame from client: {}", frame);

        for cmd in commands::parse(frame) {
            debug!("Executing command: {:?}", cmd);
            if let Some(res) = cmd.exec(&mut store, &replication)? {
                info!("Sending response to client: {}", res);
                conn.write_frame(res).await?;
            }
        }
    }

    info!(entries = store.len(), "Connection closed");
    Ok(())
}
