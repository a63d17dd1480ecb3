//! D-Bus surface of the audio service.

/// Typed D-Bus errors
pub mod error;
/// Server-side interface
pub mod interface;
/// Client proxy
pub mod proxy;

use std::sync::Arc;

use tracing::info;
use zbus::{Connection, connection};

pub use error::BusError;
pub use interface::{AudioBus, spawn_status_forwarding};
pub use proxy::AudioProxy;

use crate::{config::BusType, services::audio::AudioService};

/// Well-known bus name
pub const BUS_NAME: &str = "org.audiod.Audio";

/// Object path of the audio interface
pub const OBJECT_PATH: &str = "/org/audiod/Audio";

/// Connect to the configured bus, claim [`BUS_NAME`] and serve [`AudioBus`]
///
/// # Errors
/// Returns error if the bus is unreachable or the name is taken
pub async fn serve(service: Arc<AudioService>, bus_type: BusType) -> zbus::Result<Connection> {
    let builder = match bus_type {
        BusType::System => connection::Builder::system()?,
        BusType::Session => connection::Builder::session()?,
    };

    let connection = builder
        .name(BUS_NAME)?
        .serve_at(OBJECT_PATH, AudioBus::new(service))?
        .build()
        .await?;

    info!(name = BUS_NAME, path = OBJECT_PATH, ?bus_type, "Serving audio interface");
    Ok(connection)
}

/// Connect to the configured bus as a client
///
/// # Errors
/// Returns error if the bus is unreachable
pub async fn connect(bus_type: BusType) -> zbus::Result<Connection> {
    match bus_type {
        BusType::System => Connection::system().await,
        BusType::Session => Connection::session().await,
    }
}
