//! Scripted room entry on a modern session.
//!
//! Plays both ends of the connection: the server answers the task's room
//! data probe, the client asks to open the room, and the server lets it
//! in. Run with `RUST_LOG=debug` to watch each packet move the task on.

use std::time::Duration;

use parlor::messages::incoming::{RoomAccess, RoomDataMsg, RoomEntryInfoMsg};
use parlor::messages::outgoing::{GetRoomDataMsg, OpenConnectionMsg};
use parlor::prelude::*;
use tracing_subscriber::EnvFilter;

const ROOM_ID: Id = Id(42);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,parlor=debug")),
        )
        .init();

    let mut session = Session::builder()
        .variant(Variant::Modern)
        .task_timeout(Duration::from_secs(5))
        .build()?;
    let entry = session.enter_room(ROOM_ID, Some("secret".into()));

    // Task -> server
    let mut probe = session
        .next_outbound()
        .await
        .ok_or("session closed before the probe was sent")?;
    let probe = probe.parse::<GetRoomDataMsg>()?;
    tracing::info!(room_id = %probe.room_id, "server received room data request");

    // Server -> client
    let mut room_data = session.compose(&RoomDataMsg {
        entering: true,
        id: ROOM_ID,
        name: "Penthouse".into(),
        owner_id: Id(3),
        owner_name: "host".into(),
        access: RoomAccess::Password,
        user_count: 4,
        max_users: 25,
        description: "members only".into(),
        forward: false,
        staff_pick: false,
        group_member: false,
        muted: false,
    })?;
    session.dispatch(&mut room_data)?;
    let forwarded = room_data.parse::<RoomDataMsg>()?;
    tracing::info!(access = %forwarded.access, forward = forwarded.forward, "client received room data");

    // Client -> server
    let mut open = session.compose(&OpenConnectionMsg {
        room_id: ROOM_ID,
        password: String::new(),
    })?;
    session.dispatch(&mut open)?;
    let open = open.parse::<OpenConnectionMsg>()?;
    tracing::info!(room_id = %open.room_id, password = %open.password, "server received connection request");

    // Server -> client
    let mut entered = session.compose(&RoomEntryInfoMsg {
        room_id: ROOM_ID,
        is_owner: false,
    })?;
    session.dispatch(&mut entered)?;

    let result = entry.result().await?;
    println!("entering room {ROOM_ID}: {result}");
    Ok(())
}
