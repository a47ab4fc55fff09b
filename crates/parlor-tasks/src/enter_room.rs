//! Enters a room by id, with an optional password.
//!
//! The task never talks to the server directly beyond its opening request;
//! it steers the client into doing the entry itself.
//!
//! Modern:
//!
//! ```text
//! None ──execute: GetGuestRoom(id, 0, 1)──► RequestingRoomData
//!   ──room data for id: entering=false, forward=true, access=open──► AwaitingOpen
//!   ──client OpenFlatConnection for id: password replaced──► AwaitingEntry
//!   ──RoomEntryInfo──► Complete (Success)
//! ```
//!
//! Legacy (the client must already be in some room):
//!
//! ```text
//! None ──execute: TRYFLAT "id[/password]"──► AwaitingOpen
//!   ──FLAT_LETIN──► ReplacingId
//!   ──client GOTOFLAT: content replaced with id──► AwaitingEntry
//!   ──ROOM_READY──► Complete (Success)
//! ```
//!
//! `CantConnect` ends the task from any state on either variant.
//!
//! Every other handler checks the state before touching the payload, so a
//! packet arriving in a state that ignores it is never decoded.

use std::fmt;

use serde::{Deserialize, Serialize};

use parlor_intercept::{Intercept, InterceptorTask, Subscription, TaskContext, TaskError};
use parlor_messages::headers::{legacy, modern};
use parlor_messages::incoming::{CantConnectMsg, ErrorMsg, RoomAccess, RoomDataMsg, RoomEnterError};
use parlor_messages::outgoing::{GetRoomDataMsg, GoToRoomMsg, TryEnterRoomMsg};
use parlor_protocol::{Id, Variant};

// ---------------------------------------------------------------------------
// EnterRoomResult
// ---------------------------------------------------------------------------

/// How a room entry attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnterRoomResult {
    Unknown,
    Fail,
    InvalidPassword,
    Closed,
    Full,
    Banned,
    Success,
}

impl EnterRoomResult {
    /// Maps a `CantConnect` reason code. Codes other than full and banned
    /// are reported as [`Unknown`](Self::Unknown).
    pub fn from_cant_connect(code: i32) -> Self {
        match RoomEnterError::from_code(code) {
            Some(RoomEnterError::Full) => Self::Full,
            Some(RoomEnterError::Banned) => Self::Banned,
            _ => Self::Unknown,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for EnterRoomResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Fail => write!(f, "Fail"),
            Self::InvalidPassword => write!(f, "InvalidPassword"),
            Self::Closed => write!(f, "Closed"),
            Self::Full => write!(f, "Full"),
            Self::Banned => write!(f, "Banned"),
            Self::Success => write!(f, "Success"),
        }
    }
}

// ---------------------------------------------------------------------------
// EnterRoomTask
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    None,
    RequestingRoomData,
    AwaitingOpen,
    ReplacingId,
    AwaitingEntry,
    Complete,
}

/// Enters room `room_id`. See the module docs for the packet flow.
#[derive(Debug, Clone)]
pub struct EnterRoomTask {
    room_id: Id,
    password: Option<String>,
    state: EntryState,
}

impl EnterRoomTask {
    pub fn new(room_id: Id, password: Option<String>) -> Self {
        Self {
            room_id,
            password,
            state: EntryState::None,
        }
    }

    pub fn room_id(&self) -> Id {
        self.room_id
    }

    fn transition(&mut self, next: EntryState) {
        tracing::debug!(room_id = %self.room_id, from = ?self.state, to = ?next, "room entry");
        self.state = next;
    }

    fn finish(&mut self, e: &Intercept<'_, EnterRoomResult>, result: EnterRoomResult) {
        self.transition(EntryState::Complete);
        tracing::info!(room_id = %self.room_id, %result, "room entry finished");
        e.complete(result);
    }

    fn on_cant_connect(
        &mut self,
        msg: CantConnectMsg,
        e: &mut Intercept<'_, EnterRoomResult>,
    ) -> Result<(), TaskError> {
        if self.state != EntryState::Complete {
            self.finish(e, EnterRoomResult::from_cant_connect(msg.error));
        }
        Ok(())
    }

    // -- modern --------------------------------------------------------------

    /// Edits the response in place so the client enters on its own. Fields
    /// after the modeled ones are left untouched.
    fn on_room_data(&mut self, e: &mut Intercept<'_, EnterRoomResult>) -> Result<(), TaskError> {
        if self.state != EntryState::RequestingRoomData {
            return Ok(());
        }
        let data = e.packet_mut().parse::<RoomDataMsg>()?;
        if data.id != self.room_id {
            return Ok(());
        }

        let packet = e.packet_mut();
        packet.reset();
        packet.replace_bool(false)?;
        packet.read_id()?;
        packet.read_string()?;
        packet.read_id()?;
        packet.read_string()?;
        packet.replace_int(RoomAccess::Open as i32)?;
        packet.read_int()?;
        packet.read_int()?;
        packet.read_string()?;
        packet.replace_bool(true)?;
        packet.reset();

        self.transition(EntryState::AwaitingOpen);
        Ok(())
    }

    fn on_open_connection(&mut self, e: &mut Intercept<'_, EnterRoomResult>) -> Result<(), TaskError> {
        if self.state != EntryState::AwaitingOpen {
            return Ok(());
        }
        let packet = e.packet_mut();
        if packet.read_id()? != self.room_id {
            return Ok(());
        }
        packet.replace_string(self.password.as_deref().unwrap_or_default())?;
        self.transition(EntryState::AwaitingEntry);
        Ok(())
    }

    fn on_entry_info(&mut self, e: &mut Intercept<'_, EnterRoomResult>) -> Result<(), TaskError> {
        if self.state == EntryState::AwaitingEntry {
            self.finish(e, EnterRoomResult::Success);
        }
        Ok(())
    }

    // -- legacy --------------------------------------------------------------

    fn on_error(&mut self, e: &mut Intercept<'_, EnterRoomResult>) -> Result<(), TaskError> {
        if self.state != EntryState::AwaitingOpen {
            return Ok(());
        }
        let msg = e.packet_mut().parse::<ErrorMsg>()?;
        if msg.message == ErrorMsg::INCORRECT_FLAT_PASSWORD {
            // The task is detached once completed, so the state left
            // behind here is never observed.
            self.transition(EntryState::None);
            tracing::info!(room_id = %self.room_id, "room entry refused: wrong password");
            e.complete(EnterRoomResult::InvalidPassword);
        }
        Ok(())
    }

    fn on_let_in(&mut self, _: &mut Intercept<'_, EnterRoomResult>) -> Result<(), TaskError> {
        if self.state == EntryState::AwaitingOpen {
            self.transition(EntryState::ReplacingId);
        }
        Ok(())
    }

    fn on_go_to_room(&mut self, e: &mut Intercept<'_, EnterRoomResult>) -> Result<(), TaskError> {
        if self.state != EntryState::ReplacingId {
            return Ok(());
        }
        tracing::debug!(to = %self.room_id, "redirecting GOTOFLAT");
        e.rewrite(&GoToRoomMsg {
            room_id: self.room_id,
        })?;
        self.transition(EntryState::AwaitingEntry);
        Ok(())
    }

    fn on_room_ready(&mut self, e: &mut Intercept<'_, EnterRoomResult>) -> Result<(), TaskError> {
        if self.state == EntryState::AwaitingEntry {
            self.finish(e, EnterRoomResult::Success);
        }
        Ok(())
    }
}

impl InterceptorTask for EnterRoomTask {
    type Output = EnterRoomResult;
    const NAME: &'static str = "EnterRoomTask";

    fn on_execute(&mut self, cx: &TaskContext<'_>) -> Result<(), TaskError> {
        match cx.variant() {
            Variant::Modern => {
                cx.send(&GetRoomDataMsg::probe(self.room_id))?;
                self.transition(EntryState::RequestingRoomData);
            }
            Variant::Legacy => {
                cx.send(&TryEnterRoomMsg {
                    room_id: self.room_id,
                    password: self.password.clone(),
                })?;
                self.transition(EntryState::AwaitingOpen);
            }
        }
        Ok(())
    }

    fn subscriptions() -> Vec<Subscription<Self>> {
        vec![
            Subscription::message(Self::on_cant_connect),
            Subscription::identifier(modern::GET_GUEST_ROOM_RESULT, Self::on_room_data).on(Variant::Modern),
            Subscription::identifier(modern::OPEN_FLAT_CONNECTION, Self::on_open_connection)
                .on(Variant::Modern),
            Subscription::identifier(modern::ROOM_ENTRY_INFO, Self::on_entry_info).on(Variant::Modern),
            Subscription::identifier(legacy::ERROR, Self::on_error).on(Variant::Legacy),
            Subscription::identifier(legacy::FLAT_LETIN, Self::on_let_in).on(Variant::Legacy),
            Subscription::identifier(legacy::GOTOFLAT, Self::on_go_to_room).on(Variant::Legacy),
            Subscription::identifier(legacy::ROOM_READY, Self::on_room_ready).on(Variant::Legacy),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cant_connect_mapping() {
        assert_eq!(EnterRoomResult::from_cant_connect(1), EnterRoomResult::Full);
        assert_eq!(EnterRoomResult::from_cant_connect(4), EnterRoomResult::Banned);
        assert_eq!(EnterRoomResult::from_cant_connect(2), EnterRoomResult::Unknown);
        assert_eq!(EnterRoomResult::from_cant_connect(-1), EnterRoomResult::Unknown);
    }

    #[test]
    fn test_result_display() {
        assert_eq!(EnterRoomResult::InvalidPassword.to_string(), "InvalidPassword");
        assert!(EnterRoomResult::Success.is_success());
        assert!(!EnterRoomResult::Full.is_success());
    }

    #[test]
    fn test_result_serde() {
        let json = serde_json::to_string(&EnterRoomResult::InvalidPassword).unwrap();
        assert_eq!(json, "\"InvalidPassword\"");
        let back: EnterRoomResult = serde_json::from_str("\"Banned\"").unwrap();
        assert_eq!(back, EnterRoomResult::Banned);
    }

    #[test]
    fn test_new_task_is_idle() {
        let task = EnterRoomTask::new(Id(42), None);
        assert_eq!(task.state, EntryState::None);
        assert_eq!(task.room_id(), Id(42));
    }
}
