//! Places a wall item and waits for the server's verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

use parlor_intercept::{Intercept, InterceptorTask, Subscription, TaskContext, TaskError};
use parlor_messages::headers::legacy;
use parlor_messages::incoming::{NotificationDialogMsg, WallItemAddedMsg};
use parlor_messages::outgoing::PlaceWallItemMsg;
use parlor_protocol::{Id, Variant, WallLocation};

/// How a wall placement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceWallItemResult {
    Error,
    Success,
}

impl fmt::Display for PlaceWallItemResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Success => write!(f, "Success"),
        }
    }
}

/// Sends a wall placement for `item_id` and completes when the item shows
/// up in the room or the server refuses it.
///
/// `item_id` may be negative. The server reports the placed item under the
/// absolute value, and that is what the task waits for.
#[derive(Debug, Clone)]
pub struct PlaceWallItemTask {
    item_id: Id,
    location: WallLocation,
}

impl PlaceWallItemTask {
    pub fn new(item_id: Id, location: WallLocation) -> Self {
        Self { item_id, location }
    }

    fn on_item_added(
        &mut self,
        msg: WallItemAddedMsg,
        e: &mut Intercept<'_, PlaceWallItemResult>,
    ) -> Result<(), TaskError> {
        if msg.item.id == self.item_id.abs() {
            tracing::info!(item_id = %self.item_id, location = %self.location, "wall item placed");
            e.complete(PlaceWallItemResult::Success);
        }
        Ok(())
    }

    fn on_notification(
        &mut self,
        msg: NotificationDialogMsg,
        e: &mut Intercept<'_, PlaceWallItemResult>,
    ) -> Result<(), TaskError> {
        if msg.kind == NotificationDialogMsg::FURNI_PLACEMENT_ERROR {
            tracing::info!(item_id = %self.item_id, reason = ?msg.parameter("message"), "wall item refused");
            e.complete(PlaceWallItemResult::Error);
        }
        Ok(())
    }

    /// Legacy servers answer a refused placement by resending the
    /// inventory strip. The client never asked for it, so it is hidden.
    fn on_strip_info(&mut self, e: &mut Intercept<'_, PlaceWallItemResult>) -> Result<(), TaskError> {
        if e.complete(PlaceWallItemResult::Error) {
            tracing::info!(item_id = %self.item_id, "wall item refused");
            e.block();
        }
        Ok(())
    }
}

impl InterceptorTask for PlaceWallItemTask {
    type Output = PlaceWallItemResult;
    const NAME: &'static str = "PlaceWallItemTask";

    fn on_execute(&mut self, cx: &TaskContext<'_>) -> Result<(), TaskError> {
        cx.send(&PlaceWallItemMsg {
            item_id: self.item_id,
            location: self.location,
        })
    }

    fn subscriptions() -> Vec<Subscription<Self>> {
        vec![
            Subscription::message(Self::on_item_added),
            Subscription::message(Self::on_notification).on(Variant::Modern),
            Subscription::identifier(legacy::STRIPINFO, Self::on_strip_info).on(Variant::Legacy),
        ]
    }
}
