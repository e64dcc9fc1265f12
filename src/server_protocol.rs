use serde_json::Value;

use crate::types::Direction;

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    /// Directional request for the player.
    Input { dir: Direction },
    /// Valid only while the session is game-over.
    Restart,
    /// Valid only while the level-completed banner is up.
    Continue,
    Ping { t: f64 },
}

/// Parses one inbound websocket message. Anything malformed or unknown is
/// answered with `None` and dropped by the caller.
pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "input" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            Some(ParsedClientMessage::Input { dir })
        }
        "restart" => Some(ParsedClientMessage::Restart),
        "continue" => Some(ParsedClientMessage::Continue),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}
