use bytes::{BufMut, BytesMut};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::util::error::Result;

/// Transition style used by [`Command::set_power`].
pub const POWER_EFFECT: &str = "smooth";
/// Transition duration in milliseconds used by [`Command::set_power`].
pub const POWER_DURATION_MS: i64 = 200;
/// Request id of the built-in commands. Nothing is read back, so it never needs to change.
pub const DEFAULT_REQUEST_ID: i64 = 1;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on {
            PowerState::On
        } else {
            PowerState::Off
        }
    }
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::On => "on",
            PowerState::Off => "off",
        }
    }
}

/// One positional argument of a command. Serializes as a bare JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandParam {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<&str> for CommandParam {
    fn from(value: &str) -> Self {
        CommandParam::Str(value.to_string())
    }
}

impl From<String> for CommandParam {
    fn from(value: String) -> Self {
        CommandParam::Str(value)
    }
}

impl From<i64> for CommandParam {
    fn from(value: i64) -> Self {
        CommandParam::Int(value)
    }
}

impl From<bool> for CommandParam {
    fn from(value: bool) -> Self {
        CommandParam::Bool(value)
    }
}

/**
A control instruction as written on the wire:
`{"id":<int>,"method":<string>,"params":[...]}` followed by CRLF.

Parameter order is defined by the method and is not checked here.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: i64,
    pub method: String,
    pub params: Vec<CommandParam>,
}

impl Command {
    pub fn new(id: i64, method: impl Into<String>, params: Vec<CommandParam>) -> Self {
        Command {
            id,
            method: method.into(),
            params,
        }
    }

    pub fn set_power(state: PowerState) -> Self {
        Command::new(
            DEFAULT_REQUEST_ID,
            "set_power",
            vec![
                state.as_str().into(),
                POWER_EFFECT.into(),
                POWER_DURATION_MS.into(),
            ],
        )
    }

    pub fn toggle() -> Self {
        Command::new(DEFAULT_REQUEST_ID, "toggle", Vec::new())
    }

    /// The JSON encoding terminated by `\r\n`.
    pub fn to_wire_bytes(&self) -> Result<BytesMut> {
        let json = serde_json::to_vec(self)?;
        let mut packet = BytesMut::with_capacity(json.len() + 2);
        packet.extend_from_slice(&json);
        packet.put_slice(b"\r\n");
        Ok(packet)
    }
}
