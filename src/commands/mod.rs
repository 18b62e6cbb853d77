pub mod echo;
pub mod executable;
pub mod get;
pub mod info;
pub mod ping;
pub mod px;
pub mod set;

use std::{str, vec};
use thiserror::Error as ThisError;
use tracing::debug;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::replication::Replication;
use crate::store::Store;
use crate::Error;

use echo::Echo;
use get::Get;
use info::Info;
use ping::Ping;
use px::Px;
use set::Set;

#[derive(Debug, PartialEq)]
pub enum Command {
    Echo(Echo),
    Get(Get),
    Info(Info),
    Ping(Ping),
    Px(Px),
    Set(Set),
}

impl Executable for Command {
    fn exec(self, store: &mut Store, replication: &Replication) -> Result<Option<Frame>, Error> {
        match self {
            Command::Echo(cmd) => cmd.exec(store, replication),
            Command::Get(cmd) => cmd.exec(store, replication),
            Command::Info(cmd) => cmd.exec(store, replication),
            Command::Ping(cmd) => cmd.exec(store, replication),
            Command::Px(cmd) => cmd.exec(store, replication),
            Command::Set(cmd) => cmd.exec(store, replication),
        }
    }
}

/// Splits a request into the commands it carries, in order.
///
/// Clients send commands as RESP arrays, and a single array may hold more than one command:
/// `SET key value PX 100` is a `SET` followed by a `PX` that applies to it. Every element in
/// command position is read as a command name. Names that are unknown or lack their arguments
/// are skipped and the next element is tried. Requests that are not arrays carry no command.
pub fn parse(frame: Frame) -> Vec<Command> {
    let frames = match frame {
        Frame::Array(array) => array,
        frame => {
            debug!("Ignoring request that is not an array: {}", frame);
            return Vec::new();
        }
    };

    let parser = &mut CommandParser {
        parts: frames.into_iter(),
    };
    let mut commands = Vec::new();

    loop {
        let command_name = match parser.parse_command_name() {
            Ok(command_name) => command_name,
            Err(CommandParserError::EndOfStream) => break,
            Err(err) => {
                debug!("Skipping command: {}", err);
                continue;
            }
        };

        let command = match &command_name[..] {
            "echo" if parser.remaining() >= 1 => Echo::try_from(&mut *parser).map(Command::Echo),
            "get" if parser.remaining() >= 1 => Get::try_from(&mut *parser).map(Command::Get),
            "info" => Info::try_from(&mut *parser).map(Command::Info),
            "ping" => Ping::try_from(&mut *parser).map(Command::Ping),
            "px" if parser.remaining() >= 1 => Px::try_from(&mut *parser).map(Command::Px),
            "set" if parser.remaining() >= 2 => Set::try_from(&mut *parser).map(Command::Set),
            _ => Err(CommandParserError::UnknownCommand {
                command: command_name,
            }),
        };

        match command {
            Ok(command) => commands.push(command),
            Err(err) => debug!("Skipping command: {}", err),
        }
    }

    commands
}

pub struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self.next_frame()?;

        match command_name {
            Frame::Simple(s) => Ok(s.to_lowercase()),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Arguments are kept as frames: keys and values may be of any kind.
    fn next_frame(&mut self) -> Result<Frame, CommandParserError> {
        self.parts.next().ok_or(CommandParserError::EndOfStream)
    }

    fn remaining(&self) -> usize {
        self.parts.len()
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("protocol error; invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("protocol error; unknown command or wrong number of arguments for {command}")]
    UnknownCommand { command: String },
    #[error("protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}
