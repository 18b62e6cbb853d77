use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::replication::Replication;
use crate::store::Store;
use crate::Error;

/// Get the value of `key`. If the key does not exist or expired the special value `nil` is
/// returned.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: Frame,
}

impl Executable for Get {
    fn exec(self, store: &mut Store, _replication: &Replication) -> Result<Option<Frame>, Error> {
        Ok(Some(store.get(&self.key)))
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_frame()?;
        Ok(Self { key })
    }
}
