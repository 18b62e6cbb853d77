use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::replication::Replication;
use crate::store::Store;
use crate::Error;

/// Set `key` to hold `value`. The entry is expired right away unless a `PX` follows.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: Frame,
    pub value: Frame,
}

impl Executable for Set {
    fn exec(self, store: &mut Store, _replication: &Replication) -> Result<Option<Frame>, Error> {
        store.set(self.key, self.value);

        let res = Frame::Simple("OK".to_string());
        Ok(Some(res))
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_frame()?;
        let value = parser.next_frame()?;

        Ok(Self { key, value })
    }
}
