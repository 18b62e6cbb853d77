use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::replication::Replication;
use crate::store::Store;
use crate::Error;

/// Reports the replication role of the server. Any argument after it is read as the next
/// command.
///
/// Ref: <https://redis.io/docs/latest/commands/info/>
#[derive(Debug, PartialEq)]
pub struct Info;

impl Executable for Info {
    fn exec(self, _store: &mut Store, replication: &Replication) -> Result<Option<Frame>, Error> {
        Ok(Some(Frame::Bulk(replication.info())))
    }
}

impl TryFrom<&mut CommandParser> for Info {
    type Error = CommandParserError;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
