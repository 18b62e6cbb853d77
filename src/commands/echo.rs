use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::replication::Replication;
use crate::store::Store;
use crate::Error;

/// Returns its argument unchanged, whatever its kind.
///
/// Ref: <https://redis.io/docs/latest/commands/echo>
#[derive(Debug, PartialEq)]
pub struct Echo {
    pub value: Frame,
}

impl Executable for Echo {
    fn exec(self, _store: &mut Store, _replication: &Replication) -> Result<Option<Frame>, Error> {
        Ok(Some(self.value))
    }
}

impl TryFrom<&mut CommandParser> for Echo {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let value = parser.next_frame()?;
        Ok(Self { value })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::{self, Command};

    #[test]
    fn echo_bulk_string() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("ECHO")),
            Frame::Bulk(Bytes::from("hey")),
        ]);
        let cmd = commands::parse(frame).pop().unwrap();

        assert_eq!(
            cmd,
            Command::Echo(Echo {
                value: Frame::Bulk(Bytes::from("hey"))
            })
        );

        let mut store = Store::new();
        let res = cmd.exec(&mut store, &Replication::default()).unwrap();

        assert_eq!(res.unwrap().serialize(), b"$3\r\nhey\r\n");
    }

    #[test]
    fn echo_keeps_kind() {
        let cmd = Echo {
            value: Frame::Integer(42),
        };

        let mut store = Store::new();
        let res = cmd.exec(&mut store, &Replication::default()).unwrap();

        assert_eq!(res, Some(Frame::Integer(42)));
    }
}
