use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::replication::Replication;
use crate::store::Store;
use crate::Error;

/// The `PX <milliseconds>` option of `SET`. It gives the most recently set key that many
/// milliseconds to live and sends no reply of its own.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Px {
    pub millis: Frame,
}

impl Executable for Px {
    fn exec(self, store: &mut Store, _replication: &Replication) -> Result<Option<Frame>, Error> {
        store.set_expiry(&self.millis)?;

        Ok(None)
    }
}

impl TryFrom<&mut CommandParser> for Px {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let millis = parser.next_frame()?;
        Ok(Self { millis })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::time::{self, Duration};

    use super::*;
    use crate::commands;

    #[tokio::test]
    async fn set_with_px() {
        time::pause();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("value1")),
            Frame::Bulk(Bytes::from("PX")),
            Frame::Bulk(Bytes::from("100")),
        ]);

        let mut store = Store::new();
        let replies: Vec<Option<Frame>> = commands::parse(frame)
            .into_iter()
            .map(|cmd| cmd.exec(&mut store, &Replication::default()).unwrap())
            .collect();

        assert_eq!(replies, vec![Some(Frame::Simple("OK".to_string())), None]);

        let key = Frame::Bulk(Bytes::from("key1"));
        assert_eq!(store.get(&key), Frame::Bulk(Bytes::from("value1")));

        time::advance(Duration::from_millis(100)).await;
        assert_eq!(store.get(&key), Frame::null_bulk());
    }

    #[tokio::test]
    async fn invalid_expiry() {
        let mut store = Store::new();
        store.set(Frame::Bulk(Bytes::from("key1")), Frame::Bulk(Bytes::from("1")));

        let cmd = Px {
            millis: Frame::Bulk(Bytes::from("later")),
        };

        assert!(cmd.exec(&mut store, &Replication::default()).is_err());
    }
}
