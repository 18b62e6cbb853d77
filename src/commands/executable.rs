use crate::frame::Frame;
use crate::replication::Replication;
use crate::store::Store;
use crate::Error;

pub trait Executable {
    /// Runs the command against the connection's store. Commands that only modify a previous
    /// command return no reply.
    fn exec(self, store: &mut Store, replication: &Replication) -> Result<Option<Frame>, Error>;
}
