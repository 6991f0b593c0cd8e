mod purge_worker;

pub use purge_worker::PurgeWorker;
