pub mod rate_sync;
