//! Look Generation Core
//! Mission: From anchor to outfits — filter, cluster, assemble, score

pub mod assembler;
pub mod cache;
pub mod cluster;
pub mod color;
pub mod scorer;
pub mod service;
pub mod validity;

pub use cache::{Fingerprint, FingerprintCache};
pub use cluster::{Cluster, ClusterSelector};
pub use scorer::PairScoreTable;
pub use service::LookService;
