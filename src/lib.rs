pub mod attainment;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod normalize;
pub mod placement;
pub mod ratings;
pub mod report;
pub mod resolver;
pub mod salary;
pub mod similarity;
pub mod telemetry;

pub use attainment::{classify, Attainment, AttainmentLevel, CommitteeBand, RatingScale};
pub use config::ResolverConfig;
pub use models::{EntityGroup, ItemKey, RatingDistribution, RawResponse};
pub use resolver::EntityResolver;
