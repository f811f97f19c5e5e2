pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod reply;
pub mod resolvers;

pub use cache::{PriceCache, PriceCacheKey};
pub use domain::deal::{CreatorId, DealParameters, DealParametersDraft};
pub use domain::intent::{Assumption, ClarificationRequest, MissingField};
pub use domain::metrics::{
    CalibrationSnapshot, CpmQuote, CpmSource, CreatorCalibration, CreatorMetricsSnapshot,
    SegmentHistory,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::{
    DeterministicPricingCalculator, PriceBand, PricingCalculator, PricingInput, PricingOptions,
    PricingOutcome, PricingResult, ProvisionalEstimate,
};
pub use reply::ChatReply;
pub use resolvers::{CalibrationResolver, CpmResolver, MetricsResolver, ResolverError};
