pub mod calculator;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod errors;
pub mod goals;
pub mod hybrid;
pub mod rules;
pub mod scoring;
pub mod store;

pub use calculator::footprint::SimpleFootprint;
pub use calculator::incentives::{IncentiveOptimization, IncentiveTable};
pub use calculator::regional::{EnergyUsage, RegionalCalculator};
pub use calculator::rule_path::RulePathCalculator;
pub use classifier::{
    categorize_company_size, categorize_goals, categorize_industry, CompanySize, GoalCategory,
    IndustryType,
};
pub use domain::goal::{GoalId, GoalStatus, SustainabilityGoal};
pub use domain::implementation::{Implementation, ImplementationId, ImplementationStatus};
pub use domain::profile::{BusinessProfile, ProfileInput};
pub use domain::recommendation::{
    Difficulty, Recommendation, RecommendationId, RecommendationSource, RecommendationStatus,
    RecommendationTotals, StoredRecommendation,
};
pub use domain::UserId;
pub use errors::{AiSourceError, ApplicationError, DomainError, InterfaceError, StoreError};
pub use goals::{
    CompletionOutcome, GoalImpactMapper, GoalImpactResult, ImpactMappingTable,
    ImplementationService, UnitConverter,
};
pub use hybrid::{
    AiRecommendation, AiRecommendationRequest, AiRecommendationSource, AiSourceStatus,
    HybridMerger, HybridOutcome, RecommendationService,
};
pub use rules::catalog::RuleCatalog;
pub use rules::RuleEngine;
pub use scoring::{PriorityScorer, ScoringVariant};
pub use store::{GoalStore, ImplementationStore, RecommendationStore};
