//! External API integrations

pub mod ai_health_analysis;

pub use ai_health_analysis::AiHealthAnalysisClient;
