//! Contract module containing trait definitions for training and serving

mod feature_encoder;
mod regressor;

pub use feature_encoder::FeatureEncoder;
pub use regressor::Regressor;
