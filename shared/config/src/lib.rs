pub mod feature_toggles;

pub use feature_toggles::FeatureToggles;
