//! Commit analysis for the update report

pub mod change_classifier;

pub use change_classifier::ChangeClassifier;
