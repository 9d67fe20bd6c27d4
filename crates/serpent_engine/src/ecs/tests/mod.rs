//! Cross-module ECS scenarios

mod lifecycle_integration;
