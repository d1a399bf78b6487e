// src/ports/mod.rs
pub mod plan_presenter;

pub use plan_presenter::PlanPresenter;
