//! UI layer for the planner: the eframe app shell, trip form, and itinerary view.

pub mod app;

pub use app::PlannerApp;
