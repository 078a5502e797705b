//! Process-local concurrency primitives shared by the services

mod single_flight;
mod task_queue;

pub use single_flight::{FlightGuard, SingleFlight};
pub use task_queue::TaskQueue;
