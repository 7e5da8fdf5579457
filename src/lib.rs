// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
// Additional warnings that are allow by default (`rustc -W help`)
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused)]
// Clippy
#![allow(unknown_lints)] // necessary because rustc doesn't know about clippy
#![warn(clippy::all)]

#[macro_use]
extern crate log;

pub mod action;
pub mod config;
pub mod data;
pub mod geometry;
pub mod planner;
pub mod problem;
pub mod state;
pub mod trace;

mod fs;
mod parser;

use std::error::Error;

use crate::config::PlannerConfig;
use crate::planner::{PlanErr, PlanOk};
use crate::problem::Problem;

pub use crate::parser::ParserErr;

pub trait LoadProblem {
    fn load_problem(&self) -> Result<Problem, Box<dyn Error>>;
}

pub trait Plan {
    fn plan(&self, config: &PlannerConfig) -> Result<PlanOk, PlanErr>;
}
