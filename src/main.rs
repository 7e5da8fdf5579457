#[macro_use]
extern crate log;

use std::env;
use std::process;

use clap::{App, Arg, ArgGroup};
use env_logger::Env;
use prettytable::{Cell, Row, Table};

use box_pusher::config::{Mode, PlannerConfig};
use box_pusher::planner::{self, PlanOk};
use box_pusher::{LoadProblem, Plan};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new("box-pusher")
        .author("martin-t")
        .version("0.1")
        .about("Plans the moves of a pushing robot which brings boxes to their goals")
        .arg(
            Arg::with_name("advanced")
                .short("a")
                .long("advanced")
                .help("move a blocking object together with the box when sampling"),
        )
        .arg(
            Arg::with_name("time-out")
                .short("t")
                .long("time-out")
                .help("stop routing the robot after the time limit"),
        )
        .group(ArgGroup::with_name("mode").arg("advanced").arg("time-out"))
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .takes_value(true)
                .value_name("N")
                .help("seed for the sampling planners"),
        )
        .arg(
            Arg::with_name("stats")
                .long("stats")
                .help("print per goal reports and search statistics"),
        )
        .arg(Arg::with_name("input").required(true))
        .arg(Arg::with_name("output").required(true))
        .get_matches();

    let mode = if matches.is_present("advanced") {
        Mode::Advanced
    } else if matches.is_present("time-out") {
        Mode::TimeBoxed
    } else {
        Mode::Default
    };
    // dumps of a stuck robot end up next to wherever the planner was started
    let mut config = PlannerConfig::default().with_mode(mode).with_dump_dir(".");
    if let Some(seed) = matches.value_of("seed") {
        match seed.parse() {
            Ok(seed) => config = config.with_seed(seed),
            Err(_) => {
                println!("Seed must be a non-negative integer, got {}", seed);
                process::exit(1);
            }
        }
    }

    // both are required so clap would already have exited
    let input = matches.value_of("input").unwrap_or_default();
    let output = matches.value_of("output").unwrap_or_default();

    let problem = input.load_problem().unwrap_or_else(|err| {
        match env::current_dir() {
            Ok(dir) => println!("Can't load {} in {}: {}", input, dir.display(), err),
            Err(_) => println!("Can't load {}: {}", input, err),
        }
        process::exit(1);
    });
    debug!("Loaded problem:\n{:?}", problem);

    println!("Planning {}...", input);
    let plan = problem.plan(&config).unwrap_or_else(|err| {
        println!("Invalid problem: {}", err);
        process::exit(1);
    });

    if let Err(err) = planner::write_trace(output, &plan) {
        println!("Can't write {}: {}", output, err);
        process::exit(1);
    }

    if matches.is_present("stats") {
        print_stats(&plan);
    }
    println!("Pushes: {}", plan.pushes);
    println!("Robot: {}", plan.robot_stage);
    println!("Trace lines: {}", plan.trace.len());
    if plan.is_complete() {
        println!("Wrote plan to {}", output);
    } else {
        println!("Wrote partial plan to {}", output);
    }
}

fn print_stats(plan: &PlanOk) {
    if plan.goals.is_empty() {
        println!("Every goal reached by the coarse search");
    } else {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("Goal"),
            Cell::new("Distance"),
            Cell::new("Outcome"),
        ]));
        for report in &plan.goals {
            table.add_row(Row::new(vec![
                Cell::new(&report.goal.to_string()),
                Cell::new(&format!("{:.3}", report.distance)),
                Cell::new(&report.outcome.to_string()),
            ]));
        }
        table.printstd();
    }
    println!("Box searches:\n{}", plan.box_stats);
    println!("Robot searches:\n{}", plan.robot_stats);
}
