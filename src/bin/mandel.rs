// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate log;
extern crate mandelbrot;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use log::info;
use mandelbrot::{Framebuffer, RenderConfig, Renderer, Viewport};
use num::Complex;
use std::process;
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range(
    s: &str,
    low: usize,
    high: usize,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match usize::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const TILE: &str = "tile";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const QUEUE: &str = "queue";

fn args<'a>(default_threads: &'a str) -> ArgMatches<'a> {
    let max_threads = num_cpus::get().max(1) * 4;

    App::new("mandel")
        .version("0.1.0")
        .about("Tiled, multi-threaded Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; .png or .ppm"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x800")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(TILE)
                .long(TILE)
                .takes_value(true)
                .default_value("400x400")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse tile size"))
                .help("Size of one unit of work; must fit inside the image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.5,-2.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the complex plane"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.5,2.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the complex plane"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value(default_threads)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1024")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        200_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 200000",
                    )
                })
                .help("Iterations before a point counts as inside the set"),
        )
        .arg(
            Arg::with_name(QUEUE)
                .long(QUEUE)
                .short("q")
                .takes_value(true)
                .default_value("100")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse queue capacity",
                        "Queue capacity must be between 1 and 100000",
                    )
                })
                .help("Finished tiles allowed to wait for the writer"),
        )
        .get_matches()
}

// Arguments were checked by their validators, so these parses only
// fail on a missing default.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Option<T> {
    matches.value_of(name).and_then(|s| T::from_str(s).ok())
}

fn config_from(matches: &ArgMatches) -> Option<(RenderConfig, Complex<f64>, Complex<f64>)> {
    let size: (usize, usize) = parse_pair(matches.value_of(SIZE)?, 'x')?;
    let tile: (usize, usize) = parse_pair(matches.value_of(TILE)?, 'x')?;
    let leftlower = parse_complex(matches.value_of(LEFTLOWER)?)?;
    let rightupper = parse_complex(matches.value_of(RIGHTUPPER)?)?;
    let config = RenderConfig {
        width: size.0,
        height: size.1,
        tile_width: tile.0,
        tile_height: tile.1,
        max_iterations: value(matches, ITERATIONS)?,
        workers: value(matches, THREADS)?,
        queue_capacity: value(matches, QUEUE)?,
    };
    Some((config, leftlower, rightupper))
}

fn fail(message: &str) -> ! {
    eprintln!("Render failure: {}", message);
    process::exit(1);
}

fn main() {
    env_logger::init();
    let default_threads = num_cpus::get().to_string();
    let matches = args(&default_threads);

    let (config, leftlower, rightupper) = match config_from(&matches) {
        Some(parsed) => parsed,
        None => fail("could not read the arguments"),
    };
    let viewport =
        Viewport::from_corners(leftlower, rightupper).unwrap_or_else(|e| fail(&e.to_string()));
    let mut renderer = Renderer::new(config, viewport).unwrap_or_else(|e| fail(&e.to_string()));

    let mut image = Framebuffer::new(config.width, config.height);
    let tasks = renderer.start_pass(&mut image).unwrap_or_else(|e| fail(&e.to_string()));

    let output = matches.value_of(OUTPUT).unwrap_or_else(|| fail("no output file"));
    if let Err(e) = image.save(output) {
        fail(&format!("could not write {}: {}", output, e));
    }
    info!("wrote {} tiles to {}", tasks, output);
    println!("{} tiles rendered to {}", tasks, output);
}
