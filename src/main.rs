use clap::{crate_authors, crate_description, crate_name, crate_version, App, Arg, ArgMatches};
use env_logger::Env;
use ismags::{task::Task, types::VId};
use std::error::Error;

fn parse_order(order: &str) -> Result<Vec<VId>, Box<dyn Error>> {
    Ok(order
        .split(',')
        .map(|v| v.trim().parse::<VId>())
        .collect::<Result<Vec<_>, _>>()?)
}

fn handle_match(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let networks = matches
        .value_of("networks")
        .unwrap()
        .split(',')
        .map(String::from)
        .collect();
    let order = match matches.value_of("order") {
        Some(order) => Some(parse_order(order)?),
        None => None,
    };
    let limit = match matches.value_of("limit") {
        Some(limit) => Some(limit.parse::<usize>()?),
        None => None,
    };
    Task::new(
        matches.value_of("folder").unwrap(),
        matches.value_of("link-types").unwrap(),
        networks,
        matches.value_of("motif").unwrap(),
        matches.value_of("output").unwrap(),
    )
    .order(order)
    .parallel(matches.is_present("parallel"))
    .separate(matches.is_present("separate"))
    .limit(limit)
    .run()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let matches = App::new(crate_name!())
        .about(crate_description!())
        .author(crate_authors!())
        .version(crate_version!())
        .after_help(
            r"Link types look like `A d t t,B u P P`: a type letter, `d` (directed) or
`u` (undirected), and the suffixes appended to the source and destination
vertex names. The i-th network file is read with the i-th link type.

The motif is the lower triangle of its adjacency matrix, row by row: `0` for
no link, `X` for a link of type X from the column vertex to the row vertex,
`x` for the other direction. `AAA` is a triangle.",
        )
        .arg(
            Arg::with_name("folder")
                .help("Folder containing the network files")
                .short("f")
                .long("folder")
                .takes_value(true)
                .default_value("."),
        )
        .arg(
            Arg::with_name("link-types")
                .help("Link types, separated by commas")
                .short("l")
                .long("link-types")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("networks")
                .help("Network files, separated by commas")
                .short("n")
                .long("networks")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("motif")
                .help("Motif description")
                .short("m")
                .long("motif")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("output")
                .help("Output file, one embedding per line")
                .short("o")
                .long("output")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("order")
                .help("Visiting order of the motif vertices, e.g. 2,0,1")
                .long("order")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("parallel")
                .help("Searches on all cores")
                .long("parallel")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("separate")
                .help("Searches every network file on its own")
                .long("separate")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("limit")
                .help("Stops after this many embeddings per network")
                .long("limit")
                .takes_value(true),
        )
        .get_matches();
    handle_match(&matches)
}
