//! CLI argument definitions for `vbap-cli`.

use clap::{value_parser, Arg, ArgAction, Command};

fn input_arg() -> Arg {
    Arg::new("INPUT")
        .help("Path to a JSON layout file")
        .required(true)
        .index(1)
}

fn two_d_arg() -> Arg {
    Arg::new("2d")
        .long("2d")
        .action(ArgAction::SetTrue)
        .help("Treat the layout as horizontal and use loudspeaker pairs")
}

fn az_res_arg() -> Arg {
    Arg::new("az-res")
        .long("az-res")
        .value_name("DEGREES")
        .value_parser(value_parser!(f32))
        .default_value("5")
        .help("Azimuth resolution of the source grid")
}

fn el_res_arg() -> Arg {
    Arg::new("el-res")
        .long("el-res")
        .value_name("DEGREES")
        .value_parser(value_parser!(f32))
        .default_value("5")
        .help("Elevation resolution of the source grid")
}

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("vbap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate VBAP/MDAP gain tables for loudspeaker layouts")
        .arg_required_else_help(true)
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Only log errors"),
        )
        .arg(
            Arg::new("bench")
                .long("bench")
                .action(ArgAction::SetTrue)
                .help("Run a synthetic gain-table benchmark and exit"),
        )
        .arg(
            Arg::new("bench-sweep")
                .long("bench-sweep")
                .action(ArgAction::SetTrue)
                .help("Run the benchmark over several layout sizes and exit"),
        )
        .arg(
            Arg::new("bench-loudspeakers")
                .long("bench-loudspeakers")
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .default_value("22")
                .help("Number of random loudspeakers for the benchmark"),
        )
        .arg(
            Arg::new("bench-resolution")
                .long("bench-resolution")
                .value_name("DEGREES")
                .value_parser(value_parser!(f32))
                .default_value("2")
                .help("Grid resolution (azimuth and elevation) for the benchmark"),
        )
        .arg(
            Arg::new("bench-spread")
                .long("bench-spread")
                .value_name("DEGREES")
                .value_parser(value_parser!(f32))
                .default_value("0")
                .help("MDAP spread for the benchmark"),
        )
        .arg(
            Arg::new("bench-iterations")
                .long("bench-iterations")
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .default_value("5")
                .help("Number of iterations for the benchmark"),
        )
        .subcommand(
            Command::new("triangulate")
                .about("Print the loudspeaker triangles (or pairs) of a layout as JSON")
                .arg(input_arg())
                .arg(two_d_arg()),
        )
        .subcommand(
            Command::new("table")
                .about("Print a gain table as JSON")
                .long_about(
                    "Print a gain table as JSON. Sources listed in the layout file are used \
                     when present; otherwise a regular grid is generated.",
                )
                .arg(input_arg())
                .arg(two_d_arg())
                .arg(az_res_arg())
                .arg(el_res_arg())
                .arg(
                    Arg::new("spread")
                        .long("spread")
                        .value_name("DEGREES")
                        .value_parser(value_parser!(f32))
                        .help("Override the MDAP spread from the layout file"),
                )
                .arg(
                    Arg::new("compress")
                        .long("compress")
                        .action(ArgAction::SetTrue)
                        .help("Keep at most three gains per row with their indices"),
                )
                .arg(
                    Arg::new("interp")
                        .long("interp")
                        .action(ArgAction::SetTrue)
                        .help("Normalise rows to sum to one for interpolation"),
                ),
        )
        .subcommand(
            Command::new("grid")
                .about("Print the directions of a regular source grid as JSON")
                .arg(two_d_arg())
                .arg(az_res_arg())
                .arg(el_res_arg()),
        )
        .subcommand(
            Command::new("pvalues")
                .about("Print frequency-dependent p-norm exponents as JSON")
                .arg(
                    Arg::new("dtt")
                        .long("dtt")
                        .value_name("RATIO")
                        .value_parser(value_parser!(f32))
                        .default_value("0.5")
                        .help("Direct-to-total energy ratio of the room (0.0-1.0)"),
                )
                .arg(
                    Arg::new("freq")
                        .long("freq")
                        .value_name("HZ")
                        .value_parser(value_parser!(f32))
                        .num_args(1..)
                        .required(true)
                        .help("Frequencies in Hz"),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Emit default JSON payloads")
                .subcommand_required(true)
                .subcommand(
                    Command::new("layout-json")
                        .about("Print a default layout file")
                        .arg(
                            Arg::new("preset")
                                .long("preset")
                                .value_name("NAME")
                                .default_value("surround_7_0_4")
                                .help("Layout preset to expand into explicit loudspeakers"),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn pvalues_accepts_several_frequencies() {
        let matches = build_cli()
            .try_get_matches_from(["vbap", "pvalues", "--dtt", "1", "--freq", "100", "1000"])
            .expect("matches");
        let (_, sub) = matches.subcommand().expect("subcommand");
        let freqs: Vec<f32> = sub.get_many::<f32>("freq").expect("freq").copied().collect();
        assert_eq!(freqs, vec![100.0, 1000.0]);
    }
}
