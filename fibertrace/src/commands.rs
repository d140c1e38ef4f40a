use crate::CLAP_STYLING;
use clap::{Arg, arg, command};

fn source_arg() -> Arg {
    arg!(-s --"source" <SOURCE>)
        .required(false)
        .help("Topology document: an http(s) URL or a local JSON file")
}

fn network_arg() -> Arg {
    arg!(-n --"network" <NETWORK>)
        .required(false)
        .help("Network id or name (default: the first network in the document)")
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("fibertrace")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("fibertrace")
        .about("Trace, tabulate and export fiber network topologies")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress spinners and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" ...)
                .help("Log more detail to stderr (-v info, -vv debug)")
                .required(false)
                .global(true)
                .action(clap::ArgAction::Count),
        )
        .arg(
            arg!(-u --"unit" <UNIT>)
                .required(false)
                .help("Display unit for distances")
                .value_parser(["km", "mi"])
                .global(true),
        )
        .arg(
            arg!(--"config" <PATH>)
                .required(false)
                .help("Config file (default: ~/.config/fibertrace/config.json)")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("trace")
                .about("Trace the path from the DC office to a node")
                .arg(source_arg())
                .arg(network_arg())
                .arg(arg!(<TARGET>).help("Id of the node to trace to"))
                .arg(
                    arg!(--"map")
                        .required(false)
                        .help("Print every edge of the network with the traced path marked")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("table")
                .about("Show the distance table of a network")
                .arg(source_arg())
                .arg(network_arg())
                .arg(
                    arg!(-f --"filter" <TEXT>)
                        .required(false)
                        .help("Only show rows containing TEXT (case-insensitive)"),
                ),
        )
        .subcommand(
            command!("export")
                .about("Export distance tables as CSV")
                .arg(source_arg())
                .arg(network_arg().conflicts_with("all"))
                .arg(
                    arg!(-a --"all")
                        .required(false)
                        .help("Export every network into one file")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("File or directory to write to, '-' for stdout (default: a dated file in the current directory)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("summary")
                .about("Cable length and coverage per network and overall")
                .arg(source_arg()),
        )
        .subcommand(
            command!("validate")
                .about("Check that every network is a tree with consistent distances")
                .arg(source_arg()),
        )
        .subcommand(
            command!("search")
                .about("Find nodes by id")
                .arg(source_arg())
                .arg(network_arg())
                .arg(arg!(<QUERY>).help("Case-insensitive part of a node id")),
        )
        .subcommand(
            command!("measure")
                .about("Great-circle distance between two coordinates")
                .allow_negative_numbers(true)
                .arg(arg!(<LAT1>).value_parser(clap::value_parser!(f64)))
                .arg(arg!(<LON1>).value_parser(clap::value_parser!(f64)))
                .arg(arg!(<LAT2>).value_parser(clap::value_parser!(f64)))
                .arg(arg!(<LON2>).value_parser(clap::value_parser!(f64))),
        )
        .subcommand(
            command!("fault")
                .about("Locate the most likely fault point for a set of affected nodes")
                .arg(source_arg())
                .arg(network_arg())
                .arg(
                    arg!(<ID>)
                        .help("Affected node ids (usually customer landlines)")
                        .num_args(1..),
                ),
        )
        .subcommand(
            command!("probe")
                .about("Probe the configured front-end targets and report the first healthy one")
                .arg(
                    arg!(-c --"redirects" <REDIRECTS_JSON>)
                        .required(false)
                        .help("Target list (default: redirects.json)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("watch")
                .about("Reload a topology periodically and re-trace a node after each reload")
                .arg(source_arg())
                .arg(network_arg())
                .arg(
                    arg!(-i --"interval" <SECS>)
                        .required(false)
                        .help("Seconds between reloads")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"count" <RELOADS>)
                        .required(false)
                        .help("Stop after this many applied reloads (default: run until Ctrl-C)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(arg!([TARGET]).help("Node to re-trace after every reload")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition_is_valid() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let matches = command_argument_builder()
            .try_get_matches_from(["fibertrace", "trace", "-s", "net.json", "Joint1", "-u", "mi", "-vv"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "trace");
        assert_eq!(sub.get_one::<String>("unit").map(String::as_str), Some("mi"));
        assert_eq!(sub.get_count("verbose"), 2);
        assert_eq!(sub.get_one::<String>("TARGET").map(String::as_str), Some("Joint1"));
    }

    #[test]
    fn test_measure_accepts_negative_coordinates() {
        let matches = command_argument_builder()
            .try_get_matches_from(["fibertrace", "measure", "-33.86", "151.2", "51.5", "-0.12"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<f64>("LON2"), Some(&-0.12));
    }

    #[test]
    fn test_export_network_conflicts_with_all() {
        let result = command_argument_builder().try_get_matches_from([
            "fibertrace", "export", "-s", "net.json", "--all", "-n", "network_1",
        ]);
        assert!(result.is_err());
    }
}
