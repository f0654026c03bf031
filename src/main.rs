use dextrace::dex::{ImageLoader, JsonImageLoader};
use dextrace::diff::ClassesDiffer;
use dextrace::timeline::{parse_version, GapPolicy, Timeline};
use dextrace::Error;

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::Path;

fn main() -> Result<(), Error> {
    env_logger::init();

    let matches = Command::new("dextrace")
        .version("0.1.0")
        .about("Track classes of an obfuscated app across releases by structural diffing")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("diff")
                .about("Diff two image artifacts and print the old-to-new mapping as JSON")
                .arg(Arg::new("OLD").help("The old image artifact").required(true))
                .arg(Arg::new("NEW").help("The new image artifact").required(true)),
        )
        .subcommand(
            Command::new("init")
                .about("Create a fresh timeline directory")
                .arg(Arg::new("NAME").help("Directory to create").required(true)),
        )
        .subcommand(
            Command::new("insert")
                .about("Store a version artifact in the timeline")
                .arg(Arg::new("VERSION").help("Version of the artifact").required(true))
                .arg(Arg::new("FILE").help("The image artifact").required(true))
                .arg(
                    Arg::new("force")
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Replace the artifact if the version already exists"),
                )
                .arg(
                    Arg::new("skip-maps")
                        .long("skip-maps")
                        .action(ArgAction::SetTrue)
                        .help("Don't eagerly compute mappings to the adjacent versions"),
                ),
        )
        .subcommand(
            Command::new("map")
                .about("Compose the class mapping between two stored versions")
                .arg(Arg::new("FROM").help("Source version").required(true))
                .arg(Arg::new("TO").help("Target version").required(true))
                .arg(
                    Arg::new("drop-unresolved")
                        .long("drop-unresolved")
                        .action(ArgAction::SetTrue)
                        .help("Drop classes unresolved at an intermediate link instead of keeping the stale name"),
                ),
        )
        .subcommand(
            Command::new("until")
                .about("Last version at which a class is still present")
                .arg(Arg::new("VERSION").help("Version to start from").required(true))
                .arg(Arg::new("CLASS").help("Class fullname at that version").required(true)),
        )
        .subcommand(
            Command::new("since")
                .about("First version since which a class is present")
                .arg(Arg::new("VERSION").help("Version to start from").required(true))
                .arg(Arg::new("CLASS").help("Class fullname at that version").required(true)),
        )
        .subcommand(Command::new("versions").about("List the stored versions in order"))
        .get_matches();

    match matches.subcommand() {
        Some(("diff", sub)) => {
            let old_classes = JsonImageLoader.load(Path::new(arg(sub, "OLD")))?;
            let new_classes = JsonImageLoader.load(Path::new(arg(sub, "NEW")))?;
            let mapping = ClassesDiffer::new().diff(&old_classes, &new_classes);
            println!("{}", serde_json::to_string(mapping.forward())?);
        }
        Some(("init", sub)) => {
            Timeline::init(arg(sub, "NAME"))?;
        }
        Some(("insert", sub)) => {
            let version = parse_version(arg(sub, "VERSION"))?;
            let timeline = Timeline::open(".")?;
            timeline.insert_version(
                &version,
                Path::new(arg(sub, "FILE")),
                sub.get_flag("force"),
                !sub.get_flag("skip-maps"),
            )?;
        }
        Some(("map", sub)) => {
            let from = parse_version(arg(sub, "FROM"))?;
            let to = parse_version(arg(sub, "TO"))?;
            let gap = if sub.get_flag("drop-unresolved") {
                GapPolicy::Drop
            } else {
                GapPolicy::RetainStale
            };
            let mapping = Timeline::open(".")?.map_range_with(&from, &to, gap)?;
            println!("{}", serde_json::to_string(&mapping)?);
        }
        Some(("until", sub)) => {
            let version = parse_version(arg(sub, "VERSION"))?;
            let last = Timeline::open(".")?.until(&version, arg(sub, "CLASS"))?;
            println!("{}", last);
        }
        Some(("since", sub)) => {
            let version = parse_version(arg(sub, "VERSION"))?;
            let first = Timeline::open(".")?.since(&version, arg(sub, "CLASS"))?;
            println!("{}", first);
        }
        Some(("versions", _)) => {
            for version in Timeline::open(".")?.versions()? {
                println!("{}", version);
            }
        }
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .expect("required argument")
        .as_str()
}
